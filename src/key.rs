use serde::{Deserialize, Serialize};

/// KLE renders caps in this colour when none is given.
pub const DEFAULT_CAP_COLOR: &str = "#cccccc";
/// Default legend colour in KLE.
pub const DEFAULT_LEGEND_COLOR: &str = "#000000";

/// One physical keycap as it appears in a layout.
///
/// Colour fields are `None` when they match the KLE defaults, so that a cap
/// in the default colours and a cap with the colours spelled out explicitly
/// canonicalize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub label: String,
    pub width: f64,
    pub height: f64,
    /// Secondary rectangle, for stepped and L-shaped caps.
    pub width2: f64,
    pub height2: f64,
    /// Offset of the secondary rectangle relative to the primary one.
    pub x2: f64,
    #[serde(default)]
    pub cap_color: Option<String>,
    #[serde(default)]
    pub legend_color: Option<String>,
    #[serde(default)]
    pub homing: bool,
    #[serde(default)]
    pub stepped: bool,
}

impl Key {
    /// A plain rectangular cap with default colours and no flags.
    pub fn plain(label: &str, width: f64, height: f64) -> Self {
        Key {
            label: label.to_string(),
            width,
            height,
            width2: width,
            height2: height,
            x2: 0.0,
            cap_color: None,
            legend_color: None,
            homing: false,
            stepped: false,
        }
    }

    /// The standard ISO enter shape: 1.25x2 primary, 1.5x1 secondary
    /// hanging a quarter unit to the left.
    pub fn is_iso_enter(&self) -> bool {
        self.width == 1.25
            && self.height == 2.0
            && self.width2 == 1.5
            && self.height2 == 1.0
            && self.x2 == -0.25
    }

    /// Keycap size in units: the largest dimension of either rectangle.
    /// The secondary rectangle only counts when it is not the trivial 1x1.
    pub fn units(&self) -> f64 {
        let mut size = self.width.max(self.height);
        if self.width2 != 1.0 || self.height2 != 1.0 {
            size = size.max(self.width2).max(self.height2);
        }
        size
    }

    /// Canonical identity: two caps with equal identities are
    /// interchangeable for coverage purposes. Doubles as the display name.
    ///
    /// Shape: `label-WxH[w2xh2][-flags][-𝕔#colour][-𝕥#colour]` where flags
    /// are `H` (homing), `I` (ISO enter) and `S` (stepped), and colours
    /// appear only when they differ from the KLE defaults.
    pub fn canonical_id(&self) -> String {
        let name = self.label.replace('\n', "_").replace(' ', "+");

        let mut dims = format!("{:.2}x{:.2}", self.width, self.height);
        if (self.width2 != self.width || self.height2 != self.height)
            && (self.width2 != 1.0 || self.height2 != 1.0)
        {
            dims.push_str(&format!("[{:.2}x{:.2}]", self.width2, self.height2));
        }

        let mut flags = String::new();
        if self.homing {
            flags.push('H');
        }
        if self.is_iso_enter() {
            flags.push('I');
        }
        if self.stepped {
            flags.push('S');
        }

        let mut parts = vec![name, dims];
        if !flags.is_empty() {
            parts.push(flags);
        }
        if let Some(colour) = &self.cap_color {
            parts.push(format!("\u{1d554}{}", colour));
        }
        if let Some(colour) = &self.legend_color {
            parts.push(format!("\u{1d565}{}", colour));
        }
        parts.join("-")
    }
}
