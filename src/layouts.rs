use crate::error::{KcResult, KitcovError};
use crate::key::{Key, DEFAULT_CAP_COLOR, DEFAULT_LEGEND_COLOR};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A named collection of keycaps. Whether it acts as a kit (supply) or a
/// keyboard (demand) is decided by the caller, not the type.
#[derive(Debug, Clone)]
pub struct Layout {
    pub name: String,
    pub keys: Vec<Key>,
}

impl Layout {
    pub fn new(name: &str, keys: Vec<Key>) -> Self {
        Layout {
            name: name.to_string(),
            keys,
        }
    }

    /// Total keycap material in units.
    pub fn units(&self) -> f64 {
        self.keys.iter().map(Key::units).sum()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.keys.iter().any(|k| k.canonical_id() == id)
    }
}

/// Collects every `.json`/`.yaml`/`.yml` file under `path`, recursively.
/// A path naming a file is accepted as-is; a missing path is fatal.
pub fn discover_layout_files(path: &Path) -> KcResult<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(KitcovError::Layout(format!(
            "could not find file or directory \"{}\"",
            path.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| KitcovError::Layout(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let ext = entry
            .path()
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        if matches!(ext.as_deref(), Some("json" | "yaml" | "yml")) {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// Loads every layout found under `path`.
pub fn load_path(path: &Path) -> KcResult<Vec<Layout>> {
    let files = discover_layout_files(path)?;
    let mut layouts = Vec::with_capacity(files.len());
    for file in &files {
        layouts.push(parse_layout_file(file)?);
    }
    disambiguate_names(&mut layouts);
    Ok(layouts)
}

/// Parses one KLE file (JSON or YAML) into a [`Layout`] named after the
/// file stem.
pub fn parse_layout_file(path: &Path) -> KcResult<Layout> {
    let content = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    let keyboard: kle_serial::Keyboard = match ext.as_deref() {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        _ => serde_json::from_str(&content)?,
    };

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let keys = keyboard
        .keys
        .into_iter()
        .filter_map(convert_key)
        .collect::<Vec<_>>();
    debug!("parsed layout '{}' with {} keys", name, keys.len());
    Ok(Layout { name, keys })
}

/// Maps a KLE key record to a [`Key`]. Decals carry no physical cap and
/// yield `None`.
fn convert_key(key: kle_serial::Key) -> Option<Key> {
    if key.decal {
        return None;
    }

    let label = key
        .legends
        .iter()
        .flatten()
        .find(|l| !l.text.is_empty())
        .map(|l| l.text.clone())
        .unwrap_or_default();

    let cap_color = some_if_not_default(color_hex(&key.color), DEFAULT_CAP_COLOR);
    let legend_color = key
        .legends
        .iter()
        .flatten()
        .find(|l| !l.text.is_empty())
        .map(|l| color_hex(&l.color))
        .and_then(|c| some_if_not_default(c, DEFAULT_LEGEND_COLOR));

    Some(Key {
        label,
        width: key.width,
        height: key.height,
        width2: key.width2,
        height2: key.height2,
        x2: key.x2,
        cap_color,
        legend_color,
        homing: key.homing,
        stepped: key.stepped,
    })
}

fn color_hex(color: &kle_serial::Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

fn some_if_not_default(colour: String, default: &str) -> Option<String> {
    if colour.eq_ignore_ascii_case(default) {
        None
    } else {
        Some(colour)
    }
}

/// Results are keyed by layout name, so names must be unique across every
/// collection of one run. Colliding stems gain a numeric suffix.
pub fn disambiguate_names(layouts: &mut [Layout]) {
    let mut seen: HashSet<String> = HashSet::new();
    for layout in layouts.iter_mut() {
        let mut candidate = layout.name.clone();
        let mut counter = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{} ({})", layout.name, counter);
            counter += 1;
        }
        layout.name = candidate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_stems_are_disambiguated() {
        let mut layouts = vec![
            Layout::new("base", vec![]),
            Layout::new("base", vec![]),
            Layout::new("extras", vec![]),
        ];
        disambiguate_names(&mut layouts);
        let names: Vec<&str> = layouts.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["base", "base (2)", "extras"]);
    }

    #[test]
    fn layout_units_sum_member_units() {
        let layout = Layout::new(
            "k",
            vec![Key::plain("A", 1.0, 1.0), Key::plain("Shift", 2.25, 1.0)],
        );
        assert_eq!(layout.units(), 3.25);
    }
}
