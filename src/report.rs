use crate::analysis::catalog::{AnalysisDescriptor, ExecModes};
use crate::analysis::runner::{ResultsTable, RunContext};
use crate::config::{AnalysisConfig, OutputFormat};
use crate::error::KcResult;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

/// The user-facing results, one list of rows per category. Only analyses
/// that are not internal and whose verbosity the run met appear here; the
/// private results table keeps everything else.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    #[serde(rename = "General analysis", skip_serializing_if = "Vec::is_empty")]
    pub general: Vec<Map<String, Value>>,
    #[serde(
        rename = "Keyboard-specific analysis",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub keyboards: Vec<Map<String, Value>>,
    #[serde(rename = "Kit-specific analysis", skip_serializing_if = "Vec::is_empty")]
    pub kits: Vec<Map<String, Value>>,
    #[serde(rename = "Key-specific analysis", skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Map<String, Value>>,
}

fn surfaced(desc: &AnalysisDescriptor, cfg: &AnalysisConfig) -> bool {
    !desc.internal && cfg.verbosity >= desc.verbosity
}

impl Report {
    /// Assembles the report from the private results table, applying the
    /// internal flag and verbosity gate per descriptor.
    pub fn build(
        cfg: &AnalysisConfig,
        ordered: &[&AnalysisDescriptor],
        results: &ResultsTable,
        ctx: &RunContext,
    ) -> Report {
        let mut general = Vec::new();
        for desc in ordered {
            if !desc.modes.contains(ExecModes::GLOBAL) || !surfaced(desc, cfg) {
                continue;
            }
            if let Some(value) = results.global(desc.name) {
                let mut row = Map::new();
                row.insert("Analysis".to_string(), json_str(desc.label));
                row.insert("Value".to_string(), value.clone());
                general.push(row);
            }
        }
        general.sort_by(|a, b| row_key(a, "Analysis").cmp(&row_key(b, "Analysis")));

        let keyboard_rows = item_rows(
            cfg,
            ordered,
            results,
            "Layout",
            ctx.keyboards.iter().map(|l| l.name.as_str()),
            ExecModes::PER_KEYBOARD.with(ExecModes::ITER_KEYBOARDS),
        );
        let kit_rows = item_rows(
            cfg,
            ordered,
            results,
            "Layout",
            ctx.kits.iter().map(|l| l.name.as_str()),
            ExecModes::PER_KIT.with(ExecModes::ITER_KITS),
        );
        let key_rows = item_rows(
            cfg,
            ordered,
            results,
            "Key",
            ctx.catalog.entries().iter().map(|e| e.id.as_str()),
            ExecModes::ITER_KIT_KEYS.with(ExecModes::ITER_KEYBOARD_KEYS),
        );

        Report {
            general,
            keyboards: keyboard_rows,
            kits: kit_rows,
            keys: key_rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty()
            && self.keyboards.is_empty()
            && self.kits.is_empty()
            && self.keys.is_empty()
    }
}

/// One row per item; a category with no surfaced columns collapses to
/// nothing rather than printing bare item names.
fn item_rows<'a>(
    cfg: &AnalysisConfig,
    ordered: &[&AnalysisDescriptor],
    results: &ResultsTable,
    item_label: &str,
    items: impl Iterator<Item = &'a str>,
    any_of: ExecModes,
) -> Vec<Map<String, Value>> {
    let columns: Vec<&AnalysisDescriptor> = ordered
        .iter()
        .copied()
        .filter(|d| surfaced(d, cfg) && overlaps(d.modes, any_of))
        .collect();
    if columns.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    let mut populated = false;
    for item in items {
        let mut row = Map::new();
        row.insert(item_label.to_string(), json_str(item));
        for desc in &columns {
            if let Some(value) = results.item(desc.name, item) {
                row.insert(desc.label.to_string(), value.clone());
                populated = true;
            }
        }
        rows.push(row);
    }
    if populated {
        rows
    } else {
        Vec::new()
    }
}

fn overlaps(modes: ExecModes, any_of: ExecModes) -> bool {
    [
        ExecModes::PER_KIT,
        ExecModes::PER_KEYBOARD,
        ExecModes::ITER_KITS,
        ExecModes::ITER_KEYBOARDS,
        ExecModes::ITER_KIT_KEYS,
        ExecModes::ITER_KEYBOARD_KEYS,
    ]
    .into_iter()
    .any(|m| modes.contains(m) && any_of.contains(m))
}

fn json_str(s: &str) -> Value {
    Value::String(s.to_string())
}

fn row_key(row: &Map<String, Value>, field: &str) -> String {
    row.get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Renders the report in the requested output format. `None` yields the
/// empty string.
pub fn render(report: &Report, format: OutputFormat) -> KcResult<String> {
    Ok(match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            out
        }
        OutputFormat::Yaml => serde_yaml::to_string(report)?,
        OutputFormat::None => String::new(),
    })
}

fn render_text(report: &Report) -> String {
    let mut out = String::new();
    for (title, item_label, rows) in [
        ("General analysis", "Analysis", &report.general),
        ("Keyboard-specific analysis", "Layout", &report.keyboards),
        ("Kit-specific analysis", "Layout", &report.kits),
        ("Key-specific analysis", "Key", &report.keys),
    ] {
        if rows.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("{}\n{}\n", title, category_table(item_label, rows)));
    }
    out
}

fn category_table(item_label: &str, rows: &[Map<String, Value>]) -> Table {
    // Item column first, remaining columns alphabetical.
    let mut columns: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .filter(|c| *c != item_label && *c != "Value")
        .unique()
        .sorted()
        .collect();
    columns.insert(0, item_label);
    if rows.iter().any(|r| r.contains_key("Value")) {
        columns.push("Value");
    }

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(
        columns
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| Cell::new(row.get(*c).map_or_else(|| "-".to_string(), fmt_value)))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Human formatting for one cell: no quotes around strings, lists joined
/// with commas, `-` for absent values.
fn fmt_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Array(_) => format!("[{}]", fmt_value(v)),
                _ => fmt_value(v),
            })
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}
