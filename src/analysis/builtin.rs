use crate::analysis::runner::{ResultsTable, RunContext};
use crate::coverage::{self, CatalogEntry};
use crate::layouts::Layout;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

/// Error half of an analysis outcome: the fallback value stored in the
/// results table plus a diagnostic for the log.
#[derive(Debug)]
pub struct AnalysisFailure {
    pub value: Value,
    pub reason: String,
}

pub type Outcome = Result<Value, AnalysisFailure>;

/// The callable behind a registered analysis, shaped by its execution
/// modes: global bodies see both collections through the context, per-item
/// bodies see one layout, iterating bodies additionally see the entire
/// opposing collection, and per-key bodies see one catalog entry.
pub enum AnalysisImpl {
    Global(fn(&RunContext, &ResultsTable) -> Outcome),
    PerLayout(fn(&RunContext, &ResultsTable, &Layout) -> Outcome),
    Iterate(fn(&RunContext, &ResultsTable, &Layout, &[Layout]) -> Outcome),
    PerKey(fn(&RunContext, &ResultsTable, &CatalogEntry, &[Layout]) -> Outcome),
}

/// Resolves a registered name to its implementation. A name registered in
/// the catalog but absent here is a recoverable runner-level failure, not a
/// compile-time guarantee.
pub fn implementation(name: &str) -> Option<AnalysisImpl> {
    use AnalysisImpl::{Global, Iterate, PerKey, PerLayout};
    Some(match name {
        "num_keyboards" => Global(num_keyboards),
        "num_kits" => Global(num_kits),
        "most_common_kit_keys" => Global(most_common_kit_keys),
        "most_common_keyboard_keys" => Global(most_common_keyboard_keys),
        "most_common_kit_keys_format" => Global(most_common_kit_keys_format),
        "most_common_keyboard_keys_format" => Global(most_common_keyboard_keys_format),
        "count_units" => PerLayout(count_units),
        "compute_covering_set" => Iterate(compute_covering_set),
        "exists_covering_set" => PerLayout(exists_covering_set),
        "number_of_covering_sets" => PerLayout(number_of_covering_sets),
        "count_covering_set_units" => PerLayout(count_covering_set_units),
        "covering_set_of_lowest_units" => PerLayout(covering_set_of_lowest_units),
        "covering_set_of_lowest_units_surplus" => PerLayout(covering_set_of_lowest_units_surplus),
        "covering_set_of_lowest_units_surplus_amount" => {
            PerLayout(covering_set_of_lowest_units_surplus_amount)
        }
        "covering_set_of_lowest_units_surplus_value" => {
            PerLayout(covering_set_of_lowest_units_surplus_value)
        }
        "covering_set_cardinalities" => PerLayout(covering_set_cardinalities),
        "covering_set_of_lowest_cardinality" => PerLayout(covering_set_of_lowest_cardinality),
        "covering_set_of_lowest_cardinality_amount" => {
            PerLayout(covering_set_of_lowest_cardinality_amount)
        }
        "covering_set_of_lowest_cardinality_value" => {
            PerLayout(covering_set_of_lowest_cardinality_value)
        }
        "most_cumbersome_keyboard" => Global(most_cumbersome_keyboard),
        "most_wasteful_keyboard" => Global(most_wasteful_keyboard),
        "least_used_kit" => Global(least_used_kit),
        "smallest_set_is_minimal_surplus" => PerLayout(smallest_set_is_minimal_surplus),
        "all_boards_smallest_set_is_minimal_surplus" => {
            Global(all_boards_smallest_set_is_minimal_surplus)
        }
        "all_kits_covered" => Global(all_kits_covered),
        "all_keyboards_covered" => Global(all_keyboards_covered),
        "uncovered_keys" => Iterate(uncovered_keys),
        "key_in_kits" => PerKey(key_membership),
        "key_in_keyboards" => PerKey(key_membership),
        _ => return None,
    })
}

fn failed(reason: String) -> AnalysisFailure {
    AnalysisFailure {
        value: Value::Null,
        reason,
    }
}

fn require_item<'r>(
    results: &'r ResultsTable,
    analysis: &str,
    item: &str,
) -> Result<&'r Value, AnalysisFailure> {
    results
        .item(analysis, item)
        .ok_or_else(|| failed(format!("no \"{analysis}\" result recorded for \"{item}\"")))
}

// ---------------------------------------------------------------------------
// Global analyses
// ---------------------------------------------------------------------------

fn num_keyboards(ctx: &RunContext, _results: &ResultsTable) -> Outcome {
    Ok(json!(ctx.keyboards.len()))
}

fn num_kits(ctx: &RunContext, _results: &ResultsTable) -> Outcome {
    Ok(json!(ctx.kits.len()))
}

fn most_common_kit_keys(ctx: &RunContext, _results: &ResultsTable) -> Outcome {
    Ok(most_common_keys(ctx, ctx.kits))
}

fn most_common_keyboard_keys(ctx: &RunContext, _results: &ResultsTable) -> Outcome {
    Ok(most_common_keys(ctx, ctx.keyboards))
}

/// Occurrence counts of every canonical identity across `layouts`, most
/// frequent first, identity as the tie-break, truncated to the cutoff.
fn most_common_keys(ctx: &RunContext, layouts: &[Layout]) -> Value {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for layout in layouts {
        for key in &layout.keys {
            *counts.entry(key.canonical_id()).or_insert(0) += 1;
        }
    }
    let mut occurrences: Vec<(String, u64)> = counts.into_iter().collect();
    occurrences.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ctx.cfg.apply_cutoff(&mut occurrences);
    Value::Array(
        occurrences
            .into_iter()
            .map(|(id, count)| json!([id, count]))
            .collect(),
    )
}

fn most_common_kit_keys_format(_ctx: &RunContext, results: &ResultsTable) -> Outcome {
    format_key_occurrences(results, "most_common_kit_keys")
}

fn most_common_keyboard_keys_format(_ctx: &RunContext, results: &ResultsTable) -> Outcome {
    format_key_occurrences(results, "most_common_keyboard_keys")
}

fn format_key_occurrences(results: &ResultsTable, source: &str) -> Outcome {
    let occurrences = results
        .global(source)
        .and_then(Value::as_array)
        .ok_or_else(|| failed(format!("no \"{source}\" result recorded")))?;
    let lines: Vec<Value> = occurrences
        .iter()
        .map(|pair| {
            let id = pair.get(0).and_then(Value::as_str).unwrap_or("?");
            let count = pair.get(1).and_then(Value::as_u64).unwrap_or(0);
            json!(format!("{} ({})", id, count))
        })
        .collect();
    Ok(Value::Array(lines))
}

fn most_cumbersome_keyboard(_ctx: &RunContext, results: &ResultsTable) -> Outcome {
    let best = best_per_keyboard(results, "covering_set_of_lowest_cardinality")?;
    Ok(match best {
        Some((name, cardinality)) => json!(format!("{} ({})", name, cardinality)),
        None => Value::Null,
    })
}

fn most_wasteful_keyboard(_ctx: &RunContext, results: &ResultsTable) -> Outcome {
    let best = best_per_keyboard(results, "covering_set_of_lowest_units_surplus")?;
    Ok(match best {
        Some((name, surplus)) => json!(format!("{} ({:.2})", name, surplus)),
        None => Value::Null,
    })
}

/// The keyboard whose `[amount, names]` entry has the largest amount.
/// Alphabetically-first name wins ties; `None` when no keyboard has one.
fn best_per_keyboard(
    results: &ResultsTable,
    analysis: &str,
) -> Result<Option<(String, f64)>, AnalysisFailure> {
    let items = results
        .items(analysis)
        .ok_or_else(|| failed(format!("no \"{analysis}\" results recorded")))?;
    let mut best: Option<(String, f64)> = None;
    for (name, value) in items {
        let Some(amount) = value.get(0).and_then(Value::as_f64) else {
            continue;
        };
        if best.as_ref().map_or(true, |(_, b)| amount > *b) {
            best = Some((name.clone(), amount));
        }
    }
    Ok(best)
}

fn least_used_kit(ctx: &RunContext, results: &ResultsTable) -> Outcome {
    if ctx.kits.is_empty() {
        return Ok(Value::Null);
    }
    let covering = results
        .items("compute_covering_set")
        .ok_or_else(|| failed("no \"compute_covering_set\" results recorded".to_string()))?;

    // Count, per kit, the distinct keyboards whose covering sets mention it.
    let mut used_by: HashMap<&str, HashSet<&str>> = HashMap::new();
    for kit in ctx.kits {
        used_by.insert(kit.name.as_str(), HashSet::new());
    }
    for board in ctx.keyboards {
        let Some(sets) = covering.get(&board.name).and_then(Value::as_array) else {
            continue;
        };
        for set in sets {
            for member in set.as_array().into_iter().flatten() {
                if let Some(name) = member.as_str() {
                    if let Some(boards) = used_by.get_mut(name) {
                        boards.insert(board.name.as_str());
                    }
                }
            }
        }
    }

    let mut counts: Vec<(&str, usize)> = used_by
        .into_iter()
        .map(|(kit, boards)| (kit, boards.len()))
        .collect();
    counts.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    let (kit, count) = counts[0];
    Ok(json!(format!("{} ({})", kit, count)))
}

fn all_boards_smallest_set_is_minimal_surplus(
    _ctx: &RunContext,
    results: &ResultsTable,
) -> Outcome {
    let items = results
        .items("smallest_set_is_minimal_surplus")
        .ok_or_else(|| failed("no \"smallest_set_is_minimal_surplus\" results".to_string()))?;
    Ok(json!(items.values().all(|v| v.as_bool() == Some(true))))
}

fn all_kits_covered(ctx: &RunContext, results: &ResultsTable) -> Outcome {
    all_covered(results, ctx.kits)
}

fn all_keyboards_covered(ctx: &RunContext, results: &ResultsTable) -> Outcome {
    all_covered(results, ctx.keyboards)
}

fn all_covered(results: &ResultsTable, layouts: &[Layout]) -> Outcome {
    let mut covered = true;
    for layout in layouts {
        let exists = require_item(results, "exists_covering_set", &layout.name)?;
        covered &= exists.as_bool() == Some(true);
    }
    Ok(json!(covered))
}

// ---------------------------------------------------------------------------
// Per-layout analyses
// ---------------------------------------------------------------------------

fn count_units(_ctx: &RunContext, _results: &ResultsTable, layout: &Layout) -> Outcome {
    Ok(json!(layout.units()))
}

fn exists_covering_set(_ctx: &RunContext, results: &ResultsTable, layout: &Layout) -> Outcome {
    let sets = require_item(results, "compute_covering_set", &layout.name)?;
    Ok(json!(sets.as_array().is_some_and(|a| !a.is_empty())))
}

fn number_of_covering_sets(_ctx: &RunContext, results: &ResultsTable, layout: &Layout) -> Outcome {
    let sets = require_item(results, "compute_covering_set", &layout.name)?;
    Ok(json!(sets.as_array().map_or(0, Vec::len)))
}

/// Pairs every covering set of this keyboard with its total unit count:
/// `[[units, [kit names...]], ...]`.
fn count_covering_set_units(ctx: &RunContext, results: &ResultsTable, layout: &Layout) -> Outcome {
    let sets = require_item(results, "compute_covering_set", &layout.name)?;
    let mut priced = Vec::new();
    for set in sets.as_array().into_iter().flatten() {
        let mut units = 0.0;
        for member in set.as_array().into_iter().flatten() {
            let name = member.as_str().unwrap_or_default();
            let kit = ctx
                .layout(name)
                .ok_or_else(|| failed(format!("covering set names unknown layout \"{name}\"")))?;
            units += kit.units();
        }
        priced.push(json!([units, set]));
    }
    Ok(Value::Array(priced))
}

fn covering_set_of_lowest_units(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let priced = require_item(results, "count_covering_set_units", &layout.name)?;
    Ok(min_by_amount(priced))
}

fn covering_set_of_lowest_units_surplus(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let lowest = require_item(results, "covering_set_of_lowest_units", &layout.name)?;
    let Some(units) = lowest.get(0).and_then(Value::as_f64) else {
        return Ok(Value::Null);
    };
    let names = lowest.get(1).cloned().unwrap_or(Value::Null);
    Ok(json!([units - layout.units(), names]))
}

fn covering_set_of_lowest_units_surplus_amount(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let surplus = require_item(results, "covering_set_of_lowest_units_surplus", &layout.name)?;
    Ok(surplus.get(0).cloned().unwrap_or(Value::Null))
}

fn covering_set_of_lowest_units_surplus_value(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let surplus = require_item(results, "covering_set_of_lowest_units_surplus", &layout.name)?;
    Ok(surplus.get(1).cloned().unwrap_or(Value::Null))
}

/// Pairs every covering set with its member count: `[[n, [names...]], ...]`.
fn covering_set_cardinalities(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let sets = require_item(results, "compute_covering_set", &layout.name)?;
    let sized: Vec<Value> = sets
        .as_array()
        .into_iter()
        .flatten()
        .map(|set| json!([set.as_array().map_or(0, Vec::len), set]))
        .collect();
    Ok(Value::Array(sized))
}

fn covering_set_of_lowest_cardinality(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let sized = require_item(results, "covering_set_cardinalities", &layout.name)?;
    Ok(min_by_amount(sized))
}

fn covering_set_of_lowest_cardinality_amount(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let lowest = require_item(results, "covering_set_of_lowest_cardinality", &layout.name)?;
    Ok(lowest.get(0).cloned().unwrap_or(Value::Null))
}

fn covering_set_of_lowest_cardinality_value(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let lowest = require_item(results, "covering_set_of_lowest_cardinality", &layout.name)?;
    Ok(lowest.get(1).cloned().unwrap_or(Value::Null))
}

fn smallest_set_is_minimal_surplus(
    _ctx: &RunContext,
    results: &ResultsTable,
    layout: &Layout,
) -> Outcome {
    let by_cardinality =
        require_item(results, "covering_set_of_lowest_cardinality", &layout.name)?;
    let by_units = require_item(results, "covering_set_of_lowest_units", &layout.name)?;
    let (Some(smallest), Some(cheapest)) = (name_set(by_cardinality), name_set(by_units)) else {
        return Ok(Value::Null);
    };
    Ok(json!(smallest == cheapest))
}

/// The member names of an `[amount, [names...]]` entry, as a set.
fn name_set(entry: &Value) -> Option<HashSet<&str>> {
    let names = entry.get(1)?.as_array()?;
    Some(names.iter().filter_map(Value::as_str).collect())
}

/// The `[amount, names]` pair with the smallest amount, `Null` when the
/// list is empty. First entry wins ties, matching the sorted covering-set
/// order.
fn min_by_amount(entries: &Value) -> Value {
    let mut best: Option<&Value> = None;
    let mut best_amount = f64::INFINITY;
    for entry in entries.as_array().into_iter().flatten() {
        let Some(amount) = entry.get(0).and_then(Value::as_f64) else {
            continue;
        };
        if amount < best_amount {
            best_amount = amount;
            best = Some(entry);
        }
    }
    best.cloned().unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// Iterating analyses
// ---------------------------------------------------------------------------

fn compute_covering_set(
    ctx: &RunContext,
    _results: &ResultsTable,
    layout: &Layout,
    library: &[Layout],
) -> Outcome {
    let sets = coverage::covering_sets(ctx.cfg.search_mode(), ctx.catalog, layout, library)
        .map_err(|e| AnalysisFailure {
            value: json!([]),
            reason: e.to_string(),
        })?;
    if sets.is_empty() {
        return Err(AnalysisFailure {
            value: json!([]),
            reason: format!("no covering set exists for \"{}\"", layout.name),
        });
    }
    Ok(json!(sets))
}

fn uncovered_keys(
    ctx: &RunContext,
    _results: &ResultsTable,
    layout: &Layout,
    library: &[Layout],
) -> Outcome {
    let mut missing: Vec<String> = coverage::uncovered_keys(layout, library)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    ctx.cfg.apply_cutoff(&mut missing);
    Ok(json!(missing))
}

// ---------------------------------------------------------------------------
// Per-key analyses
// ---------------------------------------------------------------------------

fn key_membership(
    _ctx: &RunContext,
    _results: &ResultsTable,
    entry: &CatalogEntry,
    layouts: &[Layout],
) -> Outcome {
    let members: Vec<&str> = layouts
        .iter()
        .filter(|l| l.contains_id(&entry.id))
        .map(|l| l.name.as_str())
        .collect();
    Ok(json!(members))
}
