use crate::analysis::builtin::{self, AnalysisImpl, Outcome};
use crate::analysis::catalog::{builtin_catalog, AnalysisDescriptor, ExecModes};
use crate::analysis::linearize::linearize;
use crate::config::AnalysisConfig;
use crate::coverage::KeyCatalog;
use crate::error::KcResult;
use crate::layouts::Layout;
use crate::report::Report;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::error;

/// Folded into the exit code when a registered analysis has no
/// implementation behind it.
pub const MISSING_IMPL_EXIT: i32 = -1;

/// Everything an analysis body may look at. Immutable for the whole run;
/// the results table is the only thing that accumulates.
pub struct RunContext<'a> {
    pub cfg: &'a AnalysisConfig,
    pub catalog: &'a KeyCatalog,
    pub keyboards: &'a [Layout],
    pub kits: &'a [Layout],
    by_name: HashMap<&'a str, &'a Layout>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        cfg: &'a AnalysisConfig,
        catalog: &'a KeyCatalog,
        keyboards: &'a [Layout],
        kits: &'a [Layout],
    ) -> Self {
        let mut by_name = HashMap::with_capacity(keyboards.len() + kits.len());
        for layout in kits.iter().chain(keyboards.iter()) {
            by_name.insert(layout.name.as_str(), layout);
        }
        RunContext {
            cfg,
            catalog,
            keyboards,
            kits,
            by_name,
        }
    }

    pub fn layout(&self, name: &str) -> Option<&'a Layout> {
        self.by_name.get(name).copied()
    }
}

/// The private results table: every analysis result lands here keyed by
/// analysis name, regardless of verbosity, so dependents can read it.
#[derive(Debug, Default)]
pub struct ResultsTable {
    globals: HashMap<String, Value>,
    per_item: HashMap<String, BTreeMap<String, Value>>,
}

impl ResultsTable {
    pub fn global(&self, analysis: &str) -> Option<&Value> {
        self.globals.get(analysis)
    }

    pub fn item(&self, analysis: &str, item: &str) -> Option<&Value> {
        self.per_item.get(analysis).and_then(|m| m.get(item))
    }

    pub fn items(&self, analysis: &str) -> Option<&BTreeMap<String, Value>> {
        self.per_item.get(analysis)
    }

    fn set_global(&mut self, analysis: &str, value: Value) {
        self.globals.insert(analysis.to_string(), value);
    }

    fn set_item(&mut self, analysis: &str, item: &str, value: Value) {
        self.per_item
            .entry(analysis.to_string())
            .or_default()
            .insert(item.to_string(), value);
    }

    /// A per-item analysis registers an (initially empty) entry before its
    /// first invocation, so dependents always find a map to read.
    fn ensure_items(&mut self, analysis: &str) {
        self.per_item.entry(analysis.to_string()).or_default();
    }
}

pub struct RunOutput {
    /// Bitwise OR of every failed analysis' exit bit; 0 on full success.
    pub exit_code: i32,
    pub results: ResultsTable,
    pub report: Report,
}

/// Runs every registered analysis in dependency order over the loaded
/// layouts. Configuration errors (unknown or cyclic requirements) abort
/// before anything executes; per-analysis failures are logged, folded into
/// the exit code and do not halt the pipeline.
pub fn run_analyses(
    cfg: &AnalysisConfig,
    keyboards: &[Layout],
    kits: &[Layout],
    catalog: &KeyCatalog,
) -> KcResult<RunOutput> {
    let ordered = linearize(builtin_catalog())?;
    let ctx = RunContext::new(cfg, catalog, keyboards, kits);
    let mut results = ResultsTable::default();
    let mut exit_code = 0;

    for desc in &ordered {
        let Some(body) = builtin::implementation(desc.name) else {
            error!(
                "analysis \"{}\" was requested but is not implemented",
                desc.name
            );
            exit_code |= MISSING_IMPL_EXIT;
            continue;
        };
        exit_code |= run_one(desc, &body, &ctx, &mut results);
    }

    let report = Report::build(cfg, &ordered, &results, &ctx);
    Ok(RunOutput {
        exit_code,
        results,
        report,
    })
}

/// Routes one descriptor through its execution modes. Returns the exit
/// bits collected from failed invocations.
fn run_one(
    desc: &AnalysisDescriptor,
    body: &AnalysisImpl,
    ctx: &RunContext,
    results: &mut ResultsTable,
) -> i32 {
    let mut exit = 0;

    match body {
        AnalysisImpl::Global(f) if desc.modes.contains(ExecModes::GLOBAL) => {
            let value = unwrap_outcome(desc, f(ctx, results), &mut exit);
            results.set_global(desc.name, value);
        }
        AnalysisImpl::PerLayout(f) if desc.modes.is_per_item() => {
            results.ensure_items(desc.name);
            if desc.modes.contains(ExecModes::PER_KIT) {
                for layout in ctx.kits {
                    let value = unwrap_outcome(desc, f(ctx, results, layout), &mut exit);
                    results.set_item(desc.name, &layout.name, value);
                }
            }
            if desc.modes.contains(ExecModes::PER_KEYBOARD) {
                for layout in ctx.keyboards {
                    let value = unwrap_outcome(desc, f(ctx, results, layout), &mut exit);
                    results.set_item(desc.name, &layout.name, value);
                }
            }
        }
        AnalysisImpl::Iterate(f) if desc.modes.is_per_item() => {
            results.ensure_items(desc.name);
            if desc.modes.contains(ExecModes::ITER_KITS) {
                for layout in ctx.kits {
                    let value =
                        unwrap_outcome(desc, f(ctx, results, layout, ctx.keyboards), &mut exit);
                    results.set_item(desc.name, &layout.name, value);
                }
            }
            if desc.modes.contains(ExecModes::ITER_KEYBOARDS) {
                for layout in ctx.keyboards {
                    let value = unwrap_outcome(desc, f(ctx, results, layout, ctx.kits), &mut exit);
                    results.set_item(desc.name, &layout.name, value);
                }
            }
        }
        AnalysisImpl::PerKey(f) if desc.modes.is_per_item() => {
            results.ensure_items(desc.name);
            if desc.modes.contains(ExecModes::ITER_KIT_KEYS) {
                for entry in ctx.catalog.entries() {
                    let value = unwrap_outcome(desc, f(ctx, results, entry, ctx.kits), &mut exit);
                    results.set_item(desc.name, &entry.id, value);
                }
            }
            if desc.modes.contains(ExecModes::ITER_KEYBOARD_KEYS) {
                for entry in ctx.catalog.entries() {
                    let value =
                        unwrap_outcome(desc, f(ctx, results, entry, ctx.keyboards), &mut exit);
                    results.set_item(desc.name, &entry.id, value);
                }
            }
        }
        _ => {
            error!(
                "analysis \"{}\" has an implementation incompatible with its execution modes",
                desc.name
            );
            exit |= MISSING_IMPL_EXIT;
        }
    }

    exit
}

/// One invocation boundary: a failed outcome is logged, flags the
/// descriptor's exit bit and falls back to the value the failure carried.
fn unwrap_outcome(desc: &AnalysisDescriptor, outcome: Outcome, exit: &mut i32) -> Value {
    match outcome {
        Ok(value) => value,
        Err(failure) => {
            error!("analysis \"{}\" failed: {}", desc.name, failure.reason);
            *exit |= desc.exit_bit;
            failure.value
        }
    }
}
