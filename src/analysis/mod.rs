//! The analysis dependency pipeline: a registry of named, interdependent
//! analyses, a topological linearizer and the runner that executes them
//! over the loaded layouts.

pub mod builtin;
pub mod catalog;
pub mod linearize;
pub mod runner;

pub use catalog::{builtin_catalog, AnalysisDescriptor, ExecModes, DEFAULT_VERBOSITY};
pub use linearize::linearize;
pub use runner::{run_analyses, ResultsTable, RunContext, RunOutput};
