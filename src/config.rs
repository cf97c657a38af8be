use crate::coverage::SearchMode;
use clap::{Args, ValueEnum};

/// How the final report is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
    None,
}

/// Knobs governing one analysis run.
#[derive(Args, Debug, Clone)]
pub struct AnalysisConfig {
    /// Set the verbosity of the analyses surfaced in the report (0-3)
    #[arg(
        short = 'v',
        long = "analysis-verbosity",
        value_name = "level",
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    pub verbosity: u8,

    /// Memoize the covering-set search on consumed supply only. Much
    /// faster on overlapping kit libraries; existence answers stay exact
    /// but some distinct covering sets may go unreported.
    #[arg(short = 'a', long, default_value_t = false)]
    pub approximate: bool,

    /// Limit the number of elements in list-valued results (<= 0 means
    /// unbounded)
    #[arg(
        short = 'L',
        long = "list-cutoff",
        value_name = "num",
        default_value_t = 5
    )]
    pub list_cutoff: i64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            verbosity: 1,
            approximate: false,
            list_cutoff: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn search_mode(&self) -> SearchMode {
        if self.approximate {
            SearchMode::Approximate
        } else {
            SearchMode::Exact
        }
    }

    /// Truncates a list-valued result to the configured cutoff.
    pub fn apply_cutoff<T>(&self, items: &mut Vec<T>) {
        if self.list_cutoff > 0 {
            items.truncate(self.list_cutoff as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_ignores_non_positive_limits() {
        let mut cfg = AnalysisConfig::default();
        cfg.list_cutoff = 0;
        let mut items = vec![1, 2, 3];
        cfg.apply_cutoff(&mut items);
        assert_eq!(items.len(), 3);

        cfg.list_cutoff = 2;
        cfg.apply_cutoff(&mut items);
        assert_eq!(items, vec![1, 2]);
    }
}
