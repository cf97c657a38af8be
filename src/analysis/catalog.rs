/// Verbosity required of a run before an analysis surfaces, unless the
/// descriptor says otherwise.
pub const DEFAULT_VERBOSITY: u8 = 1;

/// Where and how often an analysis body runs.
///
/// `GLOBAL` runs once over both collections. `PER_*` runs once per layout of
/// that role, seeing only that layout. `ITER_*` runs once per layout of that
/// role, seeing the layout plus the entire opposing collection. The
/// `*_KEYS` modes iterate the distinct-key catalog against a constant
/// collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecModes(u16);

impl ExecModes {
    pub const GLOBAL: ExecModes = ExecModes(0x01);
    pub const PER_KIT: ExecModes = ExecModes(0x02);
    pub const PER_KEYBOARD: ExecModes = ExecModes(0x04);
    pub const ITER_KITS: ExecModes = ExecModes(0x08);
    pub const ITER_KEYBOARDS: ExecModes = ExecModes(0x10);
    pub const ITER_KIT_KEYS: ExecModes = ExecModes(0x20);
    pub const ITER_KEYBOARD_KEYS: ExecModes = ExecModes(0x40);

    pub const fn with(self, other: ExecModes) -> ExecModes {
        ExecModes(self.0 | other.0)
    }

    pub const fn contains(self, other: ExecModes) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the analysis produces results keyed by layout name.
    pub const fn is_per_item(self) -> bool {
        self.0 & !Self::GLOBAL.0 != 0
    }
}

/// A registered analysis: its identity, when it surfaces in output, how it
/// executes and which other analyses must have run first.
///
/// `internal` results feed other analyses but never reach the user-facing
/// report; `exit_bit` is OR-folded into the process exit code when the
/// analysis fails.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub verbosity: u8,
    pub modes: ExecModes,
    pub requires: &'static [&'static str],
    pub exit_bit: i32,
    pub internal: bool,
}

const fn public(
    name: &'static str,
    label: &'static str,
    description: &'static str,
    verbosity: u8,
    modes: ExecModes,
    requires: &'static [&'static str],
) -> AnalysisDescriptor {
    AnalysisDescriptor {
        name,
        label,
        description,
        verbosity,
        modes,
        requires,
        exit_bit: 1,
        internal: false,
    }
}

const fn internal(
    name: &'static str,
    modes: ExecModes,
    requires: &'static [&'static str],
) -> AnalysisDescriptor {
    AnalysisDescriptor {
        name,
        label: "",
        description: "",
        verbosity: DEFAULT_VERBOSITY,
        modes,
        requires,
        exit_bit: 1,
        internal: true,
    }
}

static CATALOG: [AnalysisDescriptor; 29] = [
    public(
        "num_keyboards",
        "Total keyboards",
        "Total number of keyboard layouts analysed",
        1,
        ExecModes::GLOBAL,
        &[],
    ),
    public(
        "num_kits",
        "Total kits",
        "Total number of kits analysed",
        1,
        ExecModes::GLOBAL,
        &[],
    ),
    internal("most_common_kit_keys", ExecModes::GLOBAL, &[]),
    internal("most_common_keyboard_keys", ExecModes::GLOBAL, &[]),
    public(
        "most_common_kit_keys_format",
        "Most common keys in kits",
        "The keys which are the most common in the kits presented",
        2,
        ExecModes::GLOBAL,
        &["most_common_kit_keys"],
    ),
    public(
        "most_common_keyboard_keys_format",
        "Most common keys in keyboards",
        "The keys which are the most common in the keyboards presented",
        2,
        ExecModes::GLOBAL,
        &["most_common_keyboard_keys"],
    ),
    public(
        "count_units",
        "Total units",
        "The total number of units present in a given layout",
        1,
        ExecModes::PER_KIT.with(ExecModes::PER_KEYBOARD),
        &[],
    ),
    internal(
        "compute_covering_set",
        ExecModes::ITER_KITS.with(ExecModes::ITER_KEYBOARDS),
        &[],
    ),
    public(
        "exists_covering_set",
        "Is covered",
        "For a keyboard whether there exists a covering set of kits, or vice versa",
        1,
        ExecModes::PER_KIT.with(ExecModes::PER_KEYBOARD),
        &["compute_covering_set"],
    ),
    public(
        "number_of_covering_sets",
        "Number of covering sets",
        "The number of sets of kits which cover a given keyboard",
        1,
        ExecModes::PER_KIT.with(ExecModes::PER_KEYBOARD),
        &["compute_covering_set"],
    ),
    internal(
        "count_covering_set_units",
        ExecModes::PER_KEYBOARD,
        &["compute_covering_set"],
    ),
    internal(
        "covering_set_of_lowest_units",
        ExecModes::PER_KEYBOARD,
        &["count_covering_set_units"],
    ),
    internal(
        "covering_set_of_lowest_units_surplus",
        ExecModes::PER_KEYBOARD,
        &["covering_set_of_lowest_units"],
    ),
    public(
        "covering_set_of_lowest_units_surplus_amount",
        "Minimal-unit covering sets surplus",
        "The least amount of surplus units (waste keycap material) required by any set of kits which covers a particular keyboard",
        1,
        ExecModes::PER_KEYBOARD,
        &["covering_set_of_lowest_units_surplus"],
    ),
    public(
        "covering_set_of_lowest_units_surplus_value",
        "Minimal-unit covering set",
        "The set of kits with minimal surplus units which covers a particular keyboard",
        3,
        ExecModes::PER_KEYBOARD,
        &["covering_set_of_lowest_units_surplus"],
    ),
    internal(
        "covering_set_cardinalities",
        ExecModes::PER_KEYBOARD,
        &["compute_covering_set"],
    ),
    internal(
        "covering_set_of_lowest_cardinality",
        ExecModes::PER_KEYBOARD,
        &["covering_set_cardinalities"],
    ),
    public(
        "covering_set_of_lowest_cardinality_amount",
        "Smallest covering set size",
        "The smallest number of kits required to cover a particular keyboard",
        2,
        ExecModes::PER_KEYBOARD,
        &["covering_set_of_lowest_cardinality"],
    ),
    public(
        "covering_set_of_lowest_cardinality_value",
        "Smallest covering set",
        "The smallest set of kits which covers a particular keyboard",
        3,
        ExecModes::PER_KEYBOARD,
        &["covering_set_of_lowest_cardinality"],
    ),
    public(
        "most_cumbersome_keyboard",
        "Keyboard requiring the most kits",
        "The keyboard which requires a customer to purchase the most kits in order to cover it",
        1,
        ExecModes::GLOBAL,
        &["covering_set_of_lowest_cardinality"],
    ),
    public(
        "most_wasteful_keyboard",
        "Keyboard with most surplus units to cover",
        "The keyboard which requires the most wasted units of plastic to cover it",
        1,
        ExecModes::GLOBAL,
        &["covering_set_of_lowest_units_surplus"],
    ),
    public(
        "least_used_kit",
        "Least-required kit",
        "The kit which is required by the fewest keyboards",
        2,
        ExecModes::GLOBAL,
        &["compute_covering_set"],
    ),
    public(
        "smallest_set_is_minimal_surplus",
        "Smallest covering set is smallest unit covering set",
        "Whether the covering set of kits with the fewest total units also contains the fewest kits",
        2,
        ExecModes::PER_KEYBOARD,
        &[
            "covering_set_of_lowest_cardinality",
            "covering_set_of_lowest_units",
        ],
    ),
    public(
        "all_boards_smallest_set_is_minimal_surplus",
        "Optimal units per kit",
        "Whether for each keyboard the least-surplus covering set is also the smallest one. This checks local optimality only; a globally cheaper kitting may still exist.",
        1,
        ExecModes::GLOBAL,
        &["smallest_set_is_minimal_surplus"],
    ),
    public(
        "all_kits_covered",
        "All kits covered",
        "Whether every key in every kit is a part of some keyboard (and so not useless)",
        1,
        ExecModes::GLOBAL,
        &["exists_covering_set"],
    ),
    public(
        "all_keyboards_covered",
        "All keyboards covered",
        "Whether every key in every keyboard is a part of some kit (and so not missing)",
        1,
        ExecModes::GLOBAL,
        &["exists_covering_set"],
    ),
    public(
        "uncovered_keys",
        "Uncovered keys",
        "A list of uncovered keys",
        2,
        ExecModes::ITER_KITS.with(ExecModes::ITER_KEYBOARDS),
        &[],
    ),
    public(
        "key_in_kits",
        "Present in kits",
        "A list of kits which contain some key",
        2,
        ExecModes::ITER_KIT_KEYS,
        &[],
    ),
    public(
        "key_in_keyboards",
        "Present in keyboards",
        "A list of keyboards which contain some key",
        2,
        ExecModes::ITER_KEYBOARD_KEYS,
        &[],
    ),
];

/// Every analysis kitcov ships with, in catalog order.
pub fn builtin_catalog() -> &'static [AnalysisDescriptor] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_compose_and_query() {
        let modes = ExecModes::PER_KIT.with(ExecModes::PER_KEYBOARD);
        assert!(modes.contains(ExecModes::PER_KIT));
        assert!(modes.contains(ExecModes::PER_KEYBOARD));
        assert!(!modes.contains(ExecModes::GLOBAL));
        assert!(modes.is_per_item());
        assert!(!ExecModes::GLOBAL.is_per_item());
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = builtin_catalog().iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), builtin_catalog().len());
    }

    #[test]
    fn catalog_requirements_exist() {
        for desc in builtin_catalog() {
            for req in desc.requires {
                assert!(
                    builtin_catalog().iter().any(|d| d.name == *req),
                    "{} requires unknown {}",
                    desc.name,
                    req
                );
            }
        }
    }
}
