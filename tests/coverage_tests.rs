use kitcov::coverage::{covering_sets, uncovered_keys, KeyCatalog, SearchMode};
use kitcov::key::Key;
use kitcov::layouts::Layout;
use rstest::rstest;

fn layout(name: &str, labels: &[&str]) -> Layout {
    Layout::new(
        name,
        labels.iter().map(|l| Key::plain(l, 1.0, 1.0)).collect(),
    )
}

fn search(mode: SearchMode, target: &Layout, library: &[Layout]) -> Vec<Vec<String>> {
    let mut all: Vec<&Layout> = library.iter().collect();
    all.push(target);
    let catalog = KeyCatalog::build(all);
    covering_sets(mode, &catalog, target, library).unwrap()
}

fn as_sets(found: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut sets: Vec<Vec<String>> = found
        .iter()
        .map(|s| {
            let mut s = s.clone();
            s.sort();
            s
        })
        .collect();
    sets.sort();
    sets.dedup();
    sets
}

#[test]
fn worked_example_two_a_one_b() {
    // kit1 supplies one A; kit2 one A and one B. Only both together give
    // A+A+B, and no single kit suffices.
    let target = layout("board", &["A", "A", "B"]);
    let library = vec![layout("kit1", &["A"]), layout("kit2", &["A", "B"])];
    let found = search(SearchMode::Exact, &target, &library);
    assert_eq!(
        as_sets(&found),
        vec![vec!["kit1".to_string(), "kit2".to_string()]]
    );
}

#[rstest]
#[case::exact(SearchMode::Exact)]
#[case::approximate(SearchMode::Approximate)]
fn sufficient_library_always_covers(#[case] mode: SearchMode) {
    let target = layout("board", &["Esc", "Tab", "Tab"]);
    let library = vec![
        layout("mods", &["Esc", "Tab"]),
        layout("extras", &["Tab", "Fn"]),
    ];
    assert!(!search(mode, &target, &library).is_empty());
}

#[rstest]
#[case::exact(SearchMode::Exact)]
#[case::approximate(SearchMode::Approximate)]
fn unsatisfiable_target_finds_nothing(#[case] mode: SearchMode) {
    // Two Esc demanded, one supplied in total.
    let target = layout("board", &["Esc", "Esc"]);
    let library = vec![layout("kit", &["Esc", "Tab"])];
    assert!(search(mode, &target, &library).is_empty());
}

#[test]
fn exact_mode_is_idempotent_and_order_independent() {
    let target = layout("board", &["A", "B", "C", "C"]);
    let library = vec![
        layout("k1", &["A", "C"]),
        layout("k2", &["B", "C"]),
        layout("k3", &["A", "B", "C", "C"]),
        layout("k4", &["C"]),
    ];
    let first = as_sets(&search(SearchMode::Exact, &target, &library));
    let second = as_sets(&search(SearchMode::Exact, &target, &library));
    assert_eq!(first, second);

    let mut shuffled = library.clone();
    shuffled.rotate_left(2);
    let rotated = as_sets(&search(SearchMode::Exact, &target, &shuffled));
    assert_eq!(first, rotated);
}

#[test]
fn removing_a_candidate_is_monotone() {
    let target = layout("board", &["A", "B"]);
    let library = vec![
        layout("ab", &["A", "B"]),
        layout("a", &["A"]),
        layout("b", &["B"]),
    ];
    let full = as_sets(&search(SearchMode::Exact, &target, &library));

    let without_ab: Vec<Layout> = library[1..].to_vec();
    let reduced = as_sets(&search(SearchMode::Exact, &target, &without_ab));

    // Nothing in the reduced run mentions the removed kit, and the sets
    // that never used it survive.
    assert!(reduced.iter().all(|s| !s.contains(&"ab".to_string())));
    let full_without_ab: Vec<Vec<String>> = full
        .into_iter()
        .filter(|s| !s.contains(&"ab".to_string()))
        .collect();
    assert_eq!(reduced, full_without_ab);
}

#[test]
fn exact_enumerates_at_least_as_many_as_approximate() {
    let target = layout("board", &["A", "B", "C"]);
    let library = vec![
        layout("k1", &["A", "B"]),
        layout("k2", &["C"]),
        layout("k3", &["A"]),
        layout("k4", &["B", "C"]),
    ];
    let exact = search(SearchMode::Exact, &target, &library);
    let approx = search(SearchMode::Approximate, &target, &library);
    assert!(exact.len() >= approx.len());
    assert_eq!(exact.is_empty(), approx.is_empty());
    // Everything the approximate run reports is a genuine covering set.
    for set in as_sets(&approx) {
        assert!(as_sets(&exact).contains(&set));
    }
}

#[test]
fn covering_sets_are_sorted_lexicographically() {
    let target = layout("board", &["A"]);
    let library = vec![
        layout("zeta", &["A"]),
        layout("alpha", &["A"]),
        layout("mid", &["A"]),
    ];
    let found = search(SearchMode::Exact, &target, &library);
    assert_eq!(
        found,
        vec![
            vec!["alpha".to_string()],
            vec!["mid".to_string()],
            vec!["zeta".to_string()],
        ]
    );
}

#[test]
fn uncovered_is_empty_for_a_covered_target() {
    let target = layout("board", &["A", "B"]);
    let library = vec![layout("k1", &["A"]), layout("k2", &["B", "C"])];
    assert!(uncovered_keys(&target, &library).is_empty());
}

#[test]
fn uncovered_reports_a_key_absent_from_every_candidate() {
    let target = layout("board", &["A", "Ghost"]);
    let library = vec![layout("k1", &["A"]), layout("k2", &["B"])];
    let missing = uncovered_keys(&target, &library);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].0, "Ghost-1.00x1.00");
    assert!(missing[0].1 >= 1);
}

#[test]
fn keys_of_different_shape_are_not_interchangeable() {
    // A 2u spacebar cannot stand in for a 6.25u one.
    let target = Layout::new("board", vec![Key::plain("Space", 6.25, 1.0)]);
    let library = vec![Layout::new("kit", vec![Key::plain("Space", 2.0, 1.0)])];
    let mut all: Vec<&Layout> = library.iter().collect();
    all.push(&target);
    let catalog = KeyCatalog::build(all);
    assert!(covering_sets(SearchMode::Exact, &catalog, &target, &library)
        .unwrap()
        .is_empty());
    assert_eq!(uncovered_keys(&target, &library).len(), 1);
}
