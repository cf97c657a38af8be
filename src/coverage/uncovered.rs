use crate::layouts::Layout;
use std::collections::HashMap;

/// Computes what the library cannot supply: for each canonical identity in
/// `target`, the count still needed after consuming at most one available
/// unit per occurrence found anywhere across the whole library.
///
/// Returns `(identity, remaining)` pairs with positive remaining need,
/// ascending by remaining count (most-nearly-covered first); ties keep the
/// target's first-seen order. Callers apply any output cutoff.
pub fn uncovered_keys(target: &Layout, library: &[Layout]) -> Vec<(String, u32)> {
    let mut order: Vec<String> = Vec::new();
    let mut need: HashMap<String, u32> = HashMap::new();
    for key in &target.keys {
        let id = key.canonical_id();
        if !need.contains_key(&id) {
            order.push(id.clone());
        }
        *need.entry(id).or_insert(0) += 1;
    }

    for layout in library {
        for key in &layout.keys {
            if let Some(count) = need.get_mut(&key.canonical_id()) {
                if *count > 0 {
                    *count -= 1;
                }
            }
        }
    }

    let mut remaining: Vec<(String, u32)> = order
        .into_iter()
        .filter_map(|id| {
            let count = need[&id];
            (count > 0).then_some((id, count))
        })
        .collect();
    remaining.sort_by_key(|(_, count)| *count);
    remaining
}
