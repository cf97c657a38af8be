use crate::coverage::encode::KeyCatalog;
use crate::error::KcResult;
use crate::layouts::Layout;
use num_bigint::BigUint;
use num_integer::Integer;
use std::collections::HashSet;

/// Memoization strategy for the covering-set search.
///
/// `Exact` keys visited states by (remainder, chosen-candidate identity) and
/// enumerates every covering set reachable by the DFS. `Approximate` keys
/// them by consumed supply only, which collapses distinct candidate subsets
/// that consumed identical total supply: the existence answer stays correct
/// but some distinct covering sets may go unreported. Opt-in only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Exact,
    Approximate,
}

struct Candidate {
    name: String,
    /// Identifies the candidate on the search path independently of its
    /// supply, so two subsets leaving the same remainder stay distinct.
    path_prime: u64,
    supply: BigUint,
}

#[derive(PartialEq, Eq, Hash)]
enum MemoKey {
    Exact(BigUint, BigUint),
    Approximate(BigUint),
}

/// Enumerates every combination of `library` members whose combined supply
/// covers `target`'s keys with multiplicity.
///
/// Each covering set is the list of member names in discovery order; the
/// result is sorted lexicographically for determinism. Worst case is
/// exponential in the library size; the memo prunes states reached again
/// via a different candidate ordering.
pub fn covering_sets(
    mode: SearchMode,
    catalog: &KeyCatalog,
    target: &Layout,
    library: &[Layout],
) -> KcResult<Vec<Vec<String>>> {
    let r0 = catalog.encode(target)?;

    let mut path_primes = catalog.continuation();
    let mut candidates = Vec::with_capacity(library.len());
    for layout in library {
        candidates.push(Candidate {
            name: layout.name.clone(),
            path_prime: path_primes.next_prime(),
            supply: catalog.encode(layout)?,
        });
    }

    let mut search = Search {
        mode,
        seen: HashSet::new(),
        found: Vec::new(),
    };
    let pool: Vec<&Candidate> = candidates.iter().collect();
    search.dfs(
        &r0,
        &BigUint::from(1u32),
        &BigUint::from(1u32),
        &mut Vec::new(),
        &pool,
    );

    let mut found = search.found;
    found.sort();
    Ok(found)
}

struct Search {
    mode: SearchMode,
    seen: HashSet<MemoKey>,
    found: Vec<Vec<String>>,
}

impl Search {
    fn memo_key(&self, r: &BigUint, path: &BigUint, consumed: &BigUint) -> MemoKey {
        match self.mode {
            SearchMode::Exact => MemoKey::Exact(r.clone(), path.clone()),
            SearchMode::Approximate => MemoKey::Approximate(consumed.clone()),
        }
    }

    /// Depth-first, without-replacement subset search.
    ///
    /// `r` is the remainder still to cover, `path` the product of chosen
    /// path primes, `consumed` the product of chosen supply values,
    /// `chosen` the member names so far and `pool` the candidates still
    /// usable on this branch.
    fn dfs(
        &mut self,
        r: &BigUint,
        path: &BigUint,
        consumed: &BigUint,
        chosen: &mut Vec<String>,
        pool: &[&Candidate],
    ) {
        let state = self.memo_key(r, path, consumed);
        self.seen.insert(state);

        let one = BigUint::from(1u32);
        if *r == one {
            // Satisfied: record and stop descending. Supersets of a
            // covering set cannot reduce the remainder any further.
            self.found.push(chosen.clone());
            return;
        }
        if pool.is_empty() {
            return;
        }

        for (i, candidate) in pool.iter().enumerate() {
            let g = r.gcd(&candidate.supply);
            let r2 = r / &g;
            if r2 == *r {
                // Shares nothing with the remaining need.
                continue;
            }
            let path2 = path * candidate.path_prime;
            let consumed2 = consumed * &candidate.supply;
            let next_state = self.memo_key(&r2, &path2, &consumed2);
            if self.seen.contains(&next_state) {
                continue;
            }

            let mut rest: Vec<&Candidate> = Vec::with_capacity(pool.len() - 1);
            rest.extend_from_slice(&pool[..i]);
            rest.extend_from_slice(&pool[i + 1..]);

            chosen.push(candidate.name.clone());
            self.dfs(&r2, &path2, &consumed2, chosen, &rest);
            chosen.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    fn layout(name: &str, labels: &[&str]) -> Layout {
        Layout::new(
            name,
            labels.iter().map(|l| Key::plain(l, 1.0, 1.0)).collect(),
        )
    }

    fn run(mode: SearchMode, target: &Layout, library: &[Layout]) -> Vec<Vec<String>> {
        let mut all: Vec<&Layout> = library.iter().collect();
        all.push(target);
        let catalog = KeyCatalog::build(all);
        covering_sets(mode, &catalog, target, library).unwrap()
    }

    #[test]
    fn single_exact_kit_covers() {
        let target = layout("board", &["A", "B"]);
        let library = vec![layout("kit", &["A", "B"])];
        let sets = run(SearchMode::Exact, &target, &library);
        assert_eq!(sets, vec![vec!["kit".to_string()]]);
    }

    #[test]
    fn duplicate_demand_needs_duplicate_supply() {
        // Two A's required; each kit supplies one.
        let target = layout("board", &["A", "A", "B"]);
        let library = vec![layout("kit1", &["A"]), layout("kit2", &["A", "B"])];
        let sets = run(SearchMode::Exact, &target, &library);
        assert_eq!(sets, vec![vec!["kit1".to_string(), "kit2".to_string()]]);
    }

    #[test]
    fn insufficient_library_yields_nothing() {
        let target = layout("board", &["A", "C"]);
        let library = vec![layout("kit", &["A", "B"])];
        assert!(run(SearchMode::Exact, &target, &library).is_empty());
    }

    #[test]
    fn useless_candidates_are_skipped() {
        let target = layout("board", &["A"]);
        let library = vec![layout("good", &["A"]), layout("noise", &["Z"])];
        let sets = run(SearchMode::Exact, &target, &library);
        assert_eq!(sets, vec![vec!["good".to_string()]]);
    }

    #[test]
    fn exact_mode_enumerates_alternatives() {
        let target = layout("board", &["A", "B"]);
        let library = vec![
            layout("ab", &["A", "B"]),
            layout("a", &["A"]),
            layout("b", &["B"]),
        ];
        // Non-minimal qualifying combinations are reported too; only
        // supersets of an already-satisfied state are cut off.
        let sets = run(SearchMode::Exact, &target, &library);
        assert_eq!(
            sets,
            vec![
                vec!["a".to_string(), "ab".to_string()],
                vec!["a".to_string(), "b".to_string()],
                vec!["ab".to_string()],
                vec!["b".to_string(), "ab".to_string()],
            ]
        );
    }

    #[test]
    fn approximate_mode_agrees_on_existence() {
        let target = layout("board", &["A", "B"]);
        let library = vec![
            layout("ab", &["A", "B"]),
            layout("a", &["A"]),
            layout("b", &["B"]),
        ];
        let exact = run(SearchMode::Exact, &target, &library);
        let approx = run(SearchMode::Approximate, &target, &library);
        assert!(!approx.is_empty());
        assert!(exact.len() >= approx.len());
    }

    #[test]
    fn result_is_sorted_and_library_order_independent() {
        let target = layout("board", &["A", "B", "C"]);
        let forward = vec![
            layout("p", &["A"]),
            layout("q", &["B"]),
            layout("r", &["C"]),
            layout("s", &["A", "B", "C"]),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        let a = run(SearchMode::Exact, &target, &forward);
        let b = run(SearchMode::Exact, &target, &backward);
        let norm = |sets: Vec<Vec<String>>| -> Vec<Vec<String>> {
            let mut sets: Vec<Vec<String>> = sets
                .into_iter()
                .map(|mut s| {
                    s.sort();
                    s
                })
                .collect();
            sets.sort();
            sets
        };
        assert_eq!(norm(a), norm(b));
    }
}
