use crate::coverage::primes::PrimeSeq;
use crate::error::{KcResult, KitcovError};
use crate::key::Key;
use crate::layouts::Layout;
use num_bigint::BigUint;
use std::collections::HashMap;

/// One distinct canonical key identity, the first cap seen with it, and
/// the prime standing in for it this run.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub key: Key,
    pub prime: u64,
}

/// The run-scoped coordinate system of the engine: every distinct canonical
/// identity across all layouts gets a unique prime, assigned in first-seen
/// order. A layout's multiset of keys is then the product of its members'
/// primes, so k copies of a cap raise its prime to the k-th power.
#[derive(Debug, Default)]
pub struct KeyCatalog {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<String, usize>,
    primes: PrimeSeq,
}

impl KeyCatalog {
    pub fn build<'a, I>(layouts: I) -> Self
    where
        I: IntoIterator<Item = &'a Layout>,
    {
        let mut catalog = KeyCatalog::default();
        for layout in layouts {
            for key in &layout.keys {
                let id = key.canonical_id();
                if !catalog.by_id.contains_key(&id) {
                    let prime = catalog.primes.next_prime();
                    catalog.by_id.insert(id.clone(), catalog.entries.len());
                    catalog.entries.push(CatalogEntry {
                        id,
                        key: key.clone(),
                        prime,
                    });
                }
            }
        }
        catalog
    }

    /// Distinct identities in first-seen order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn prime_of(&self, id: &str) -> Option<u64> {
        self.by_id.get(id).map(|&i| self.entries[i].prime)
    }

    /// The prime stream continued past every assigned key prime. The
    /// covering-set search draws its per-candidate path primes from here so
    /// they can never collide with a key prime.
    pub fn continuation(&self) -> PrimeSeq {
        self.primes
    }

    /// Encodes a layout's multiset of keys as an exact product of primes.
    pub fn encode(&self, layout: &Layout) -> KcResult<BigUint> {
        let mut product = BigUint::from(1u32);
        for key in &layout.keys {
            let id = key.canonical_id();
            let prime = self.prime_of(&id).ok_or_else(|| {
                KitcovError::Layout(format!(
                    "key \"{}\" of layout \"{}\" is not in the catalog",
                    id, layout.name
                ))
            })?;
            product *= prime;
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(name: &str, labels: &[&str]) -> Layout {
        Layout::new(
            name,
            labels.iter().map(|l| Key::plain(l, 1.0, 1.0)).collect(),
        )
    }

    #[test]
    fn primes_assigned_in_first_seen_order() {
        let a = layout("a", &["X", "Y"]);
        let b = layout("b", &["Y", "Z"]);
        let catalog = KeyCatalog::build([&a, &b]);
        let primes: Vec<u64> = catalog.entries().iter().map(|e| e.prime).collect();
        assert_eq!(primes, vec![3, 5, 7]);
        assert_eq!(catalog.prime_of(&Key::plain("Z", 1.0, 1.0).canonical_id()), Some(7));
    }

    #[test]
    fn repeats_raise_the_exponent() {
        let a = layout("a", &["X", "X", "Y"]);
        let catalog = KeyCatalog::build([&a]);
        // 3 * 3 * 5
        assert_eq!(catalog.encode(&a).unwrap(), BigUint::from(45u32));
    }

    #[test]
    fn continuation_starts_after_key_primes() {
        let a = layout("a", &["X", "Y", "Z"]);
        let catalog = KeyCatalog::build([&a]);
        let mut rest = catalog.continuation();
        assert_eq!(rest.next_prime(), 11);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let a = layout("a", &["X"]);
        let catalog = KeyCatalog::build([&a]);
        let other = layout("b", &["W"]);
        assert!(catalog.encode(&other).is_err());
    }
}
