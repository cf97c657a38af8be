//! The coverage resolution engine: prime-product multiset encoding, the
//! covering-set search and the uncovered-key finder.

pub mod encode;
pub mod primes;
pub mod search;
pub mod uncovered;

pub use encode::{CatalogEntry, KeyCatalog};
pub use primes::PrimeSeq;
pub use search::{covering_sets, SearchMode};
pub use uncovered::uncovered_keys;
