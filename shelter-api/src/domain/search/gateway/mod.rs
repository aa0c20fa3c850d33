//! Fuzzy-index gateway implementations.

mod meili;
#[cfg(test)]
mod mock;

pub use meili::MeiliGateway;
#[cfg(test)]
pub use mock::MockFuzzyGateway;
