//! Relational store implementations.

#[cfg(test)]
mod mock;
mod postgres;

#[cfg(test)]
pub use mock::MockAnimalStore;
pub use postgres::PgAnimalStore;
