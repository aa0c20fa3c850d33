//! Animal search - structured filtering reconciled with fuzzy full-text
//! ranking.
//!
//! One request flows through:
//!
//! 1. [`SearchCriteria::from_query_pairs`] - tolerant parse of the query
//!    string into a typed criteria value (round-trips via
//!    [`SearchCriteria::to_query_pairs`]).
//! 2. [`restrict`] - permission projection, run once so nothing downstream
//!    re-checks roles.
//! 3. [`build_predicate_groups`] - pure translation into an immutable list of
//!    predicate groups (AND of OR-groups) for the relational store.
//! 4. [`AnimalSearchService::search`] - reconciliation: the fuzzy index owns
//!    *order*, the relational store owns *membership*; an independent count
//!    feeds [`paginate`].
//!
//! The trait seams ([`FuzzySearchGateway`], [`AnimalStore`]) have
//! Meilisearch/Postgres implementations plus in-memory mocks for tests.

mod criteria;
mod paginate;
mod permissions;
mod predicates;
mod service;
mod traits;

pub mod gateway;
pub mod repository;

pub use criteria::{DateRange, SearchCriteria, SortMode};
pub use paginate::{page_count, paginate, PageSlice};
pub use permissions::{restrict, AllowedFields, PermissionContext, Role};
pub use predicates::{build_predicate_groups, DateField, FreeTextPlan, Predicate, PredicateGroup};
pub use service::{AnimalSearchService, ResultPage, SearchConfig};
pub use traits::{AnimalStore, FuzzyFilters, FuzzySearchGateway, SearchError, StoreOrder};
