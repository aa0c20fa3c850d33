//! Trait seams of the search subsystem: the fuzzy-index gateway and the
//! relational store, abstracted so the reconciliation logic is testable
//! without live backends.

use async_trait::async_trait;

use crate::domain::animal::{AnimalRecord, AnimalStatus, Species};

use super::criteria::DateRange;
use super::predicates::PredicateGroup;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("sort mode not allowed for this caller")]
    Forbidden,

    #[error("fuzzy index error: {0}")]
    Gateway(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;

/// Subset of the structured criteria the fuzzy index can pre-filter on
/// natively. Anything it cannot pre-filter on is re-applied by the relational
/// store afterward, so this is an optimization, never a correctness
/// dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuzzyFilters {
    pub species: Vec<Species>,
    pub statuses: Vec<AnimalStatus>,
    pub pick_up_date: DateRange,
    pub pick_up_locations: Vec<String>,
}

/// External typo-tolerant text index. Returns ranked identifiers, best match
/// first, at most `max_count` of them. Safe to call with empty filters.
#[async_trait]
pub trait FuzzySearchGateway: Send + Sync {
    async fn search(
        &self,
        text: &str,
        filters: &FuzzyFilters,
        max_count: usize,
    ) -> Result<Vec<i32>>;
}

/// Store-side orderings. Ties are broken by ascending id in every adapter so
/// pagination stays deterministic across repeated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrder {
    Name,
    BirthdateDesc,
    PickUpDateDesc,
    /// Nulls last.
    VaccinationAsc,
}

/// Relational store contract: conjunction of predicate groups, each group an
/// OR of simple comparisons, plus sorted/paged retrieval and an independent
/// count over the same groups.
#[async_trait]
pub trait AnimalStore: Send + Sync {
    async fn fetch_page(
        &self,
        groups: &[PredicateGroup],
        order: StoreOrder,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AnimalRecord>>;

    /// All records matching the groups, with no store-side ordering. Used for
    /// relevance-ordered results where the index owns the order.
    async fn fetch_unordered(&self, groups: &[PredicateGroup]) -> Result<Vec<AnimalRecord>>;

    async fn count(&self, groups: &[PredicateGroup]) -> Result<i64>;

    /// Known pick-up locations, for the filter UI.
    async fn distinct_pick_up_locations(&self) -> Result<Vec<String>>;
}
