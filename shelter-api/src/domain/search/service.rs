//! Animal search service: reconciles fuzzy-index ranking with relational
//! filtering into one ordered, paginated, permission-projected result page.
//!
//! The split of responsibilities is the key invariant here: the fuzzy index
//! owns *order*, the relational store owns *membership*. Divergence between
//! the two degrades order, never hides or fabricates records.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::animal::AnimalSummary;

use super::criteria::{SearchCriteria, SortMode};
use super::paginate::{page_count, paginate};
use super::permissions::{restrict, PermissionContext};
use super::predicates::{build_predicate_groups, FreeTextPlan};
use super::traits::{AnimalStore, FuzzyFilters, FuzzySearchGateway, Result, SearchError, StoreOrder};

/// Operational constants of the search pipeline.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Fixed page size for result pages.
    pub page_size: u32,
    /// Maximum candidate identifiers requested from the fuzzy index. Not
    /// user-controllable.
    pub max_fuzzy_candidates: usize,
    /// Bound on the fuzzy-index call before degrading.
    pub gateway_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_fuzzy_candidates: 50,
            gateway_timeout: Duration::from_millis(800),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub items: Vec<AnimalSummary>,
    pub total_count: i64,
    pub page_count: u32,
}

impl ResultPage {
    fn empty() -> Self {
        Self {
            items: vec![],
            total_count: 0,
            page_count: 0,
        }
    }
}

/// How free text is resolved for one request.
enum Ranking {
    /// No free text.
    None,
    /// Ranked identifiers from the fuzzy index, best match first.
    Ranked(Vec<i32>),
    /// Index unavailable; fall back to store-side matching and structured
    /// order.
    Degraded(String),
}

pub struct AnimalSearchService<G, S>
where
    G: FuzzySearchGateway,
    S: AnimalStore,
{
    gateway: G,
    store: S,
    config: SearchConfig,
}

impl<G, S> AnimalSearchService<G, S>
where
    G: FuzzySearchGateway,
    S: AnimalStore,
{
    pub fn new(gateway: G, store: S, config: SearchConfig) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    pub fn with_defaults(gateway: G, store: S) -> Self {
        Self::new(gateway, store, SearchConfig::default())
    }

    /// Execute one search request.
    ///
    /// Criteria are normalized, narrowed to the caller's permissions, turned
    /// into predicate groups, and reconciled with the fuzzy-index ranking when
    /// free text is present. The total count is always an independent count
    /// over the same predicate groups, never the length of a fetched page.
    pub async fn search(
        &self,
        criteria: SearchCriteria,
        ctx: &PermissionContext,
    ) -> Result<ResultPage> {
        let (criteria, allowed) = restrict(criteria.normalized(), ctx)?;
        let today = OffsetDateTime::now_utc().date();

        let ranking = match &criteria.free_text {
            Some(text) => match self.ranked_ids(text, &criteria).await {
                Ok(ids) => Ranking::Ranked(ids),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "fuzzy index unavailable, degrading to store-side text matching"
                    );
                    Ranking::Degraded(text.clone())
                }
            },
            None => Ranking::None,
        };

        // No candidates means no results; skip the store round trip entirely.
        if let Ranking::Ranked(ids) = &ranking {
            if ids.is_empty() {
                return Ok(ResultPage::empty());
            }
        }

        let plan = match &ranking {
            Ranking::None => FreeTextPlan::None,
            Ranking::Ranked(ids) => FreeTextPlan::RankedIds(ids),
            Ranking::Degraded(text) => FreeTextPlan::StoreMatch(text),
        };
        let groups = build_predicate_groups(&criteria, plan, today);

        let (total_count, records) = match &ranking {
            Ranking::Ranked(ids) if criteria.sort == SortMode::Relevance => {
                // Membership from the store, order from the index: fetch the
                // whole filtered set unordered and reorder it in memory.
                let mut records = self.store.fetch_unordered(&groups).await?;
                let total = records.len() as i64;

                let position: HashMap<i32, usize> = ids
                    .iter()
                    .enumerate()
                    .map(|(rank, &id)| (id, rank))
                    .collect();
                // Records the index does not know (stale index) sort last by
                // id instead of disappearing.
                records.sort_by_key(|record| {
                    (
                        position.get(&record.id).copied().unwrap_or(usize::MAX),
                        record.id,
                    )
                });

                let slice = paginate(total, self.config.page_size, criteria.page);
                let page = records
                    .into_iter()
                    .skip(slice.offset as usize)
                    .take(slice.limit as usize)
                    .collect();
                (total, page)
            }
            _ => {
                // Structured sort: the store owns both membership and order.
                // Count and page fetch are independent reads over the same
                // groups and may overlap.
                let order = store_order(criteria.sort);
                let slice = paginate(0, self.config.page_size, criteria.page);
                let (total, page) = tokio::try_join!(
                    self.store.count(&groups),
                    self.store.fetch_page(&groups, order, slice.offset, slice.limit),
                )?;
                (total, page)
            }
        };

        let items = records
            .into_iter()
            .map(|record| AnimalSummary::project(record, &allowed))
            .collect();

        Ok(ResultPage {
            items,
            total_count,
            page_count: page_count(total_count, self.config.page_size),
        })
    }

    /// Known pick-up locations for the filter UI.
    pub async fn pick_up_locations(&self) -> Result<Vec<String>> {
        self.store.distinct_pick_up_locations().await
    }

    async fn ranked_ids(&self, text: &str, criteria: &SearchCriteria) -> Result<Vec<i32>> {
        let filters = FuzzyFilters {
            species: criteria.species.iter().copied().collect(),
            statuses: criteria.statuses.iter().copied().collect(),
            pick_up_date: criteria.pick_up_date,
            pick_up_locations: criteria.pick_up_locations.iter().cloned().collect(),
        };

        match tokio::time::timeout(
            self.config.gateway_timeout,
            self.gateway
                .search(text, &filters, self.config.max_fuzzy_candidates),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SearchError::Gateway("timed out".to_string())),
        }
    }
}

/// Store ordering for a sort mode. `RELEVANCE` only reaches here when the
/// ranking degraded, in which case it falls back to the pick-up-date order.
fn store_order(sort: SortMode) -> StoreOrder {
    match sort {
        SortMode::Name => StoreOrder::Name,
        SortMode::BirthdateDesc => StoreOrder::BirthdateDesc,
        SortMode::Relevance | SortMode::PickUpDateDesc => StoreOrder::PickUpDateDesc,
        SortMode::VaccinationAsc => StoreOrder::VaccinationAsc,
    }
}
