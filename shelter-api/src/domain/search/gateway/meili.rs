//! Meilisearch-backed fuzzy search gateway.

use async_trait::async_trait;
use meili::{MeiliClient, SearchRequest};

use crate::domain::search::traits::{FuzzyFilters, FuzzySearchGateway, Result, SearchError};

#[derive(Debug, Clone)]
pub struct MeiliGateway {
    client: MeiliClient,
    index_uid: String,
}

impl MeiliGateway {
    pub fn new(client: MeiliClient, index_uid: impl Into<String>) -> Self {
        Self {
            client,
            index_uid: index_uid.into(),
        }
    }
}

#[async_trait]
impl FuzzySearchGateway for MeiliGateway {
    async fn search(
        &self,
        text: &str,
        filters: &FuzzyFilters,
        max_count: usize,
    ) -> Result<Vec<i32>> {
        let request =
            SearchRequest::new(text, max_count).with_filter(filter_expression(filters));

        let response = self
            .client
            .search(&self.index_uid, &request)
            .await
            .map_err(|err| SearchError::Gateway(err.to_string()))?;

        Ok(response.hit_ids())
    }
}

/// Build a Meilisearch filter expression for the pre-filterable subset of the
/// criteria. The index stores dates as julian day numbers so range filters
/// stay numeric.
fn filter_expression(filters: &FuzzyFilters) -> Option<String> {
    let mut parts = Vec::new();

    if !filters.species.is_empty() {
        parts.push(format!("species IN [{}]", join_tokens(&filters.species)));
    }
    if !filters.statuses.is_empty() {
        parts.push(format!("status IN [{}]", join_tokens(&filters.statuses)));
    }
    if let Some(min) = filters.pick_up_date.min {
        parts.push(format!("pickUpDay >= {}", min.to_julian_day()));
    }
    if let Some(max) = filters.pick_up_date.max {
        parts.push(format!("pickUpDay <= {}", max.to_julian_day()));
    }
    if !filters.pick_up_locations.is_empty() {
        let quoted: Vec<String> = filters
            .pick_up_locations
            .iter()
            .map(|location| quote(location))
            .collect();
        parts.push(format!("pickUpLocation IN [{}]", quoted.join(", ")));
    }

    (!parts.is_empty()).then(|| parts.join(" AND "))
}

/// Quote a string value for a filter expression. Backslashes must be escaped
/// before quotes, or a trailing backslash swallows the closing quote.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn join_tokens<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
