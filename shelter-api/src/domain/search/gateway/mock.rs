//! Mock fuzzy gateway for testing.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::search::traits::{FuzzyFilters, FuzzySearchGateway, Result, SearchError};

/// In-memory gateway with a configurable ranking and failure mode, recording
/// every call for assertions.
#[derive(Clone, Default)]
pub struct MockFuzzyGateway {
    ranking: Vec<i32>,
    fail: bool,
    calls: Arc<RwLock<Vec<(String, FuzzyFilters, usize)>>>,
}

impl MockFuzzyGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers to return, best match first.
    pub fn with_ranking(mut self, ranking: Vec<i32>) -> Self {
        self.ranking = ranking;
        self
    }

    /// Every call fails, as a transport error would.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Recorded `(text, filters, max_count)` calls.
    pub fn calls(&self) -> Vec<(String, FuzzyFilters, usize)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl FuzzySearchGateway for MockFuzzyGateway {
    async fn search(
        &self,
        text: &str,
        filters: &FuzzyFilters,
        max_count: usize,
    ) -> Result<Vec<i32>> {
        self.calls
            .write()
            .unwrap()
            .push((text.to_string(), filters.clone(), max_count));

        if self.fail {
            return Err(SearchError::Gateway("connection refused".to_string()));
        }

        Ok(self.ranking.iter().copied().take(max_count).collect())
    }
}
