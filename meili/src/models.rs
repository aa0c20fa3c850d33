use serde::{Deserialize, Serialize};

/// Body of a `POST /indexes/{uid}/search` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub limit: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_retrieve: Vec<String>,
}

impl SearchRequest {
    pub fn new(q: impl Into<String>, limit: usize) -> Self {
        Self {
            q: q.into(),
            filter: None,
            limit,
            attributes_to_retrieve: vec!["id".to_string()],
        }
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }
}

/// Response from a search request. Hits are returned best match first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub hits: Vec<Hit>,
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hit {
    pub id: i32,
}

impl SearchResponse {
    /// Ranked document identifiers, best match first.
    pub fn hit_ids(&self) -> Vec<i32> {
        self.hits.iter().map(|hit| hit.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_search_response() {
        let body = r#"
        {
            "hits": [{"id": 7, "name": "Milo"}, {"id": 2, "name": "Mila"}],
            "query": "mil",
            "processingTimeMs": 3,
            "limit": 50,
            "offset": 0,
            "estimatedTotalHits": 2
        }
        "#;

        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.hit_ids(), vec![7, 2]);
        assert_eq!(response.query, "mil");
    }

    #[test]
    fn serialize_request_omits_absent_filter() {
        let request = SearchRequest::new("mil", 50);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("filter").is_none());
        assert_eq!(json["limit"], 50);
    }
}
