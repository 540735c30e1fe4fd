use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// A search a user (or the refresh worker) executed against the sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    pub id: i64,
    pub query: String,
    pub normalized_query: String,
    pub filters: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Incoming search request, before normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Option<String>,
}

/// Normalize a search query: trim, lowercase, collapse interior whitespace.
/// Grouping for deal scoring keys on this value, so two searches that differ
/// only in spacing or case land in the same query group.
pub fn normalize_query(query: &str) -> CoreResult<String> {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(CoreError::ValidationError(
            "Query must be a non-empty string".to_string(),
        ));
    }
    Ok(collapsed.to_lowercase())
}
