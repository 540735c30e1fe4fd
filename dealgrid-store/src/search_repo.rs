use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dealgrid_core::repository::SearchRepository;
use dealgrid_core::search::Search;

pub struct PostgresSearchRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SearchRow {
    id: i64,
    query: String,
    normalized_query: String,
    filters: Option<String>,
    user_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<SearchRow> for Search {
    fn from(row: SearchRow) -> Self {
        Search {
            id: row.id,
            query: row.query,
            normalized_query: row.normalized_query,
            filters: row.filters,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

const SEARCH_COLUMNS: &str = "id, query, normalized_query, filters, user_id, created_at";

#[async_trait]
impl SearchRepository for PostgresSearchRepository {
    async fn create_search(
        &self,
        query: &str,
        normalized_query: &str,
        filters: Option<&str>,
        user_id: Option<i64>,
    ) -> Result<Search, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            INSERT INTO searches (query, normalized_query, filters, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {SEARCH_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, SearchRow>(&sql)
            .bind(query)
            .bind(normalized_query)
            .bind(filters)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn recent_searches(
        &self,
        limit: i64,
    ) -> Result<Vec<Search>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {SEARCH_COLUMNS}
            FROM searches
            ORDER BY created_at DESC
            LIMIT $1
            "#
        );
        let rows = sqlx::query_as::<_, SearchRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Search::from).collect())
    }

    async fn recent_searches_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Search>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {SEARCH_COLUMNS}
            FROM searches
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, SearchRow>(&sql)
            .bind(user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Search::from).collect())
    }

    async fn latest_search_for_query(
        &self,
        normalized_query: &str,
    ) -> Result<Option<Search>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            r#"
            SELECT {SEARCH_COLUMNS}
            FROM searches
            WHERE normalized_query = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#
        );
        let row = sqlx::query_as::<_, SearchRow>(&sql)
            .bind(normalized_query)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Search::from))
    }
}
