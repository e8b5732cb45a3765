//! SQLite card cache implementation.
//!
//! Implements `CardCache` from `holicard-core` using sqlx with split
//! read/write pools. The holiday is stored by its slug.

use chrono::{DateTime, Utc};
use holicard_core::storage::card_cache::CardCache;
use holicard_types::card::CachedCard;
use holicard_types::error::RepositoryError;
use holicard_types::holiday::{CardKey, HolidayKind};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `CardCache`.
#[derive(Clone)]
pub struct SqliteCardCache {
    pool: DatabasePool,
}

impl SqliteCardCache {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct CardRow {
    country: String,
    holiday: String,
    body: String,
    created_at: String,
    updated_at: String,
}

impl CardRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            country: row.try_get("country")?,
            holiday: row.try_get("holiday")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_card(self) -> Result<CachedCard, RepositoryError> {
        let holiday: HolidayKind = self
            .holiday
            .parse()
            .map_err(RepositoryError::Query)?;

        Ok(CachedCard {
            key: CardKey::new(self.country, holiday),
            body: self.body,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

impl CardCache for SqliteCardCache {
    async fn get(&self, key: &CardKey) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT body FROM holiday_cards WHERE country = ? AND holiday = ?")
            .bind(&key.country)
            .bind(key.holiday.slug())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| row.try_get::<String, _>("body"))
            .transpose()
            .map_err(query_error)
    }

    async fn put(&self, key: &CardKey, body: &str) -> Result<(), RepositoryError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO holiday_cards (country, holiday, body, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (country, holiday) DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at"#,
        )
        .bind(&key.country)
        .bind(key.holiday.slug())
        .bind(body)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn count_distinct_countries(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(DISTINCT country) FROM holiday_cards")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM holiday_cards")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(count as u64)
    }

    async fn clear_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM holiday_cards")
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn list_entries(&self) -> Result<Vec<CachedCard>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT country, holiday, body, created_at, updated_at FROM holiday_cards ORDER BY country, holiday",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| CardRow::from_row(row).map_err(query_error)?.into_card())
            .collect()
    }
}
