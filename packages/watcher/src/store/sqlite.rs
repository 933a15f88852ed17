//! SQLite-backed store.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::{Result, WatchError};
use crate::store::Store;
use crate::types::{ReviewRecord, ReviewStatus};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the reviews table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                slug TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                url TEXT NOT NULL,
                status TEXT NOT NULL,
                latest_event TEXT,
                shapefile_link TEXT,
                eco_made INTEGER NOT NULL DEFAULT 0,
                eco_order_link TEXT,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(WatchError::store)?;
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ReviewRecord> {
        let status_text: String = row.get("status");
        let status = ReviewStatus::from_str(&status_text).ok_or_else(|| {
            WatchError::Store(format!("unknown persisted status '{}'", status_text).into())
        })?;

        Ok(ReviewRecord {
            slug: row.get("slug"),
            name: row.get("name"),
            url: row.get("url"),
            status,
            latest_event: row.get("latest_event"),
            shapefile_link: row.get("shapefile_link"),
            eco_made: row.get("eco_made"),
            eco_order_link: row.get("eco_order_link"),
        })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, slug: &str) -> Result<Option<ReviewRecord>> {
        // slug is the primary key, so more than one row should be
        // impossible; count anyway and treat it as corruption.
        let rows = sqlx::query(
            r#"
            SELECT slug, name, url, status, latest_event,
                   shapefile_link, eco_made, eco_order_link
            FROM reviews
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_all(&self.pool)
        .await
        .map_err(WatchError::store)?;

        if rows.len() > 1 {
            return Err(WatchError::StoreCorruption {
                slug: slug.to_string(),
                rows: rows.len(),
            });
        }

        rows.first().map(Self::row_to_record).transpose()
    }

    async fn upsert(&self, record: &ReviewRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                slug, name, url, status, latest_event,
                shapefile_link, eco_made, eco_order_link, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (slug) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                status = excluded.status,
                latest_event = excluded.latest_event,
                shapefile_link = excluded.shapefile_link,
                eco_made = excluded.eco_made,
                eco_order_link = excluded.eco_order_link,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.slug)
        .bind(&record.name)
        .bind(&record.url)
        .bind(record.status.as_str())
        .bind(&record.latest_event)
        .bind(&record.shapefile_link)
        .bind(record.eco_made)
        .bind(&record.eco_order_link)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(WatchError::store)?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<ReviewRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT slug, name, url, status, latest_event,
                   shapefile_link, eco_made, eco_order_link
            FROM reviews
            ORDER BY slug
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(WatchError::store)?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn delete_all_except(&self, keep: &BTreeSet<String>) -> Result<()> {
        if keep.is_empty() {
            sqlx::query("DELETE FROM reviews")
                .execute(&self.pool)
                .await
                .map_err(WatchError::store)?;
            return Ok(());
        }

        let placeholders = vec!["?"; keep.len()].join(", ");
        let sql = format!("DELETE FROM reviews WHERE slug NOT IN ({})", placeholders);

        let mut query = sqlx::query(&sql);
        for slug in keep {
            query = query.bind(slug);
        }
        query
            .execute(&self.pool)
            .await
            .map_err(WatchError::store)?;
        Ok(())
    }
}
