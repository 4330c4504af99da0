//! Pattern store backed by Postgres.
//!
//! Matching runs in the `match_hebcal_event` SQL function, which returns rows
//! best first. Wildcard patterns are stored next to their `LIKE` translation
//! (see [`pattern::to_like_patterns`]) so both stores agree on what a pattern matches.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use super::{EventMetadata, PatternStore, TagMatch};
use crate::adapter::HolidayCategory;
use crate::catalog::{FastStartType, HebrewDayRange, TagCatalog};
use crate::error::StoreError;
use crate::hdate::HMonth;
use crate::pattern::{self, MatchType};

/// Connection pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgStoreOptions {
    pub max_connections: u32,
    /// Deadline for acquiring a connection and for each query
    pub query_timeout: Duration,
}

impl Default for PgStoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// One row of `match_hebcal_event`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct MatchRow {
    tag_key: String,
    display_name_hebrew: String,
    display_name_english_ashkenazi: String,
    display_name_english_sephardi: Option<String>,
    match_type: String,
    priority: i32,
    duration_days_israel: i16,
    duration_days_diaspora: i16,
    fast_start_type: Option<String>,
    hebrew_month: Option<i16>,
    day_start: Option<i16>,
    day_end: Option<i16>,
}

fn small_to_u8(value: i16, column: &str) -> Result<u8, StoreError> {
    u8::try_from(value).map_err(|_| StoreError::Decode(format!("{column} out of range: {value}")))
}

impl TryFrom<MatchRow> for TagMatch {
    type Error = StoreError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let match_type: MatchType = row.match_type.parse().map_err(StoreError::Decode)?;
        let fast_start_type: Option<FastStartType> = row
            .fast_start_type
            .as_deref()
            .map(str::parse::<FastStartType>)
            .transpose()
            .map_err(StoreError::Decode)?;

        let date_range = match row.hebrew_month {
            Some(month) => {
                let month = HMonth::from_number(small_to_u8(month, "hebrew_month")?)
                    .ok_or_else(|| StoreError::Decode(format!("invalid hebrew_month: {month}")))?;
                Some(HebrewDayRange {
                    month,
                    day_start: small_to_u8(row.day_start.unwrap_or(1), "day_start")?,
                    day_end: small_to_u8(row.day_end.unwrap_or(30), "day_end")?,
                })
            }
            None => None,
        };

        Ok(TagMatch {
            tag_key: row.tag_key,
            display_name_hebrew: row.display_name_hebrew,
            display_name_english_ashkenazi: row.display_name_english_ashkenazi,
            display_name_english_sephardi: row.display_name_english_sephardi,
            match_type,
            priority: row.priority,
            metadata: EventMetadata {
                duration_days_israel: small_to_u8(row.duration_days_israel, "duration_days_israel")?,
                duration_days_diaspora: small_to_u8(
                    row.duration_days_diaspora,
                    "duration_days_diaspora",
                )?,
                fast_start_type,
            },
            date_range,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgPatternStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgPatternStore {
    pub async fn connect(database_url: &str, options: PgStoreOptions) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.query_timeout)
            .connect(database_url)
            .await?;
        Ok(Self::from_pool(pool, options.query_timeout))
    }

    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Runs the embedded migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Upserts every tag by `tag_key` and replaces its patterns with the
    /// catalog's. Returns the number of pattern rows written.
    pub async fn import_catalog(&self, catalog: &TagCatalog) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut imported = 0;

        for tag in &catalog.tags {
            let (tag_id,): (i32,) = sqlx::query_as(
                "INSERT INTO zman_tags (tag_key, tag_type, display_name_hebrew, display_name_english_ashkenazi, \
                 display_name_english_sephardi, is_visible_to_users, duration_days_israel, duration_days_diaspora, fast_start_type) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 ON CONFLICT (tag_key) DO UPDATE SET \
                 tag_type = EXCLUDED.tag_type, \
                 display_name_hebrew = EXCLUDED.display_name_hebrew, \
                 display_name_english_ashkenazi = EXCLUDED.display_name_english_ashkenazi, \
                 display_name_english_sephardi = EXCLUDED.display_name_english_sephardi, \
                 is_visible_to_users = EXCLUDED.is_visible_to_users, \
                 duration_days_israel = EXCLUDED.duration_days_israel, \
                 duration_days_diaspora = EXCLUDED.duration_days_diaspora, \
                 fast_start_type = EXCLUDED.fast_start_type \
                 RETURNING id",
            )
            .bind(&tag.key)
            .bind(tag.tag_type.as_str())
            .bind(&tag.display_name_hebrew)
            .bind(&tag.display_name_english_ashkenazi)
            .bind(&tag.display_name_english_sephardi)
            .bind(tag.visible)
            .bind(i16::from(tag.duration_days_israel))
            .bind(i16::from(tag.duration_days_diaspora))
            .bind(tag.fast_start_type.map(|f| f.as_str()))
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM tag_event_patterns WHERE tag_id = $1")
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;

            for p in &tag.patterns {
                let like_patterns = match p.match_type {
                    MatchType::Wildcard => pattern::to_like_patterns(&p.value),
                    _ => Vec::new(),
                };
                imported += sqlx::query(
                    "INSERT INTO tag_event_patterns (tag_id, match_type, match_value, priority, hebrew_month, day_start, day_end, like_patterns) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                     ON CONFLICT (tag_id, match_type, match_value) DO NOTHING",
                )
                .bind(tag_id)
                .bind(p.match_type.as_str())
                .bind(&p.value)
                .bind(p.priority)
                .bind(p.hebrew_month.map(i16::from))
                .bind(p.day_start.map(i16::from))
                .bind(p.day_end.map(i16::from))
                .bind(like_patterns)
                .execute(&mut *tx)
                .await?
                .rows_affected() as usize;
            }
        }

        tx.commit().await?;
        info!(tags = catalog.tags.len(), patterns = imported, "Imported tag catalog");
        Ok(imported)
    }
}

#[async_trait]
impl PatternStore for PgPatternStore {
    async fn match_event(
        &self,
        title: &str,
        category: HolidayCategory,
    ) -> Result<Vec<TagMatch>, StoreError> {
        let query = sqlx::query_as::<_, MatchRow>("SELECT * FROM match_hebcal_event($1, $2)")
            .bind(title)
            .bind(category.as_str())
            .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| StoreError::Timeout(self.query_timeout))??;

        debug!(title, %category, rows = rows.len(), "Queried match_hebcal_event");
        rows.into_iter().map(TagMatch::try_from).collect()
    }
}
