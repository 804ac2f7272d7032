use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::format_timestamp;

pub const DEFAULT_PAIN_TYPE: &str = "cramps";

#[derive(Debug, Clone, Serialize)]
pub struct PainEntry {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub pain_score: i64,
    pub pain_type: String,
    pub productivity_impact: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPainEntry {
    pub pain_score: i64,
    #[serde(default)]
    pub pain_type: Option<String>,
    #[serde(default)]
    pub productivity_impact: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Productivity impact assumed when the entry does not state one.
pub fn default_productivity_impact(pain_score: i64) -> i64 {
    ((pain_score as f64 * 0.8).floor() as i64).min(10)
}

pub async fn insert_pain_entry(
    pool: &SqlitePool,
    user_id: &str,
    entry: &NewPainEntry,
) -> Result<PainEntry, sqlx::Error> {
    let stored = PainEntry {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        date: entry.date.unwrap_or_else(Utc::now),
        pain_score: entry.pain_score,
        pain_type: entry
            .pain_type
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAIN_TYPE.to_string()),
        productivity_impact: entry
            .productivity_impact
            .unwrap_or_else(|| default_productivity_impact(entry.pain_score)),
        notes: entry.notes.clone(),
    };

    sqlx::query(
        r#"
        INSERT INTO "pain_entries"
            ("id", "user_id", "date", "pain_score", "pain_type", "productivity_impact", "notes")
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&stored.id)
    .bind(&stored.user_id)
    .bind(format_timestamp(&stored.date))
    .bind(stored.pain_score)
    .bind(&stored.pain_type)
    .bind(stored.productivity_impact)
    .bind(&stored.notes)
    .execute(pool)
    .await?;

    Ok(stored)
}

/// Newest first, at most `limit` rows.
pub async fn recent_pain_entries(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<PainEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "user_id", "date", "pain_score", "pain_type", "productivity_impact", "notes"
        FROM "pain_entries"
        WHERE "user_id" = ?
        ORDER BY "date" DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_pain_entry).collect()
}

fn map_pain_entry(row: &SqliteRow) -> Result<PainEntry, sqlx::Error> {
    Ok(PainEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: row.try_get("date")?,
        pain_score: row.try_get("pain_score")?,
        pain_type: row.try_get("pain_type")?,
        productivity_impact: row.try_get("productivity_impact")?,
        notes: row.try_get("notes")?,
    })
}
