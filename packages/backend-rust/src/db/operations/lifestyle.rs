use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::format_timestamp;

#[derive(Debug, Clone, Serialize)]
pub struct LifestyleEntry {
    pub id: String,
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub sleep_hours: f64,
    pub exercise_minutes: i64,
    pub stress_level: i64,
    pub hydration_liters: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLifestyleEntry {
    pub sleep_hours: f64,
    pub exercise_minutes: i64,
    pub stress_level: i64,
    pub hydration_liters: f64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

pub async fn insert_lifestyle_entry(
    pool: &SqlitePool,
    user_id: &str,
    entry: &NewLifestyleEntry,
) -> Result<LifestyleEntry, sqlx::Error> {
    let stored = LifestyleEntry {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        date: entry.date.unwrap_or_else(Utc::now),
        sleep_hours: entry.sleep_hours,
        exercise_minutes: entry.exercise_minutes,
        stress_level: entry.stress_level,
        hydration_liters: entry.hydration_liters,
    };

    sqlx::query(
        r#"
        INSERT INTO "lifestyle_entries"
            ("id", "user_id", "date", "sleep_hours", "exercise_minutes", "stress_level", "hydration_liters")
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&stored.id)
    .bind(&stored.user_id)
    .bind(format_timestamp(&stored.date))
    .bind(stored.sleep_hours)
    .bind(stored.exercise_minutes)
    .bind(stored.stress_level)
    .bind(stored.hydration_liters)
    .execute(pool)
    .await?;

    Ok(stored)
}

/// Newest first, at most `limit` rows.
pub async fn recent_lifestyle_entries(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<LifestyleEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "user_id", "date", "sleep_hours", "exercise_minutes", "stress_level", "hydration_liters"
        FROM "lifestyle_entries"
        WHERE "user_id" = ?
        ORDER BY "date" DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.iter().map(map_lifestyle_entry).collect()
}

fn map_lifestyle_entry(row: &SqliteRow) -> Result<LifestyleEntry, sqlx::Error> {
    Ok(LifestyleEntry {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        date: row.try_get("date")?,
        sleep_hours: row.try_get("sleep_hours")?,
        exercise_minutes: row.try_get("exercise_minutes")?,
        stress_level: row.try_get("stress_level")?,
        hydration_liters: row.try_get("hydration_liters")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sqlite_url;
    use crate::db::init_pool;
    use chrono::Duration;

    #[tokio::test]
    async fn test_recent_lifestyle_entries_order() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&sqlite_url(&dir.path().join("lifestyle.db")))
            .await
            .unwrap();
        let now = Utc::now();

        for day in 0..9i64 {
            let entry = NewLifestyleEntry {
                sleep_hours: 5.0 + day as f64 * 0.5,
                exercise_minutes: 10 * day,
                stress_level: day.min(10),
                hydration_liters: 1.5,
                date: Some(now - Duration::days(8 - day)),
            };
            insert_lifestyle_entry(&pool, "u1", &entry).await.unwrap();
        }

        let recent = recent_lifestyle_entries(&pool, "u1", 7).await.unwrap();
        assert_eq!(recent.len(), 7);
        assert_eq!(recent[0].exercise_minutes, 80);
        assert_eq!(recent[6].exercise_minutes, 20);
        assert!(recent.windows(2).all(|w| w[0].date >= w[1].date));
        assert!(recent_lifestyle_entries(&pool, "other", 7).await.unwrap().is_empty());
    }
}
