use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use super::format_timestamp;

pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_EXPERIMENT_GROUP: &str = "control";

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub timezone: String,
    pub consent_flags: serde_json::Value,
    pub experiment_group: String,
}

pub async fn create_user(pool: &SqlitePool, timezone: Option<&str>) -> Result<User, sqlx::Error> {
    let user = User {
        user_id: uuid::Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        timezone: timezone.unwrap_or(DEFAULT_TIMEZONE).to_string(),
        consent_flags: default_consent_flags(),
        experiment_group: DEFAULT_EXPERIMENT_GROUP.to_string(),
    };

    sqlx::query(
        r#"
        INSERT INTO "users" ("user_id", "created_at", "timezone", "consent_flags", "experiment_group")
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.user_id)
    .bind(format_timestamp(&user.created_at))
    .bind(&user.timezone)
    .bind(user.consent_flags.to_string())
    .bind(&user.experiment_group)
    .execute(pool)
    .await?;

    Ok(user)
}

pub async fn find_user(pool: &SqlitePool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT "user_id", "created_at", "timezone", "consent_flags", "experiment_group"
        FROM "users" WHERE "user_id" = ? LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let consent_raw: String = row.try_get("consent_flags")?;
    Ok(Some(User {
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        timezone: row.try_get("timezone")?,
        consent_flags: serde_json::from_str(&consent_raw).unwrap_or_else(|_| default_consent_flags()),
        experiment_group: row.try_get("experiment_group")?,
    }))
}

fn default_consent_flags() -> serde_json::Value {
    serde_json::json!({ "analytics": true, "personalization": true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sqlite_url;
    use crate::db::init_pool;

    #[tokio::test]
    async fn test_create_then_find_user() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&sqlite_url(&dir.path().join("users.db")))
            .await
            .unwrap();

        let created = create_user(&pool, Some("Europe/Berlin")).await.unwrap();
        assert!(uuid::Uuid::parse_str(&created.user_id).is_ok());

        let found = find_user(&pool, &created.user_id).await.unwrap().unwrap();
        assert_eq!(found.timezone, "Europe/Berlin");
        assert_eq!(found.experiment_group, DEFAULT_EXPERIMENT_GROUP);
        assert_eq!(found.consent_flags["analytics"], true);
        assert_eq!(found.created_at.timestamp(), created.created_at.timestamp());

        assert!(find_user(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_user_defaults_timezone() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_pool(&sqlite_url(&dir.path().join("users.db")))
            .await
            .unwrap();

        let created = create_user(&pool, None).await.unwrap();
        assert_eq!(created.timezone, DEFAULT_TIMEZONE);
    }
}
