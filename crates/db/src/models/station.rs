use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum StationError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Station not found")]
    NotFound,
    #[error("Station name already registered: {0}")]
    DuplicateName(String),
    #[error("Station name must not be blank")]
    BlankName,
    #[error("Station {0} is still used by a line")]
    StillReferenced(i64),
}

impl StationError {
    /// A unique-name violation raced past the lookup in `Station::create`.
    pub(crate) fn on_insert(err: sqlx::Error, name: &str) -> Self {
        if err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation())
        {
            StationError::DuplicateName(name.to_string())
        } else {
            StationError::Database(err)
        }
    }

    /// A section still points at the station being deleted.
    pub(crate) fn on_delete(err: sqlx::Error, id: i64) -> Self {
        if err
            .as_database_error()
            .is_some_and(|e| e.is_foreign_key_violation())
        {
            StationError::StillReferenced(id)
        } else {
            StationError::Database(err)
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CreateStation {
    pub name: String,
}

impl Station {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Station>("SELECT id, name, created_at FROM stations ORDER BY id")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Station>("SELECT id, name, created_at FROM stations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Station>("SELECT id, name, created_at FROM stations WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM stations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn create(pool: &SqlitePool, data: &CreateStation) -> Result<Self, StationError> {
        let name = data.name.trim();
        if name.is_empty() {
            return Err(StationError::BlankName);
        }
        if Self::find_by_name(pool, name).await?.is_some() {
            return Err(StationError::DuplicateName(name.to_string()));
        }

        let station = sqlx::query_as::<_, Station>(
            r#"INSERT INTO stations (name)
               VALUES ($1)
               RETURNING id, name, created_at"#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| StationError::on_insert(e, name))?;

        Ok(station)
    }

    /// Removes the station row. Sections must already have been rewritten
    /// so that none reference it; otherwise `StillReferenced`.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), StationError> {
        let result = sqlx::query("DELETE FROM stations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| StationError::on_delete(e, id))?;

        if result.rows_affected() == 0 {
            return Err(StationError::NotFound);
        }

        Ok(())
    }
}
