use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use ts_rs::TS;

use super::{
    section::{Section, deserialize_distance},
    station::Station,
};

#[derive(Debug, Error)]
pub enum LineError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Line not found")]
    NotFound,
    #[error("Line name already registered: {0}")]
    DuplicateName(String),
    #[error("Line name must not be blank")]
    BlankName,
}

impl LineError {
    /// A unique-name violation raced past the lookup before the write.
    pub(crate) fn on_write(err: sqlx::Error, name: &str) -> Self {
        if err
            .as_database_error()
            .is_some_and(|e| e.is_unique_violation())
        {
            LineError::DuplicateName(name.to_string())
        } else {
            LineError::Database(err)
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line with its stations listed from up-terminus to down-terminus.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LineWithStations {
    #[serde(flatten)]
    #[ts(flatten)]
    pub line: Line,
    pub stations: Vec<Station>,
    pub sections: Vec<Section>,
    #[ts(type = "number")]
    pub total_distance: i64,
}

/// Body of `POST /lines`: the line plus its first section.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateLine {
    pub name: String,
    pub color: String,
    #[ts(type = "number | null")]
    pub up_station_id: Option<i64>,
    #[ts(type = "number | null")]
    pub down_station_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_distance")]
    #[ts(type = "number | string | null")]
    pub distance: Option<i64>,
}

#[derive(Debug, Default, Deserialize, TS)]
pub struct UpdateLine {
    pub name: Option<String>,
    pub color: Option<String>,
}

const LINE_COLUMNS: &str = "id, name, color, created_at, updated_at";

impl Line {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Line>(&format!("SELECT {LINE_COLUMNS} FROM lines ORDER BY id"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Line>(&format!("SELECT {LINE_COLUMNS} FROM lines WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Line>(&format!("SELECT {LINE_COLUMNS} FROM lines WHERE name = $1"))
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Insert the line and its first section together.
    ///
    /// The section's `line_id` is ignored and replaced by the new line's id.
    pub async fn create_with_section(
        pool: &SqlitePool,
        name: &str,
        color: &str,
        first_section: &Section,
    ) -> Result<Self, LineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LineError::BlankName);
        }
        if Self::find_by_name(pool, name).await?.is_some() {
            return Err(LineError::DuplicateName(name.to_string()));
        }

        let mut tx = pool.begin().await?;

        let line = sqlx::query_as::<_, Line>(&format!(
            "INSERT INTO lines (name, color) VALUES ($1, $2) RETURNING {LINE_COLUMNS}"
        ))
        .bind(name)
        .bind(color.trim())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| LineError::on_write(e, name))?;

        let section = Section {
            line_id: line.id,
            ..*first_section
        };
        Section::insert(&mut *tx, &section).await?;

        tx.commit().await?;
        Ok(line)
    }

    pub async fn update(pool: &SqlitePool, id: i64, data: UpdateLine) -> Result<Self, LineError> {
        let existing = Self::find_by_id(pool, id).await?.ok_or(LineError::NotFound)?;

        let name = match data.name.as_deref().map(str::trim) {
            Some("") => return Err(LineError::BlankName),
            Some(name) => name.to_string(),
            None => existing.name,
        };
        if let Some(other) = Self::find_by_name(pool, &name).await? {
            if other.id != id {
                return Err(LineError::DuplicateName(name));
            }
        }
        let color = data
            .color
            .map(|c| c.trim().to_string())
            .unwrap_or(existing.color);

        let line = sqlx::query_as::<_, Line>(&format!(
            r#"UPDATE lines
               SET name = $2, color = $3, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {LINE_COLUMNS}"#
        ))
        .bind(id)
        .bind(&name)
        .bind(color)
        .fetch_one(pool)
        .await
        .map_err(|e| LineError::on_write(e, &name))?;

        Ok(line)
    }

    /// Deletes the line; its sections go with it through `ON DELETE CASCADE`.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), LineError> {
        let result = sqlx::query("DELETE FROM lines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LineError::NotFound);
        }

        Ok(())
    }
}
