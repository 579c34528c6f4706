use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Sqlite, SqliteConnection, SqlitePool};
use ts_rs::TS;

/// One directed edge of a line's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[ts(type = "number")]
    pub line_id: i64,
    #[ts(type = "number")]
    pub up_station_id: i64,
    #[ts(type = "number")]
    pub down_station_id: i64,
    #[ts(type = "number")]
    pub distance: i64,
}

/// Body of `POST /lines/{id}/sections`.
///
/// Fields are optional so a missing one surfaces as a validation error
/// instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateSection {
    #[ts(type = "number | null")]
    pub up_station_id: Option<i64>,
    #[ts(type = "number | null")]
    pub down_station_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_distance")]
    #[ts(type = "number | string | null")]
    pub distance: Option<i64>,
}

/// Admin clients send distances either as numbers or as numeric strings.
pub(crate) fn deserialize_distance<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(i64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid distance: {s:?}"))),
    }
}

impl Section {
    pub fn new(line_id: i64, up_station_id: i64, down_station_id: i64, distance: i64) -> Self {
        Self {
            line_id,
            up_station_id,
            down_station_id,
            distance,
        }
    }

    pub async fn find_by_line(pool: &SqlitePool, line_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Section>(
            r#"SELECT line_id, up_station_id, down_station_id, distance
               FROM sections
               WHERE line_id = $1
               ORDER BY id"#,
        )
        .bind(line_id)
        .fetch_all(pool)
        .await
    }

    /// Lines whose path touches `station_id` at either end of any section.
    pub async fn line_ids_containing(
        pool: &SqlitePool,
        station_id: i64,
    ) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT DISTINCT line_id
               FROM sections
               WHERE up_station_id = $1 OR down_station_id = $1
               ORDER BY line_id"#,
        )
        .bind(station_id)
        .fetch_all(pool)
        .await
    }

    pub(crate) async fn insert(
        conn: &mut SqliteConnection,
        section: &Section,
    ) -> Result<(), sqlx::Error> {
        sqlx::query::<Sqlite>(
            r#"INSERT INTO sections (line_id, up_station_id, down_station_id, distance)
               VALUES ($1, $2, $3, $4)"#,
        )
        .bind(section.line_id)
        .bind(section.up_station_id)
        .bind(section.down_station_id)
        .bind(section.distance)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Swap a line's whole section set in one transaction.
    pub async fn replace_for_line(
        pool: &SqlitePool,
        line_id: i64,
        sections: &[Section],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM sections WHERE line_id = $1")
            .bind(line_id)
            .execute(&mut *tx)
            .await?;

        for section in sections {
            let row = Section {
                line_id,
                ..*section
            };
            Self::insert(&mut *tx, &row).await?;
        }

        tx.commit().await?;
        tracing::debug!(line_id, count = sections.len(), "Replaced line sections");
        Ok(())
    }
}
