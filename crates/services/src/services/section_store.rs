use async_trait::async_trait;
use db::models::{
    line::{Line, LineError},
    section::Section,
    station::Station,
};
use sqlx::SqlitePool;

use super::topology::{LineId, StationId};

/// Persistence seen by the topology services. A line's sections are read
/// and written as one unit.
#[async_trait]
pub trait SectionStore: Send + Sync {
    async fn load_sections(&self, line_id: LineId) -> Result<Vec<Section>, sqlx::Error>;

    /// Atomically replaces the line's whole section set.
    async fn replace_sections(
        &self,
        line_id: LineId,
        sections: &[Section],
    ) -> Result<(), sqlx::Error>;

    async fn station_exists(&self, station_id: StationId) -> Result<bool, sqlx::Error>;

    async fn line_exists(&self, line_id: LineId) -> Result<bool, sqlx::Error>;

    async fn lines_containing(&self, station_id: StationId) -> Result<Vec<LineId>, sqlx::Error>;

    /// Drops the line and its sections. Deleting a missing line is a no-op.
    async fn delete_line(&self, line_id: LineId) -> Result<(), sqlx::Error>;
}

#[derive(Clone)]
pub struct SqliteSectionStore {
    pool: SqlitePool,
}

impl SqliteSectionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SectionStore for SqliteSectionStore {
    async fn load_sections(&self, line_id: LineId) -> Result<Vec<Section>, sqlx::Error> {
        Section::find_by_line(&self.pool, line_id).await
    }

    async fn replace_sections(
        &self,
        line_id: LineId,
        sections: &[Section],
    ) -> Result<(), sqlx::Error> {
        Section::replace_for_line(&self.pool, line_id, sections).await
    }

    async fn station_exists(&self, station_id: StationId) -> Result<bool, sqlx::Error> {
        Station::exists(&self.pool, station_id).await
    }

    async fn line_exists(&self, line_id: LineId) -> Result<bool, sqlx::Error> {
        Ok(Line::find_by_id(&self.pool, line_id).await?.is_some())
    }

    async fn lines_containing(&self, station_id: StationId) -> Result<Vec<LineId>, sqlx::Error> {
        Section::line_ids_containing(&self.pool, station_id).await
    }

    async fn delete_line(&self, line_id: LineId) -> Result<(), sqlx::Error> {
        match Line::delete(&self.pool, line_id).await {
            Ok(()) | Err(LineError::NotFound) => Ok(()),
            Err(LineError::Database(e)) => Err(e),
            Err(other) => Err(sqlx::Error::Protocol(other.to_string())),
        }
    }
}
