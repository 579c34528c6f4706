use db::models::{
    section::Section,
    station::{Station, StationError},
};
use sqlx::SqlitePool;
use thiserror::Error;

use super::{
    line_locks::LineLocks,
    line_sections::{LineCascadeOutcome, LineSectionService, LineServiceError},
    section_store::SqliteSectionStore,
    topology::{LineId, StationId},
};

#[derive(Debug, Error)]
pub enum StationServiceError {
    #[error(transparent)]
    Station(#[from] StationError),
    #[error(transparent)]
    Line(#[from] LineServiceError),
    #[error("Station {station_id} is still on lines {failed_lines:?}")]
    CascadeIncomplete {
        station_id: StationId,
        failed_lines: Vec<LineId>,
        outcomes: Vec<LineCascadeOutcome>,
    },
}

pub struct StationService;

/// Rounds of cascade-then-delete before giving up on a station that keeps
/// being added back to lines.
const DELETE_ATTEMPTS: usize = 3;

impl StationService {
    /// Deletes a station everywhere: first from every line running through
    /// it, then the station itself. If any line could not be rewritten the
    /// station is kept and the per-line outcomes are returned in the error.
    ///
    /// A section added between the cascade and the delete makes the delete
    /// fail on the foreign key; the cascade then runs again.
    pub async fn delete_station(
        pool: &SqlitePool,
        locks: &LineLocks,
        station_id: StationId,
    ) -> Result<Vec<LineCascadeOutcome>, StationServiceError> {
        if Station::find_by_id(pool, station_id)
            .await
            .map_err(StationError::from)?
            .is_none()
        {
            return Err(StationError::NotFound.into());
        }

        let service = LineSectionService::new(SqliteSectionStore::new(pool.clone()), locks.clone());
        let mut outcomes = Vec::new();

        for attempt in 1..=DELETE_ATTEMPTS {
            outcomes.extend(service.cascade_remove_station(station_id).await?);

            let failed_lines = failed_lines(&outcomes);
            if !failed_lines.is_empty() {
                tracing::warn!(station_id, ?failed_lines, "Station kept, cascade incomplete");
                return Err(StationServiceError::CascadeIncomplete {
                    station_id,
                    failed_lines,
                    outcomes,
                });
            }

            match Station::delete(pool, station_id).await {
                Ok(()) => {
                    tracing::info!(station_id, lines = outcomes.len(), "Station deleted");
                    return Ok(outcomes);
                }
                Err(StationError::StillReferenced(_)) => {
                    tracing::debug!(station_id, attempt, "Station was added back to a line");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let failed_lines = Section::line_ids_containing(pool, station_id)
            .await
            .map_err(StationError::from)?;
        tracing::warn!(station_id, ?failed_lines, "Station kept, lines keep adding it back");
        Err(StationServiceError::CascadeIncomplete {
            station_id,
            failed_lines,
            outcomes,
        })
    }
}

fn failed_lines(outcomes: &[LineCascadeOutcome]) -> Vec<LineId> {
    outcomes
        .iter()
        .filter(|outcome| outcome.result.is_failure())
        .map(|outcome| outcome.line_id)
        .collect()
}
