//! Section changes for one line at a time, plus the station cascade.
//!
//! Each mutation takes the line's lock, loads its sections, asks the
//! topology policies for the next path and writes it back in one go.

use db::models::line::LineError;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

use super::{
    line_locks::LineLocks,
    section_store::SectionStore,
    topology::{
        CascadeStep, LineId, LinePath, Removal, SectionError, StationId, insert_section,
        plan_cascade, remove_station,
    },
};

#[derive(Debug, Error)]
pub enum LineServiceError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Section(#[from] SectionError),
    #[error(transparent)]
    Line(#[from] LineError),
    #[error("Line {0} not found")]
    LineNotFound(LineId),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Per-line result of deleting a station system-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum CascadeResult {
    Untouched,
    TerminusTrimmed,
    SectionsMerged,
    LineDeleted,
    Failed { reason: String },
}

impl CascadeResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, CascadeResult::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct LineCascadeOutcome {
    #[ts(type = "number")]
    pub line_id: LineId,
    pub result: CascadeResult,
}

pub struct LineSectionService<S> {
    store: S,
    locks: LineLocks,
}

impl<S: SectionStore> LineSectionService<S> {
    pub fn new(store: S, locks: LineLocks) -> Self {
        Self { store, locks }
    }

    /// Current path of a line. Reads are not serialized with writers; the
    /// store hands back a consistent snapshot.
    pub async fn path(&self, line_id: LineId) -> Result<LinePath, LineServiceError> {
        let sections = self.store.load_sections(line_id).await?;
        if sections.is_empty() && !self.store.line_exists(line_id).await? {
            return Err(LineServiceError::LineNotFound(line_id));
        }
        Ok(LinePath::from_sections(line_id, sections)?)
    }

    pub async fn insert_section(
        &self,
        line_id: LineId,
        up: StationId,
        down: StationId,
        distance: i64,
    ) -> Result<LinePath, LineServiceError> {
        let _guard = self.locks.lock(line_id).await;
        let path = self.path(line_id).await?;

        for station_id in [up, down] {
            if !self.store.station_exists(station_id).await? {
                return Err(SectionError::UnknownStation(station_id).into());
            }
        }

        let (next, placement) = insert_section(&path, up, down, distance).inspect_err(|e| {
            tracing::debug!(line_id, up, down, distance, "Section rejected: {}", e);
        })?;

        self.store.replace_sections(line_id, next.sections()).await?;
        tracing::info!(line_id, up, down, distance, ?placement, "Section added");
        Ok(next)
    }

    pub async fn remove_station(
        &self,
        line_id: LineId,
        station_id: StationId,
    ) -> Result<(LinePath, Removal), LineServiceError> {
        let _guard = self.locks.lock(line_id).await;
        let path = self.path(line_id).await?;

        let (next, removal) = remove_station(&path, station_id).inspect_err(|e| {
            tracing::debug!(line_id, station_id, "Station removal rejected: {}", e);
        })?;

        self.store.replace_sections(line_id, next.sections()).await?;
        tracing::info!(line_id, station_id, ?removal, "Station removed from line");
        Ok((next, removal))
    }

    /// Takes the station off every line that runs through it. Lines are
    /// handled one by one under their own lock; a failure is recorded in
    /// that line's outcome and the remaining lines still go ahead.
    pub async fn cascade_remove_station(
        &self,
        station_id: StationId,
    ) -> Result<Vec<LineCascadeOutcome>, LineServiceError> {
        let line_ids = self.store.lines_containing(station_id).await?;
        let mut outcomes = Vec::with_capacity(line_ids.len());

        for line_id in line_ids {
            let result = match self.cascade_line(line_id, station_id).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(line_id, station_id, "Cascade failed on line: {}", e);
                    CascadeResult::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(LineCascadeOutcome { line_id, result });
        }

        Ok(outcomes)
    }

    async fn cascade_line(
        &self,
        line_id: LineId,
        station_id: StationId,
    ) -> Result<CascadeResult, LineServiceError> {
        let _guard = self.locks.lock(line_id).await;
        let path = match self.path(line_id).await {
            Err(LineServiceError::LineNotFound(_)) => return Ok(CascadeResult::Untouched),
            other => other?,
        };

        match plan_cascade(&path, station_id)? {
            CascadeStep::Untouched => Ok(CascadeResult::Untouched),
            CascadeStep::Rewrite { path, removal } => {
                self.store.replace_sections(line_id, path.sections()).await?;
                tracing::info!(line_id, station_id, ?removal, "Cascade rewrote line");
                Ok(match removal {
                    Removal::TerminusTrimmed { .. } => CascadeResult::TerminusTrimmed,
                    Removal::SectionsMerged { .. } => CascadeResult::SectionsMerged,
                })
            }
            CascadeStep::DeleteLine => {
                self.store.delete_line(line_id).await?;
                self.locks.forget(line_id).await;
                tracing::info!(line_id, station_id, "Cascade deleted single-section line");
                Ok(CascadeResult::LineDeleted)
            }
        }
    }
}
