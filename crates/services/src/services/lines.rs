use std::collections::HashMap;

use db::models::{
    line::{CreateLine, Line, LineWithStations},
    section::Section,
    station::Station,
};
use sqlx::SqlitePool;

use super::{
    line_locks::LineLocks,
    line_sections::LineServiceError,
    topology::{LineId, LinePath, SectionError, validate_candidate},
};

/// Line-level operations that are not section edits.
pub struct LineService;

impl LineService {
    /// Creates a line together with its first section.
    pub async fn create_line(pool: &SqlitePool, data: CreateLine) -> Result<Line, LineServiceError> {
        let up = data
            .up_station_id
            .ok_or(LineServiceError::MissingField("upStationId"))?;
        let down = data
            .down_station_id
            .ok_or(LineServiceError::MissingField("downStationId"))?;
        let distance = data
            .distance
            .ok_or(LineServiceError::MissingField("distance"))?;

        for station_id in [up, down] {
            if !Station::exists(pool, station_id).await? {
                return Err(SectionError::UnknownStation(station_id).into());
            }
        }
        validate_candidate(up, down, distance)?;

        let line = Line::create_with_section(
            pool,
            &data.name,
            &data.color,
            &Section::new(0, up, down, distance),
        )
        .await?;

        tracing::info!(line_id = line.id, name = %line.name, up, down, distance, "Line created");
        Ok(line)
    }

    /// The line with its stations in path order.
    pub async fn find_with_stations(
        pool: &SqlitePool,
        line_id: LineId,
    ) -> Result<LineWithStations, LineServiceError> {
        let line = Line::find_by_id(pool, line_id)
            .await?
            .ok_or(LineServiceError::LineNotFound(line_id))?;
        let path = LinePath::from_sections(line_id, Section::find_by_line(pool, line_id).await?)?;

        let mut by_id: HashMap<i64, Station> = Station::find_all(pool)
            .await?
            .into_iter()
            .map(|station| (station.id, station))
            .collect();
        let stations = path
            .stations()
            .into_iter()
            .map(|station_id| {
                by_id
                    .remove(&station_id)
                    .ok_or_else(|| SectionError::InconsistentPath {
                        line_id,
                        reason: format!("station {station_id} no longer exists"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LineWithStations {
            line,
            total_distance: path.total_distance(),
            sections: path.into_sections(),
            stations,
        })
    }

    pub async fn delete_line(
        pool: &SqlitePool,
        locks: &LineLocks,
        line_id: LineId,
    ) -> Result<(), LineServiceError> {
        {
            let _guard = locks.lock(line_id).await;
            Line::delete(pool, line_id).await?;
        }
        locks.forget(line_id).await;
        tracing::info!(line_id, "Line deleted");
        Ok(())
    }
}
