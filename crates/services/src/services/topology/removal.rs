use db::models::section::Section;

use super::{LinePath, SectionError, StationId};

/// What happened to the path when a station left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The station was a terminus; its only section was dropped.
    TerminusTrimmed { removed: Section },
    /// The station was interior; its two sections became `merged`.
    SectionsMerged { merged: Section },
}

pub fn remove_station(
    path: &LinePath,
    station_id: StationId,
) -> Result<(LinePath, Removal), SectionError> {
    let line_id = path.line_id();

    if path.section_count() == 1 {
        return Err(SectionError::CannotReduceBelowMinimum(line_id));
    }
    if !path.contains_station(station_id) {
        return Err(SectionError::StationNotOnLine {
            line_id,
            station_id,
        });
    }

    let adjacent = path.adjacent_sections(station_id);
    let (next, removal) = match (adjacent.upstream, adjacent.downstream) {
        (Some(&upstream), Some(&downstream)) => {
            let distance = upstream
                .distance
                .checked_add(downstream.distance)
                .ok_or(SectionError::DistanceOverflow { line_id })?;
            let merged = Section::new(
                line_id,
                upstream.up_station_id,
                downstream.down_station_id,
                distance,
            );
            let sections = path
                .sections()
                .iter()
                .filter(|s| **s != upstream && **s != downstream)
                .copied()
                .chain(std::iter::once(merged))
                .collect();
            (
                LinePath::from_sections(line_id, sections)?,
                Removal::SectionsMerged { merged },
            )
        }
        (Some(&removed), None) | (None, Some(&removed)) => {
            let sections = path
                .sections()
                .iter()
                .filter(|s| **s != removed)
                .copied()
                .collect();
            (
                LinePath::from_sections(line_id, sections)?,
                Removal::TerminusTrimmed { removed },
            )
        }
        (None, None) => {
            return Err(SectionError::StationNotOnLine {
                line_id,
                station_id,
            });
        }
    };

    tracing::trace!(line_id, station_id, ?removal, "Planned station removal");
    Ok((next, removal))
}
