//! Line topology: a line's sections must always form one simple path.
//!
//! Everything here is pure. Callers load a line's sections, build a
//! [`LinePath`], ask a policy for the next path and persist the result as a
//! whole. A rejected request never touches the input path.

pub mod cascade;
pub mod insertion;
pub mod path;
pub mod removal;

use thiserror::Error;

pub use cascade::{CascadeStep, plan_cascade};
pub use insertion::{Placement, insert_section, plan_insertion};
pub use path::{Adjacent, LinePath};
pub use removal::{Removal, remove_station};

pub type LineId = i64;
pub type StationId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("Station {0} is not registered")]
    UnknownStation(StationId),
    #[error("A section cannot start and end at station {0}")]
    SameStationEndpoints(StationId),
    #[error("Section distance must be positive, got {0}")]
    NonPositiveDistance(i64),
    #[error("Stations {up} and {down} are already connected on this line")]
    SectionAlreadyExists { up: StationId, down: StationId },
    #[error("Neither station {up} nor station {down} is on this line")]
    DisjointSection { up: StationId, down: StationId },
    #[error("Distance {distance} must be shorter than the section it splits ({span})")]
    DistanceExceedsSpan { distance: i64, span: i64 },
    #[error("Section {up} -> {down} cannot be placed on this line")]
    InvalidSectionPlacement { up: StationId, down: StationId },
    #[error("Line {line_id} would be longer than the largest supported distance")]
    DistanceOverflow { line_id: LineId },
    #[error("Line {0} has a single section left and cannot lose a station")]
    CannotReduceBelowMinimum(LineId),
    #[error("Station {station_id} is not on line {line_id}")]
    StationNotOnLine { line_id: LineId, station_id: StationId },
    #[error("Sections of line {line_id} do not form a single path: {reason}")]
    InconsistentPath { line_id: LineId, reason: String },
}

impl SectionError {
    /// Rejections caused by the request, as opposed to corrupt stored data.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, SectionError::InconsistentPath { .. })
    }
}

/// Checks that hold for any section regardless of the line it joins.
pub fn validate_candidate(up: StationId, down: StationId, distance: i64) -> Result<(), SectionError> {
    if up == down {
        return Err(SectionError::SameStationEndpoints(up));
    }
    if distance <= 0 {
        return Err(SectionError::NonPositiveDistance(distance));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::{HashMap, HashSet};

    use db::models::section::Section;

    use super::{LineId, LinePath};

    pub const LINE: LineId = 1;

    pub fn section(up: i64, down: i64, distance: i64) -> Section {
        Section::new(LINE, up, down, distance)
    }

    pub fn path(sections: &[(i64, i64, i64)]) -> LinePath {
        let sections = sections
            .iter()
            .map(|&(up, down, distance)| section(up, down, distance))
            .collect();
        LinePath::from_sections(LINE, sections).expect("test path must be valid")
    }

    /// Degree-level check of the path invariants, independent of `LinePath`.
    pub fn assert_simple_path(path: &LinePath) {
        let mut outgoing: HashMap<i64, usize> = HashMap::new();
        let mut incoming: HashMap<i64, usize> = HashMap::new();
        for s in path.sections() {
            assert_ne!(s.up_station_id, s.down_station_id, "self loop in {s:?}");
            assert!(s.distance > 0, "non-positive distance in {s:?}");
            *outgoing.entry(s.up_station_id).or_default() += 1;
            *incoming.entry(s.down_station_id).or_default() += 1;
        }
        assert!(outgoing.values().all(|&n| n == 1), "branching: {outgoing:?}");
        assert!(incoming.values().all(|&n| n == 1), "merging: {incoming:?}");

        let stations: HashSet<i64> = outgoing.keys().chain(incoming.keys()).copied().collect();
        let termini = stations
            .iter()
            .filter(|id| outgoing.contains_key(id) != incoming.contains_key(id))
            .count();
        assert_eq!(termini, 2, "expected exactly two termini");
        assert_eq!(stations.len(), path.section_count() + 1);

        let ordered = path.stations();
        assert_eq!(ordered.len(), stations.len());
        let (up, down) = path.endpoints();
        assert_eq!(ordered.first(), Some(&up));
        assert_eq!(ordered.last(), Some(&down));
    }
}
