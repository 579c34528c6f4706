use super::{LinePath, Removal, SectionError, StationId, remove_station};

/// What a system-wide station deletion means for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeStep {
    /// The station is not on this line.
    Untouched,
    /// The line keeps running without the station.
    Rewrite { path: LinePath, removal: Removal },
    /// The station is an end of the line's only section. A line cannot
    /// exist without a section, so the whole line goes.
    DeleteLine,
}

pub fn plan_cascade(path: &LinePath, station_id: StationId) -> Result<CascadeStep, SectionError> {
    if !path.contains_station(station_id) {
        return Ok(CascadeStep::Untouched);
    }
    if path.section_count() == 1 {
        return Ok(CascadeStep::DeleteLine);
    }
    let (path, removal) = remove_station(path, station_id)?;
    Ok(CascadeStep::Rewrite { path, removal })
}
