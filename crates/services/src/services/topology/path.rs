use std::collections::HashMap;

use db::models::section::Section;

use super::{LineId, SectionError, StationId, validate_candidate};

/// The sections of one line, kept in order from up-terminus to down-terminus.
///
/// Sections live in a flat arena; stations map to the arena slot of the
/// section leaving them (`outgoing`) and the one arriving at them
/// (`incoming`). A valid path gives every station at most one of each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePath {
    line_id: LineId,
    sections: Vec<Section>,
    outgoing: HashMap<StationId, usize>,
    incoming: HashMap<StationId, usize>,
}

/// Sections touching one station. `upstream` ends at the station,
/// `downstream` starts at it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Adjacent<'a> {
    pub upstream: Option<&'a Section>,
    pub downstream: Option<&'a Section>,
}

impl Adjacent<'_> {
    pub fn count(&self) -> usize {
        usize::from(self.upstream.is_some()) + usize::from(self.downstream.is_some())
    }
}

impl LinePath {
    /// A fresh line: exactly one section.
    pub fn new(first: Section) -> Result<Self, SectionError> {
        validate_candidate(first.up_station_id, first.down_station_id, first.distance)?;
        Self::from_sections(first.line_id, vec![first])
    }

    /// Builds the path from an unordered section set, checking every
    /// invariant. Any violation is reported as `InconsistentPath`.
    pub fn from_sections(line_id: LineId, sections: Vec<Section>) -> Result<Self, SectionError> {
        let broken = |reason: String| SectionError::InconsistentPath { line_id, reason };

        if sections.is_empty() {
            return Err(broken("line has no sections".into()));
        }

        let mut outgoing = HashMap::with_capacity(sections.len());
        let mut incoming = HashMap::with_capacity(sections.len());
        for (slot, section) in sections.iter().enumerate() {
            if section.line_id != line_id {
                return Err(broken(format!(
                    "section {} -> {} belongs to line {}",
                    section.up_station_id, section.down_station_id, section.line_id
                )));
            }
            if section.up_station_id == section.down_station_id {
                return Err(broken(format!("station {} loops onto itself", section.up_station_id)));
            }
            if section.distance <= 0 {
                return Err(broken(format!(
                    "section {} -> {} has distance {}",
                    section.up_station_id, section.down_station_id, section.distance
                )));
            }
            if outgoing.insert(section.up_station_id, slot).is_some() {
                return Err(broken(format!("line branches at station {}", section.up_station_id)));
            }
            if incoming.insert(section.down_station_id, slot).is_some() {
                return Err(broken(format!("line merges at station {}", section.down_station_id)));
            }
        }
        if checked_total(&sections).is_none() {
            return Err(broken("total distance overflows".into()));
        }

        let mut heads = outgoing.keys().filter(|id| !incoming.contains_key(*id));
        let head = match (heads.next(), heads.next()) {
            (Some(&head), None) => head,
            (None, _) => return Err(broken("line forms a cycle".into())),
            (Some(_), Some(_)) => return Err(broken("line is split into several pieces".into())),
        };

        let mut ordered = Vec::with_capacity(sections.len());
        let mut current = head;
        while let Some(&slot) = outgoing.get(&current) {
            if ordered.len() == sections.len() {
                return Err(broken("line forms a cycle".into()));
            }
            ordered.push(sections[slot]);
            current = sections[slot].down_station_id;
        }
        if ordered.len() != sections.len() {
            return Err(broken("line is split into several pieces".into()));
        }

        Ok(Self::index(line_id, ordered))
    }

    /// Indexes sections that are already known to be in path order.
    fn index(line_id: LineId, sections: Vec<Section>) -> Self {
        let outgoing = sections
            .iter()
            .enumerate()
            .map(|(slot, s)| (s.up_station_id, slot))
            .collect();
        let incoming = sections
            .iter()
            .enumerate()
            .map(|(slot, s)| (s.down_station_id, slot))
            .collect();
        Self {
            line_id,
            sections,
            outgoing,
            incoming,
        }
    }

    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    /// Sections in path order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// `(up-terminus, down-terminus)`.
    pub fn endpoints(&self) -> (StationId, StationId) {
        (self.up_terminus(), self.down_terminus())
    }

    pub fn up_terminus(&self) -> StationId {
        self.sections[0].up_station_id
    }

    pub fn down_terminus(&self) -> StationId {
        self.sections[self.sections.len() - 1].down_station_id
    }

    pub fn contains_station(&self, station_id: StationId) -> bool {
        self.outgoing.contains_key(&station_id) || self.incoming.contains_key(&station_id)
    }

    /// The section running exactly `up -> down`, if any.
    pub fn section_between(&self, up: StationId, down: StationId) -> Option<&Section> {
        self.outgoing
            .get(&up)
            .map(|&slot| &self.sections[slot])
            .filter(|section| section.down_station_id == down)
    }

    pub fn adjacent_sections(&self, station_id: StationId) -> Adjacent<'_> {
        Adjacent {
            upstream: self.incoming.get(&station_id).map(|&slot| &self.sections[slot]),
            downstream: self.outgoing.get(&station_id).map(|&slot| &self.sections[slot]),
        }
    }

    /// Stations from up-terminus to down-terminus.
    pub fn stations(&self) -> Vec<StationId> {
        std::iter::once(self.up_terminus())
            .chain(self.sections.iter().map(|s| s.down_station_id))
            .collect()
    }

    /// Sum of all section distances. Construction rejects paths whose total
    /// does not fit, so this never overflows.
    pub fn total_distance(&self) -> i64 {
        checked_total(&self.sections).unwrap_or(i64::MAX)
    }

    /// Total distance after adding `extra`, or `None` on overflow.
    pub fn total_with(&self, extra: i64) -> Option<i64> {
        self.total_distance().checked_add(extra)
    }

    /// Replaces the section in `slot` with `replacement` (zero or more
    /// sections) and re-validates the result.
    pub(super) fn splice(
        &self,
        slot: usize,
        replacement: &[Section],
    ) -> Result<Self, SectionError> {
        let mut sections = Vec::with_capacity(self.sections.len() + replacement.len());
        sections.extend_from_slice(&self.sections[..slot]);
        sections.extend_from_slice(replacement);
        sections.extend_from_slice(&self.sections[slot + 1..]);
        Self::from_sections(self.line_id, sections)
    }

    pub(super) fn slot_of(&self, section: &Section) -> Option<usize> {
        self.outgoing
            .get(&section.up_station_id)
            .copied()
            .filter(|&slot| self.sections[slot] == *section)
    }
}

fn checked_total(sections: &[Section]) -> Option<i64> {
    sections
        .iter()
        .try_fold(0i64, |total, s| total.checked_add(s.distance))
}
