use db::models::section::Section;

use super::{LinePath, SectionError, StationId, validate_candidate};

/// Where a new section goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The new section ends at the current up-terminus.
    ExtendUp,
    /// The new section starts at the current down-terminus.
    ExtendDown,
    /// The up station is on the line; the new station cuts `replaced`
    /// at `distance` from its up end.
    SplitFromUp { replaced: Section },
    /// The down station is on the line; the new station cuts `replaced`
    /// at `distance` from its down end.
    SplitFromDown { replaced: Section },
}

/// Decides where `up -> down` would go without building the new path.
pub fn plan_insertion(
    path: &LinePath,
    up: StationId,
    down: StationId,
    distance: i64,
) -> Result<Placement, SectionError> {
    validate_candidate(up, down, distance)?;

    let has_up = path.contains_station(up);
    let has_down = path.contains_station(down);

    if has_up && has_down {
        if path.section_between(up, down).is_some() || path.section_between(down, up).is_some() {
            return Err(SectionError::SectionAlreadyExists { up, down });
        }
        // Joining two stations already on the line would close a loop.
        return Err(SectionError::InvalidSectionPlacement { up, down });
    }
    if !has_up && !has_down {
        return Err(SectionError::DisjointSection { up, down });
    }

    let extension = if has_down && down == path.up_terminus() {
        Some(Placement::ExtendUp)
    } else if has_up && up == path.down_terminus() {
        Some(Placement::ExtendDown)
    } else {
        None
    };
    if let Some(placement) = extension {
        if path.total_with(distance).is_none() {
            return Err(SectionError::DistanceOverflow {
                line_id: path.line_id(),
            });
        }
        return Ok(placement);
    }

    let adjacent = if has_up {
        path.adjacent_sections(up)
    } else {
        path.adjacent_sections(down)
    };
    let (replaced, placement) = match (has_up, adjacent.downstream, adjacent.upstream) {
        (true, Some(&replaced), _) => (replaced, Placement::SplitFromUp { replaced }),
        (false, _, Some(&replaced)) => (replaced, Placement::SplitFromDown { replaced }),
        _ => return Err(SectionError::InvalidSectionPlacement { up, down }),
    };

    if distance >= replaced.distance {
        return Err(SectionError::DistanceExceedsSpan {
            distance,
            span: replaced.distance,
        });
    }

    Ok(placement)
}

/// Grafts `up -> down` onto the path, returning the new path.
pub fn insert_section(
    path: &LinePath,
    up: StationId,
    down: StationId,
    distance: i64,
) -> Result<(LinePath, Placement), SectionError> {
    let placement = plan_insertion(path, up, down, distance)?;
    let line_id = path.line_id();
    let added = Section::new(line_id, up, down, distance);

    let next = match placement {
        Placement::ExtendUp => {
            let mut sections = Vec::with_capacity(path.section_count() + 1);
            sections.push(added);
            sections.extend_from_slice(path.sections());
            LinePath::from_sections(line_id, sections)
        }
        Placement::ExtendDown => {
            let mut sections = path.sections().to_vec();
            sections.push(added);
            LinePath::from_sections(line_id, sections)
        }
        Placement::SplitFromUp { replaced } => splice(
            path,
            &replaced,
            [
                added,
                Section::new(line_id, down, replaced.down_station_id, replaced.distance - distance),
            ],
        ),
        Placement::SplitFromDown { replaced } => splice(
            path,
            &replaced,
            [
                Section::new(line_id, replaced.up_station_id, up, replaced.distance - distance),
                added,
            ],
        ),
    };

    let next = next.map_err(|_| SectionError::InvalidSectionPlacement { up, down })?;
    Ok((next, placement))
}

fn splice(
    path: &LinePath,
    replaced: &Section,
    halves: [Section; 2],
) -> Result<LinePath, SectionError> {
    let slot = path
        .slot_of(replaced)
        .ok_or(SectionError::InvalidSectionPlacement {
            up: replaced.up_station_id,
            down: replaced.down_station_id,
        })?;
    path.splice(slot, &halves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::topology::test_support::{assert_simple_path, path, section};

    #[test]
    fn extends_above_the_up_terminus() {
        let line = path(&[(2, 3, 5)]);
        let (next, placement) = insert_section(&line, 1, 2, 5).unwrap();

        assert_eq!(placement, Placement::ExtendUp);
        assert_eq!(next.up_terminus(), 1);
        assert_eq!(next.stations(), vec![1, 2, 3]);
        assert_eq!(next.total_distance(), line.total_distance() + 5);
        assert_simple_path(&next);
    }

    #[test]
    fn extends_below_the_down_terminus() {
        let line = path(&[(1, 2, 5)]);
        let (next, placement) = insert_section(&line, 2, 3, 5).unwrap();

        assert_eq!(placement, Placement::ExtendDown);
        assert_eq!(next.endpoints(), (1, 3));
        assert_eq!(next.total_distance(), 10);
        assert_simple_path(&next);
    }

    #[test]
    fn splits_from_the_up_side() {
        let line = path(&[(1, 2, 10)]);
        let (next, placement) = insert_section(&line, 1, 3, 4).unwrap();

        assert_eq!(
            placement,
            Placement::SplitFromUp {
                replaced: section(1, 2, 10)
            }
        );
        assert_eq!(next.sections(), &[section(1, 3, 4), section(3, 2, 6)]);
        assert_eq!(next.total_distance(), 10);
        assert_simple_path(&next);
    }

    #[test]
    fn splits_from_the_down_side() {
        let line = path(&[(1, 3, 10), (3, 4, 8)]);
        let (next, _) = insert_section(&line, 2, 3, 3).unwrap();

        assert_eq!(
            next.sections(),
            &[section(1, 2, 7), section(2, 3, 3), section(3, 4, 8)]
        );
        assert_simple_path(&next);
    }

    #[test]
    fn splits_interior_sections() {
        let line = path(&[(1, 2, 5), (2, 3, 10), (3, 4, 5)]);
        let (next, _) = insert_section(&line, 2, 9, 6).unwrap();

        assert_eq!(next.stations(), vec![1, 2, 9, 3, 4]);
        assert_eq!(next.section_between(9, 3), Some(&section(9, 3, 4)));
        assert_eq!(next.total_distance(), line.total_distance());
    }

    #[test]
    fn split_must_fit_inside_the_span() {
        let line = path(&[(1, 2, 10)]);

        for distance in [10, 11] {
            assert_eq!(
                insert_section(&line, 1, 3, distance),
                Err(SectionError::DistanceExceedsSpan { distance, span: 10 })
            );
        }
        assert_eq!(
            insert_section(&path(&[(1, 3, 10)]), 2, 3, 20),
            Err(SectionError::DistanceExceedsSpan {
                distance: 20,
                span: 10
            })
        );
    }

    #[test]
    fn rejections_follow_the_documented_order() {
        let line = path(&[(1, 2, 10)]);

        assert_eq!(
            insert_section(&line, 2, 2, 5),
            Err(SectionError::SameStationEndpoints(2))
        );
        assert_eq!(
            insert_section(&line, 7, 7, -1),
            Err(SectionError::SameStationEndpoints(7))
        );
        assert_eq!(
            insert_section(&line, 1, 2, 0),
            Err(SectionError::NonPositiveDistance(0))
        );
        assert_eq!(
            insert_section(&line, 1, 2, 20),
            Err(SectionError::SectionAlreadyExists { up: 1, down: 2 })
        );
        assert_eq!(
            insert_section(&line, 2, 1, 3),
            Err(SectionError::SectionAlreadyExists { up: 2, down: 1 })
        );
        assert_eq!(
            insert_section(&line, 3, 4, 20),
            Err(SectionError::DisjointSection { up: 3, down: 4 })
        );
    }

    #[test]
    fn closing_a_loop_is_an_invalid_placement() {
        let line = path(&[(1, 2, 5), (2, 3, 5)]);

        assert_eq!(
            insert_section(&line, 1, 3, 4),
            Err(SectionError::InvalidSectionPlacement { up: 1, down: 3 })
        );
        assert_eq!(
            insert_section(&line, 3, 1, 4),
            Err(SectionError::InvalidSectionPlacement { up: 3, down: 1 })
        );
    }

    #[test]
    fn rejected_insert_leaves_path_untouched() {
        let line = path(&[(1, 2, 10)]);
        let before = line.clone();

        assert!(insert_section(&line, 1, 3, 10).is_err());
        assert!(insert_section(&line, 5, 6, 1).is_err());
        assert_eq!(line, before);
    }

    #[test]
    fn long_insertion_sequence_keeps_a_simple_path() {
        let mut line = path(&[(100, 200, 1_000)]);
        let mut expected_total = 1_000;

        for station in 1..=40_i64 {
            let (up, down, distance) = match station % 4 {
                0 => (station, line.up_terminus(), 7),
                1 => (line.down_terminus(), station, 11),
                2 => {
                    let longest = *line.sections().iter().max_by_key(|s| s.distance).unwrap();
                    (longest.up_station_id, station, longest.distance / 2)
                }
                _ => {
                    let longest = *line.sections().iter().max_by_key(|s| s.distance).unwrap();
                    (station, longest.down_station_id, longest.distance / 3)
                }
            };
            let (next, placement) = insert_section(&line, up, down, distance).unwrap();
            if matches!(placement, Placement::ExtendUp | Placement::ExtendDown) {
                expected_total += distance;
            }

            assert_simple_path(&next);
            assert_eq!(next.section_count(), line.section_count() + 1);
            assert_eq!(next.total_distance(), expected_total);
            line = next;
        }
    }

    #[test]
    fn extension_past_the_largest_total_is_rejected() {
        let long = i64::MAX / 2 + 1;
        let line = path(&[(1, 2, long)]);

        assert_eq!(
            insert_section(&line, 2, 3, long),
            Err(SectionError::DistanceOverflow { line_id: line.line_id() })
        );
        assert_eq!(
            insert_section(&line, 0, 1, long),
            Err(SectionError::DistanceOverflow { line_id: line.line_id() })
        );

        let (next, _) = insert_section(&line, 2, 3, long - 2).unwrap();
        assert_eq!(next.total_distance(), i64::MAX - 1);
        assert_simple_path(&next);
    }
}
