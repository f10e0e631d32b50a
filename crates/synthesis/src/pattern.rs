use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use model::{
    pattern::{Pattern, PatternKey, PatternRow, PatternStop},
    report::{RowError, SourceFile},
    stop::Stop,
    DirectionId, RouteId,
};

use crate::{
    canonical::parse_direction,
    registry::StopRegistry,
    segment::{Leg, SegmentGraph},
};

/// Groups pattern rows into one ordered stop sequence per route and direction.
///
/// With a direction column, rows are grouped by its value. Without one, a new
/// group starts whenever a route's sequence number does not strictly increase
/// over the route's previous row; the groups of a route are numbered 0, 1, 2, ...
/// in order of appearance. Rows referencing unknown stops are reported and
/// dropped, patterns left with fewer than two stops are discarded.
pub fn build_patterns(
    rows: Vec<PatternRow>,
    has_direction_column: bool,
    registry: &StopRegistry,
    errors: &mut Vec<RowError>,
) -> IndexMap<PatternKey, Pattern> {
    let mut groups: IndexMap<PatternKey, Vec<(PatternRow, &Stop)>> = IndexMap::new();
    let mut last_sequence: HashMap<RouteId, (i64, DirectionId)> = HashMap::new();

    for row in rows {
        let direction_id = if has_direction_column {
            row.direction
                .as_deref()
                .and_then(parse_direction)
                .unwrap_or(0)
        } else {
            // a sequence reset starts the next direction, whether or not the stop resolves
            let direction_id = match last_sequence.get(&row.route_id) {
                Some((previous, direction_id)) if row.sequence <= *previous => direction_id + 1,
                Some((_, direction_id)) => *direction_id,
                None => 0,
            };
            last_sequence.insert(row.route_id.clone(), (row.sequence, direction_id));
            direction_id
        };
        let stop = match registry.resolve(&row.stop_ref) {
            Ok(stop) => stop,
            Err(why) => {
                log::warn!("patterns row {} skipped: {}", row.row, why);
                errors.push(why.at(Some(row.row), SourceFile::Patterns));
                continue;
            }
        };
        groups
            .entry(PatternKey::new(row.route_id.clone(), direction_id))
            .or_default()
            .push((row, stop));
    }

    let mut patterns = IndexMap::new();
    for (key, mut rows) in groups {
        rows.sort_by_key(|(row, _)| row.sequence);
        let stops = rows
            .iter()
            .map(|(row, stop)| PatternStop::new(stop, row))
            .dedup_by(|a, b| a.stop_id == b.stop_id)
            .collect::<Vec<_>>();
        if stops.len() < 2 {
            log::warn!(
                "discarding pattern of route '{}' direction {}: fewer than two stops",
                key.route_id,
                key.direction_id
            );
            continue;
        }
        patterns.insert(
            key.clone(),
            Pattern {
                route_id: key.route_id,
                direction_id: key.direction_id,
                stops,
            },
        );
    }
    log::info!("built {} patterns", patterns.len());
    patterns
}

/// A pattern together with the segment traversed by each consecutive stop pair,
/// `legs[i]` connecting `stops[i]` and `stops[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    pub pattern: Pattern,
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: IndexMap<PatternKey, RoutePattern>,
}

impl PatternSet {
    /// Registers the segments of every pattern with the graph. A pattern whose
    /// segments can not be built is reported and left out.
    pub fn connect(
        patterns: IndexMap<PatternKey, Pattern>,
        graph: &mut SegmentGraph,
        errors: &mut Vec<RowError>,
    ) -> Self {
        let mut connected = IndexMap::new();
        for (key, pattern) in patterns {
            match graph.connect_pattern(&pattern) {
                Ok(legs) => {
                    connected.insert(key, RoutePattern { pattern, legs });
                }
                Err(why) => {
                    log::warn!(
                        "pattern of route '{}' direction {} skipped: {}",
                        key.route_id,
                        key.direction_id,
                        why
                    );
                    errors.push(why.at(None, SourceFile::Patterns));
                }
            }
        }
        log::info!("connected {} patterns with {} segments", connected.len(), graph.len());
        Self {
            patterns: connected,
        }
    }

    /// Patterns of one route in input order.
    pub fn for_route(&self, route_id: &str) -> impl Iterator<Item = &RoutePattern> {
        let route_id = route_id.to_owned();
        self.patterns
            .values()
            .filter(move |route_pattern| route_pattern.pattern.route_id == route_id)
    }

    pub fn get(&self, key: &PatternKey) -> Option<&RoutePattern> {
        self.patterns.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoutePattern> {
        self.patterns.values()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
