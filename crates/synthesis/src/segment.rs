use std::collections::HashMap;

use indexmap::IndexMap;
use itertools::Itertools;
use model::{
    pattern::{Pattern, PatternStop},
    segment::{Segment, SegmentKind, SegmentTraversal},
    stop::Stop,
};
use utility::{geo::straight_line, id::Id};

use crate::{error::SynthesisError, registry::StopRegistry, routing::RoutingProvider};

/// One step of a trip or pattern: the segment used, in which orientation, and
/// the routing metadata known for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub traversal: SegmentTraversal,
    pub distance_meters: f64,
    /// Travel time reported by the routing provider, if any.
    pub duration_seconds: Option<i64>,
}

/// Deduplicated set of segments of one run. Each unordered stop pair maps to
/// exactly one segment, no matter how often or in which direction it is used.
pub struct SegmentGraph<'a> {
    registry: &'a StopRegistry,
    provider: &'a dyn RoutingProvider,
    segments: IndexMap<Id<Segment>, Segment>,
    by_endpoints: HashMap<(Id<Stop>, Id<Stop>), Id<Segment>>,
    routed_durations: HashMap<Id<Segment>, i64>,
}

impl<'a> SegmentGraph<'a> {
    pub fn new(registry: &'a StopRegistry, provider: &'a dyn RoutingProvider) -> Self {
        Self {
            registry,
            provider,
            segments: IndexMap::new(),
            by_endpoints: HashMap::new(),
            routed_durations: HashMap::new(),
        }
    }

    /// Returns the segment between two stops, creating it on first use.
    ///
    /// An explicit distance takes precedence over the routing provider, which
    /// takes precedence over the great-circle distance. Requesting a revenue
    /// segment upgrades an existing empty one.
    pub fn get_or_create(
        &mut self,
        from: &Id<Stop>,
        to: &Id<Stop>,
        distance_meters: Option<f64>,
        kind: SegmentKind,
    ) -> Result<Leg, SynthesisError> {
        if from == to {
            return Err(SynthesisError::SameOriginAndDestination {
                reference: from.to_string(),
            });
        }
        if let Some(id) = self.by_endpoints.get(&(from.clone(), to.clone())).cloned() {
            return Ok(self.leg(id, false, kind));
        }
        if let Some(id) = self.by_endpoints.get(&(to.clone(), from.clone())).cloned() {
            return Ok(self.leg(id, true, kind));
        }

        let from_stop = self.stop(from)?;
        let to_stop = self.stop(to)?;
        let routed = self.provider.route(from_stop, to_stop);
        let distance_meters = distance_meters
            .or_else(|| routed.as_ref().map(|leg| leg.distance_meters))
            .unwrap_or_else(|| from_stop.distance_meters_to(to_stop));
        let geometry = match &routed {
            Some(leg) if leg.geometry.len() >= 2 => leg.geometry.clone(),
            _ => straight_line(from_stop.location, to_stop.location),
        };

        let id = self.unused_id(Segment::id_for(from, to));
        if let Some(duration) = routed.and_then(|leg| leg.duration_seconds) {
            self.routed_durations.insert(id.clone(), duration);
        }
        log::debug!("new {:?} segment {} ({:.0} m)", kind, id, distance_meters);
        self.segments.insert(
            id.clone(),
            Segment {
                id: id.clone(),
                start_stop_id: from.clone(),
                end_stop_id: to.clone(),
                distance_meters,
                geometry,
                kind,
            },
        );
        self.by_endpoints.insert((from.clone(), to.clone()), id.clone());
        Ok(self.leg(id, false, kind))
    }

    /// Links every consecutive stop pair of a pattern.
    pub fn connect_pattern(&mut self, pattern: &Pattern) -> Result<Vec<Leg>, SynthesisError> {
        pattern
            .stops
            .iter()
            .tuple_windows()
            .map(|(previous, next)| {
                self.get_or_create(
                    &previous.stop_id,
                    &next.stop_id,
                    explicit_distance_meters(previous, next),
                    SegmentKind::Revenue,
                )
            })
            .collect()
    }

    pub fn get(&self, id: &Id<Segment>) -> Option<&Segment> {
        self.segments.get(id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments.into_values().collect()
    }

    fn stop(&self, id: &Id<Stop>) -> Result<&'a Stop, SynthesisError> {
        let registry: &'a StopRegistry = self.registry;
        registry
            .get(id)
            .ok_or_else(|| SynthesisError::UnknownStopReference {
                reference: id.to_string(),
            })
    }

    fn leg(&mut self, id: Id<Segment>, reversed: bool, kind: SegmentKind) -> Leg {
        let duration_seconds = self.routed_durations.get(&id).copied();
        let distance_meters = match self.segments.get_mut(&id) {
            Some(segment) => {
                if kind == SegmentKind::Revenue && segment.kind == SegmentKind::Empty {
                    log::debug!("segment {} upgraded to revenue", id);
                    segment.kind = SegmentKind::Revenue;
                }
                segment.distance_meters
            }
            None => 0.0,
        };
        Leg {
            traversal: SegmentTraversal {
                segment_id: id,
                reversed,
            },
            distance_meters,
            duration_seconds,
        }
    }

    /// Stop codes may contain the separator, so "A-B" + "C" and "A" + "B-C"
    /// would otherwise share an id.
    fn unused_id(&self, id: Id<Segment>) -> Id<Segment> {
        if !self.segments.contains_key(&id) {
            return id;
        }
        (2..)
            .map(|n| Id::new(format!("{}#{}", id, n)))
            .find(|candidate| !self.segments.contains_key(candidate))
            .unwrap_or(id)
    }
}

/// Distance of a pattern leg given by the pattern table itself: the difference
/// of accumulated distances if positive, otherwise the leg distance of the
/// arriving row if positive.
fn explicit_distance_meters(previous: &PatternStop, next: &PatternStop) -> Option<f64> {
    previous
        .accumulated_distance_km
        .zip(next.accumulated_distance_km)
        .map(|(from, to)| to - from)
        .filter(|km| *km > 0.0)
        .or_else(|| next.leg_distance_km.filter(|km| *km > 0.0))
        .map(|km| km * 1000.0)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use model::pattern::PatternRow;
    use utility::geo::Coordinate;

    use super::*;
    use crate::{
        registry::tests::stop_row,
        routing::{NoRouting, RoutedLeg},
    };

    fn registry() -> StopRegistry {
        let mut errors = vec![];
        StopRegistry::build(
            vec![
                stop_row(1, "A", "Alameda", 0.0, 0.00),
                stop_row(2, "B", "Baquedano", 0.0, 0.01),
                stop_row(3, "C", "Cumming", 0.0, 0.02),
            ],
            &mut errors,
        )
    }

    fn id(code: &str) -> Id<Stop> {
        Id::new(code.to_owned())
    }

    struct FixedRouting;

    impl RoutingProvider for FixedRouting {
        fn route(&self, from: &Stop, to: &Stop) -> Option<RoutedLeg> {
            Some(RoutedLeg {
                distance_meters: 1500.0,
                duration_seconds: Some(240),
                geometry: vec![
                    from.location,
                    Coordinate::new(0.001, 0.005),
                    to.location,
                ],
            })
        }
    }

    #[test]
    fn deduplicates_by_unordered_pair() {
        let registry = registry();
        let mut graph = SegmentGraph::new(&registry, &NoRouting);
        let forward = graph
            .get_or_create(&id("A"), &id("B"), None, SegmentKind::Revenue)
            .unwrap();
        let backward = graph
            .get_or_create(&id("B"), &id("A"), None, SegmentKind::Revenue)
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(forward.traversal.segment_id.raw(), "A-B");
        assert_eq!(backward.traversal.segment_id, forward.traversal.segment_id);
        assert!(!forward.traversal.reversed);
        assert!(backward.traversal.reversed);
        assert_relative_eq!(forward.distance_meters, 1111.95, epsilon = 0.1);
        assert_eq!(forward.duration_seconds, None);
    }

    #[test]
    fn explicit_distance_wins_over_provider() {
        let registry = registry();
        let mut graph = SegmentGraph::new(&registry, &FixedRouting);
        let explicit = graph
            .get_or_create(&id("A"), &id("B"), Some(900.0), SegmentKind::Revenue)
            .unwrap();
        let routed = graph
            .get_or_create(&id("B"), &id("C"), None, SegmentKind::Revenue)
            .unwrap();
        assert_eq!(explicit.distance_meters, 900.0);
        assert_eq!(explicit.duration_seconds, Some(240));
        assert_eq!(routed.distance_meters, 1500.0);
        let segment = graph.get(&routed.traversal.segment_id).unwrap();
        assert_eq!(segment.geometry.len(), 3);
    }

    #[test]
    fn revenue_use_upgrades_empty_segment() {
        let registry = registry();
        let mut graph = SegmentGraph::new(&registry, &NoRouting);
        let leg = graph
            .get_or_create(&id("A"), &id("C"), None, SegmentKind::Empty)
            .unwrap();
        assert_eq!(
            graph.get(&leg.traversal.segment_id).unwrap().kind,
            SegmentKind::Empty
        );
        graph
            .get_or_create(&id("C"), &id("A"), None, SegmentKind::Revenue)
            .unwrap();
        graph
            .get_or_create(&id("A"), &id("C"), None, SegmentKind::Empty)
            .unwrap();
        assert_eq!(
            graph.get(&leg.traversal.segment_id).unwrap().kind,
            SegmentKind::Revenue
        );
    }

    #[test]
    fn rejects_loops_and_unknown_stops() {
        let registry = registry();
        let mut graph = SegmentGraph::new(&registry, &NoRouting);
        assert!(matches!(
            graph.get_or_create(&id("A"), &id("A"), None, SegmentKind::Revenue),
            Err(SynthesisError::SameOriginAndDestination { .. })
        ));
        assert!(matches!(
            graph.get_or_create(&id("A"), &id("Z"), None, SegmentKind::Revenue),
            Err(SynthesisError::UnknownStopReference { .. })
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn pattern_distances_follow_table_columns() {
        let registry = registry();
        let stop = |code: &str, accumulated: Option<f64>, leg: Option<f64>| {
            let row = PatternRow {
                row: 1,
                route_id: "R1".to_owned(),
                direction: None,
                sequence: 1,
                stop_ref: code.to_owned(),
                accumulated_distance_km: accumulated,
                leg_distance_km: leg,
            };
            PatternStop::new(registry.resolve(code).unwrap(), &row)
        };
        let pattern = Pattern {
            route_id: "R1".to_owned(),
            direction_id: 0,
            stops: vec![
                stop("A", Some(0.0), None),
                stop("B", Some(0.8), Some(5.0)),
                stop("C", Some(0.8), Some(0.6)),
            ],
        };
        let mut graph = SegmentGraph::new(&registry, &NoRouting);
        let legs = graph.connect_pattern(&pattern).unwrap();
        assert_eq!(legs.len(), 2);
        assert_relative_eq!(legs[0].distance_meters, 800.0, epsilon = 1e-9);
        assert_relative_eq!(legs[1].distance_meters, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn colliding_ids_get_suffix() {
        let mut errors = vec![];
        let registry = StopRegistry::build(
            vec![
                stop_row(1, "A-B", "x", 0.0, 0.0),
                stop_row(2, "C", "y", 0.0, 0.01),
                stop_row(3, "A", "z", 0.0, 0.02),
                stop_row(4, "B-C", "w", 0.0, 0.03),
            ],
            &mut errors,
        );
        let mut graph = SegmentGraph::new(&registry, &NoRouting);
        let first = graph
            .get_or_create(&id("A-B"), &id("C"), None, SegmentKind::Revenue)
            .unwrap();
        let second = graph
            .get_or_create(&id("A"), &id("B-C"), None, SegmentKind::Revenue)
            .unwrap();
        assert_eq!(first.traversal.segment_id.raw(), "A-B-C");
        assert_eq!(second.traversal.segment_id.raw(), "A-B-C#2");
    }
}
