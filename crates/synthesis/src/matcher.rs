use model::{pattern::PatternStop, DirectionId};

use crate::{
    error::SynthesisError,
    pattern::{PatternSet, RoutePattern},
    segment::Leg,
};

/// The contiguous part of a pattern an event travels, from `origin` to
/// `destination` inclusive.
#[derive(Debug, Clone, Copy)]
pub struct SubPattern<'a> {
    pub route_pattern: &'a RoutePattern,
    pub origin: usize,
    pub destination: usize,
}

impl<'a> SubPattern<'a> {
    pub fn direction_id(&self) -> DirectionId {
        self.route_pattern.pattern.direction_id
    }

    pub fn stops(&self) -> &'a [PatternStop] {
        &self.route_pattern.pattern.stops[self.origin..=self.destination]
    }

    pub fn legs(&self) -> &'a [Leg] {
        &self.route_pattern.legs[self.origin..self.destination]
    }
}

/// First position whose stop has the referenced code, or failing that, the
/// referenced name.
pub fn locate(stops: &[PatternStop], reference: &str) -> Option<usize> {
    stops
        .iter()
        .position(|stop| stop.code == reference)
        .or_else(|| stops.iter().position(|stop| stop.name == reference))
}

/// Finds the first pattern of `route_id` whose first visit of the origin comes
/// before its first visit of the destination. Patterns in the hinted direction
/// are tried exclusively if the route has any.
pub fn match_event<'a>(
    patterns: &'a PatternSet,
    route_id: &str,
    origin_ref: &str,
    destination_ref: &str,
    direction_hint: Option<DirectionId>,
) -> Result<SubPattern<'a>, SynthesisError> {
    let mut candidates = patterns.for_route(route_id).collect::<Vec<_>>();
    if candidates.is_empty() {
        return Err(SynthesisError::PatternNotFound {
            route_id: route_id.to_owned(),
        });
    }
    if let Some(hint) = direction_hint {
        if candidates
            .iter()
            .any(|candidate| candidate.pattern.direction_id == hint)
        {
            candidates.retain(|candidate| candidate.pattern.direction_id == hint);
        }
    }

    candidates
        .into_iter()
        .find_map(|route_pattern| {
            let stops = &route_pattern.pattern.stops;
            let origin = locate(stops, origin_ref)?;
            let destination = locate(stops, destination_ref)?;
            (origin < destination).then_some(SubPattern {
                route_pattern,
                origin,
                destination,
            })
        })
        .ok_or_else(|| SynthesisError::StopPairNotFound {
            route_id: route_id.to_owned(),
            origin: origin_ref.to_owned(),
            destination: destination_ref.to_owned(),
        })
}
