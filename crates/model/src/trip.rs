use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::id::{HasId, Id};
use utility::serde::duration;

use crate::{
    itinerary::EventKind, segment::SegmentTraversal, stop::Stop, DirectionId, RouteId,
    ServiceId,
};

/// A trip reconstructed from one itinerary event.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Id<Trip>,
    pub route_id: Option<RouteId>,
    pub service_id: ServiceId,
    pub direction_id: DirectionId,
    pub kind: EventKind,
    pub block_id: Option<String>,
    /// Segments in travel order, used to derive the trip's shape.
    pub traversals: Vec<SegmentTraversal>,
}

impl HasId for Trip {
    type IdType = String;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StopVisit {
    pub trip_id: Id<Trip>,
    pub stop_id: Id<Stop>,

    /// 1-based position within the trip.
    pub sequence: u32,

    /// arrival time as a duration since midnight. this is because
    /// times greater than 24:00:00 are allowed to represent a time at the next day.
    #[serde(with = "duration")]
    #[schemars(schema_with = "duration::schema")]
    pub arrival_time: Duration,

    /// departure time as a duration since midnight, see `arrival_time`.
    #[serde(with = "duration")]
    #[schemars(schema_with = "duration::schema")]
    pub departure_time: Duration,

    /// Strictly increasing along the trip.
    pub distance_traveled_km: f64,
}
