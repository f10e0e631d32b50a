use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::serde::duration;

use crate::{DirectionId, RouteId, ServiceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Passenger carrying service.
    Revenue,
    /// Empty repositioning, e.g. from the depot to the first stop.
    Deadhead,
}

impl EventKind {
    /// Reads the event column, where `1` is revenue and `0` is deadhead.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "1" | "revenue" | "service" => Some(Self::Revenue),
            "0" | "deadhead" | "empty" => Some(Self::Deadhead),
            _ => None,
        }
    }

    pub fn is_revenue(self) -> bool {
        matches!(self, Self::Revenue)
    }
}

/// One observation of a vehicle moving from one referenced stop to another.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEvent {
    pub row: usize,
    pub route_id: Option<RouteId>,
    pub service_id: ServiceId,
    pub kind: EventKind,
    pub origin_ref: String,
    pub destination_ref: String,

    /// Clock time the vehicle leaves the origin, measured from the start of the
    /// service day.
    #[serde(with = "duration")]
    pub start_time: Duration,

    #[serde(
        default,
        serialize_with = "duration::serialize_option",
        deserialize_with = "duration::deserialize_option"
    )]
    pub end_time: Option<Duration>,

    /// Explicit travel time, used when there is no end time.
    #[serde(
        default,
        serialize_with = "duration::serialize_option",
        deserialize_with = "duration::deserialize_option"
    )]
    pub duration: Option<Duration>,

    pub direction_hint: Option<DirectionId>,
    pub block_ref: Option<String>,
    pub trip_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_event_column() {
        assert_eq!(EventKind::parse("1"), Some(EventKind::Revenue));
        assert_eq!(EventKind::parse(" 0 "), Some(EventKind::Deadhead));
        assert_eq!(EventKind::parse("Deadhead"), Some(EventKind::Deadhead));
        assert_eq!(EventKind::parse("2"), None);
    }
}
