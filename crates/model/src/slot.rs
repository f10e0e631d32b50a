use chrono::Duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{id::Id, serde::duration};

use crate::segment::Segment;

/// One raw travel time sample of a segment, contributed by one leg of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotObservation {
    pub segment_id: Id<Segment>,
    pub time_of_day_seconds: i64,
    pub duration_seconds: i64,
}

/// A band of the operating day during which the travel time of a segment is
/// treated as constant. The end is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTimeSlot {
    pub segment_id: Id<Segment>,
    #[serde(with = "duration")]
    #[schemars(schema_with = "duration::schema")]
    pub start_time: Duration,
    #[serde(with = "duration")]
    #[schemars(schema_with = "duration::schema")]
    pub end_time: Duration,
    pub travel_time_seconds: i64,
}

/// All slots of one segment together with its representative travel time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTimetable {
    pub segment_id: Id<Segment>,
    pub base_travel_time_seconds: i64,
    pub slots: Vec<SegmentTimeSlot>,
}

impl SegmentTimetable {
    /// Travel time in effect at the given time of day. Times before the first
    /// band fall back to the base travel time.
    pub fn travel_time_at(&self, time_of_day_seconds: i64) -> i64 {
        self.slots
            .iter()
            .find(|slot| {
                slot.start_time.num_seconds() <= time_of_day_seconds
                    && time_of_day_seconds < slot.end_time.num_seconds()
            })
            .map(|slot| slot.travel_time_seconds)
            .unwrap_or(self.base_travel_time_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: i64, end: i64, travel_time_seconds: i64) -> SegmentTimeSlot {
        SegmentTimeSlot {
            segment_id: Id::new("A-B".to_owned()),
            start_time: Duration::seconds(start),
            end_time: Duration::seconds(end),
            travel_time_seconds,
        }
    }

    #[test]
    fn looks_up_band_or_base() {
        let timetable = SegmentTimetable {
            segment_id: Id::new("A-B".to_owned()),
            base_travel_time_seconds: 900,
            slots: vec![slot(3600, 7200, 1200), slot(7200, 129_600, 600)],
        };
        assert_eq!(timetable.travel_time_at(0), 900);
        assert_eq!(timetable.travel_time_at(3600), 1200);
        assert_eq!(timetable.travel_time_at(7199), 1200);
        assert_eq!(timetable.travel_time_at(7200), 600);
    }

    #[test]
    fn serializes_slot_times_as_clock_strings() {
        let json = serde_json::to_value(slot(7200, 129_600, 600)).unwrap();
        assert_eq!(json["startTime"], "02:00:00");
        assert_eq!(json["endTime"], "36:00:00");
        assert_eq!(json["travelTimeSeconds"], 600);
    }
}
