use std::collections::BTreeMap;

use chrono::Duration;
use indexmap::IndexMap;
use itertools::Itertools;
use model::{
    segment::Segment,
    slot::{SegmentTimeSlot, SegmentTimetable, TimeSlotObservation},
};
use utility::{id::Id, time::SECONDS_PER_DAY};

use crate::config::SynthesisConfig;

/// Collects observations per segment over a whole run.
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    by_segment: IndexMap<Id<Segment>, Vec<TimeSlotObservation>>,
}

impl ObservationLog {
    pub fn record(&mut self, observation: TimeSlotObservation) {
        self.by_segment
            .entry(observation.segment_id.clone())
            .or_default()
            .push(observation);
    }

    pub fn len(&self) -> usize {
        self.by_segment.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_segment.is_empty()
    }

    /// Compresses the observations of every segment, consuming the log.
    pub fn compress_all(self, config: &SynthesisConfig) -> Vec<SegmentTimetable> {
        self.by_segment
            .into_iter()
            .filter_map(|(segment_id, observations)| compress(segment_id, &observations, config))
            .collect()
    }
}

/// Folds a time at or past the end of the extended day back by the fewest whole
/// days that bring it below the end.
fn fold_into_day(time_of_day_seconds: i64, day_end: i64) -> i64 {
    let time = time_of_day_seconds.max(0);
    let limit = day_end.max(SECONDS_PER_DAY);
    if time < limit {
        return time;
    }
    time - ((time - limit) / SECONDS_PER_DAY + 1) * SECONDS_PER_DAY
}

/// Median of the distinct values, averaging and rounding the two middle ones
/// for an even count.
pub fn median_of_distinct(durations: impl IntoIterator<Item = i64>) -> Option<i64> {
    let distinct = durations.into_iter().sorted().dedup().collect::<Vec<_>>();
    if distinct.is_empty() {
        return None;
    }
    let middle = distinct.len() / 2;
    if distinct.len() % 2 == 1 {
        Some(distinct[middle])
    } else {
        Some(((distinct[middle - 1] + distinct[middle]) as f64 / 2.0).round() as i64)
    }
}

/// Turns the raw observations of one segment into consecutive bands of equal
/// travel time, the last one closing at the end of the extended day.
///
/// Of two observations at the same time the longer one is kept. Returns `None`
/// when no observation has a positive duration.
pub fn compress(
    segment_id: Id<Segment>,
    observations: &[TimeSlotObservation],
    config: &SynthesisConfig,
) -> Option<SegmentTimetable> {
    let day_end = config.extended_day_end_seconds;
    let mut longest: BTreeMap<i64, i64> = BTreeMap::new();
    for observation in observations
        .iter()
        .filter(|observation| observation.duration_seconds > 0)
    {
        let time = fold_into_day(observation.time_of_day_seconds, day_end);
        let entry = longest.entry(time).or_insert(observation.duration_seconds);
        *entry = (*entry).max(observation.duration_seconds);
    }

    let base_travel_time_seconds = median_of_distinct(
        observations
            .iter()
            .map(|observation| observation.duration_seconds)
            .filter(|duration| *duration > 0),
    )?;

    let slot = |start: i64, end: i64, travel_time_seconds: i64| SegmentTimeSlot {
        segment_id: segment_id.clone(),
        start_time: Duration::seconds(start),
        end_time: Duration::seconds(end),
        travel_time_seconds,
    };

    let mut slots = vec![];
    let mut samples = longest.into_iter();
    let (mut start, mut current) = samples.next()?;
    if config.leading_slot && start > 0 {
        slots.push(slot(0, start, base_travel_time_seconds));
    }
    for (time, duration) in samples {
        if duration != current {
            slots.push(slot(start, time, current));
            start = time;
            current = duration;
        }
    }
    slots.push(slot(start, day_end.max(start + 1), current));

    Some(SegmentTimetable {
        segment_id,
        base_travel_time_seconds,
        slots,
    })
}
