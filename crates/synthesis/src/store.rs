use std::{collections::BTreeMap, error::Error, fmt};

use model::{
    pattern::{Pattern, PatternKey},
    segment::Segment,
    slot::SegmentTimetable,
    stop::Stop,
    trip::{StopVisit, Trip},
};
use utility::id::Id;

use crate::result::SynthesisResult;

pub trait WithPrimaryKey<K> {
    fn primary_key(&self) -> K;
}

impl WithPrimaryKey<Id<Stop>> for Stop {
    fn primary_key(&self) -> Id<Stop> {
        self.id.clone()
    }
}

impl WithPrimaryKey<PatternKey> for Pattern {
    fn primary_key(&self) -> PatternKey {
        self.key()
    }
}

/// Segments are identified by their unordered stop pair, not by their id.
impl WithPrimaryKey<(Id<Stop>, Id<Stop>)> for Segment {
    fn primary_key(&self) -> (Id<Stop>, Id<Stop>) {
        self.pair_key()
    }
}

impl WithPrimaryKey<Id<Segment>> for SegmentTimetable {
    fn primary_key(&self) -> Id<Segment> {
        self.segment_id.clone()
    }
}

impl WithPrimaryKey<Id<Trip>> for Trip {
    fn primary_key(&self) -> Id<Trip> {
        self.id.clone()
    }
}

impl WithPrimaryKey<(Id<Trip>, u32)> for StopVisit {
    fn primary_key(&self) -> (Id<Trip>, u32) {
        (self.trip_id.clone(), self.sequence)
    }
}

pub trait PrimaryKeyTable<K, V>
where
    V: WithPrimaryKey<K>,
{
    fn get(&self, key: &K) -> Option<V>;

    fn get_all(&self) -> Vec<V>;

    /// Inserts or replaces, returning the replaced row.
    fn insert(&mut self, value: V) -> Option<V>;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rows kept in key order, so snapshots of equal content are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryPrimaryKeyTable<K, V> {
    map: BTreeMap<K, V>,
}

impl<K, V> Default for InMemoryPrimaryKeyTable<K, V> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<K, V> InMemoryPrimaryKeyTable<K, V>
where
    K: Ord,
    V: WithPrimaryKey<K>,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<V>) -> Self {
        let mut map = BTreeMap::<K, V>::new();
        for row in rows {
            map.insert(row.primary_key(), row);
        }
        Self { map }
    }

    pub fn keys_where<F>(&self, predicate: F) -> Vec<K>
    where
        K: Clone,
        F: Fn(&V) -> bool,
    {
        self.map
            .iter()
            .filter(|(_, value)| predicate(value))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<K, V> PrimaryKeyTable<K, V> for InMemoryPrimaryKeyTable<K, V>
where
    K: Ord,
    K: fmt::Debug,
    V: Clone,
    V: WithPrimaryKey<K>,
{
    fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).cloned()
    }

    fn get_all(&self) -> Vec<V> {
        self.map.values().cloned().collect::<Vec<_>>()
    }

    fn insert(&mut self, value: V) -> Option<V> {
        let key = value.primary_key();
        log::trace!("upsert with key: {:?}", key);
        self.map.insert(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.map.remove(key)
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A row of the committed result refers to a row that exists neither in the
    /// result nor in the store.
    DanglingReference {
        table: &'static str,
        key: String,
        missing: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingReference {
                table,
                key,
                missing,
            } => write!(f, "{} row '{}' refers to missing '{}'", table, key, missing),
        }
    }
}

impl Error for StoreError {}

/// Rows written and rows replaced by one commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    pub inserted: usize,
    pub replaced: usize,
}

impl CommitSummary {
    fn count<V>(&mut self, previous: Option<V>) {
        match previous {
            Some(_) => self.replaced += 1,
            None => self.inserted += 1,
        }
    }
}

/// Durable side of a run. A commit applies a whole result or nothing; rows of
/// the result replace stored rows with the same identity.
pub trait ScheduleStore {
    fn commit(&mut self, result: &SynthesisResult) -> Result<CommitSummary, StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleTables {
    pub stops: InMemoryPrimaryKeyTable<Id<Stop>, Stop>,
    pub patterns: InMemoryPrimaryKeyTable<PatternKey, Pattern>,
    pub segments: InMemoryPrimaryKeyTable<(Id<Stop>, Id<Stop>), Segment>,
    pub timetables: InMemoryPrimaryKeyTable<Id<Segment>, SegmentTimetable>,
    pub trips: InMemoryPrimaryKeyTable<Id<Trip>, Trip>,
    pub stop_visits: InMemoryPrimaryKeyTable<(Id<Trip>, u32), StopVisit>,
}

impl ScheduleTables {
    fn apply(&mut self, result: &SynthesisResult) -> CommitSummary {
        let mut summary = CommitSummary::default();
        for stop in &result.stops {
            summary.count(self.stops.insert(stop.clone()));
        }
        for pattern in &result.patterns {
            summary.count(self.patterns.insert(pattern.clone()));
        }
        for segment in &result.segments {
            let previous = self.segments.insert(segment.clone());
            // a segment rediscovered in the other orientation gets a new id
            if let Some(stale) = previous.as_ref().filter(|stale| stale.id != segment.id) {
                self.timetables.remove(&stale.id);
            }
            summary.count(previous);
        }
        for timetable in &result.timetables {
            summary.count(self.timetables.insert(timetable.clone()));
        }
        for trip in &result.trips {
            let stale_visits = self
                .stop_visits
                .keys_where(|visit| visit.trip_id == trip.id);
            for key in stale_visits {
                self.stop_visits.remove(&key);
            }
            summary.count(self.trips.insert(trip.clone()));
        }
        for visit in &result.stop_visits {
            summary.count(self.stop_visits.insert(visit.clone()));
        }
        summary
    }

    fn validate(&self, result: &SynthesisResult) -> Result<(), StoreError> {
        let segment_ids = self
            .segments
            .get_all()
            .into_iter()
            .map(|segment| segment.id)
            .collect::<Vec<_>>();
        for trip in &result.trips {
            for traversal in &trip.traversals {
                if !segment_ids.contains(&traversal.segment_id) {
                    return Err(StoreError::DanglingReference {
                        table: "trips",
                        key: trip.id.to_string(),
                        missing: traversal.segment_id.to_string(),
                    });
                }
            }
        }
        for visit in &result.stop_visits {
            if self.trips.get(&visit.trip_id).is_none() {
                return Err(StoreError::DanglingReference {
                    table: "stop_visits",
                    key: format!("{}#{}", visit.trip_id, visit.sequence),
                    missing: visit.trip_id.to_string(),
                });
            }
            if self.stops.get(&visit.stop_id).is_none() {
                return Err(StoreError::DanglingReference {
                    table: "stop_visits",
                    key: format!("{}#{}", visit.trip_id, visit.sequence),
                    missing: visit.stop_id.to_string(),
                });
            }
        }
        for timetable in &result.timetables {
            if !segment_ids.contains(&timetable.segment_id) {
                return Err(StoreError::DanglingReference {
                    table: "timetables",
                    key: timetable.segment_id.to_string(),
                    missing: timetable.segment_id.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Stages every commit on a copy of the tables and swaps it in once the copy
/// is consistent.
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    tables: ScheduleTables,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &ScheduleTables {
        &self.tables
    }

    /// All stored rows in key order, stop visits ordered by trip and sequence.
    pub fn snapshot(&self) -> SynthesisResult {
        SynthesisResult {
            stops: self.tables.stops.get_all(),
            patterns: self.tables.patterns.get_all(),
            segments: self.tables.segments.get_all(),
            timetables: self.tables.timetables.get_all(),
            trips: self.tables.trips.get_all(),
            stop_visits: self.tables.stop_visits.get_all(),
        }
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn commit(&mut self, result: &SynthesisResult) -> Result<CommitSummary, StoreError> {
        let mut staged = self.tables.clone();
        let summary = staged.apply(result);
        staged.validate(result)?;
        self.tables = staged;
        log::info!(
            "committed {} new and {} replaced rows",
            summary.inserted,
            summary.replaced
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use model::{
        itinerary::EventKind,
        segment::{SegmentKind, SegmentTraversal},
    };
    use utility::geo::Coordinate;

    use super::*;

    fn stop(code: &str) -> Stop {
        Stop {
            id: Id::new(code.to_owned()),
            code: code.to_owned(),
            name: code.to_owned(),
            location: Coordinate::new(0.0, 0.0),
            kind: None,
        }
    }

    fn segment(start: &str, end: &str) -> Segment {
        let (start, end) = (Id::new(start.to_owned()), Id::new(end.to_owned()));
        Segment {
            id: Segment::id_for(&start, &end),
            start_stop_id: start,
            end_stop_id: end,
            distance_meters: 100.0,
            geometry: vec![],
            kind: SegmentKind::Revenue,
        }
    }

    fn visit(trip: &str, stop: &str, sequence: u32, arrival: i64) -> StopVisit {
        StopVisit {
            trip_id: Id::new(trip.to_owned()),
            stop_id: Id::new(stop.to_owned()),
            sequence,
            arrival_time: Duration::seconds(arrival),
            departure_time: Duration::seconds(arrival),
            distance_traveled_km: sequence as f64,
        }
    }

    fn result(visits: Vec<StopVisit>) -> SynthesisResult {
        SynthesisResult {
            stops: vec![stop("A"), stop("B"), stop("C")],
            patterns: vec![],
            segments: vec![segment("A", "B"), segment("B", "C")],
            timetables: vec![],
            trips: vec![Trip {
                id: Id::new("T1".to_owned()),
                route_id: Some("R1".to_owned()),
                service_id: "WD".to_owned(),
                direction_id: 0,
                kind: EventKind::Revenue,
                block_id: None,
                traversals: vec![SegmentTraversal {
                    segment_id: Id::new("A-B".to_owned()),
                    reversed: false,
                }],
            }],
            stop_visits: visits,
        }
    }

    #[test]
    fn recommit_replaces_visits_of_trip() {
        let mut store = InMemoryScheduleStore::new();
        store
            .commit(&result(vec![
                visit("T1", "A", 1, 100),
                visit("T1", "B", 2, 200),
                visit("T1", "C", 3, 300),
            ]))
            .unwrap();
        let summary = store
            .commit(&result(vec![visit("T1", "A", 1, 150), visit("T1", "B", 2, 250)]))
            .unwrap();
        assert_eq!(summary.inserted, 2);
        let visits = store.snapshot().stop_visits;
        assert_eq!(visits.len(), 2);
        assert_eq!(visits[1].arrival_time.num_seconds(), 250);
    }

    #[test]
    fn reversed_segment_replaces_by_pair() {
        let mut store = InMemoryScheduleStore::new();
        store.commit(&result(vec![])).unwrap();
        let mut rerun = result(vec![]);
        rerun.segments = vec![segment("B", "A"), segment("C", "B")];
        rerun.trips[0].traversals[0].segment_id = Id::new("B-A".to_owned());
        store.commit(&rerun).unwrap();
        let segments = store.snapshot().segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id.raw(), "B-A");
    }

    #[test]
    fn failed_commit_leaves_store_untouched() {
        let mut store = InMemoryScheduleStore::new();
        store.commit(&result(vec![visit("T1", "A", 1, 100)])).unwrap();
        let before = store.snapshot();

        let mut broken = result(vec![visit("T1", "Z", 1, 100)]);
        broken.stops.clear();
        let error = store.commit(&broken).unwrap_err();
        assert_eq!(
            error,
            StoreError::DanglingReference {
                table: "stop_visits",
                key: "T1#1".to_owned(),
                missing: "Z".to_owned(),
            }
        );
        assert_eq!(store.snapshot(), before);
    }
}
