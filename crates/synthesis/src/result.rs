use model::{
    pattern::Pattern,
    report::{RowError, SourceFile},
    segment::Segment,
    slot::SegmentTimetable,
    stop::Stop,
    trip::{StopVisit, Trip},
};
use serde::{Deserialize, Serialize};
use utility::id::Id;

/// Everything a run produces, staged in memory until a store commits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub stops: Vec<Stop>,
    pub patterns: Vec<Pattern>,
    pub segments: Vec<Segment>,
    pub timetables: Vec<SegmentTimetable>,
    pub trips: Vec<Trip>,
    /// Grouped by trip, in trip order, each group ordered by sequence.
    pub stop_visits: Vec<StopVisit>,
}

impl SynthesisResult {
    pub fn segment(&self, id: &Id<Segment>) -> Option<&Segment> {
        self.segments.iter().find(|segment| &segment.id == id)
    }

    pub fn visits_of<'a>(&'a self, trip_id: &'a Id<Trip>) -> impl Iterator<Item = &'a StopVisit> {
        self.stop_visits
            .iter()
            .filter(move |visit| &visit.trip_id == trip_id)
    }
}

/// Counts per output kind plus every rejected row, as handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub stops: usize,
    pub patterns: usize,
    pub segments: usize,
    pub timetables: usize,
    pub trips: usize,
    pub stop_visits: usize,
    pub errors: Vec<RowError>,
}

impl RunReport {
    pub fn new(result: &SynthesisResult, errors: &[RowError]) -> Self {
        Self {
            stops: result.stops.len(),
            patterns: result.patterns.len(),
            segments: result.segments.len(),
            timetables: result.timetables.len(),
            trips: result.trips.len(),
            stop_visits: result.stop_visits.len(),
            errors: errors.to_vec(),
        }
    }

    pub fn errors_in(&self, source_file: SourceFile) -> impl Iterator<Item = &RowError> {
        self.errors
            .iter()
            .filter(move |error| error.source_file == source_file)
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_camel_case() {
        let report = RunReport::new(
            &SynthesisResult::default(),
            &[RowError::new(Some(3), SourceFile::Itineraries, "unknown stop reference 'X'")],
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stopVisits"], 0);
        assert_eq!(json["errors"][0]["sourceFile"], "itineraries");
        assert_eq!(json["errors"][0]["row"], 3);
        assert_eq!(report.errors_in(SourceFile::Stops).count(), 0);
        assert!(!report.is_clean());
    }
}
