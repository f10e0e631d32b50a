use std::collections::HashMap;

use chrono::Duration;
use model::{
    itinerary::{EventKind, ItineraryEvent},
    pattern::PatternRow,
    report::{RowError, SourceFile},
    stop::StopRow,
    DirectionId,
};
use utility::time::{parse_time, MAX_TIME_SECONDS};

use crate::error::SynthesisError;

/// Column aliases accepted by the input tables. Header names are compared after
/// trimming and lowercasing.
pub mod columns {
    pub const STOP_CODE: &[&str] = &["stop_code", "code", "id"];
    pub const STOP_NAME: &[&str] = &["stop_name", "name"];
    pub const LATITUDE: &[&str] = &["latitude", "lat", "stop_lat"];
    pub const LONGITUDE: &[&str] = &["longitude", "lon", "lng", "stop_lon"];
    pub const STOP_TYPE: &[&str] = &["type"];

    pub const ROUTE: &[&str] = &["route_id", "route"];
    pub const SEQUENCE: &[&str] = &["sequence", "seq", "stop_sequence"];
    pub const PATTERN_STOP: &[&str] = &["stop_code", "stop_name", "stop_id"];
    pub const ACCUMULATED_DISTANCE: &[&str] = &["accumulate_distance"];
    pub const LEG_DISTANCE: &[&str] = &["distance"];
    pub const DIRECTION: &[&str] = &["direction_id", "direction", "sentido"];

    pub const SERVICE_ID: &[&str] = &["service_id", "serviceid"];
    pub const EVENT: &[&str] = &["event", "event_type"];
    pub const ORIGIN: &[&str] = &["origin", "from_stop", "origen"];
    pub const DESTINATION: &[&str] = &["destination", "destiny", "to_stop", "destino"];
    pub const START: &[&str] = &["start", "start_time"];
    pub const END: &[&str] = &["end", "end_time"];
    pub const DURATION: &[&str] = &["duration"];
    pub const BLOCK: &[&str] = &["bus", "block_id"];
    pub const TRIP_ID: &[&str] = &["trip_id"];
}

pub type RawRecord = HashMap<String, String>;

/// A table as read by the ingestion layer, before any alias resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

impl RawTable {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers
                .iter()
                .map(|header| normalize_header(header.as_ref()))
                .collect(),
            records: vec![],
        }
    }

    /// Appends a row given in header order. Missing trailing values are treated
    /// as empty.
    pub fn push_row<S: AsRef<str>>(&mut self, values: &[S]) {
        let record = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = values
                    .get(index)
                    .map(|value| value.as_ref().to_owned())
                    .unwrap_or_default();
                (header.clone(), value)
            })
            .collect();
        self.records.push(record);
    }

    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.headers
            .iter()
            .any(|header| aliases.contains(&header.as_str()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// First non-empty value among the aliases, trimmed.
fn field<'a>(record: &'a RawRecord, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

fn required<'a>(
    record: &'a RawRecord,
    aliases: &[&str],
    name: &'static str,
) -> Result<&'a str, SynthesisError> {
    field(record, aliases).ok_or(SynthesisError::MissingRequiredField { field: name })
}

/// Parses a decimal number, accepting a comma as decimal separator.
fn parse_number(value: &str, name: &'static str) -> Result<f64, SynthesisError> {
    let normalized = if value.contains('.') {
        value.to_owned()
    } else {
        value.replace(',', ".")
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| SynthesisError::InvalidValue {
            field: name,
            value: value.to_owned(),
        })
}

fn optional_number(
    record: &RawRecord,
    aliases: &[&str],
    name: &'static str,
) -> Result<Option<f64>, SynthesisError> {
    field(record, aliases)
        .map(|value| parse_number(value, name))
        .transpose()
}

fn parse_clock(value: &str, name: &'static str) -> Result<Duration, SynthesisError> {
    parse_time(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| SynthesisError::InvalidValue {
            field: name,
            value: value.to_owned(),
        })
}

/// Reads a duration given in plain seconds or as a clock time.
fn parse_duration(value: &str) -> Result<Duration, SynthesisError> {
    match value.parse::<i64>() {
        Ok(seconds) if (0..=MAX_TIME_SECONDS).contains(&seconds) => {
            Ok(Duration::seconds(seconds))
        }
        Ok(_) => Err(SynthesisError::InvalidValue {
            field: "duration",
            value: value.to_owned(),
        }),
        Err(_) => parse_clock(value, "duration"),
    }
}

/// Reads a direction value: `IDA` is 0, `VUELTA` is 1, otherwise an integer.
pub fn parse_direction(value: &str) -> Option<DirectionId> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("ida") {
        Some(0)
    } else if value.eq_ignore_ascii_case("vuelta") {
        Some(1)
    } else {
        value.parse::<DirectionId>().ok()
    }
}

pub fn canonicalize_stop(row: usize, record: &RawRecord) -> Result<StopRow, SynthesisError> {
    let code = required(record, columns::STOP_CODE, "stop_code")?;
    let name = required(record, columns::STOP_NAME, "stop_name")?;
    let latitude = required(record, columns::LATITUDE, "latitude")?;
    let longitude = required(record, columns::LONGITUDE, "longitude")?;
    Ok(StopRow {
        row,
        code: code.to_owned(),
        name: name.to_owned(),
        latitude: parse_number(latitude, "latitude")?,
        longitude: parse_number(longitude, "longitude")?,
        kind: field(record, columns::STOP_TYPE).map(str::to_owned),
    })
}

pub fn canonicalize_pattern(
    row: usize,
    record: &RawRecord,
) -> Result<PatternRow, SynthesisError> {
    let route_id = required(record, columns::ROUTE, "route_id")?;
    let sequence = required(record, columns::SEQUENCE, "sequence")?;
    let stop_ref = required(record, columns::PATTERN_STOP, "stop_code")?;
    let sequence = parse_number(sequence, "sequence")?;
    if sequence.fract() != 0.0 {
        return Err(SynthesisError::InvalidValue {
            field: "sequence",
            value: sequence.to_string(),
        });
    }
    Ok(PatternRow {
        row,
        route_id: route_id.to_owned(),
        direction: field(record, columns::DIRECTION).map(str::to_owned),
        sequence: sequence as i64,
        stop_ref: stop_ref.to_owned(),
        accumulated_distance_km: optional_number(
            record,
            columns::ACCUMULATED_DISTANCE,
            "accumulate_distance",
        )?,
        leg_distance_km: optional_number(record, columns::LEG_DISTANCE, "distance")?,
    })
}

pub fn canonicalize_event(
    row: usize,
    record: &RawRecord,
) -> Result<ItineraryEvent, SynthesisError> {
    let service_id = required(record, columns::SERVICE_ID, "service_id")?;
    let origin_ref = required(record, columns::ORIGIN, "origin")?;
    let destination_ref = required(record, columns::DESTINATION, "destination")?;
    let start = required(record, columns::START, "start")?;

    let kind = match field(record, columns::EVENT) {
        Some(value) => EventKind::parse(value).ok_or_else(|| SynthesisError::InvalidValue {
            field: "event",
            value: value.to_owned(),
        })?,
        None => EventKind::Revenue,
    };
    let duration = field(record, columns::DURATION)
        .map(parse_duration)
        .transpose()?;

    Ok(ItineraryEvent {
        row,
        route_id: field(record, columns::ROUTE).map(str::to_owned),
        service_id: service_id.to_owned(),
        kind,
        origin_ref: origin_ref.to_owned(),
        destination_ref: destination_ref.to_owned(),
        start_time: parse_clock(start, "start")?,
        end_time: field(record, columns::END)
            .map(|value| parse_clock(value, "end"))
            .transpose()?,
        duration,
        direction_hint: field(record, columns::DIRECTION).and_then(parse_direction),
        block_ref: field(record, columns::BLOCK).map(str::to_owned),
        trip_id: field(record, columns::TRIP_ID).map(str::to_owned),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternTable {
    pub rows: Vec<PatternRow>,
    pub has_direction_column: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItineraryTable {
    pub events: Vec<ItineraryEvent>,
    pub has_service_id_column: bool,
}

/// Canonical rows of all three input tables plus the rows rejected while
/// canonicalizing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisInput {
    pub stops: Vec<StopRow>,
    pub patterns: PatternTable,
    pub itineraries: ItineraryTable,
    pub errors: Vec<RowError>,
}

fn canonicalize_all<T, F>(
    table: &RawTable,
    source_file: SourceFile,
    errors: &mut Vec<RowError>,
    canonicalize: F,
) -> Vec<T>
where
    F: Fn(usize, &RawRecord) -> Result<T, SynthesisError>,
{
    table
        .records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let row = index + 1;
            match canonicalize(row, record) {
                Ok(value) => Some(value),
                Err(why) => {
                    log::warn!("{} row {} skipped: {}", source_file, row, why);
                    errors.push(why.at(Some(row), source_file));
                    None
                }
            }
        })
        .collect()
}

impl SynthesisInput {
    pub fn from_raw(stops: &RawTable, patterns: &RawTable, itineraries: &RawTable) -> Self {
        let mut errors = vec![];
        let stop_rows = canonicalize_all(stops, SourceFile::Stops, &mut errors, canonicalize_stop);
        let pattern_rows =
            canonicalize_all(patterns, SourceFile::Patterns, &mut errors, canonicalize_pattern);

        // Without the column every row would fail the same way; the engine reports
        // the structural error once instead.
        let has_service_id_column = itineraries.has_column(columns::SERVICE_ID);
        let events = if has_service_id_column {
            canonicalize_all(
                itineraries,
                SourceFile::Itineraries,
                &mut errors,
                canonicalize_event,
            )
        } else {
            vec![]
        };

        Self {
            stops: stop_rows,
            patterns: PatternTable {
                rows: pattern_rows,
                has_direction_column: patterns.has_column(columns::DIRECTION),
            },
            itineraries: ItineraryTable {
                events,
                has_service_id_column,
            },
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        let mut table = RawTable::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn resolves_stop_aliases() {
        let stops = table(
            &["\u{feff}Code", " Name ", "lat", "lng"],
            &[&["S1", "Plaza", "-33,45", "-70.66"]],
        );
        let row = canonicalize_stop(1, &stops.records[0]).unwrap();
        assert_eq!(row.code, "S1");
        assert_eq!(row.name, "Plaza");
        assert_eq!(row.latitude, -33.45);
        assert_eq!(row.longitude, -70.66);
        assert_eq!(row.kind, None);
    }

    #[test]
    fn stop_without_coordinates_is_rejected() {
        let stops = table(&["stop_code", "stop_name", "lat", "lon"], &[&["S1", "Plaza", "", "1"]]);
        assert_eq!(
            canonicalize_stop(1, &stops.records[0]),
            Err(SynthesisError::MissingRequiredField { field: "latitude" })
        );
    }

    #[test]
    fn reads_pattern_rows() {
        let patterns = table(
            &["route", "seq", "stop_name", "accumulate_distance", "sentido"],
            &[&["R1", "3", "Plaza", "1.25", "VUELTA"]],
        );
        let row = canonicalize_pattern(7, &patterns.records[0]).unwrap();
        assert_eq!(row.row, 7);
        assert_eq!(row.route_id, "R1");
        assert_eq!(row.sequence, 3);
        assert_eq!(row.stop_ref, "Plaza");
        assert_eq!(row.accumulated_distance_km, Some(1.25));
        assert_eq!(row.leg_distance_km, None);
        assert_eq!(row.direction.as_deref(), Some("VUELTA"));
        assert!(patterns.has_column(columns::DIRECTION));
    }

    #[test]
    fn reads_itinerary_rows() {
        let itineraries = table(
            &["serviceid", "event", "route", "origen", "destino", "start", "end", "bus"],
            &[&["LAB", "0", "", "DEP", "S1", "1.00:10:00", "00:30:00", "B12"]],
        );
        let event = canonicalize_event(1, &itineraries.records[0]).unwrap();
        assert_eq!(event.service_id, "LAB");
        assert_eq!(event.kind, EventKind::Deadhead);
        assert_eq!(event.route_id, None);
        assert_eq!(event.origin_ref, "DEP");
        assert_eq!(event.destination_ref, "S1");
        assert_eq!(event.start_time, Duration::seconds(86400 + 600));
        assert_eq!(event.end_time, Some(Duration::seconds(1800)));
        assert_eq!(event.block_ref.as_deref(), Some("B12"));
    }

    #[test]
    fn duration_accepts_seconds_and_clock_format() {
        let itineraries = table(
            &["service_id", "origin", "destiny", "start_time", "duration"],
            &[
                &["WK", "A", "B", "08:00:00", "540"],
                &["WK", "A", "B", "08:00:00", "00:09:00"],
                &["WK", "A", "B", "08:00:00", "soon"],
            ],
        );
        let first = canonicalize_event(1, &itineraries.records[0]).unwrap();
        let second = canonicalize_event(2, &itineraries.records[1]).unwrap();
        assert_eq!(first.duration, Some(Duration::seconds(540)));
        assert_eq!(second.duration, first.duration);
        assert_eq!(first.kind, EventKind::Revenue);
        assert!(matches!(
            canonicalize_event(3, &itineraries.records[2]),
            Err(SynthesisError::InvalidValue { field: "duration", .. })
        ));
    }

    #[test]
    fn out_of_range_times_are_invalid_values() {
        let itineraries = table(
            &["service_id", "origin", "destiny", "start_time", "duration"],
            &[
                &["WK", "A", "B", "08:00:00", "9999999999999999"],
                &["WK", "A", "B", "200000000000.00:00:00", "60"],
                &["WK", "A", "B", "08:00:00", "-60"],
            ],
        );
        assert!(matches!(
            canonicalize_event(1, &itineraries.records[0]),
            Err(SynthesisError::InvalidValue { field: "duration", .. })
        ));
        assert!(matches!(
            canonicalize_event(2, &itineraries.records[1]),
            Err(SynthesisError::InvalidValue { field: "start", .. })
        ));
        assert!(matches!(
            canonicalize_event(3, &itineraries.records[2]),
            Err(SynthesisError::InvalidValue { field: "duration", .. })
        ));
    }

    #[test]
    fn missing_service_column_skips_all_events() {
        let stops = table(&["code", "name", "lat", "lon"], &[]);
        let patterns = table(&["route", "seq", "stop_code"], &[]);
        let itineraries = table(
            &["origin", "destiny", "start"],
            &[&["A", "B", "08:00:00"], &["B", "C", "09:00:00"]],
        );
        let input = SynthesisInput::from_raw(&stops, &patterns, &itineraries);
        assert!(!input.itineraries.has_service_id_column);
        assert!(input.itineraries.events.is_empty());
        assert!(input.errors.is_empty());
        assert!(!input.patterns.has_direction_column);
    }

    #[test]
    fn collects_row_errors_with_positions() {
        let stops = table(
            &["code", "name", "lat", "lon"],
            &[&["S1", "One", "1", "1"], &["S2", "", "1", "1"]],
        );
        let input = SynthesisInput::from_raw(&stops, &RawTable::default(), &RawTable::default());
        assert_eq!(input.stops.len(), 1);
        assert_eq!(input.errors.len(), 1);
        assert_eq!(input.errors[0].row, Some(2));
        assert_eq!(input.errors[0].source_file, SourceFile::Stops);
    }

    #[test]
    fn direction_values() {
        assert_eq!(parse_direction("IDA"), Some(0));
        assert_eq!(parse_direction("vuelta"), Some(1));
        assert_eq!(parse_direction("1"), Some(1));
        assert_eq!(parse_direction("north"), None);
    }
}
