use std::collections::HashMap;

use chrono::Duration;
use indexmap::IndexMap;
use model::{
    itinerary::{EventKind, ItineraryEvent},
    report::{RowError, SourceFile},
    segment::SegmentKind,
    slot::TimeSlotObservation,
    stop::Stop,
    trip::{StopVisit, Trip},
    DirectionId,
};
use utility::{
    id::Id,
    time::{format_time, SECONDS_PER_DAY},
};

use crate::{
    canonical::SynthesisInput,
    config::SynthesisConfig,
    day_wrap::{cumulative_distances_km, normalize, ClockTimes},
    distribute::distribute,
    error::SynthesisError,
    matcher::match_event,
    pattern::{build_patterns, PatternSet},
    registry::StopRegistry,
    result::{RunReport, SynthesisResult},
    routing::{NoRouting, RoutingProvider},
    segment::{Leg, SegmentGraph},
    slots::ObservationLog,
};

/// What a run hands back: the result, complete or partial, and every row that
/// was rejected on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisOutcome {
    pub result: SynthesisResult,
    pub errors: Vec<RowError>,
}

impl SynthesisOutcome {
    pub fn report(&self) -> RunReport {
        RunReport::new(&self.result, &self.errors)
    }
}

pub struct Engine<P = NoRouting> {
    config: SynthesisConfig,
    provider: P,
}

impl Engine<NoRouting> {
    pub fn new(config: SynthesisConfig) -> Self {
        Self {
            config,
            provider: NoRouting,
        }
    }
}

impl<P: RoutingProvider> Engine<P> {
    pub fn with_provider(config: SynthesisConfig, provider: P) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Runs all stages over one set of input tables.
    pub fn run(&self, input: SynthesisInput) -> SynthesisOutcome {
        let SynthesisInput {
            stops,
            patterns,
            itineraries,
            mut errors,
        } = input;

        let registry = StopRegistry::build(stops, &mut errors);
        let patterns = build_patterns(
            patterns.rows,
            patterns.has_direction_column,
            &registry,
            &mut errors,
        );
        let mut graph = SegmentGraph::new(&registry, &self.provider);
        let pattern_set = PatternSet::connect(patterns, &mut graph, &mut errors);

        let mut synthesizer = TripSynthesizer {
            config: &self.config,
            registry: &registry,
            patterns: &pattern_set,
            graph: &mut graph,
            generated_ids: HashMap::new(),
        };
        let mut trips: IndexMap<Id<Trip>, SynthesizedTrip> = IndexMap::new();
        if itineraries.has_service_id_column {
            for event in &itineraries.events {
                match synthesizer.synthesize(event) {
                    Ok(synthesized) => {
                        if trips.contains_key(&synthesized.trip.id) {
                            log::warn!(
                                "itineraries row {} replaces trip {}",
                                event.row,
                                synthesized.trip.id
                            );
                        }
                        trips.insert(synthesized.trip.id.clone(), synthesized);
                    }
                    Err(why) => {
                        log::warn!("itineraries row {} skipped: {}", event.row, why);
                        errors.push(why.at(Some(event.row), SourceFile::Itineraries));
                    }
                }
            }
        } else {
            log::error!("{}", SynthesisError::MissingServiceIdColumn);
            errors.push(SynthesisError::MissingServiceIdColumn.at(None, SourceFile::Itineraries));
        }

        // a replaced trip leaves its observations behind, only surviving trips count
        let mut observations = ObservationLog::default();
        for synthesized in trips.values() {
            for observation in &synthesized.observations {
                observations.record(observation.clone());
            }
        }
        log::info!(
            "synthesized {} trips from {} events, {} observations",
            trips.len(),
            itineraries.events.len(),
            observations.len()
        );
        let timetables = observations.compress_all(&self.config);

        let (trips, stop_visits): (Vec<_>, Vec<_>) = trips
            .into_values()
            .map(|synthesized| (synthesized.trip, synthesized.visits))
            .unzip();
        let result = SynthesisResult {
            stops: registry.iter().cloned().collect(),
            patterns: pattern_set
                .iter()
                .map(|route_pattern| route_pattern.pattern.clone())
                .collect(),
            segments: graph.into_segments(),
            timetables,
            trips,
            stop_visits: stop_visits.into_iter().flatten().collect(),
        };
        log::info!(
            "run finished: {} segments, {} timetables, {} rejected rows",
            result.segments.len(),
            result.timetables.len(),
            errors.len()
        );
        SynthesisOutcome { result, errors }
    }
}

struct SynthesizedTrip {
    trip: Trip,
    visits: Vec<StopVisit>,
    observations: Vec<TimeSlotObservation>,
}

/// Per-event state of the itinerary phase.
struct TripSynthesizer<'r, 'g> {
    config: &'r SynthesisConfig,
    registry: &'r StopRegistry,
    patterns: &'r PatternSet,
    graph: &'r mut SegmentGraph<'g>,
    generated_ids: HashMap<String, usize>,
}

impl<'r, 'g> TripSynthesizer<'r, 'g> {
    fn synthesize(&mut self, event: &ItineraryEvent) -> Result<SynthesizedTrip, SynthesisError> {
        let registry = self.registry;
        let origin = registry.resolve(&event.origin_ref)?;
        let destination = registry.resolve(&event.destination_ref)?;
        if origin.id == destination.id {
            return Err(SynthesisError::SameOriginAndDestination {
                reference: event.origin_ref.clone(),
            });
        }

        let (stops, legs, direction_id) = match event.kind {
            EventKind::Revenue => {
                let route_id = event
                    .route_id
                    .as_deref()
                    .ok_or(SynthesisError::MissingRequiredField { field: "route" })?;
                let sub = match_event(
                    self.patterns,
                    route_id,
                    &origin.code,
                    &destination.code,
                    event.direction_hint,
                )?;
                let stops = sub
                    .stops()
                    .iter()
                    .map(|stop| stop.stop_id.clone())
                    .collect::<Vec<_>>();
                (stops, sub.legs().to_vec(), sub.direction_id())
            }
            EventKind::Deadhead => {
                let leg = self
                    .graph
                    .get_or_create(&origin.id, &destination.id, None, SegmentKind::Empty)?;
                (
                    vec![origin.id.clone(), destination.id.clone()],
                    vec![leg],
                    event.direction_hint.unwrap_or(0),
                )
            }
        };

        let total_seconds = self.total_duration_seconds(event, &legs);
        let leg_distances_km = legs
            .iter()
            .map(|leg| leg.distance_meters / 1000.0)
            .collect::<Vec<_>>();
        let leg_durations = distribute(&leg_distances_km, total_seconds);

        let start = event.start_time.num_seconds();
        let start_day = start.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
        let start_clock = start.rem_euclid(SECONDS_PER_DAY);
        let mut offset = 0;
        let mut clock_times = Vec::with_capacity(stops.len());
        clock_times.push(ClockTimes::new(start_clock, start_clock));
        for duration in &leg_durations {
            offset += duration;
            // elapsed since the start day, so legs of a day or more keep their days
            let clock = start_clock + offset;
            clock_times.push(ClockTimes::new(clock, clock));
        }
        let elapsed = normalize(&clock_times);
        let distances = cumulative_distances_km(
            &legs
                .iter()
                .map(|leg| leg.distance_meters)
                .collect::<Vec<_>>(),
        );

        let trip_id = self.trip_id(event, origin, destination, direction_id);
        let visits = stops
            .into_iter()
            .zip(elapsed.iter())
            .zip(distances)
            .enumerate()
            .map(|(index, ((stop_id, times), distance_traveled_km))| StopVisit {
                trip_id: trip_id.clone(),
                stop_id,
                sequence: index as u32 + 1,
                arrival_time: Duration::seconds(start_day + times.arrival),
                departure_time: Duration::seconds(start_day + times.departure),
                distance_traveled_km,
            })
            .collect();
        let observations = legs
            .iter()
            .zip(elapsed.iter())
            .zip(&leg_durations)
            .map(|((leg, times), duration)| TimeSlotObservation {
                segment_id: leg.traversal.segment_id.clone(),
                time_of_day_seconds: times.departure,
                duration_seconds: *duration,
            })
            .collect();

        Ok(SynthesizedTrip {
            trip: Trip {
                id: trip_id,
                route_id: event.route_id.clone(),
                service_id: event.service_id.clone(),
                direction_id,
                kind: event.kind,
                block_id: event.block_ref.clone(),
                traversals: legs.into_iter().map(|leg| leg.traversal).collect(),
            },
            visits,
            observations,
        })
    }

    /// End minus start, rolling over midnight when negative. Without an end time
    /// the explicit duration, then the routed durations of all legs, then the
    /// distance at the default speed.
    fn total_duration_seconds(&self, event: &ItineraryEvent, legs: &[Leg]) -> i64 {
        if let Some(end) = event.end_time {
            let seconds = (end - event.start_time).num_seconds();
            return if seconds < 0 {
                seconds + SECONDS_PER_DAY
            } else {
                seconds
            };
        }
        if let Some(duration) = event.duration {
            return duration.num_seconds();
        }
        let routed = legs
            .iter()
            .map(|leg| leg.duration_seconds)
            .sum::<Option<i64>>();
        if let Some(seconds) = routed.filter(|_| !legs.is_empty()) {
            return seconds;
        }
        let meters: f64 = legs.iter().map(|leg| leg.distance_meters).sum();
        (meters / self.config.default_speed_meters_per_second()).round() as i64
    }

    /// The event's own trip id if it has one, otherwise one derived from its
    /// service, route, direction, start and endpoints. Repeats within a run get
    /// a numeric suffix.
    fn trip_id(
        &mut self,
        event: &ItineraryEvent,
        origin: &Stop,
        destination: &Stop,
        direction_id: DirectionId,
    ) -> Id<Trip> {
        if let Some(trip_id) = &event.trip_id {
            return Id::new(trip_id.clone());
        }
        let base = format!(
            "{}_{}_{}_{}_{}_{}",
            event.service_id,
            event.route_id.as_deref().unwrap_or("DH"),
            direction_id,
            format_time(event.start_time.num_seconds()).replace(':', ""),
            origin.code,
            destination.code
        );
        let count = self.generated_ids.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            Id::new(base)
        } else {
            Id::new(format!("{}_{}", base, count))
        }
    }
}
