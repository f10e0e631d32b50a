use utility::{geo::round_km, time::SECONDS_PER_DAY};

/// Arrival and departure of one stop visit, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTimes {
    pub arrival: i64,
    pub departure: i64,
}

impl ClockTimes {
    pub fn new(arrival: i64, departure: i64) -> Self {
        Self { arrival, departure }
    }
}

/// Turns the clock times of consecutive stop visits into non-decreasing
/// elapsed times, rolling over into the next day where a clock time would
/// otherwise go backwards.
pub fn normalize(visits: &[ClockTimes]) -> Vec<ClockTimes> {
    let mut day_offset = 0;
    let mut last_departure: Option<i64> = None;
    visits
        .iter()
        .map(|visit| {
            if let Some(last) = last_departure {
                if visit.arrival + day_offset < last {
                    day_offset += SECONDS_PER_DAY;
                }
            }
            let arrival = visit.arrival + day_offset;
            let mut departure = visit.departure + day_offset;
            if departure < arrival {
                departure = if departure + SECONDS_PER_DAY >= arrival {
                    departure + SECONDS_PER_DAY
                } else {
                    arrival
                };
            }
            last_departure = Some(departure);
            ClockTimes { arrival, departure }
        })
        .collect()
}

/// Cumulative distance in kilometers at every stop of a trip, given the leg
/// lengths between them. The first stop is at 0, every following value is
/// rounded to meters and strictly greater than the one before.
pub fn cumulative_distances_km(leg_distances_meters: &[f64]) -> Vec<f64> {
    let mut total_meters = 0.0;
    let mut previous = 0.0;
    let mut distances = Vec::with_capacity(leg_distances_meters.len() + 1);
    distances.push(previous);
    for leg in leg_distances_meters {
        total_meters += leg.max(0.0);
        let mut current = round_km(total_meters / 1000.0);
        if current <= previous {
            current = round_km(previous + 0.001);
        }
        distances.push(current);
        previous = current;
    }
    distances
}
