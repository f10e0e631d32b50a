use chrono::Duration;
use serde::Serialize;
use serde_repr::Serialize_repr;
use utility::serde::duration;

use super::IdString;

/// Indicates pickup method.
/// See <https://gtfs.org/schedule/reference/#stop_timestxt>
#[derive(Serialize_repr, PartialEq, Debug, Clone, Copy, Default)]
#[repr(u8)]
pub enum PickupMethod {
    /// Regularly scheduled pickup.
    #[default]
    RegularlyScheduled = 0,

    /// No pickup available.
    NotAvailable = 1,
}

/// Indicates drop off method.
/// See <https://gtfs.org/schedule/reference/#stop_timestxt>
#[derive(Serialize_repr, PartialEq, Debug, Clone, Copy, Default)]
#[repr(u8)]
pub enum DropOffMethod {
    /// Regularly scheduled drop off.
    #[default]
    RegularlyScheduled = 0,

    /// No drop off available.
    NotAvailable = 1,
}

/// Times that a vehicle arrives at and departs from stops for each trip.
/// Primary Key: `(trip_id, stop_sequence)`
/// See <https://gtfs.org/schedule/reference/#stop_timestxt>
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopTimesRow {
    /// Foreign ID referencing `trips.trip_id`.
    pub trip_id: IdString,

    /// For times occurring after midnight on the service day, the time is a value
    /// greater than `24:00:00` in `HH:MM:SS`.
    #[serde(serialize_with = "duration::serialize")]
    pub arrival_time: Duration,

    /// See `arrival_time`.
    #[serde(serialize_with = "duration::serialize")]
    pub departure_time: Duration,

    /// Foreign ID referencing `stops.stop_id`.
    pub stop_id: IdString,

    /// Order of stops for a particular trip. The values must increase along the
    /// trip but do not need to be consecutive.
    pub stop_sequence: u32,

    /// The last stop of a trip allows no pickup.
    pub pickup_type: PickupMethod,

    /// The first stop of a trip allows no drop off.
    pub drop_off_type: DropOffMethod,

    /// Distance from the first stop in kilometers, same unit as
    /// `shapes.shape_dist_traveled`.
    pub shape_dist_traveled: f64,
}
