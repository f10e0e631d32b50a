use serde::Serialize;
use serde_repr::Serialize_repr;

use super::IdString;

/// Indicates the direction of travel for a trip. This field should not be used in
/// routing; it provides a way to separate trips by direction when publishing time
/// tables.
///
/// # Examples
///
/// The `trip_headsign` and `direction_id` fields may be used together to assign a
/// name to travel in each direction for a set of trips. A trips.txt file could
/// contain these records for use in time tables:
/// - `trip_id,...,trip_headsign,direction_id`
/// - `1234,...,Airport,0`
/// - `1505,...,Downtown,1`
///
/// See <https://gtfs.org/schedule/reference/#tripstxt>
#[derive(Serialize_repr, PartialEq, Debug, Clone, Copy)]
#[repr(u8)]
pub enum TravelDirection {
    /// Travel in one direction (e.g. outbound travel).
    TravelInOneDirection = 0,

    /// Travel in the opposite direction (e.g. inbound travel).
    TravelInOppositeDirection = 1,
}

impl TravelDirection {
    /// GTFS only knows two directions. Pattern groups found by sequence resets can
    /// be numbered higher, those alternate between the two.
    pub fn from_direction_id(direction_id: u32) -> Self {
        if direction_id % 2 == 0 {
            Self::TravelInOneDirection
        } else {
            Self::TravelInOppositeDirection
        }
    }
}

/// Trips for each route. A trip is a sequence of two or more stops that occur during
/// a specific time period.
/// Primary Key: `trip_id`
/// See <https://gtfs.org/schedule/reference/#tripstxt>
/// Empty optional values are written as empty fields, so every row has the same
/// number of columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripsRow {
    /// Foreign ID referencing `routes.route_id`.
    /// Identifies a route.
    pub route_id: IdString,

    /// Foreign ID referencing `calendar.service_id` or `calendar_dates.service_id`.
    /// Identifies a set of dates when service is available for one or more routes.
    pub service_id: IdString,

    /// Unique Primary Key.
    /// Identifies a trip.
    pub trip_id: IdString,

    #[serde(rename = "direction_id")]
    pub direction: TravelDirection,

    /// Identifies the block to which the trip belongs.
    /// A block consists of a single trip or many sequential trips made using the same
    /// vehicle.
    pub block_id: Option<IdString>,

    /// Foreign ID referencing `shapes.shape_id`.
    pub shape_id: Option<IdString>,
}
