use serde::Serialize;
use serde_repr::Serialize_repr;

use super::{IdString, Latitude, Longitude};

/// Location Type.
/// See <https://gtfs.org/schedule/reference/#stopstxt>
#[derive(Serialize_repr, PartialEq, Debug, Clone, Copy, Default)]
#[repr(u8)]
pub enum LocationType {
    /// **Stop** (or **Platform**). A location where passengers board or disembark
    /// from a transit vehicle.
    #[default]
    StopOrPlatform = 0,

    /// **Station**. A physical structure or area that contains one or more platform.
    Station = 1,
}

impl LocationType {
    /// Reads the optional `type` column of the stop table. Anything but a station
    /// is exported as a plain stop.
    pub fn from_kind(kind: Option<&str>) -> Self {
        match kind.map(|kind| kind.trim().to_lowercase()).as_deref() {
            Some("1" | "station") => Self::Station,
            _ => Self::StopOrPlatform,
        }
    }
}

/// Stops where vehicles pick up or drop off riders.
/// Primary Key: `stop_id`.
/// See <https://gtfs.org/schedule/reference/#stopstxt>
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopsRow {
    /// Unique Primary Key.
    /// The stop code of the input table doubles as id.
    pub stop_id: IdString,

    /// Short text or a number that identifies the location for riders.
    pub stop_code: String,

    /// Name of the location as printed on a timetable.
    pub stop_name: String,

    /// Latitude of the location.
    pub stop_lat: Latitude,

    /// Longitude of the location.
    pub stop_lon: Longitude,

    pub location_type: LocationType,
}

impl From<&model::stop::Stop> for StopsRow {
    fn from(stop: &model::stop::Stop) -> Self {
        Self {
            stop_id: stop.id.raw(),
            stop_code: stop.code.clone(),
            stop_name: stop.name.clone(),
            stop_lat: stop.location.latitude,
            stop_lon: stop.location.longitude,
            location_type: LocationType::from_kind(stop.kind.as_deref()),
        }
    }
}
