use serde::Serialize;
use serde_repr::Serialize_repr;

use super::IdString;

/// Indicates the type of transportation used on a route.
/// See <https://gtfs.org/schedule/reference/#routestxt>
#[derive(Serialize_repr, PartialEq, Debug, Clone, Copy, Default)]
#[repr(u16)]
pub enum RouteType {
    /// Tram, Streetcar, Light rail. Any light rail or street level system within a
    /// metropolitan area.
    Tram = 0,

    /// Subway, Metro. Any underground rail system within a metropolitan area.
    Subway = 1,

    /// Rail. Used for intercity or long-distance travel.
    Rail = 2,

    /// Bus. Used for short- and long-distance bus routes.
    #[default]
    Bus = 3,
}

/// Transit routes. A route is a group of trips that are displayed to riders as a
/// single service.
/// Primary Key: `route_id`
/// See <https://gtfs.org/schedule/reference/#routestxt>
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutesRow {
    /// Unique Primary Key.
    /// Identifies a route.
    pub route_id: IdString,

    /// Short name of a route. Often a short, abstract identifier (e.g., "32",
    /// "100X", "Green") that riders use to identify a route.
    pub route_short_name: String,

    pub route_type: RouteType,
}

impl RoutesRow {
    pub fn bus(route_id: &str) -> Self {
        Self {
            route_id: route_id.to_owned(),
            route_short_name: route_id.to_owned(),
            route_type: RouteType::Bus,
        }
    }
}
