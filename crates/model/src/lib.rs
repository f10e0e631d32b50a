pub use serde_with;

pub mod itinerary;
pub mod pattern;
pub mod report;
pub mod segment;
pub mod slot;
pub mod stop;
pub mod trip;

/// Identifies a route as given by the input tables.
pub type RouteId = String;

/// Identifies a calendar service as given by the input tables.
pub type ServiceId = String;

/// Direction of travel within a route, `0` and `1` by GTFS convention.
pub type DirectionId = u32;
