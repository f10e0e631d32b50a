use serde::Serialize;

use super::{IdString, Latitude, Longitude};

/// Rules for mapping vehicle travel paths, sometimes referred to as route alignments.
///
/// Primary key `(shape_id, shape_pt_sequence)`
///
/// Shapes describe the path that a vehicle travels along a route alignment, and are
/// defined in the file shapes.txt. Shapes are associated with Trips, and consist of a
/// sequence of points through which the vehicle passes in order.
///
/// See <https://gtfs.org/schedule/reference/#shapestxt>
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapesRow {
    /// Identifies a shape.
    pub shape_id: IdString,

    /// Latitude of a shape point. Each record in shapes.txt represents a shape point
    /// used to define the shape.
    #[serde(rename = "shape_pt_lat")]
    pub point_latitude: Latitude,

    /// Longitude of a shape point.
    #[serde(rename = "shape_pt_lon")]
    pub point_longitude: Longitude,

    /// Sequence in which the shape points connect to form the shape. Values must
    /// increase along the trip but do not need to be consecutive.
    #[serde(rename = "shape_pt_sequence")]
    pub point_sequence: u32,

    /// Actual distance traveled along the shape from the first shape point to the
    /// point specified in this record, in kilometers.
    #[serde(rename = "shape_dist_traveled")]
    pub distance_traveled: f64,
}
