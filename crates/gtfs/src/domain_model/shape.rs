use std::collections::HashMap;

use model::{
    segment::SegmentTraversal,
    trip::Trip,
};
use synthesis::{day_wrap::cumulative_distances_km, SynthesisResult};
use utility::{
    geo::{polyline_length_meters, round_km, Coordinate},
    id::{HasId, Id},
};

use crate::data_model::{shapes::ShapesRow, Latitude, Longitude};

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: Id<Shape>,
    pub points: Vec<ShapePoint>,
}

impl HasId for Shape {
    type IdType = String;
}

/// Oriented geometry of one traversed segment and the distance the trip's stop
/// times account for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapePiece {
    pub geometry: Vec<Coordinate>,
    pub distance_meters: f64,
}

impl Shape {
    /// Concatenates the geometry of consecutive segment traversals. The shared
    /// point where one segment ends and the next begins is kept once.
    ///
    /// Distances along the shape use the same cumulative leg distances as the
    /// stop times, so the point ending each piece carries exactly the
    /// `shape_dist_traveled` of the stop it reaches. Points inside a piece are
    /// placed by their share of the piece's geometric length.
    pub fn from_pieces(id: Id<Shape>, pieces: &[ShapePiece]) -> Self {
        let stop_distances = cumulative_distances_km(
            &pieces
                .iter()
                .map(|piece| piece.distance_meters)
                .collect::<Vec<_>>(),
        );

        let mut points: Vec<ShapePoint> = vec![];
        for (piece, bounds) in pieces.iter().zip(stop_distances.windows(2)) {
            let (from_km, to_km) = (bounds[0], bounds[1]);
            let length = polyline_length_meters(&piece.geometry);
            let mut along = 0.0;
            for (index, coordinate) in piece.geometry.iter().enumerate() {
                if index > 0 {
                    along += piece.geometry[index - 1].distance_meters(coordinate);
                }
                let fraction = match (length > 0.0, index) {
                    (true, _) => along / length,
                    (false, 0) => 0.0,
                    (false, _) => 1.0,
                };
                let distance_traveled_km = round_km(from_km + fraction * (to_km - from_km));
                if let Some(last) = points.last_mut().filter(|last| last.is_at(coordinate)) {
                    last.distance_traveled_km = last.distance_traveled_km.max(distance_traveled_km);
                    continue;
                }
                points.push(ShapePoint {
                    latitude: coordinate.latitude,
                    longitude: coordinate.longitude,
                    distance_traveled_km,
                });
            }
        }
        Self { id, points }
    }

    pub fn rows(&self) -> impl Iterator<Item = ShapesRow> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(move |(index, point)| ShapesRow {
                shape_id: self.id.raw(),
                point_latitude: point.latitude,
                point_longitude: point.longitude,
                point_sequence: index as u32 + 1,
                distance_traveled: point.distance_traveled_km,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapePoint {
    pub latitude: Latitude,
    pub longitude: Longitude,
    pub distance_traveled_km: f64,
}

impl ShapePoint {
    fn is_at(&self, coordinate: &Coordinate) -> bool {
        self.latitude == coordinate.latitude && self.longitude == coordinate.longitude
    }
}

/// Shapes of all revenue trips of a result. Trips traversing the same segments
/// in the same orientations share one shape.
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    pub shapes: Vec<Shape>,
    by_trip: HashMap<Id<Trip>, Id<Shape>>,
}

impl ShapeSet {
    pub fn build(result: &SynthesisResult) -> Self {
        let mut set = Self::default();
        let mut by_traversals: HashMap<&[SegmentTraversal], Id<Shape>> = HashMap::new();
        for trip in result.trips.iter().filter(|trip| trip.kind.is_revenue()) {
            if let Some(shape_id) = by_traversals.get(trip.traversals.as_slice()) {
                set.by_trip.insert(trip.id.clone(), shape_id.clone());
                continue;
            }
            let shape_id: Id<Shape> = Id::new(format!(
                "{}_{}_{}",
                trip.route_id.as_deref().unwrap_or("DH"),
                trip.direction_id,
                set.shapes.len() + 1
            ));
            let pieces = trip
                .traversals
                .iter()
                .map(|traversal| {
                    let segment = result.segment(&traversal.segment_id);
                    if segment.is_none() {
                        log::warn!(
                            "trip {} refers to unknown segment {}",
                            trip.id,
                            traversal.segment_id
                        );
                    }
                    segment.map(|segment| ShapePiece {
                        geometry: segment.oriented_geometry(traversal.reversed),
                        distance_meters: segment.distance_meters,
                    })
                })
                .collect::<Option<Vec<_>>>();
            let Some(pieces) = pieces else {
                continue;
            };
            let shape = Shape::from_pieces(shape_id.clone(), &pieces);
            if shape.points.len() < 2 {
                log::warn!("trip {} has no usable geometry", trip.id);
                continue;
            }
            by_traversals.insert(trip.traversals.as_slice(), shape_id.clone());
            set.by_trip.insert(trip.id.clone(), shape_id);
            set.shapes.push(shape);
        }
        log::info!(
            "built {} shapes for {} trips",
            set.shapes.len(),
            set.by_trip.len()
        );
        set
    }

    pub fn shape_of(&self, trip_id: &Id<Trip>) -> Option<&Id<Shape>> {
        self.by_trip.get(trip_id)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use model::{
        itinerary::EventKind,
        segment::{Segment, SegmentKind},
    };

    use super::*;

    fn segment(start: &str, end: &str, meters: f64, geometry: Vec<Coordinate>) -> Segment {
        let (start, end) = (Id::new(start.to_owned()), Id::new(end.to_owned()));
        Segment {
            id: Segment::id_for(&start, &end),
            start_stop_id: start,
            end_stop_id: end,
            distance_meters: meters,
            geometry,
            kind: SegmentKind::Revenue,
        }
    }

    fn trip(id: &str, kind: EventKind, traversals: &[(&str, bool)]) -> Trip {
        Trip {
            id: Id::new(id.to_owned()),
            route_id: Some("R1".to_owned()),
            service_id: "WD".to_owned(),
            direction_id: 0,
            kind,
            block_id: None,
            traversals: traversals
                .iter()
                .map(|(segment_id, reversed)| SegmentTraversal {
                    segment_id: Id::new((*segment_id).to_owned()),
                    reversed: *reversed,
                })
                .collect(),
        }
    }

    fn result() -> SynthesisResult {
        SynthesisResult {
            segments: vec![
                segment(
                    "A",
                    "B",
                    1000.0,
                    vec![
                        Coordinate::new(0.0, 0.0),
                        Coordinate::new(0.0, 0.005),
                        Coordinate::new(0.0, 0.01),
                    ],
                ),
                segment(
                    "C",
                    "B",
                    2000.0,
                    vec![Coordinate::new(0.0, 0.02), Coordinate::new(0.0, 0.01)],
                ),
            ],
            trips: vec![
                trip("T1", EventKind::Revenue, &[("A-B", false), ("C-B", true)]),
                trip("T2", EventKind::Revenue, &[("A-B", false), ("C-B", true)]),
                trip("T3", EventKind::Revenue, &[("C-B", false), ("A-B", true)]),
                trip("D1", EventKind::Deadhead, &[("A-B", false)]),
            ],
            ..SynthesisResult::default()
        }
    }

    #[test]
    fn joins_oriented_segment_geometry() {
        let shapes = ShapeSet::build(&result());
        let shape = &shapes.shapes[0];
        let longitudes = shape
            .points
            .iter()
            .map(|point| point.longitude)
            .collect::<Vec<_>>();
        assert_eq!(longitudes, vec![0.0, 0.005, 0.01, 0.02]);
        let distances = shape
            .points
            .iter()
            .map(|point| point.distance_traveled_km)
            .collect::<Vec<_>>();
        assert_eq!(distances, vec![0.0, 0.5, 1.0, 3.0]);
    }

    #[test]
    fn stop_points_carry_the_stop_time_distances() {
        let pieces = [
            ShapePiece {
                geometry: vec![
                    Coordinate::new(0.0, 0.0),
                    Coordinate::new(0.0, 0.0025),
                    Coordinate::new(0.0, 0.01),
                ],
                distance_meters: 1200.0,
            },
            ShapePiece {
                geometry: vec![Coordinate::new(0.0, 0.01), Coordinate::new(0.0, 0.01)],
                distance_meters: 0.0,
            },
            ShapePiece {
                geometry: vec![Coordinate::new(0.0, 0.01), Coordinate::new(0.0, 0.02)],
                distance_meters: 766.0,
            },
        ];
        let shape = Shape::from_pieces(Id::new("S".to_owned()), &pieces);
        let stop_distances = cumulative_distances_km(&[1200.0, 0.0, 766.0]);
        assert_eq!(stop_distances, vec![0.0, 1.2, 1.201, 1.966]);
        assert_eq!(shape.points.len(), 4);
        assert_relative_eq!(shape.points[1].distance_traveled_km, 0.3, epsilon = 1e-9);
        assert_eq!(shape.points[2].distance_traveled_km, stop_distances[2]);
        assert_eq!(shape.points[3].distance_traveled_km, stop_distances[3]);
    }

    #[test]
    fn identical_traversals_share_a_shape() {
        let shapes = ShapeSet::build(&result());
        assert_eq!(shapes.shapes.len(), 2);
        let t1 = shapes.shape_of(&Id::new("T1".to_owned())).unwrap();
        let t2 = shapes.shape_of(&Id::new("T2".to_owned())).unwrap();
        let t3 = shapes.shape_of(&Id::new("T3".to_owned())).unwrap();
        assert_eq!(t1, t2);
        assert_ne!(t1, t3);
        assert!(shapes.shape_of(&Id::new("D1".to_owned())).is_none());
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let shapes = ShapeSet::build(&result());
        let rows = shapes.shapes[1].rows().collect::<Vec<_>>();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].shape_id, "R1_0_2");
        assert_eq!(rows[0].point_sequence, 1);
        assert_eq!(rows[0].point_longitude, 0.02);
        assert_eq!(rows[3].point_sequence, 4);
    }
}
