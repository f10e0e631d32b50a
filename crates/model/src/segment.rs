use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::Coordinate,
    id::{HasId, Id},
};

use crate::stop::Stop;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Revenue,
    Empty,
}

/// A stop to stop link. The same record serves both travel directions; the
/// orientation stored here is the one it was first discovered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: Id<Segment>,
    pub start_stop_id: Id<Stop>,
    pub end_stop_id: Id<Stop>,
    pub distance_meters: f64,
    pub geometry: Vec<Coordinate>,
    pub kind: SegmentKind,
}

impl HasId for Segment {
    type IdType = String;
}

impl Segment {
    pub fn id_for(start: &Id<Stop>, end: &Id<Stop>) -> Id<Segment> {
        Id::new(format!("{}-{}", start, end))
    }

    /// The unordered stop pair identifying this segment.
    pub fn pair_key(&self) -> (Id<Stop>, Id<Stop>) {
        pair_key(&self.start_stop_id, &self.end_stop_id)
    }

    /// Geometry in travel order for one traversal.
    pub fn oriented_geometry(&self, reversed: bool) -> Vec<Coordinate> {
        if reversed {
            self.geometry.iter().rev().copied().collect()
        } else {
            self.geometry.clone()
        }
    }
}

pub fn pair_key(a: &Id<Stop>, b: &Id<Stop>) -> (Id<Stop>, Id<Stop>) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// One use of a segment by a trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTraversal {
    pub segment_id: Id<Segment>,
    pub reversed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> Segment {
        Segment {
            id: Segment::id_for(&Id::new("B".to_owned()), &Id::new("A".to_owned())),
            start_stop_id: Id::new("B".to_owned()),
            end_stop_id: Id::new("A".to_owned()),
            distance_meters: 120.0,
            geometry: vec![
                Coordinate::new(1.0, 1.0),
                Coordinate::new(1.5, 1.5),
                Coordinate::new(2.0, 2.0),
            ],
            kind: SegmentKind::Revenue,
        }
    }

    #[test]
    fn pair_key_ignores_orientation() {
        let segment = segment();
        assert_eq!(segment.id.raw(), "B-A");
        assert_eq!(
            segment.pair_key(),
            (Id::new("A".to_owned()), Id::new("B".to_owned()))
        );
    }

    #[test]
    fn reversed_traversal_flips_geometry() {
        let segment = segment();
        let reversed = segment.oriented_geometry(true);
        assert_eq!(reversed.first(), segment.geometry.last());
        assert_eq!(reversed.last(), segment.geometry.first());
        assert_eq!(segment.oriented_geometry(false), segment.geometry);
    }
}
