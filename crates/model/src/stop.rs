use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    geo::Coordinate,
    id::{HasId, Id},
};

/// A stop as registered for one synthesis run. The code doubles as id, the
/// name is an alternative reference used by pattern and itinerary tables.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: Id<Stop>,
    pub code: String,
    pub name: String,
    pub location: Coordinate,
    /// Free form `type` column of the stop table.
    pub kind: Option<String>,
}

impl HasId for Stop {
    type IdType = String;
}

impl Stop {
    pub fn from_row(row: StopRow) -> Self {
        Self {
            id: Id::new(row.code.clone()),
            code: row.code,
            name: row.name,
            location: Coordinate::new(row.latitude, row.longitude),
            kind: row.kind,
        }
    }

    pub fn distance_meters_to(&self, other: &Stop) -> f64 {
        self.location.distance_meters(&other.location)
    }
}

/// A canonical row of the stop table.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRow {
    /// 1-based position of the data row within its table.
    pub row: usize,
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: Option<String>,
}
