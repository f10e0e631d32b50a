use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{geo::Coordinate, id::Id};

use crate::{stop::Stop, DirectionId, RouteId};

/// A canonical row of the pattern table.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRow {
    pub row: usize,
    pub route_id: RouteId,
    /// Raw value of the direction column, if the table has one.
    pub direction: Option<String>,
    pub sequence: i64,
    pub stop_ref: String,
    pub accumulated_distance_km: Option<f64>,
    /// Distance from the previous row's stop to this row's stop.
    pub leg_distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternKey {
    pub route_id: RouteId,
    pub direction_id: DirectionId,
}

impl PatternKey {
    pub fn new<S: Into<RouteId>>(route_id: S, direction_id: DirectionId) -> Self {
        Self {
            route_id: route_id.into(),
            direction_id,
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatternStop {
    pub stop_id: Id<Stop>,
    pub code: String,
    pub name: String,
    pub location: Coordinate,
    pub sequence: i64,
    pub accumulated_distance_km: Option<f64>,
    pub leg_distance_km: Option<f64>,
}

impl PatternStop {
    pub fn new(stop: &Stop, row: &PatternRow) -> Self {
        Self {
            stop_id: stop.id.clone(),
            code: stop.code.clone(),
            name: stop.name.clone(),
            location: stop.location,
            sequence: row.sequence,
            accumulated_distance_km: row.accumulated_distance_km,
            leg_distance_km: row.leg_distance_km,
        }
    }
}

/// The ordered stop sequence of one route in one direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub route_id: RouteId,
    pub direction_id: DirectionId,
    pub stops: Vec<PatternStop>,
}

impl Pattern {
    pub fn key(&self) -> PatternKey {
        PatternKey::new(self.route_id.clone(), self.direction_id)
    }

    pub fn stop_ids(&self) -> Vec<Id<Stop>> {
        self.stops.iter().map(|stop| stop.stop_id.clone()).collect()
    }
}
