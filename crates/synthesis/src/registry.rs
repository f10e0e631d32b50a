use std::collections::HashMap;

use indexmap::IndexMap;
use model::{
    report::{RowError, SourceFile},
    stop::{Stop, StopRow},
};
use utility::id::Id;

use crate::error::SynthesisError;

/// Maps stop codes and names to the stops of one run. Built once, read-only
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct StopRegistry {
    stops: IndexMap<Id<Stop>, Stop>,
    by_code: HashMap<String, Id<Stop>>,
    by_name: HashMap<String, Id<Stop>>,
}

impl StopRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(rows: Vec<StopRow>, errors: &mut Vec<RowError>) -> Self {
        let mut registry = Self::new();
        for row in rows {
            let line = row.row;
            if let Err(why) = registry.insert(row) {
                log::warn!("stops row {} skipped: {}", line, why);
                errors.push(why.at(Some(line), SourceFile::Stops));
            }
        }
        log::info!("registered {} stops", registry.len());
        registry
    }

    pub fn insert(&mut self, row: StopRow) -> Result<&Stop, SynthesisError> {
        if self.by_code.contains_key(&row.code) {
            return Err(SynthesisError::DuplicateStop { code: row.code });
        }
        let stop = Stop::from_row(row);
        self.by_code.insert(stop.code.clone(), stop.id.clone());
        self.by_name
            .entry(stop.name.clone())
            .or_insert_with(|| stop.id.clone());
        let id = stop.id.clone();
        Ok(&*self.stops.entry(id).or_insert(stop))
    }

    /// Resolves a reference by exact code, then by exact name.
    pub fn resolve(&self, reference: &str) -> Result<&Stop, SynthesisError> {
        self.by_code
            .get(reference)
            .or_else(|| self.by_name.get(reference))
            .and_then(|id| self.stops.get(id))
            .ok_or_else(|| SynthesisError::UnknownStopReference {
                reference: reference.to_owned(),
            })
    }

    pub fn get(&self, id: &Id<Stop>) -> Option<&Stop> {
        self.stops.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stop> {
        self.stops.values()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn stop_row(row: usize, code: &str, name: &str, lat: f64, lon: f64) -> StopRow {
        StopRow {
            row,
            code: code.to_owned(),
            name: name.to_owned(),
            latitude: lat,
            longitude: lon,
            kind: None,
        }
    }

    #[test]
    fn resolves_by_code_then_name() {
        let mut errors = vec![];
        let registry = StopRegistry::build(
            vec![
                stop_row(1, "S1", "Plaza", 0.0, 0.0),
                // a name that equals another stop's code loses against the code
                stop_row(2, "S2", "S1", 0.0, 0.01),
            ],
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(registry.resolve("S1").unwrap().name, "Plaza");
        assert_eq!(registry.resolve("Plaza").unwrap().code, "S1");
        assert_eq!(registry.resolve("S2").unwrap().name, "S1");
        assert_eq!(
            registry.resolve("plaza"),
            Err(SynthesisError::UnknownStopReference {
                reference: "plaza".to_owned()
            })
        );
    }

    #[test]
    fn first_registration_wins() {
        let mut errors = vec![];
        let registry = StopRegistry::build(
            vec![
                stop_row(1, "S1", "Plaza", 0.0, 0.0),
                stop_row(2, "S1", "Other", 1.0, 1.0),
                stop_row(3, "S3", "Plaza", 2.0, 2.0),
            ],
            &mut errors,
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].row, Some(2));
        assert_eq!(registry.resolve("S1").unwrap().name, "Plaza");
        assert_eq!(registry.resolve("Plaza").unwrap().code, "S1");
        assert_eq!(registry.resolve("S3").unwrap().location.latitude, 2.0);
    }
}
