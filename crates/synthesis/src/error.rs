use std::{error::Error, fmt};

use model::report::{RowError, SourceFile};

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisError {
    /// A row lacks a value the engine can not do without.
    MissingRequiredField { field: &'static str },
    /// A value is present but can not be parsed.
    InvalidValue { field: &'static str, value: String },
    /// A stop code or name that is not in the stop table.
    UnknownStopReference { reference: String },
    /// A stop code registered twice; the first registration is kept.
    DuplicateStop { code: String },
    /// The route has no pattern at all.
    PatternNotFound { route_id: String },
    /// The route has patterns, but none visits origin before destination.
    StopPairNotFound {
        route_id: String,
        origin: String,
        destination: String,
    },
    /// An event that starts and ends at the same stop.
    SameOriginAndDestination { reference: String },
    /// The itinerary table has no service id column, so no event can be
    /// attributed to a service.
    MissingServiceIdColumn,
}

impl SynthesisError {
    pub fn at(self, row: Option<usize>, source_file: SourceFile) -> RowError {
        RowError::new(row, source_file, self.to_string())
    }
}

impl fmt::Display for SynthesisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequiredField { field } => {
                write!(f, "missing required field '{}'", field)
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value '{}' for field '{}'", value, field)
            }
            Self::UnknownStopReference { reference } => {
                write!(f, "unknown stop reference '{}'", reference)
            }
            Self::DuplicateStop { code } => {
                write!(f, "stop code '{}' is already registered", code)
            }
            Self::PatternNotFound { route_id } => {
                write!(f, "no pattern found for route '{}'", route_id)
            }
            Self::StopPairNotFound {
                route_id,
                origin,
                destination,
            } => write!(
                f,
                "no pattern of route '{}' visits '{}' before '{}'",
                route_id, origin, destination
            ),
            Self::SameOriginAndDestination { reference } => {
                write!(f, "origin and destination are both '{}'", reference)
            }
            Self::MissingServiceIdColumn => {
                write!(f, "itinerary table has no service_id column")
            }
        }
    }
}

impl Error for SynthesisError {}
