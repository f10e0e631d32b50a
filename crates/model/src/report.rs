use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum SourceFile {
    Stops,
    Patterns,
    Itineraries,
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stops => "stops",
            Self::Patterns => "patterns",
            Self::Itineraries => "itineraries",
        };
        f.write_str(name)
    }
}

/// A rejected input row, handed back to the caller after a run.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based data row, `None` for errors about a whole table.
    pub row: Option<usize>,
    pub source_file: SourceFile,
    pub message: String,
}

impl RowError {
    pub fn new<S: Into<String>>(row: Option<usize>, source_file: SourceFile, message: S) -> Self {
        Self {
            row,
            source_file,
            message: message.into(),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "{} row {}: {}", self.source_file, row, self.message),
            None => write!(f, "{}: {}", self.source_file, self.message),
        }
    }
}
