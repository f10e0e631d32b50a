use std::{error::Error, fmt, io, path::PathBuf};

use model::report::SourceFile;

/// Failure to read one of the input tables at all. Problems within single rows
/// are not errors here, they are reported by the synthesis run.
#[derive(Debug)]
pub enum IngestError {
    Io(io::Error),
    Csv(csv::Error),
    Zip(zip::result::ZipError),
    MissingTable {
        source_file: SourceFile,
        location: PathBuf,
    },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(why) => write!(f, "could not read input: {}", why),
            Self::Csv(why) => write!(f, "malformed csv: {}", why),
            Self::Zip(why) => write!(f, "malformed zip archive: {}", why),
            Self::MissingTable {
                source_file,
                location,
            } => write!(
                f,
                "no {} table found in {}",
                source_file,
                location.display()
            ),
        }
    }
}

impl Error for IngestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(why) => Some(why),
            Self::Csv(why) => Some(why),
            Self::Zip(why) => Some(why),
            Self::MissingTable { .. } => None,
        }
    }
}

impl From<io::Error> for IngestError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for IngestError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<zip::result::ZipError> for IngestError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Zip(value)
    }
}

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Csv(csv::Error),
    Zip(zip::result::ZipError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(why) => write!(f, "could not write feed: {}", why),
            Self::Csv(why) => write!(f, "could not encode feed: {}", why),
            Self::Zip(why) => write!(f, "could not write zip archive: {}", why),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(why) => Some(why),
            Self::Csv(why) => Some(why),
            Self::Zip(why) => Some(why),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Zip(value)
    }
}
