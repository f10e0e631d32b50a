use std::{
    fs::File,
    io::{Read, Seek},
    path::{Path, PathBuf},
};

use model::report::SourceFile;
use synthesis::canonical::{RawTable, SynthesisInput};

use crate::error::IngestError;

/// File names, without extension, under which each input table is looked up.
fn table_names(source_file: SourceFile) -> &'static [&'static str] {
    match source_file {
        SourceFile::Stops => &["stops"],
        SourceFile::Patterns => &["patterns", "route_patterns"],
        SourceFile::Itineraries => &["itineraries", "itinerary"],
    }
}

const EXTENSIONS: [&str; 2] = ["csv", "txt"];

fn matches_table(file_name: &str, source_file: SourceFile) -> bool {
    let path = Path::new(file_name);
    let (Some(stem), Some(extension)) = (
        path.file_stem().and_then(|stem| stem.to_str()),
        path.extension().and_then(|extension| extension.to_str()),
    ) else {
        return false;
    };
    table_names(source_file).contains(&stem.to_lowercase().as_str())
        && EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

/// Reads a header-keyed table. Rows may be shorter or longer than the header,
/// missing values are empty and surplus values are dropped.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.iter().map(str::to_owned).collect::<Vec<_>>();
    let mut table = RawTable::new(&headers);
    for record in reader.records() {
        let record = record?;
        table.push_row(&record.iter().collect::<Vec<_>>());
    }
    Ok(table)
}

pub fn read_table_file<P: AsRef<Path>>(path: P) -> Result<RawTable, IngestError> {
    let file = File::open(path.as_ref())?;
    let table = read_table(file)?;
    log::debug!("read {} rows from {}", table.len(), path.as_ref().display());
    Ok(table)
}

/// The three raw input tables of a synthesis run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTables {
    pub stops: RawTable,
    pub patterns: RawTable,
    pub itineraries: RawTable,
}

impl InputTables {
    /// Reads `stops`, `patterns` and `itineraries` (`.csv` or `.txt`) from a
    /// directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, IngestError> {
        let dir = dir.as_ref();
        let find = |source_file: SourceFile| -> Result<PathBuf, IngestError> {
            for entry in std::fs::read_dir(dir)? {
                let path = entry?.path();
                let is_table = path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| matches_table(name, source_file));
                if is_table {
                    return Ok(path);
                }
            }
            Err(IngestError::MissingTable {
                source_file,
                location: dir.to_owned(),
            })
        };
        let tables = Self {
            stops: read_table_file(find(SourceFile::Stops)?)?,
            patterns: read_table_file(find(SourceFile::Patterns)?)?,
            itineraries: read_table_file(find(SourceFile::Itineraries)?)?,
        };
        tables.log_counts(dir);
        Ok(tables)
    }

    /// Reads the tables from a zip archive. Nested directories are ignored, the
    /// first entry whose file name matches a table wins.
    pub fn from_zip<R: Read + Seek>(reader: R, location: &Path) -> Result<Self, IngestError> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut stops = None;
        let mut patterns = None;
        let mut itineraries = None;

        for i in 0..archive.len() {
            let file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let file_name = match file.enclosed_name() {
                Some(path) => path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_owned),
                None => None,
            };
            let Some(file_name) = file_name else {
                continue;
            };
            let slot = if matches_table(&file_name, SourceFile::Stops) {
                &mut stops
            } else if matches_table(&file_name, SourceFile::Patterns) {
                &mut patterns
            } else if matches_table(&file_name, SourceFile::Itineraries) {
                &mut itineraries
            } else {
                log::debug!("skipping {} in {}", file_name, location.display());
                continue;
            };
            if slot.is_none() {
                *slot = Some(read_table(file)?);
            }
        }

        let require = |table: Option<RawTable>, source_file| {
            table.ok_or_else(|| IngestError::MissingTable {
                source_file,
                location: location.to_owned(),
            })
        };
        let tables = Self {
            stops: require(stops, SourceFile::Stops)?,
            patterns: require(patterns, SourceFile::Patterns)?,
            itineraries: require(itineraries, SourceFile::Itineraries)?,
        };
        tables.log_counts(location);
        Ok(tables)
    }

    /// Reads from a zip archive if the path is a file, otherwise from a directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::from_zip(File::open(path)?, path)
        } else {
            Self::from_dir(path)
        }
    }

    pub fn into_input(self) -> SynthesisInput {
        SynthesisInput::from_raw(&self.stops, &self.patterns, &self.itineraries)
    }

    fn log_counts(&self, location: &Path) {
        log::info!(
            "read {} stops, {} pattern rows and {} itinerary rows from {}",
            self.stops.len(),
            self.patterns.len(),
            self.itineraries.len(),
            location.display()
        );
    }
}
