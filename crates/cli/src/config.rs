use std::{env, path::PathBuf};

use gtfs::ExportFormat;

/// Where the binary reads its input and writes the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Directory or zip archive holding the stops, patterns and itineraries
    /// tables.
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Optional path for the full synthesis result as JSON.
    pub result_json: Option<PathBuf>,
}

impl CliConfig {
    /// Reads `SYNTHESIS_INPUT`, `SYNTHESIS_OUTPUT`, `SYNTHESIS_EXPORT_FORMAT` and
    /// `SYNTHESIS_RESULT_JSON`. Only the input is required. Without an explicit
    /// format an output ending in `.zip` is written as archive.
    pub fn from_env() -> Option<Self> {
        let input = PathBuf::from(env::var("SYNTHESIS_INPUT").ok()?);
        let output = env::var("SYNTHESIS_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("gtfs"));
        let format = match env::var("SYNTHESIS_EXPORT_FORMAT") {
            Ok(value) => ExportFormat::parse(&value)?,
            Err(_) => Self::format_of(&output),
        };
        let result_json = env::var("SYNTHESIS_RESULT_JSON").ok().map(PathBuf::from);
        Some(Self {
            input,
            output,
            format,
            result_json,
        })
    }

    /// Positional arguments `<input> [output]` take precedence over the
    /// environment.
    pub fn from_args_or_env<I>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(input) = args.next() else {
            return Self::from_env();
        };
        let mut config = Self::from_env().unwrap_or_else(|| Self {
            input: PathBuf::new(),
            output: PathBuf::from("gtfs"),
            format: ExportFormat::Directory,
            result_json: None,
        });
        config.input = PathBuf::from(input);
        if let Some(output) = args.next() {
            config.output = PathBuf::from(output);
            if env::var("SYNTHESIS_EXPORT_FORMAT").is_err() {
                config.format = Self::format_of(&config.output);
            }
        }
        Some(config)
    }

    fn format_of(output: &std::path::Path) -> ExportFormat {
        match output.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("zip") => ExportFormat::Zip,
            _ => ExportFormat::Directory,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn zip_extension_selects_archive() {
        assert_eq!(CliConfig::format_of(Path::new("out/feed.ZIP")), ExportFormat::Zip);
        assert_eq!(CliConfig::format_of(Path::new("out/feed")), ExportFormat::Directory);
    }
}
