use std::env;

use utility::time::{format_time, parse_time, EXTENDED_DAY_END};

/// Tunables of a synthesis run.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisConfig {
    /// Speed used to derive the duration of an event that has neither an end
    /// time, nor a duration, nor a routed duration for all of its legs.
    pub default_speed_kmh: f64,

    /// Emit a band from `00:00:00` to the first observation of a segment,
    /// carrying the base travel time. Off by default: consumers fall back to the
    /// base travel time for times before the first band.
    pub leading_slot: bool,

    /// End of the operating day that the last slot of each segment closes at.
    pub extended_day_end_seconds: i64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_speed_kmh: 20.0,
            leading_slot: false,
            extended_day_end_seconds: EXTENDED_DAY_END,
        }
    }
}

impl SynthesisConfig {
    /// Reads `SYNTHESIS_DEFAULT_SPEED_KMH`, `SYNTHESIS_LEADING_SLOT` and
    /// `SYNTHESIS_DAY_END`. Unset or invalid variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = env::var("SYNTHESIS_DEFAULT_SPEED_KMH") {
            match value.trim().parse::<f64>() {
                Ok(speed) if speed > 0.0 => config.default_speed_kmh = speed,
                _ => log::warn!(
                    "ignoring SYNTHESIS_DEFAULT_SPEED_KMH='{}', using {} km/h",
                    value,
                    config.default_speed_kmh
                ),
            }
        }
        if let Ok(value) = env::var("SYNTHESIS_LEADING_SLOT") {
            config.leading_slot =
                matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(value) = env::var("SYNTHESIS_DAY_END") {
            match parse_time(&value) {
                Ok(seconds) if seconds > 0 => config.extended_day_end_seconds = seconds,
                _ => log::warn!(
                    "ignoring SYNTHESIS_DAY_END='{}', using {}",
                    value,
                    format_time(config.extended_day_end_seconds)
                ),
            }
        }
        config
    }

    pub fn default_speed_meters_per_second(&self) -> f64 {
        self.default_speed_kmh / 3.6
    }
}
