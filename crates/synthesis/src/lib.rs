//! Reconstructs a schedule model from a stop table, ordered route patterns and
//! raw itinerary events: deduplicated segments with geometry, trips with
//! day-wrapped stop visits, and a compressed time-of-day table of segment
//! travel times.
//!
//! Stages run strictly in order, each consuming the complete output of the
//! previous one:
//!
//! 1. [`registry::StopRegistry`] resolves stop codes and names.
//! 2. [`pattern::build_patterns`] groups pattern rows per route and direction.
//! 3. [`segment::SegmentGraph`] deduplicates stop pairs into segments.
//! 4. [`matcher::match_event`] finds the sub-pattern an event travels.
//! 5. [`distribute::distribute`] splits the event's duration over its legs.
//! 6. [`day_wrap::normalize`] turns clock times into elapsed seconds.
//! 7. [`slots::compress`] builds per-segment travel time bands.
//!
//! [`engine::Engine::run`] drives all of them and never fails as a whole;
//! rejected rows are returned next to the (possibly partial) result.

pub mod canonical;
pub mod config;
pub mod day_wrap;
pub mod distribute;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod result;
pub mod routing;
pub mod segment;
pub mod slots;
pub mod store;

pub use config::SynthesisConfig;
pub use engine::{Engine, SynthesisOutcome};
pub use error::SynthesisError;
pub use result::{RunReport, SynthesisResult};
