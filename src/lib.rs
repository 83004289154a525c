//! Ingestion-and-analytics pipeline for a two-channel (IR/Red) PPG sensor
//! stream: a deduplicated time-ordered sample archive, a beat event stream,
//! raw and quantile-trimmed heart-rate sequences, and windowed range/min-max
//! queries in absolute-millisecond or display-time units.
//!
//! The band-pass filter and beat detector live in the `beatdet` crate and are
//! injected through its `SampleFilter`/`BeatDetector` traits; everything here
//! is the orchestration around them.

pub mod archive;
pub mod batch;
pub mod config;
pub mod error;
pub mod session;
pub mod smooth;
pub mod types;

pub use batch::{parse_batch, RawRecord};
pub use config::{BeatChannel, PipelineConfig, SeriesFlags};
pub use error::ConfigError;
pub use session::{Pipeline, ProcessingSummary};
pub use smooth::trimmed_mean;
pub use types::{to_absolute_ms, to_display_units, HeartRate, Sample, Series, TimeRef};
