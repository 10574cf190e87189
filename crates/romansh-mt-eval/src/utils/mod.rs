pub mod cache;
pub mod telemetry;

pub use cache::{DiskScoreCache, MemoryScoreCache, ScoreCache, ScoreKey};
pub use telemetry::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, TelemetryInitError, init_tracing, truncate};
