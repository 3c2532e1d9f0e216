//! Shared data models for the coachcut train splitter.
//!
//! This crate provides Serde-serializable types for:
//! - Split configuration and its defaults
//! - Column segments and train/coach naming
//! - Run summaries
//! - Records consumed by the coverage report generator

pub mod config;
pub mod report;
pub mod segment;
pub mod split;
pub mod train;

// Re-export common types
pub use config::{ConfigError, SplitConfig};
pub use report::{CoachRecord, CoachRow, CoverageSummary, EnginePresence};
pub use segment::{is_partition, ColumnSegment};
pub use split::{CoachSummary, SplitSummary, VideoProperties};
pub use train::{thumbnail_number, TrainNumber};
