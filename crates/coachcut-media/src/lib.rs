#![deny(unreachable_patterns)]
//! Train video to per-coach video splitting.
//!
//! This crate provides:
//! - Sampled vertical edge-density profiling of side-on train footage
//! - Valley detection that locates the gaps between coaches
//! - Column segmentation with minimum-width merging
//! - A re-encode pass writing one cropped video and a thumbnail series per coach
//! - Collection of the coach folders for the coverage report
//!
//! Everything that touches frames is behind the `opencv` feature; the
//! profile arithmetic and segmentation are pure and always available.

pub mod error;
pub mod report;
pub mod sampler;
pub mod segments;
pub mod valleys;

#[cfg(feature = "opencv")]
pub mod edges;
#[cfg(feature = "opencv")]
pub mod output;
#[cfg(feature = "opencv")]
pub mod source;
#[cfg(feature = "opencv")]
pub mod splitter;
#[cfg(feature = "opencv")]
pub mod writer;

pub use error::{MediaError, MediaResult};
pub use report::collect_coach_data;
pub use sampler::sample_indices;
pub use segments::SegmentBuilder;
pub use valleys::{ProfileAggregator, ValleyDetection};

#[cfg(feature = "opencv")]
pub use edges::EdgeProfiler;
#[cfg(feature = "opencv")]
pub use output::{FrameSink, OpenCvOutput, OpenCvVideoSink, OutputBackend};
#[cfg(feature = "opencv")]
pub use sampler::{FrameSampler, SampledFrame};
#[cfg(feature = "opencv")]
pub use source::{FrameSource, OpenCvSource};
#[cfg(feature = "opencv")]
pub use splitter::{split_train_video, CoachSplitter, SegmentPlan};
#[cfg(feature = "opencv")]
pub use writer::{SegmentedVideoWriter, WriteOutcome};
