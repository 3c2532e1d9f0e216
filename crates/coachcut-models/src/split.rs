//! Results of a column-split run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::segment::ColumnSegment;
use crate::train::TrainNumber;

/// Basic properties of a source video as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoProperties {
    /// Frame rate (fps)
    pub fps: f64,
    /// Total number of frames the container advertises
    pub frame_count: u64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Output of one coach after the re-encode pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoachSummary {
    /// 1-based coach index in left-to-right order
    pub index: usize,
    /// Folder and file stem, `{train}_{index}`
    pub name: String,
    /// Column range cropped for this coach
    pub segment: ColumnSegment,
    /// Folder holding the video and thumbnails
    pub folder: PathBuf,
    /// Path of the coach video
    pub video_path: PathBuf,
    /// Thumbnails written, in order
    pub thumbnails: Vec<PathBuf>,
    /// Frames appended to the coach video
    pub frames_written: u64,
}

/// Summary of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SplitSummary {
    pub train_number: TrainNumber,
    pub video: VideoProperties,
    /// Boundary centers found by the profiling pass
    pub boundaries: Vec<u32>,
    /// Frames sampled for the profile
    pub profiles_used: usize,
    /// Whether the aggregate profile had no dynamic range
    pub degenerate_profile: bool,
    pub coaches: Vec<CoachSummary>,
    /// Frames read during the full pass
    pub frames_processed: u64,
}

impl SplitSummary {
    /// Number of coach folders produced.
    pub fn coach_count(&self) -> usize {
        self.coaches.len()
    }

    /// Segments in coach order.
    pub fn segments(&self) -> Vec<ColumnSegment> {
        self.coaches.iter().map(|c| c.segment).collect()
    }
}
