//! End-to-end coach splitting.
//!
//! A run makes two passes over the video:
//! 1. **Plan**: sample every `stride`-th frame, profile its vertical edges and
//!    locate the low-density gaps between coaches
//! 2. **Write**: rewind and crop every frame into one video per coach,
//!    dropping a thumbnail every `thumbnail_interval` frames

use std::path::{Path, PathBuf};
use std::time::Instant;

use opencv::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use coachcut_models::{ColumnSegment, SplitConfig, SplitSummary};

use crate::edges::EdgeProfiler;
use crate::error::{MediaError, MediaResult};
use crate::output::{OpenCvOutput, OutputBackend};
use crate::sampler::FrameSampler;
use crate::segments::SegmentBuilder;
use crate::source::{FrameSource, OpenCvSource};
use crate::valleys::ProfileAggregator;
use crate::writer::SegmentedVideoWriter;

/// Outcome of the profiling pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPlan {
    /// Frame width taken from the profiles
    pub width: u32,
    pub height: u32,
    /// Boundary centers, increasing
    pub centers: Vec<u32>,
    /// Partition of `[0, width)`
    pub segments: Vec<ColumnSegment>,
    pub profiles_used: usize,
    pub frames_skipped: usize,
    pub degenerate: bool,
}

/// Splits a train video into per-coach videos.
#[derive(Debug, Clone)]
pub struct CoachSplitter {
    config: SplitConfig,
}

impl CoachSplitter {
    /// Create a splitter.
    ///
    /// # Errors
    /// `InvalidConfig` when the configuration fails validation.
    pub fn new(config: SplitConfig) -> MediaResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Run the profiling pass and derive the coach segments.
    ///
    /// # Errors
    /// `EmptyProfileSet` when no sampled frame could be profiled.
    pub fn plan<S: FrameSource + ?Sized>(&self, source: &mut S) -> MediaResult<SegmentPlan> {
        let properties = source.properties();
        let profiler = EdgeProfiler::from_config(&self.config);

        let mut sampler = FrameSampler::new(
            source,
            properties.frame_count,
            self.config.effective_stride(),
        );
        let mut profiles: Vec<Vec<f32>> = Vec::new();
        let mut height = properties.height;
        let mut rejected = 0usize;

        for sample in sampler.by_ref() {
            match profiler.profile(&sample.frame) {
                Ok(profile) => {
                    if profiles.is_empty() {
                        height = sample.frame.rows().max(0) as u32;
                    }
                    profiles.push(profile);
                }
                Err(e) => {
                    warn!(index = sample.index, error = %e, "Frame could not be profiled, skipping");
                    rejected += 1;
                }
            }
        }
        let frames_skipped = sampler.skipped() + rejected;

        let width = match profiles.first() {
            Some(first) => first.len() as u32,
            None => return Err(MediaError::EmptyProfileSet),
        };

        let detection = ProfileAggregator::from_config(&self.config, width).detect(&profiles)?;
        let segments = SegmentBuilder::from_config(&self.config).build(&detection.centers, width);

        info!(
            profiles = profiles.len(),
            skipped = frames_skipped,
            width,
            boundaries = ?detection.centers,
            segments = segments.len(),
            "Coach boundaries located"
        );

        Ok(SegmentPlan {
            width,
            height,
            centers: detection.centers,
            segments,
            profiles_used: profiles.len(),
            frames_skipped,
            degenerate: detection.degenerate,
        })
    }

    /// Plan, rewind and write every coach of `source` under `out_dir`.
    pub fn split_source<S, B>(
        &self,
        source: &mut S,
        backend: &mut B,
        out_dir: &Path,
    ) -> MediaResult<SplitSummary>
    where
        S: FrameSource + ?Sized,
        B: OutputBackend,
    {
        let started = Instant::now();
        let properties = source.properties();

        let plan = self.plan(source)?;
        source.rewind()?;

        let outcome = SegmentedVideoWriter::new(backend, &self.config).write_all(
            source,
            &plan.segments,
            plan.height,
            properties.fps,
            out_dir,
        )?;

        let elapsed = started.elapsed();
        metrics::histogram!("coachcut_split_duration_seconds").record(elapsed.as_secs_f64());

        info!(
            train = %self.config.train_number,
            coaches = outcome.coaches.len(),
            frames = outcome.frames_processed,
            elapsed_ms = elapsed.as_millis() as u64,
            out_dir = %out_dir.display(),
            "Train split into coaches"
        );

        Ok(SplitSummary {
            train_number: self.config.train_number.clone(),
            video: properties,
            boundaries: plan.centers,
            profiles_used: plan.profiles_used,
            degenerate_profile: plan.degenerate,
            coaches: outcome.coaches,
            frames_processed: outcome.frames_processed,
        })
    }

    /// Split a video file with the OpenCV decoder and encoders.
    ///
    /// # Errors
    /// `VideoOpen` before any output is created when the video is unreadable.
    pub fn split(&self, video_path: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> MediaResult<SplitSummary> {
        let mut backend = OpenCvOutput::from_config(&self.config)?;
        let mut source = OpenCvSource::open(video_path, self.config.fallback_fps)?;
        self.split_source(&mut source, &mut backend, out_dir.as_ref())
    }
}

/// Split a train video on the blocking thread pool.
pub async fn split_train_video(
    video_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: SplitConfig,
) -> MediaResult<SplitSummary> {
    let video_path: PathBuf = video_path.as_ref().to_path_buf();
    let out_dir: PathBuf = out_dir.as_ref().to_path_buf();
    let splitter = CoachSplitter::new(config)?;

    tokio::task::spawn_blocking(move || splitter.split(&video_path, &out_dir))
        .await
        .map_err(|e| MediaError::internal(format!("Blocking task join error: {}", e)))?
}
