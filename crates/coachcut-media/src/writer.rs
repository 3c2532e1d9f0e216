//! Second pass: crop every frame into per-coach videos and thumbnails.

use std::path::{Path, PathBuf};

use opencv::{
    core::{Mat, Rect},
    prelude::*,
};
use tracing::{debug, info};

use coachcut_models::{CoachSummary, ColumnSegment, SplitConfig, TrainNumber};

use crate::error::{MediaError, MediaResult};
use crate::output::{FrameSink, OutputBackend};
use crate::source::FrameSource;

/// Open output state of one coach.
struct CoachOutput<K: FrameSink> {
    index: usize,
    name: String,
    segment: ColumnSegment,
    folder: PathBuf,
    video_path: PathBuf,
    sink: K,
    thumbnails: Vec<PathBuf>,
    frames_written: u64,
}

impl<K: FrameSink> CoachOutput<K> {
    fn into_summary(self) -> CoachSummary {
        CoachSummary {
            index: self.index,
            name: self.name,
            segment: self.segment,
            folder: self.folder,
            video_path: self.video_path,
            thumbnails: self.thumbnails,
            frames_written: self.frames_written,
        }
    }
}

/// Result of a full re-encode pass.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOutcome {
    pub coaches: Vec<CoachSummary>,
    pub frames_processed: u64,
}

/// Fans every source frame out to one video per segment.
pub struct SegmentedVideoWriter<'a, B: OutputBackend> {
    backend: &'a mut B,
    train_number: TrainNumber,
    video_extension: String,
    thumbnail_interval: u64,
}

impl<'a, B: OutputBackend> SegmentedVideoWriter<'a, B> {
    pub fn new(backend: &'a mut B, config: &SplitConfig) -> Self {
        Self {
            backend,
            train_number: config.train_number.clone(),
            video_extension: config.video_extension.clone(),
            thumbnail_interval: config.thumbnail_interval.max(1),
        }
    }

    /// Read `source` to the end, writing each segment's crop of every frame.
    ///
    /// `source` must already be positioned at frame 0. It is released once the
    /// pass ends, whether or not it succeeded.
    ///
    /// # Errors
    /// `OutputWrite` when a folder, stream or thumbnail cannot be written,
    /// `FrameGeometry` when a frame cannot hold the planned segments.
    pub fn write_all<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        segments: &[ColumnSegment],
        frame_height: u32,
        fps: f64,
        out_dir: &Path,
    ) -> MediaResult<WriteOutcome> {
        let result = self.run(source, segments, frame_height, fps, out_dir);
        let released = source.release();
        let outcome = result?;
        released?;
        Ok(outcome)
    }

    fn run<S: FrameSource + ?Sized>(
        &mut self,
        source: &mut S,
        segments: &[ColumnSegment],
        frame_height: u32,
        fps: f64,
        out_dir: &Path,
    ) -> MediaResult<WriteOutcome> {
        let plan_width = segments.last().map_or(0, |s| s.end);
        let mut outputs = self.open_outputs(segments, frame_height, fps, out_dir)?;

        let mut frame_idx: u64 = 0;
        while let Some(frame) = source.read_frame()? {
            check_geometry(&frame, frame_idx, plan_width, frame_height)?;
            let thumbnail_due = frame_idx % self.thumbnail_interval == 0;

            for output in outputs.iter_mut() {
                let crop = crop_columns(&frame, output.segment, frame_height)?;
                output.sink.write(&crop)?;
                output.frames_written += 1;

                if thumbnail_due {
                    let n = output.thumbnails.len() as u32 + 1;
                    let path = output
                        .folder
                        .join(self.train_number.thumbnail_file_name(output.index, n));
                    self.backend.write_thumbnail(&path, &crop)?;
                    output.thumbnails.push(path);
                    metrics::counter!("coachcut_thumbnails_written_total").increment(1);
                }
            }

            metrics::counter!("coachcut_frames_written_total").increment(1);
            frame_idx += 1;
        }

        for output in outputs.iter_mut() {
            output.sink.finish()?;
            debug!(
                coach = %output.name,
                frames = output.frames_written,
                thumbnails = output.thumbnails.len(),
                "Closed coach video"
            );
        }

        info!(
            frames = frame_idx,
            coaches = outputs.len(),
            "Re-encode pass complete"
        );

        Ok(WriteOutcome {
            coaches: outputs.into_iter().map(CoachOutput::into_summary).collect(),
            frames_processed: frame_idx,
        })
    }

    fn open_outputs(
        &mut self,
        segments: &[ColumnSegment],
        frame_height: u32,
        fps: f64,
        out_dir: &Path,
    ) -> MediaResult<Vec<CoachOutput<B::Sink>>> {
        let mut outputs = Vec::with_capacity(segments.len());

        for (i, segment) in segments.iter().enumerate() {
            let index = i + 1;
            let name = self.train_number.coach_name(index);
            let folder = out_dir.join(&name);
            std::fs::create_dir_all(&folder)
                .map_err(|e| MediaError::output_write(&folder, e.to_string()))?;

            let video_path = folder.join(
                self.train_number
                    .video_file_name(index, &self.video_extension),
            );
            let sink = self
                .backend
                .open_video(&video_path, fps, segment.width(), frame_height)?;

            debug!(
                coach = %name,
                start = segment.start,
                end = segment.end,
                path = %video_path.display(),
                "Opened coach output"
            );

            outputs.push(CoachOutput {
                index,
                name,
                segment: *segment,
                folder,
                video_path,
                sink,
                thumbnails: Vec::new(),
                frames_written: 0,
            });
        }

        Ok(outputs)
    }
}

fn check_geometry(frame: &Mat, index: u64, plan_width: u32, frame_height: u32) -> MediaResult<()> {
    let found_width = frame.cols().max(0) as u32;
    let found_height = frame.rows().max(0) as u32;
    if found_width < plan_width || found_height != frame_height {
        return Err(MediaError::FrameGeometry {
            index,
            width: plan_width,
            height: frame_height,
            found_width,
            found_height,
        });
    }
    Ok(())
}

/// Copy columns `[segment.start, segment.end)` into an owned frame.
pub fn crop_columns(frame: &Mat, segment: ColumnSegment, frame_height: u32) -> MediaResult<Mat> {
    let rect = Rect::new(
        segment.start as i32,
        0,
        segment.width() as i32,
        frame_height as i32,
    );
    let roi = Mat::roi(frame, rect)?;
    let mut owned = Mat::default();
    roi.copy_to(&mut owned)?;
    Ok(owned)
}
