//! Uniform frame sampling for the profiling pass.

use std::iter::StepBy;
use std::ops::Range;

#[cfg(feature = "opencv")]
use opencv::core::Mat;
#[cfg(feature = "opencv")]
use tracing::warn;

#[cfg(feature = "opencv")]
use crate::error::MediaResult;
#[cfg(feature = "opencv")]
use crate::source::FrameSource;

/// Frame indices `0, stride, 2 * stride, ... < total_frames`.
///
/// A stride of 0 behaves like 1.
pub fn sample_indices(total_frames: u64, stride: u32) -> StepBy<Range<u64>> {
    (0..total_frames).step_by(stride.max(1) as usize)
}

/// A decoded frame and its position in the source.
#[cfg(feature = "opencv")]
pub struct SampledFrame {
    pub index: u64,
    pub frame: Mat,
}

/// Lazily seeks and decodes every sampled index of a source.
///
/// Frames that fail to seek or decode are logged and skipped; the iterator
/// only yields frames that decoded.
#[cfg(feature = "opencv")]
pub struct FrameSampler<'a, S: FrameSource + ?Sized> {
    source: &'a mut S,
    indices: StepBy<Range<u64>>,
    sampled: usize,
    skipped: usize,
}

#[cfg(feature = "opencv")]
impl<'a, S: FrameSource + ?Sized> FrameSampler<'a, S> {
    pub fn new(source: &'a mut S, total_frames: u64, stride: u32) -> Self {
        Self {
            source,
            indices: sample_indices(total_frames, stride),
            sampled: 0,
            skipped: 0,
        }
    }

    /// Frames yielded so far.
    pub fn sampled(&self) -> usize {
        self.sampled
    }

    /// Indices skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode(&mut self, index: u64) -> MediaResult<Option<Mat>> {
        self.source.seek(index)?;
        self.source.read_frame()
    }
}

#[cfg(feature = "opencv")]
impl<S: FrameSource + ?Sized> Iterator for FrameSampler<'_, S> {
    type Item = SampledFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.indices.next()?;
            match self.decode(index) {
                Ok(Some(frame)) => {
                    self.sampled += 1;
                    metrics::counter!("coachcut_frames_sampled_total").increment(1);
                    return Some(SampledFrame { index, frame });
                }
                Ok(None) => {
                    warn!(index, "Sampled frame is empty, skipping");
                }
                Err(e) => {
                    warn!(index, error = %e, "Sampled frame could not be decoded, skipping");
                }
            }
            self.skipped += 1;
            metrics::counter!("coachcut_frames_skipped_total").increment(1);
        }
    }
}
