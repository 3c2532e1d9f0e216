//! Boundary centers to coach segments.
//!
//! Cut points are `[0] + centers + [width]`. Intervals narrower than the
//! minimum width are absorbed into the previously emitted interval in a
//! single left-to-right pass; an interval never merges forward. A narrow
//! leftmost interval has nothing behind it and is kept as its own segment.

use coachcut_models::{ColumnSegment, SplitConfig};

/// Builds the final column segments of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBuilder {
    min_segment_ratio: f64,
}

impl Default for SegmentBuilder {
    fn default() -> Self {
        Self::new(coachcut_models::config::DEFAULT_MIN_SEGMENT_RATIO)
    }
}

impl SegmentBuilder {
    pub fn new(min_segment_ratio: f64) -> Self {
        Self { min_segment_ratio }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.min_segment_ratio)
    }

    /// Partition `[0, frame_width)` at `centers`.
    ///
    /// `centers` must be increasing; values outside the frame are ignored.
    /// Returns an empty list only for a zero-width frame.
    pub fn build(&self, centers: &[u32], frame_width: u32) -> Vec<ColumnSegment> {
        let min_width = self.min_segment_ratio * frame_width as f64;

        let mut cuts = Vec::with_capacity(centers.len() + 2);
        cuts.push(0);
        cuts.extend(centers.iter().copied().filter(|&c| c < frame_width));
        cuts.push(frame_width);

        let mut merged: Vec<ColumnSegment> = Vec::with_capacity(cuts.len() - 1);
        for pair in cuts.windows(2) {
            let interval = ColumnSegment::new(pair[0], pair[1]);
            let narrow = (interval.width() as f64) < min_width;
            match merged.last_mut() {
                Some(prev) if narrow => prev.end = interval.end,
                None if interval.width() == 0 => {}
                _ => merged.push(interval),
            }
        }

        merged
    }
}
