//! Per-frame vertical edge-density profiles.
//!
//! # Algorithm
//! 1. Convert the frame to grayscale
//! 2. Canny hysteresis edge extraction (binary 0/255 mask)
//! 3. Count edge pixels in every column
//! 4. Smooth the 1 x width count row with a 1-D Gaussian along the columns
//!
//! The smoothing hides single-column noise (poles, lettering) while wide
//! structural gaps between coaches survive.

use opencv::{
    core::{self, Mat, Size},
    imgproc,
    prelude::*,
};

use coachcut_models::config::odd_kernel_width;
use coachcut_models::SplitConfig;

use crate::error::{MediaError, MediaResult};

/// Sobel aperture used by the edge detector.
const CANNY_APERTURE: i32 = 3;

/// Turns one decoded frame into a column profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfiler {
    canny_low: f64,
    canny_high: f64,
    kernel_width: u32,
}

impl EdgeProfiler {
    /// Create a profiler; `smoothing_width` is forced to an odd value >= 1.
    pub fn new(canny_low: f64, canny_high: f64, smoothing_width: u32) -> Self {
        Self {
            canny_low,
            canny_high,
            kernel_width: odd_kernel_width(smoothing_width),
        }
    }

    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.canny_low, config.canny_high, config.smoothing_width)
    }

    /// Effective smoothing kernel width.
    pub fn kernel_width(&self) -> u32 {
        self.kernel_width
    }

    /// Compute the smoothed edge count of every column of `frame`.
    ///
    /// Accepts 1-, 3- (BGR) and 4-channel (BGRA) 8-bit frames. The result has
    /// exactly `frame.cols()` entries.
    pub fn profile(&self, frame: &Mat) -> MediaResult<Vec<f32>> {
        if frame.empty() {
            return Err(MediaError::internal("cannot profile an empty frame"));
        }

        let converted;
        let gray = match frame.channels() {
            1 => frame,
            3 => {
                converted = convert_to_gray(frame, imgproc::COLOR_BGR2GRAY)?;
                &converted
            }
            4 => {
                converted = convert_to_gray(frame, imgproc::COLOR_BGRA2GRAY)?;
                &converted
            }
            n => {
                return Err(MediaError::internal(format!(
                    "unsupported channel count {n} for edge profiling"
                )))
            }
        };

        let mut edges = Mat::default();
        imgproc::canny(
            gray,
            &mut edges,
            self.canny_low,
            self.canny_high,
            CANNY_APERTURE,
            false,
        )?;

        // Sum down every column into a single row; mask pixels are 0 or 255.
        let mut column_sums = Mat::default();
        core::reduce(&edges, &mut column_sums, 0, core::REDUCE_SUM, core::CV_32F)?;
        let mut counts = Mat::default();
        column_sums.convert_to(&mut counts, core::CV_32F, 1.0 / 255.0, 0.0)?;

        let mut smoothed = Mat::default();
        imgproc::gaussian_blur_def(
            &counts,
            &mut smoothed,
            Size::new(self.kernel_width as i32, 1),
            0.0,
        )?;

        Ok(smoothed.data_typed::<f32>()?.to_vec())
    }
}

fn convert_to_gray(frame: &Mat, code: i32) -> MediaResult<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, code)?;
    Ok(gray)
}
