//! Splitter configuration.
//!
//! Every tunable of the boundary search and the re-encode pass lives here so
//! the pipeline never reads process-wide state. The defaults reproduce the
//! behaviour tuned for side-view footage of passenger trains.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::train::TrainNumber;

/// Frames between two profiling samples.
pub const DEFAULT_SAMPLE_STRIDE: u32 = 30;
/// Lower hysteresis threshold of the edge detector (0-255 intensity scale).
pub const DEFAULT_CANNY_LOW: f64 = 50.0;
/// Upper hysteresis threshold of the edge detector.
pub const DEFAULT_CANNY_HIGH: f64 = 150.0;
/// Width of the 1-D Gaussian applied to each column profile.
pub const DEFAULT_SMOOTHING_WIDTH: u32 = 51;
/// Normalised density below which a column counts as part of a valley.
pub const DEFAULT_VALLEY_THRESHOLD: f64 = 0.20;
/// Valley clustering distance as a fraction of frame width.
pub const DEFAULT_MIN_DISTANCE_RATIO: f64 = 0.02;
/// Segments narrower than this fraction of frame width are merged away.
pub const DEFAULT_MIN_SEGMENT_RATIO: f64 = 0.1;
/// One thumbnail per coach every this many frames.
pub const DEFAULT_THUMBNAIL_INTERVAL: u64 = 30;
/// Frame rate used when the source does not report one.
pub const DEFAULT_FALLBACK_FPS: f64 = 25.0;
/// FourCC of the per-coach output videos.
pub const DEFAULT_VIDEO_FOURCC: &str = "mp4v";
/// Container extension of the per-coach output videos.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("canny_low ({low}) must not exceed canny_high ({high})")]
    InvertedThresholds { low: f64, high: f64 },

    #[error("video_fourcc must be exactly four ASCII characters, got {0:?}")]
    InvalidFourcc(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Configuration for one column-split run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SplitConfig {
    /// Train identifier used in folder and file names.
    #[serde(default)]
    pub train_number: TrainNumber,

    /// Frames between profiling samples (0 behaves like 1).
    #[serde(default = "default_sample_stride")]
    pub sample_stride: u32,

    /// Lower Canny threshold.
    #[serde(default = "default_canny_low")]
    pub canny_low: f64,

    /// Upper Canny threshold.
    #[serde(default = "default_canny_high")]
    pub canny_high: f64,

    /// Requested smoothing kernel width; see [`SplitConfig::kernel_width`].
    #[serde(default = "default_smoothing_width")]
    pub smoothing_width: u32,

    /// Normalised density threshold for valley columns.
    #[serde(default = "default_valley_threshold")]
    pub valley_threshold: f64,

    /// Valley clustering distance as a fraction of frame width.
    #[serde(default = "default_min_distance_ratio")]
    pub min_distance_ratio: f64,

    /// Minimum segment width as a fraction of frame width.
    #[serde(default = "default_min_segment_ratio")]
    pub min_segment_ratio: f64,

    /// Thumbnail cadence in frames of the full pass.
    #[serde(default = "default_thumbnail_interval")]
    pub thumbnail_interval: u64,

    /// Output frame rate when the source reports none.
    #[serde(default = "default_fallback_fps")]
    pub fallback_fps: f64,

    /// FourCC code for output videos (e.g. "mp4v", "MJPG").
    #[serde(default = "default_video_fourcc")]
    pub video_fourcc: String,

    /// Output video container extension without the dot.
    #[serde(default = "default_video_extension")]
    pub video_extension: String,
}

fn default_sample_stride() -> u32 {
    DEFAULT_SAMPLE_STRIDE
}
fn default_canny_low() -> f64 {
    DEFAULT_CANNY_LOW
}
fn default_canny_high() -> f64 {
    DEFAULT_CANNY_HIGH
}
fn default_smoothing_width() -> u32 {
    DEFAULT_SMOOTHING_WIDTH
}
fn default_valley_threshold() -> f64 {
    DEFAULT_VALLEY_THRESHOLD
}
fn default_min_distance_ratio() -> f64 {
    DEFAULT_MIN_DISTANCE_RATIO
}
fn default_min_segment_ratio() -> f64 {
    DEFAULT_MIN_SEGMENT_RATIO
}
fn default_thumbnail_interval() -> u64 {
    DEFAULT_THUMBNAIL_INTERVAL
}
fn default_fallback_fps() -> f64 {
    DEFAULT_FALLBACK_FPS
}
fn default_video_fourcc() -> String {
    DEFAULT_VIDEO_FOURCC.to_string()
}
fn default_video_extension() -> String {
    DEFAULT_VIDEO_EXTENSION.to_string()
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_number: TrainNumber::default(),
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            smoothing_width: DEFAULT_SMOOTHING_WIDTH,
            valley_threshold: DEFAULT_VALLEY_THRESHOLD,
            min_distance_ratio: DEFAULT_MIN_DISTANCE_RATIO,
            min_segment_ratio: DEFAULT_MIN_SEGMENT_RATIO,
            thumbnail_interval: DEFAULT_THUMBNAIL_INTERVAL,
            fallback_fps: DEFAULT_FALLBACK_FPS,
            video_fourcc: DEFAULT_VIDEO_FOURCC.to_string(),
            video_extension: DEFAULT_VIDEO_EXTENSION.to_string(),
        }
    }
}

impl SplitConfig {
    /// Create a configuration with default tuning for the given train.
    pub fn new(train_number: impl Into<TrainNumber>) -> Self {
        Self {
            train_number: train_number.into(),
            ..Default::default()
        }
    }

    /// Create config from environment variables, falling back to defaults.
    ///
    /// Reads `COACHCUT_TRAIN_NUMBER`, `COACHCUT_SAMPLE_STRIDE`,
    /// `COACHCUT_CANNY_LOW`, `COACHCUT_CANNY_HIGH`, `COACHCUT_SMOOTHING_WIDTH`,
    /// `COACHCUT_VALLEY_THRESHOLD`, `COACHCUT_MIN_DISTANCE_RATIO`,
    /// `COACHCUT_MIN_SEGMENT_RATIO`, `COACHCUT_THUMBNAIL_INTERVAL`,
    /// `COACHCUT_FALLBACK_FPS`, `COACHCUT_VIDEO_FOURCC` and
    /// `COACHCUT_VIDEO_EXTENSION`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(default)
        }

        Self {
            train_number: std::env::var("COACHCUT_TRAIN_NUMBER")
                .map(TrainNumber::from)
                .unwrap_or_default(),
            sample_stride: parsed("COACHCUT_SAMPLE_STRIDE", DEFAULT_SAMPLE_STRIDE),
            canny_low: parsed("COACHCUT_CANNY_LOW", DEFAULT_CANNY_LOW),
            canny_high: parsed("COACHCUT_CANNY_HIGH", DEFAULT_CANNY_HIGH),
            smoothing_width: parsed("COACHCUT_SMOOTHING_WIDTH", DEFAULT_SMOOTHING_WIDTH),
            valley_threshold: parsed("COACHCUT_VALLEY_THRESHOLD", DEFAULT_VALLEY_THRESHOLD),
            min_distance_ratio: parsed("COACHCUT_MIN_DISTANCE_RATIO", DEFAULT_MIN_DISTANCE_RATIO),
            min_segment_ratio: parsed("COACHCUT_MIN_SEGMENT_RATIO", DEFAULT_MIN_SEGMENT_RATIO),
            thumbnail_interval: parsed("COACHCUT_THUMBNAIL_INTERVAL", DEFAULT_THUMBNAIL_INTERVAL),
            fallback_fps: parsed("COACHCUT_FALLBACK_FPS", DEFAULT_FALLBACK_FPS),
            video_fourcc: std::env::var("COACHCUT_VIDEO_FOURCC")
                .unwrap_or_else(|_| DEFAULT_VIDEO_FOURCC.to_string()),
            video_extension: std::env::var("COACHCUT_VIDEO_EXTENSION")
                .unwrap_or_else(|_| DEFAULT_VIDEO_EXTENSION.to_string()),
        }
    }

    /// Builder-style setter for the train number.
    pub fn with_train_number(mut self, train_number: impl Into<TrainNumber>) -> Self {
        self.train_number = train_number.into();
        self
    }

    /// Builder-style setter for the sampling stride.
    pub fn with_sample_stride(mut self, stride: u32) -> Self {
        self.sample_stride = stride;
        self
    }

    /// Builder-style setter for the Canny thresholds.
    pub fn with_canny_thresholds(mut self, low: f64, high: f64) -> Self {
        self.canny_low = low;
        self.canny_high = high;
        self
    }

    /// Builder-style setter for the profile smoothing width.
    pub fn with_smoothing_width(mut self, width: u32) -> Self {
        self.smoothing_width = width;
        self
    }

    /// Builder-style setter for the valley threshold, clamped to `[0, 1]`.
    pub fn with_valley_threshold(mut self, threshold: f64) -> Self {
        self.valley_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder-style setter for the minimum segment ratio, clamped to `[0, 1]`.
    pub fn with_min_segment_ratio(mut self, ratio: f64) -> Self {
        self.min_segment_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Builder-style setter for the thumbnail cadence.
    pub fn with_thumbnail_interval(mut self, interval: u64) -> Self {
        self.thumbnail_interval = interval;
        self
    }

    /// Builder-style setter for the output codec and container.
    pub fn with_video_format(mut self, fourcc: impl Into<String>, extension: impl Into<String>) -> Self {
        self.video_fourcc = fourcc.into();
        self.video_extension = extension.into();
        self
    }

    /// Sampling stride, never zero.
    pub fn effective_stride(&self) -> u32 {
        self.sample_stride.max(1)
    }

    /// Smoothing kernel width forced to an odd value >= 1.
    pub fn kernel_width(&self) -> u32 {
        odd_kernel_width(self.smoothing_width)
    }

    /// Valley clustering distance in columns for a frame of `frame_width`.
    pub fn min_distance(&self, frame_width: u32) -> u32 {
        (self.min_distance_ratio * frame_width as f64).floor() as u32
    }

    /// Minimum segment width in columns (fractional) for a frame of `frame_width`.
    pub fn min_segment_width(&self, frame_width: u32) -> f64 {
        self.min_segment_ratio * frame_width as f64
    }

    /// FourCC as four characters.
    pub fn fourcc_chars(&self) -> Result<[char; 4], ConfigError> {
        let chars: Vec<char> = self.video_fourcc.chars().collect();
        match chars.as_slice() {
            [a, b, c, d] if chars.iter().all(char::is_ascii) => Ok([*a, *b, *c, *d]),
            _ => Err(ConfigError::InvalidFourcc(self.video_fourcc.clone())),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.train_number.as_str().trim().is_empty() {
            return Err(ConfigError::Empty("train_number"));
        }
        check_range("canny_low", self.canny_low, 0.0, 255.0 * 8.0)?;
        check_range("canny_high", self.canny_high, 0.0, 255.0 * 8.0)?;
        if self.canny_low > self.canny_high {
            return Err(ConfigError::InvertedThresholds {
                low: self.canny_low,
                high: self.canny_high,
            });
        }
        // The Gaussian kernel size is handed to OpenCV as an i32.
        check_range("smoothing_width", self.kernel_width() as f64, 1.0, i32::MAX as f64)?;
        check_range("valley_threshold", self.valley_threshold, 0.0, 1.0)?;
        check_range("min_distance_ratio", self.min_distance_ratio, 0.0, 1.0)?;
        check_range("min_segment_ratio", self.min_segment_ratio, 0.0, 1.0)?;
        check_range("fallback_fps", self.fallback_fps, f64::MIN_POSITIVE, 1000.0)?;
        if self.thumbnail_interval == 0 {
            return Err(ConfigError::OutOfRange {
                field: "thumbnail_interval",
                value: 0.0,
                min: 1.0,
                max: u64::MAX as f64,
            });
        }
        if self.video_extension.trim().is_empty() {
            return Err(ConfigError::Empty("video_extension"));
        }
        self.fourcc_chars()?;
        Ok(())
    }
}

/// Force a kernel width to the nearest odd value >= 1 (even widths round up).
///
/// ```
/// use coachcut_models::config::odd_kernel_width;
///
/// assert_eq!(odd_kernel_width(51), 51);
/// assert_eq!(odd_kernel_width(50), 51);
/// assert_eq!(odd_kernel_width(0), 1);
/// ```
pub fn odd_kernel_width(width: u32) -> u32 {
    width | 1
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SplitConfig::default();
        assert_eq!(config.sample_stride, 30);
        assert_eq!(config.kernel_width(), 51);
        assert!((config.valley_threshold - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.thumbnail_interval, 30);
        assert_eq!(config.train_number.as_str(), "12309");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_derived_distances() {
        let config = SplitConfig::default();
        assert_eq!(config.min_distance(300), 6);
        assert_eq!(config.min_distance(1920), 38);
        assert!((config.min_segment_width(300) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_kernel_width_forced_odd() {
        assert_eq!(SplitConfig::default().with_smoothing_width(50).kernel_width(), 51);
        assert_eq!(SplitConfig::default().with_smoothing_width(0).kernel_width(), 1);
        assert_eq!(SplitConfig::default().with_smoothing_width(7).kernel_width(), 7);
    }

    #[test]
    fn test_zero_stride_behaves_like_one() {
        assert_eq!(SplitConfig::default().with_sample_stride(0).effective_stride(), 1);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SplitConfig::new("DHN-1")
            .with_sample_stride(10)
            .with_valley_threshold(1.7)
            .with_video_format("MJPG", "avi");

        assert_eq!(config.train_number.as_str(), "DHN-1");
        assert_eq!(config.sample_stride, 10);
        assert!((config.valley_threshold - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.fourcc_chars().unwrap(), ['M', 'J', 'P', 'G']);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let inverted = SplitConfig::default().with_canny_thresholds(200.0, 100.0);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvertedThresholds { .. })
        ));

        let bad_fourcc = SplitConfig::default().with_video_format("h264x", "mp4");
        assert!(matches!(bad_fourcc.validate(), Err(ConfigError::InvalidFourcc(_))));

        let no_thumbs = SplitConfig::default().with_thumbnail_interval(0);
        assert!(no_thumbs.validate().is_err());

        let blank = SplitConfig::new("  ");
        assert_eq!(blank.validate(), Err(ConfigError::Empty("train_number")));
    }

    #[test]
    fn test_validate_rejects_oversized_kernel() {
        let huge = SplitConfig::default().with_smoothing_width(u32::MAX);
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::OutOfRange {
                field: "smoothing_width",
                ..
            })
        ));

        let largest = SplitConfig::default().with_smoothing_width(i32::MAX as u32 - 1);
        assert!(largest.validate().is_ok());
    }

    #[test]
    fn test_min_segment_ratio_clamped() {
        let config = SplitConfig::default().with_min_segment_ratio(2.5);
        assert!((config.min_segment_ratio - 1.0).abs() < f64::EPSILON);
        assert!((config.min_segment_width(300) - 300.0).abs() < 1e-9);

        let config = SplitConfig::default().with_min_segment_ratio(-0.3);
        assert_eq!(config.min_segment_width(300), 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_env_parses_or_falls_back() {
        std::env::set_var("COACHCUT_TRAIN_NUMBER", "22691");
        std::env::set_var("COACHCUT_SAMPLE_STRIDE", " 12 ");
        std::env::set_var("COACHCUT_CANNY_LOW", "not-a-number");
        std::env::set_var("COACHCUT_VIDEO_FOURCC", "MJPG");

        let config = SplitConfig::from_env();

        for key in [
            "COACHCUT_TRAIN_NUMBER",
            "COACHCUT_SAMPLE_STRIDE",
            "COACHCUT_CANNY_LOW",
            "COACHCUT_VIDEO_FOURCC",
        ] {
            std::env::remove_var(key);
        }

        assert_eq!(config.train_number.as_str(), "22691");
        assert_eq!(config.sample_stride, 12);
        assert_eq!(config.canny_low, DEFAULT_CANNY_LOW);
        assert_eq!(config.canny_high, DEFAULT_CANNY_HIGH);
        assert_eq!(config.video_fourcc, "MJPG");
        assert_eq!(config.video_extension, DEFAULT_VIDEO_EXTENSION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: SplitConfig =
            serde_json::from_str(r#"{"train_number": "777", "sample_stride": 10}"#).unwrap();
        assert_eq!(config.train_number.as_str(), "777");
        assert_eq!(config.sample_stride, 10);
        assert_eq!(config.smoothing_width, DEFAULT_SMOOTHING_WIDTH);
        assert_eq!(config.video_extension, "mp4");
    }
}
