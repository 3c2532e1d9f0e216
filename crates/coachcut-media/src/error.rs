//! Error types for media operations.

use std::path::{Path, PathBuf};
use thiserror::Error;

use coachcut_models::ConfigError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while splitting a train video.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to open video {path}: {message}")]
    VideoOpen { path: PathBuf, message: String },

    #[error("Failed to decode frame {index}: {message}")]
    FrameDecode { index: u64, message: String },

    #[error("Frame {index} is {found_width}x{found_height}, expected {width}x{height}")]
    FrameGeometry {
        index: u64,
        width: u32,
        height: u32,
        found_width: u32,
        found_height: u32,
    },

    #[error("No frame profiles could be computed; check that the video is readable")]
    EmptyProfileSet,

    #[error("Profile length mismatch: expected {expected} columns, found {found}")]
    ProfileLengthMismatch { expected: usize, found: usize },

    #[error("Failed to write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a video open failure error.
    pub fn video_open(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::VideoOpen {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a frame decode failure error.
    pub fn frame_decode(index: u64, message: impl Into<String>) -> Self {
        Self::FrameDecode {
            index,
            message: message.into(),
        }
    }

    /// Create an output write failure error.
    pub fn output_write(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::OutputWrite {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
