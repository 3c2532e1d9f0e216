//! Frame sources for the two passes over a train video.
//!
//! The profiling pass seeks to individual frames; the re-encode pass rewinds
//! once and then reads sequentially to the end.

use std::path::{Path, PathBuf};

use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use tracing::{debug, info, warn};

use coachcut_models::VideoProperties;

use crate::error::{MediaError, MediaResult};

/// Random-access source of decoded frames.
pub trait FrameSource {
    /// Properties reported when the source was opened.
    fn properties(&self) -> VideoProperties;

    /// Position the source so the next read returns frame `index`.
    fn seek(&mut self, index: u64) -> MediaResult<()>;

    /// Decode the next frame, `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> MediaResult<Option<Mat>>;

    /// Return to frame 0 before a full sequential pass.
    fn rewind(&mut self) -> MediaResult<()> {
        self.seek(0)
    }

    /// Release the underlying decoder.
    fn release(&mut self) -> MediaResult<()> {
        Ok(())
    }
}

/// Video file decoded through OpenCV's `VideoCapture`.
pub struct OpenCvSource {
    path: PathBuf,
    capture: VideoCapture,
    properties: VideoProperties,
}

impl OpenCvSource {
    /// Open a video file.
    ///
    /// `fallback_fps` is reported when the container carries no frame rate.
    ///
    /// # Errors
    /// `VideoOpen` when the file is missing or no backend can decode it.
    pub fn open(path: impl AsRef<Path>, fallback_fps: f64) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MediaError::video_open(path, "file does not exist"));
        }

        let capture = open_capture(path)?;
        let properties = read_properties(&capture, fallback_fps)?;

        info!(
            path = %path.display(),
            frames = properties.frame_count,
            fps = properties.fps,
            width = properties.width,
            height = properties.height,
            "Opened source video"
        );

        Ok(Self {
            path: path.to_path_buf(),
            capture,
            properties,
        })
    }

    /// Path of the opened file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for OpenCvSource {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn seek(&mut self, index: u64) -> MediaResult<()> {
        let accepted = self
            .capture
            .set(videoio::CAP_PROP_POS_FRAMES, index as f64)
            .map_err(|e| MediaError::frame_decode(index, format!("seek failed: {e}")))?;
        if accepted {
            Ok(())
        } else {
            Err(MediaError::frame_decode(index, "backend rejected seek"))
        }
    }

    fn read_frame(&mut self) -> MediaResult<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }

    fn rewind(&mut self) -> MediaResult<()> {
        match self.seek(0) {
            Ok(()) => Ok(()),
            Err(e) => {
                // Forward-only backends cannot seek back; start over from a fresh handle.
                warn!(path = %self.path.display(), error = %e, "Rewind rejected, reopening video");
                self.capture.release()?;
                self.capture = open_capture(&self.path)?;
                Ok(())
            }
        }
    }

    fn release(&mut self) -> MediaResult<()> {
        debug!(path = %self.path.display(), "Releasing source video");
        self.capture.release()?;
        Ok(())
    }
}

fn open_capture(path: &Path) -> MediaResult<VideoCapture> {
    let path_str = path
        .to_str()
        .ok_or_else(|| MediaError::video_open(path, "path is not valid UTF-8"))?;

    let capture = VideoCapture::from_file(path_str, videoio::CAP_ANY)
        .map_err(|e| MediaError::video_open(path, e.to_string()))?;
    if !capture.is_opened().unwrap_or(false) {
        return Err(MediaError::video_open(path, "no video backend could decode the file"));
    }

    Ok(capture)
}

fn read_properties(capture: &VideoCapture, fallback_fps: f64) -> MediaResult<VideoProperties> {
    let fps = capture.get(videoio::CAP_PROP_FPS)?;
    let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?;
    let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
    let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;

    Ok(VideoProperties {
        fps: if fps.is_finite() && fps > 0.0 { fps } else { fallback_fps },
        frame_count: non_negative(frame_count) as u64,
        width: non_negative(width) as u32,
        height: non_negative(height) as u32,
    })
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
