//! Output streams for coach videos and thumbnails.

use std::path::{Path, PathBuf};

use opencv::{
    core::{Mat, Size, Vector},
    imgcodecs,
    prelude::*,
    videoio::VideoWriter,
};
use tracing::debug;

use coachcut_models::SplitConfig;

use crate::error::{MediaError, MediaResult};

/// An open output video accepting cropped frames in order.
pub trait FrameSink {
    /// Append one frame.
    fn write(&mut self, frame: &Mat) -> MediaResult<()>;

    /// Flush and close the stream. Called exactly once.
    fn finish(&mut self) -> MediaResult<()>;
}

/// Creates coach video streams and writes thumbnails.
pub trait OutputBackend {
    type Sink: FrameSink;

    /// Open a video of `width` x `height` frames at `fps`.
    fn open_video(&mut self, path: &Path, fps: f64, width: u32, height: u32)
        -> MediaResult<Self::Sink>;

    /// Encode `image` to `path`.
    fn write_thumbnail(&mut self, path: &Path, image: &Mat) -> MediaResult<()>;
}

/// OpenCV `VideoWriter` + `imwrite` backend.
#[derive(Debug, Clone, Copy)]
pub struct OpenCvOutput {
    fourcc: i32,
}

impl OpenCvOutput {
    pub fn new(fourcc: [char; 4]) -> MediaResult<Self> {
        let [a, b, c, d] = fourcc;
        Ok(Self {
            fourcc: VideoWriter::fourcc(a, b, c, d)?,
        })
    }

    pub fn from_config(config: &SplitConfig) -> MediaResult<Self> {
        Self::new(config.fourcc_chars()?)
    }
}

impl OutputBackend for OpenCvOutput {
    type Sink = OpenCvVideoSink;

    fn open_video(
        &mut self,
        path: &Path,
        fps: f64,
        width: u32,
        height: u32,
    ) -> MediaResult<Self::Sink> {
        let path_str = utf8_path(path)?;
        let size = Size::new(width as i32, height as i32);

        let writer = VideoWriter::new(path_str, self.fourcc, fps, size, true)
            .map_err(|e| MediaError::output_write(path, e.to_string()))?;
        if !writer.is_opened().unwrap_or(false) {
            return Err(MediaError::output_write(
                path,
                "no encoder accepted the requested codec",
            ));
        }

        debug!(path = %path.display(), width, height, fps, "Opened coach video");
        Ok(OpenCvVideoSink {
            path: path.to_path_buf(),
            writer,
            finished: false,
        })
    }

    fn write_thumbnail(&mut self, path: &Path, image: &Mat) -> MediaResult<()> {
        let path_str = utf8_path(path)?;
        let written = imgcodecs::imwrite(path_str, image, &Vector::<i32>::new())
            .map_err(|e| MediaError::output_write(path, e.to_string()))?;
        if !written {
            return Err(MediaError::output_write(path, "image encoder refused the thumbnail"));
        }
        Ok(())
    }
}

/// Coach video written through OpenCV.
pub struct OpenCvVideoSink {
    path: PathBuf,
    writer: VideoWriter,
    finished: bool,
}

impl FrameSink for OpenCvVideoSink {
    fn write(&mut self, frame: &Mat) -> MediaResult<()> {
        self.writer
            .write(frame)
            .map_err(|e| MediaError::output_write(&self.path, e.to_string()))
    }

    fn finish(&mut self) -> MediaResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer
            .release()
            .map_err(|e| MediaError::output_write(&self.path, e.to_string()))
    }
}

fn utf8_path(path: &Path) -> MediaResult<&str> {
    path.to_str()
        .ok_or_else(|| MediaError::output_write(path, "path is not valid UTF-8"))
}
