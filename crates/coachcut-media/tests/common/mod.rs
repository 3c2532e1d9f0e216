//! Shared fixtures for the split pipeline tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC3},
    imgproc,
    prelude::*,
};

use coachcut_media::{FrameSink, FrameSource, MediaError, MediaResult, OutputBackend};
use coachcut_models::VideoProperties;

pub const WIDTH: i32 = 300;
pub const HEIGHT: i32 = 100;
/// Dark gap between the two coaches, columns `[145, 155)`.
pub const GAP_START: i32 = 145;
pub const GAP_END: i32 = 155;

const DARK: f64 = 30.0;
const BRIGHT: f64 = 220.0;
const STRIPE: i32 = 4;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("coachcut_media=debug")
        .try_init();
}

/// Two textured coaches separated by a plain dark gap.
///
/// Each coach is a run of 4-px vertical stripes, bright first when counted
/// outward from the gap.
pub fn two_coach_frame() -> Mat {
    let mut frame = flat_frame(WIDTH, HEIGHT, DARK);
    for col in 0..WIDTH {
        let offset = if col < GAP_START {
            GAP_START - 1 - col
        } else if col >= GAP_END {
            col - GAP_END
        } else {
            continue;
        };
        if (offset / STRIPE) % 2 == 0 {
            imgproc::rectangle(
                &mut frame,
                Rect::new(col, 0, 1, HEIGHT),
                Scalar::all(BRIGHT),
                imgproc::FILLED,
                imgproc::LINE_8,
                0,
            )
            .unwrap();
        }
    }
    frame
}

pub fn flat_frame(width: i32, height: i32, value: f64) -> Mat {
    Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(value)).unwrap()
}

/// In-memory video with optional frames that refuse to seek.
pub struct MemorySource {
    frames: Vec<Mat>,
    fps: f64,
    position: usize,
    pub unseekable: HashSet<u64>,
    pub rewinds: usize,
    pub released: bool,
}

impl MemorySource {
    pub fn new(frames: Vec<Mat>) -> Self {
        Self {
            frames,
            fps: 25.0,
            position: 0,
            unseekable: HashSet::new(),
            rewinds: 0,
            released: false,
        }
    }

    pub fn repeated(frame: &Mat, count: usize) -> Self {
        Self::new((0..count).map(|_| frame.try_clone().unwrap()).collect())
    }

    pub fn with_unseekable(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.unseekable.extend(indices);
        self
    }

    pub fn replace_frame(&mut self, index: usize, frame: Mat) {
        self.frames[index] = frame;
    }
}

impl FrameSource for MemorySource {
    fn properties(&self) -> VideoProperties {
        let (width, height) = self
            .frames
            .first()
            .map_or((0, 0), |f| (f.cols() as u32, f.rows() as u32));
        VideoProperties {
            fps: self.fps,
            frame_count: self.frames.len() as u64,
            width,
            height,
        }
    }

    fn seek(&mut self, index: u64) -> MediaResult<()> {
        if self.unseekable.contains(&index) {
            return Err(MediaError::frame_decode(index, "corrupt frame"));
        }
        self.position = index as usize;
        Ok(())
    }

    fn read_frame(&mut self) -> MediaResult<Option<Mat>> {
        let Some(frame) = self.frames.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(frame.try_clone()?))
    }

    fn rewind(&mut self) -> MediaResult<()> {
        self.rewinds += 1;
        self.position = 0;
        Ok(())
    }

    fn release(&mut self) -> MediaResult<()> {
        self.released = true;
        Ok(())
    }
}

/// What a recording sink saw.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedVideo {
    pub path: PathBuf,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub frames: u64,
    pub finished: bool,
}

/// Output backend that records calls and leaves placeholder files on disk.
#[derive(Default)]
pub struct RecordingOutput {
    pub videos: Rc<RefCell<Vec<RecordedVideo>>>,
    pub thumbnails: Vec<PathBuf>,
    /// Fail the n-th thumbnail write (0-based)
    pub fail_thumbnail_at: Option<usize>,
}

impl RecordingOutput {
    pub fn videos(&self) -> Vec<RecordedVideo> {
        self.videos.borrow().clone()
    }
}

pub struct RecordingSink {
    videos: Rc<RefCell<Vec<RecordedVideo>>>,
    slot: usize,
}

impl FrameSink for RecordingSink {
    fn write(&mut self, frame: &Mat) -> MediaResult<()> {
        let mut videos = self.videos.borrow_mut();
        let video = &mut videos[self.slot];
        if frame.cols() as u32 != video.width || frame.rows() as u32 != video.height {
            return Err(MediaError::output_write(&video.path, "frame size changed"));
        }
        video.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> MediaResult<()> {
        self.videos.borrow_mut()[self.slot].finished = true;
        Ok(())
    }
}

impl OutputBackend for RecordingOutput {
    type Sink = RecordingSink;

    fn open_video(
        &mut self,
        path: &Path,
        fps: f64,
        width: u32,
        height: u32,
    ) -> MediaResult<Self::Sink> {
        std::fs::write(path, b"").map_err(|e| MediaError::output_write(path, e.to_string()))?;
        let mut videos = self.videos.borrow_mut();
        videos.push(RecordedVideo {
            path: path.to_path_buf(),
            fps,
            width,
            height,
            frames: 0,
            finished: false,
        });
        Ok(RecordingSink {
            videos: Rc::clone(&self.videos),
            slot: videos.len() - 1,
        })
    }

    fn write_thumbnail(&mut self, path: &Path, image: &Mat) -> MediaResult<()> {
        if self.fail_thumbnail_at == Some(self.thumbnails.len()) {
            return Err(MediaError::output_write(path, "disk full"));
        }
        assert!(!image.empty());
        std::fs::write(path, b"jpeg").map_err(|e| MediaError::output_write(path, e.to_string()))?;
        self.thumbnails.push(path.to_path_buf());
        Ok(())
    }
}

/// Sub-directory names of `dir`, sorted.
pub fn folder_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
