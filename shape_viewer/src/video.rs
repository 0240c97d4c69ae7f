use std::path::{Path, PathBuf};

use image::RgbImage;
use log::{debug, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use shape_vision::{FrameSource, Result, ShapeVisionError};

use crate::convert::bgr_mat_to_rgb;

/// Frames decoded from a video file by OpenCV's videoio backend.
///
/// The capture handle is released when the source is dropped.
pub struct VideoFileSource {
    path: PathBuf,
    capture: VideoCapture,
    frame: Mat,
}

impl VideoFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.to_string_lossy();

        let capture = VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|e| ShapeVisionError::open(path, e))?;
        if !capture.is_opened().map_err(|e| ShapeVisionError::open(path, e))? {
            return Err(ShapeVisionError::open(path, "no video backend could open the file"));
        }

        debug!(
            "opened {} ({}x{} @ {:.2} fps)",
            path.display(),
            capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or_default(),
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or_default(),
            capture.get(videoio::CAP_PROP_FPS).unwrap_or_default(),
        );

        Ok(Self {
            path: path.to_path_buf(),
            capture,
            frame: Mat::default(),
        })
    }
}

impl FrameSource for VideoFileSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let grabbed = self
            .capture
            .read(&mut self.frame)
            .map_err(|e| ShapeVisionError::Frame(Box::new(e)))?;
        if !grabbed || self.frame.empty() {
            return Ok(None);
        }
        bgr_mat_to_rgb(&self.frame).map(Some)
    }
}

impl Drop for VideoFileSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("failed to release {}: {}", self.path.display(), e);
        }
    }
}
