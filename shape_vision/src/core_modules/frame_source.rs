// THEORY:
// A `FrameSource` is a pull-based stream of decoded frames: each call either
// hands out the next frame or signals end-of-stream with `None`. There is no
// seeking and no pacing; the consumer pulls as fast as it can process.
//
// Sources own their input handle. Whatever native resource backs them (a file,
// a decoder context) must be released in `Drop`, so that the loop driver releases
// it on every exit path just by letting the source go out of scope.

use std::path::{Path, PathBuf};

use image::RgbImage;
use log::debug;

use crate::error::{Result, ShapeVisionError};

pub trait FrameSource {
    /// The next frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        (**self).next_frame()
    }
}

/// A still image decoded up front, yielded exactly once.
#[derive(Debug)]
pub struct ImageFileSource {
    path: PathBuf,
    frame: Option<RgbImage>,
}

impl ImageFileSource {
    /// Decodes the image at `path`. Fails with `ShapeVisionError::Open` when the
    /// file is missing or cannot be decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let frame = image::open(path)
            .map_err(|e| ShapeVisionError::open(path, e))?
            .to_rgb8();
        debug!(
            "decoded {} ({}x{})",
            path.display(),
            frame.width(),
            frame.height()
        );
        Ok(Self {
            path: path.to_path_buf(),
            frame: Some(frame),
        })
    }

    pub fn from_image(path: impl Into<PathBuf>, frame: RgbImage) -> Self {
        Self {
            path: path.into(),
            frame: Some(frame),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for ImageFileSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        Ok(self.frame.take())
    }
}
