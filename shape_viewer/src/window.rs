use image::RgbImage;
use log::warn;
use opencv::highgui;
use shape_vision::{Presenter, Result, ShapeVisionError};

use crate::convert::rgb_to_bgr_mat;

/// A HighGUI window. Closing is tied to `Drop`, so the window goes away on
/// every exit path of the loop that owns it.
pub struct HighGuiWindow {
    name: String,
}

impl HighGuiWindow {
    pub fn open(name: &str) -> opencv::Result<Self> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        Ok(Self {
            name: name.to_string(),
        })
    }
}

impl Presenter for HighGuiWindow {
    fn show(&mut self, frame: &RgbImage) -> Result<()> {
        let bgr = rgb_to_bgr_mat(frame).map_err(display_error)?;
        highgui::imshow(&self.name, &bgr).map_err(display_error)
    }

    fn wait_key(&mut self, delay_ms: i32) -> Result<Option<char>> {
        let key = highgui::wait_key(delay_ms).map_err(display_error)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_all_windows() {
            warn!("failed to close window '{}': {}", self.name, e);
        }
    }
}

fn display_error(e: opencv::Error) -> ShapeVisionError {
    ShapeVisionError::Display(Box::new(e))
}
