//! Conversions between OpenCV's BGR `Mat` and the `RgbImage` frames the
//! pipeline works on.

use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar},
    imgproc,
    prelude::*,
};
use shape_vision::ShapeVisionError;

/// Copies a decoded 8-bit BGR frame into an `RgbImage`.
pub fn bgr_mat_to_rgb(frame: &Mat) -> Result<RgbImage, ShapeVisionError> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(frame_error)?;

    let width = rgb.cols() as u32;
    let height = rgb.rows() as u32;
    let buffer = rgb.data_bytes().map_err(frame_error)?.to_vec();

    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        let message = format!("frame buffer does not hold {}x{} RGB pixels", width, height);
        ShapeVisionError::Frame(message.into())
    })
}

/// Builds a BGR `Mat` suitable for `highgui::imshow`.
pub fn rgb_to_bgr_mat(image: &RgbImage) -> opencv::Result<Mat> {
    let mut rgb = Mat::new_size_with_default(
        core::Size::new(image.width() as i32, image.height() as i32),
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(image.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn frame_error(e: opencv::Error) -> ShapeVisionError {
    ShapeVisionError::Frame(Box::new(e))
}
