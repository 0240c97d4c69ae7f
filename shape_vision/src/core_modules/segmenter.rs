// THEORY:
// The `segmenter` decides which pixels might belong to a shape. It is the only
// stage that differs between the detection modes, so it sits behind the
// `Segmenter` trait and the rest of the pipeline never knows which strategy ran.
//
// 1.  **Color range**: the scene background is a fairly uniform hue band (grass).
//     Every pixel whose HSV triple falls inside that band is background; the mask
//     is the inverse. Cheap, and insensitive to lighting gradients inside the band.
// 2.  **Edges**: when no reliable background color exists, the frame is reduced to
//     grayscale, lightly blurred and run through Canny. The edge map is the mask;
//     it is noisier and relies on closing to turn edge fragments into loops.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;

use crate::config::StrategyConfig;

const FOREGROUND: Luma<u8> = Luma([255]);
const BACKGROUND: Luma<u8> = Luma([0]);

/// Produces a binary foreground mask for a frame.
pub trait Segmenter {
    /// The mask has the extent of `frame`; foreground is 255, background 0.
    fn segment(&self, frame: &RgbImage) -> GrayImage;

    fn name(&self) -> &'static str;
}

/// Builds the segmenter described by `config`.
pub fn from_config(config: &StrategyConfig) -> Box<dyn Segmenter> {
    match *config {
        StrategyConfig::ColorRange {
            lower_hsv,
            upper_hsv,
        } => Box::new(ColorRangeSegmenter::new(lower_hsv, upper_hsv)),
        StrategyConfig::Edge {
            blur_kernel,
            low_threshold,
            high_threshold,
        } => Box::new(EdgeSegmenter::new(blur_kernel, low_threshold, high_threshold)),
    }
}

#[derive(Debug, Clone)]
pub struct ColorRangeSegmenter {
    lower: [u8; 3],
    upper: [u8; 3],
}

impl ColorRangeSegmenter {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    fn is_background(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

impl Segmenter for ColorRangeSegmenter {
    fn segment(&self, frame: &RgbImage) -> GrayImage {
        GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
            if self.is_background(rgb_to_hsv(*frame.get_pixel(x, y))) {
                BACKGROUND
            } else {
                FOREGROUND
            }
        })
    }

    fn name(&self) -> &'static str {
        "color_range"
    }
}

#[derive(Debug, Clone)]
pub struct EdgeSegmenter {
    blur_kernel: u32,
    low_threshold: f32,
    high_threshold: f32,
}

impl EdgeSegmenter {
    pub fn new(blur_kernel: u32, low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            blur_kernel,
            low_threshold,
            high_threshold,
        }
    }

    fn blur(&self, gray: GrayImage) -> GrayImage {
        if self.blur_kernel <= 1 {
            return gray;
        }
        gaussian_blur_f32(&gray, sigma_for_kernel(self.blur_kernel))
    }
}

impl Segmenter for EdgeSegmenter {
    fn segment(&self, frame: &RgbImage) -> GrayImage {
        let gray = image::imageops::grayscale(frame);
        let blurred = self.blur(gray);
        canny(&blurred, self.low_threshold, self.high_threshold)
    }

    fn name(&self) -> &'static str {
        "edge"
    }
}

/// Standard deviation OpenCV derives for a Gaussian kernel of side `kernel`
/// when none is given explicitly.
fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Converts to 8-bit HSV: hue in 0..=179 (degrees halved), saturation and value
/// in 0..=255.
pub fn rgb_to_hsv(pixel: Rgb<u8>) -> [u8; 3] {
    let [r, g, b] = pixel.0.map(i32::from);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 { 0 } else { (255 * diff + v / 2) / v };

    let h = if diff == 0 {
        0.0
    } else {
        let diff = diff as f32;
        let degrees = if v == r {
            60.0 * (g - b) as f32 / diff
        } else if v == g {
            120.0 + 60.0 * (b - r) as f32 / diff
        } else {
            240.0 + 60.0 * (r - g) as f32 / diff
        };
        if degrees < 0.0 { degrees + 360.0 } else { degrees }
    };

    let h = ((h / 2.0).round() as i32) % 180;
    [h as u8, s as u8, v as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const GRASS: Rgb<u8> = Rgb([40, 120, 40]);

    #[test]
    fn hsv_of_primaries() {
        assert_eq!(rgb_to_hsv(Rgb([255, 0, 0])), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 255, 0])), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 255])), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(Rgb([0, 0, 0])), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(Rgb([128, 128, 128])), [0, 0, 128]);
    }

    #[test]
    fn hsv_wraps_negative_hue() {
        // Magenta-red: max is red and blue > green, so the raw hue is negative.
        let [h, _, _] = rgb_to_hsv(Rgb([255, 0, 128]));
        assert!(h > 150 && h < 180);
    }

    #[test]
    fn grass_is_background_and_shapes_are_foreground() {
        let mut frame = RgbImage::from_pixel(60, 40, GRASS);
        draw_filled_rect_mut(&mut frame, Rect::at(10, 10).of_size(20, 15), Rgb([200, 30, 30]));

        let mask = ColorRangeSegmenter::new([35, 50, 50], [95, 255, 155]).segment(&frame);

        assert_eq!(mask.dimensions(), frame.dimensions());
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(15, 15)[0], 255);
        assert_eq!(mask.pixels().filter(|p| p[0] == 255).count(), 20 * 15);
    }

    #[test]
    fn bright_green_above_value_band_is_foreground() {
        let frame = RgbImage::from_pixel(4, 4, Rgb([0, 255, 0]));
        let mask = ColorRangeSegmenter::new([35, 50, 50], [95, 255, 155]).segment(&frame);
        assert!(mask.pixels().all(|p| p[0] == 255));
    }

    #[test]
    fn uniform_frame_has_no_edges() {
        let frame = RgbImage::from_pixel(32, 32, Rgb([90, 90, 90]));
        let mask = EdgeSegmenter::new(1, 30.0, 130.0).segment(&frame);
        assert_eq!(mask.dimensions(), (32, 32));
        assert!(mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn edges_follow_a_high_contrast_boundary() {
        let mut frame = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        draw_filled_rect_mut(&mut frame, Rect::at(16, 16).of_size(32, 32), Rgb([255, 255, 255]));

        let mask = EdgeSegmenter::new(3, 30.0, 130.0).segment(&frame);

        assert!(mask.pixels().any(|p| p[0] == 255));
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(mask.get_pixel(32, 32)[0], 0);
        assert_eq!(mask.get_pixel(2, 2)[0], 0);
    }

    #[test]
    fn kernel_sigma_matches_opencv_rule() {
        assert!((sigma_for_kernel(3) - 0.8).abs() < 1e-6);
        assert!((sigma_for_kernel(5) - 1.1).abs() < 1e-6);
    }

    #[test]
    fn builds_from_config() {
        let segmenter = from_config(&crate::config::PipelineConfig::edge_based().segmentation);
        assert_eq!(segmenter.name(), "edge");
        let segmenter = from_config(&crate::config::PipelineConfig::color_range().segmentation);
        assert_eq!(segmenter.name(), "color_range");
    }
}
