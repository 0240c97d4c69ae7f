// THEORY:
// The `annotator` is the only stage that writes pixels of the frame the user
// sees, and it always writes to a copy. Each detected polygon is outlined as a
// closed loop of line segments, and a filled disc marks its centroid when the
// centroid is defined. A shape with zero area keeps its outline but gets no
// marker.
//
// imageproc draws 1px segments only. A thicker outline is a stack of segments
// shifted over a `thickness x thickness` block of offsets centred on the
// original line.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use imageproc::point::Point;

use crate::config::AnnotationConfig;
use crate::core_modules::shape_filter::DetectedShape;

/// Draws detected shapes onto a copy of a frame.
#[derive(Debug, Clone)]
pub struct Annotator {
    outline_color: Rgb<u8>,
    outline_thickness: u32,
    marker_color: Rgb<u8>,
    marker_radius: u32,
}

impl Annotator {
    pub fn new(config: &AnnotationConfig) -> Self {
        Self {
            outline_color: Rgb(config.outline_color),
            outline_thickness: config.outline_thickness,
            marker_color: Rgb(config.marker_color),
            marker_radius: config.marker_radius,
        }
    }

    /// Returns a copy of `frame` with every polygon outlined and every defined
    /// centroid marked. `frame` itself is never touched.
    pub fn annotate(&self, frame: &RgbImage, shapes: &[DetectedShape]) -> RgbImage {
        let mut canvas = frame.clone();
        for shape in shapes {
            self.draw_outline(&mut canvas, &shape.polygon);
            if let Some(centroid) = shape.centroid {
                draw_filled_circle_mut(
                    &mut canvas,
                    (centroid.x, centroid.y),
                    self.marker_radius as i32,
                    self.marker_color,
                );
            }
        }
        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbImage, polygon: &[Point<i32>]) {
        let n = polygon.len();
        if n == 0 || self.outline_thickness == 0 {
            return;
        }

        let thickness = self.outline_thickness as i32;
        let first = -(thickness / 2);
        let offsets = first..first + thickness;
        for dy in offsets.clone() {
            for dx in offsets.clone() {
                for i in 0..n {
                    let a = polygon[i];
                    let b = polygon[(i + 1) % n];
                    draw_line_segment_mut(
                        canvas,
                        ((a.x + dx) as f32, (a.y + dy) as f32),
                        ((b.x + dx) as f32, (b.y + dy) as f32),
                        self.outline_color,
                    );
                }
            }
        }
    }
}
