// THEORY:
// The `contour_extractor` turns a cleaned mask into closed boundaries, one per
// connected foreground component. Only outermost borders are kept: hole borders
// and components nested inside holes are dropped, so a ring yields one contour.
//
// Tracing itself is imageproc's border following. The tracer never starts an
// outer border in the first column, so the mask is traced inside a one pixel
// zero frame and the points are shifted back afterwards. Regions touching any
// image edge, including a fully set mask, are then traced like interior ones.
//
// The traced boundary lists
// every border pixel; interior points of straight horizontal, vertical and
// diagonal runs carry no shape information and are removed, leaving the corner
// points only.

use image::{GrayImage, imageops};
use imageproc::contours::{self, BorderType};
use imageproc::point::Point;

/// A closed boundary, first point implicitly joined to the last.
pub type Contour = Vec<Point<i32>>;

/// Outer contours of all connected foreground (non-zero) regions of `mask`.
/// Enumeration order is whatever the tracer produces.
pub fn extract_outer_contours(mask: &GrayImage) -> Vec<Contour> {
    let padded = pad_with_background(mask);
    contours::find_contours::<i32>(&padded)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let points: Vec<Point<i32>> = c
                .points
                .iter()
                .map(|p| Point::new(p.x - 1, p.y - 1))
                .collect();
            compress_runs(&points)
        })
        .collect()
}

fn pad_with_background(mask: &GrayImage) -> GrayImage {
    let mut padded = GrayImage::new(mask.width() + 2, mask.height() + 2);
    imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Drops every point whose incoming and outgoing steps point the same way.
pub fn compress_runs(points: &[Point<i32>]) -> Contour {
    let mut points = points.to_vec();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |from: Point<i32>, to: Point<i32>| {
        ((to.x - from.x).signum(), (to.y - from.y).signum())
    };

    let compressed: Contour = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let current = points[i];
            let next = points[(i + 1) % n];
            step(prev, current) != step(current, next)
        })
        .map(|i| points[i])
        .collect();

    // A closed straight run (degenerate line) would otherwise vanish entirely.
    if compressed.is_empty() {
        points[..1].to_vec()
    } else {
        compressed
    }
}
