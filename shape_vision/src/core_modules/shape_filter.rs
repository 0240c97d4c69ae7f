// THEORY:
// The `shape_filter` turns raw contours into shapes.
//
// 1.  **Noise rejection**: a contour enclosing less than `min_area` is dropped
//     before anything else is computed for it. The threshold depends on the
//     segmentation strategy, since edge noise produces many small closed loops.
// 2.  **Simplification**: survivors are reduced with a closed-curve
//     Douglas-Peucker pass whose tolerance is a fixed fraction of the contour's
//     perimeter, so large and small shapes are simplified to the same relative
//     precision.
// 3.  **Centroid**: moments of the simplified polygon give the marker position.
//     A polygon that collapsed to zero area keeps its outline but gets no marker.

use imageproc::geometry::arc_length;
use imageproc::point::Point;
use log::trace;

use crate::core_modules::contour_extractor::Contour;
use crate::core_modules::moments::{PolygonMoments, polygon_area};

/// A contour that survived filtering, in simplified form.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedShape {
    pub polygon: Vec<Point<i32>>,
    pub centroid: Option<Point<i32>>,
    /// Area of the source contour.
    pub area: f64,
}

impl DetectedShape {
    pub fn vertex_count(&self) -> usize {
        self.polygon.len()
    }
}

#[derive(Debug, Clone)]
pub struct ShapeFilter {
    min_area: f64,
    epsilon_ratio: f64,
}

impl ShapeFilter {
    pub fn new(min_area: f64, epsilon_ratio: f64) -> Self {
        Self {
            min_area,
            epsilon_ratio,
        }
    }

    pub fn filter(&self, contours: &[Contour]) -> Vec<DetectedShape> {
        contours.iter().filter_map(|c| self.shape_from(c)).collect()
    }

    /// `None` when the contour is below the area threshold.
    pub fn shape_from(&self, contour: &Contour) -> Option<DetectedShape> {
        let area = polygon_area(contour);
        if area < self.min_area {
            trace!("dropping contour of area {:.1} (< {:.1})", area, self.min_area);
            return None;
        }

        let epsilon = self.epsilon_ratio * arc_length(contour, true);
        let polygon = approximate_closed(contour, epsilon);
        let centroid = PolygonMoments::of(&polygon).centroid();

        Some(DetectedShape {
            polygon,
            centroid,
            area,
        })
    }
}

/// Douglas-Peucker simplification of a closed curve.
///
/// The curve is split at two mutually distant points, then each half is
/// simplified as an open polyline. Every point of the input lies within
/// `epsilon` of the returned polygon's boundary.
pub fn approximate_closed(curve: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = curve.len();
    if n < 3 {
        return curve.to_vec();
    }

    // Walk to the farthest point a few times so both anchors sit on the hull.
    let mut start = 0;
    let mut end = farthest_from(curve, start);
    for _ in 0..2 {
        let next = farthest_from(curve, end);
        start = end;
        end = next;
    }

    if distance(curve[start], curve[end]) <= epsilon {
        return vec![curve[start]];
    }

    let forward: Vec<Point<i32>> = (0..n)
        .map(|k| curve[(start + k) % n])
        .take((end + n - start) % n + 1)
        .collect();
    let backward: Vec<Point<i32>> = (0..n)
        .map(|k| curve[(end + k) % n])
        .take((start + n - end) % n + 1)
        .collect();

    let mut polygon = approximate_open(&forward, epsilon);
    polygon.pop();
    let mut rest = approximate_open(&backward, epsilon);
    rest.pop();
    polygon.extend(rest);
    polygon
}

/// Douglas-Peucker on an open polyline; both endpoints are always kept.
fn approximate_open(line: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if line.len() < 3 {
        return line.to_vec();
    }

    let first = line[0];
    let last = line[line.len() - 1];
    let (index, max_distance) = line[1..line.len() - 1]
        .iter()
        .enumerate()
        .map(|(i, &p)| (i + 1, distance_to_segment(p, first, last)))
        .fold((0, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

    if max_distance <= epsilon {
        return vec![first, last];
    }

    let mut left = approximate_open(&line[..=index], epsilon);
    left.pop();
    left.extend(approximate_open(&line[index..], epsilon));
    left
}

fn farthest_from(curve: &[Point<i32>], anchor: usize) -> usize {
    let origin = curve[anchor];
    (0..curve.len())
        .map(|i| (i, distance_squared(origin, curve[i])))
        .fold((anchor, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
        .0
}

fn distance_squared(a: Point<i32>, b: Point<i32>) -> i64 {
    let dx = (b.x - a.x) as i64;
    let dy = (b.y - a.y) as i64;
    dx * dx + dy * dy
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    (distance_squared(a, b) as f64).sqrt()
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// point distance when `a == b`.
fn distance_to_segment(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let length = distance(a, b);
    if length == 0.0 {
        return distance(p, a);
    }
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    ((p.y - a.y) as f64 * dx - (p.x - a.x) as f64 * dy).abs() / length
}
