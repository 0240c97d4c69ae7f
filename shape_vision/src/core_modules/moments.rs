// THEORY:
// Spatial moments of a simple polygon, computed from its vertices with Green's
// theorem rather than by rasterising the interior. Only the orders the detector
// needs are kept: `m00` (enclosed area) and `m10`/`m01` (first moments), which
// give the centroid `(m10 / m00, m01 / m00)`.
//
// Vertex order does not matter: a clockwise polygon produces negative raw sums,
// and all three are flipped together so `m00` is always the unsigned area.

use imageproc::point::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    pub fn of(polygon: &[Point<i32>]) -> Self {
        let n = polygon.len();
        if n < 3 {
            return Self::default();
        }

        let mut a00 = 0.0;
        let mut a10 = 0.0;
        let mut a01 = 0.0;

        for i in 0..n {
            let prev = polygon[(i + n - 1) % n];
            let cur = polygon[i];
            let (xp, yp) = (prev.x as f64, prev.y as f64);
            let (xc, yc) = (cur.x as f64, cur.y as f64);

            let cross = xp * yc - xc * yp;
            a00 += cross;
            a10 += cross * (xp + xc);
            a01 += cross * (yp + yc);
        }

        let sign = if a00 < 0.0 { -1.0 } else { 1.0 };
        Self {
            m00: sign * a00 / 2.0,
            m10: sign * a10 / 6.0,
            m01: sign * a01 / 6.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.m00
    }

    /// Centroid truncated to integer pixel coordinates; `None` when the polygon
    /// encloses no area.
    pub fn centroid(&self) -> Option<Point<i32>> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as i32,
            (self.m01 / self.m00) as i32,
        ))
    }
}

/// Unsigned area enclosed by a closed polygon.
pub fn polygon_area(polygon: &[Point<i32>]) -> f64 {
    PolygonMoments::of(polygon).area()
}
