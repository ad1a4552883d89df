//! # Plane Geometry
//!
//! The handful of 2D predicates the model needs: segment intersection for
//! polygon simplicity, closest points for edge snapping, and centroids for
//! anchoring room nodes.

use crate::Point;
use crate::primitives::GEOMETRY_EPSILON;

/// Signed area of the triangle `(a, b, c)`, doubled.
///
/// Positive when `c` lies to the left of `a → b`.
#[must_use]
pub fn cross(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn sign(v: f64) -> i8 {
    if v > GEOMETRY_EPSILON {
        1
    } else if v < -GEOMETRY_EPSILON {
        -1
    } else {
        0
    }
}

/// `p` lies within the bounding box of `a`–`b` (used for collinear cases).
fn within_box(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

/// Whether closed segments `p1–p2` and `p3–p4` share at least one point.
///
/// Touching endpoints and collinear overlap count as intersection.
#[must_use]
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let d1 = sign(cross(p3, p4, p1));
    let d2 = sign(cross(p3, p4, p2));
    let d3 = sign(cross(p1, p2, p3));
    let d4 = sign(cross(p1, p2, p4));

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && within_box(p3, p4, p1))
        || (d2 == 0 && within_box(p3, p4, p2))
        || (d3 == 0 && within_box(p1, p2, p3))
        || (d4 == 0 && within_box(p1, p2, p4))
}

/// Boundary segments of an implicitly closed polygon, with their index.
///
/// Segment `i` runs from vertex `i` to vertex `i + 1`; the last one closes
/// the ring. A two-vertex polygon has a single segment.
pub fn polygon_segments(polygon: &[Point]) -> impl Iterator<Item = (usize, Point, Point)> + '_ {
    let n = polygon.len();
    let count = match n {
        0 | 1 => 0,
        2 => 1,
        _ => n,
    };
    (0..count).map(move |i| (i, polygon[i], polygon[(i + 1) % n]))
}

/// Whether any two non-adjacent boundary segments of the polygon intersect.
///
/// Polygons with fewer than four vertices are never reported: a triangle
/// has no non-adjacent segment pair.
#[must_use]
pub fn polygon_self_intersects(polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 4 {
        return false;
    }

    let segments: Vec<(usize, Point, Point)> = polygon_segments(polygon).collect();
    for (i, a1, a2) in &segments {
        for (j, b1, b2) in segments.iter().skip(i + 1) {
            let adjacent = *j == i + 1 || (*i == 0 && *j == n - 1);
            if adjacent {
                continue;
            }
            if segments_intersect(*a1, *a2, *b1, *b2) {
                return true;
            }
        }
    }
    false
}

/// Closest point to `p` on the segment `a–b`.
#[must_use]
pub fn closest_point_on_segment(p: Point, a: Point, b: Point) -> Point {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq <= GEOMETRY_EPSILON {
        return a;
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * abx, a.y + t * aby)
}

/// Signed shoelace area of the polygon.
#[must_use]
pub fn signed_area(polygon: &[Point]) -> f64 {
    polygon_segments(polygon)
        .map(|(_, a, b)| a.x * b.y - b.x * a.y)
        .sum::<f64>()
        / 2.0
}

/// Area centroid of the polygon.
///
/// Falls back to the vertex average when the area vanishes (fewer than
/// three vertices, or collinear ones). `None` for an empty polygon.
#[must_use]
pub fn centroid(polygon: &[Point]) -> Option<Point> {
    if polygon.is_empty() {
        return None;
    }

    let area = signed_area(polygon);
    if polygon.len() < 3 || area.abs() <= GEOMETRY_EPSILON {
        let n = polygon.len() as f64;
        let (sx, sy) = polygon
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Some(Point::new(sx / n, sy / n));
    }

    let (cx, cy) = polygon_segments(polygon).fold((0.0, 0.0), |(cx, cy), (_, a, b)| {
        let f = a.x * b.y - b.x * a.y;
        (cx + (a.x + b.x) * f, cy + (a.y + b.y) * f)
    });
    Some(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
}
