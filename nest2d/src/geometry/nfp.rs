use crate::geometry::convex_hull::convex_hull_from_points;
use crate::geometry::primitives::{Circle, Point, Rect};
use crate::util::GEOM_EPS;

/// Number of segments used to discretize a disk for a given accuracy in `(0, 1]`
pub fn n_segments(accuracy: f64) -> usize {
    (8.0 + 56.0 * accuracy.clamp(0.0, 1.0)).round() as usize
}

/// Minkowski sum of two convex polygons
pub fn minkowski_sum(a: &[Point], b: &[Point]) -> Vec<Point> {
    let sums = a
        .iter()
        .flat_map(|p| b.iter().map(move |q| Point(p.0 + q.0, p.1 + q.1)))
        .collect();
    convex_hull_from_points(sums)
}

/// No-fit polygon of `orbiting` around `stationary`, both given as convex hulls.
///
/// Contains every translation of `orbiting` that brings it closer than `clearance` to `stationary`.
/// Since the hulls are used, the result is conservative for concave shapes.
/// The clearance disk is replaced by a circumscribed `n_segments`-gon, which only enlarges the polygon.
pub fn no_fit_polygon(
    stationary: &[Point],
    orbiting: &[Point],
    clearance: f64,
    n_segments: usize,
) -> Vec<Point> {
    let reflected = orbiting.iter().map(|p| -*p).collect::<Vec<_>>();
    let nfp = minkowski_sum(stationary, &reflected);
    let nfp = match clearance > 0.0 {
        true => {
            let disk = Circle {
                center: Point(0.0, 0.0),
                radius: clearance,
            };
            minkowski_sum(&nfp, &disk.circumscribed_polygon(n_segments))
        }
        false => nfp,
    };
    dedup_ring(nfp)
}

/// Inner-fit polygon: every translation of `orbiting` that keeps it inside the convex,
/// counterclockwise `container`, at least `margin` away from the container's boundary.
///
/// Empty if no such translation exists.
/// Degenerates into a segment or a single point when the fit is exact in one or both axes.
pub fn inner_fit_polygon(container: &[Point], orbiting: &[Point], margin: f64) -> Vec<Point> {
    let (Some(c_bbox), Some(o_bbox)) = (Rect::from_points(container), Rect::from_points(orbiting))
    else {
        return vec![];
    };

    //translations keeping the bounding box of `orbiting` inside the container's, a superset of the result
    let (x_min, x_max) = (c_bbox.x_min - o_bbox.x_min, c_bbox.x_max - o_bbox.x_max);
    let (y_min, y_max) = (c_bbox.y_min - o_bbox.y_min, c_bbox.y_max - o_bbox.y_max);
    if x_min > x_max + GEOM_EPS || y_min > y_max + GEOM_EPS {
        return vec![];
    }
    let (x_max, y_max) = (x_max.max(x_min), y_max.max(y_min));
    let mut ifp = vec![
        Point(x_min, y_min),
        Point(x_max, y_min),
        Point(x_max, y_max),
        Point(x_min, y_max),
    ];

    let n = container.len();
    for i in 0..n {
        let (a, b) = (container[i], container[(i + 1) % n]);
        let len = (b.0 - a.0).hypot(b.1 - a.1);
        if len == 0.0 {
            continue;
        }
        //inward normal of a counterclockwise edge
        let normal = Point(-(b.1 - a.1) / len, (b.0 - a.0) / len);
        let min_proj = orbiting
            .iter()
            .map(|v| normal.dot(v))
            .fold(f64::MAX, f64::min);
        let bound = normal.dot(&a) - min_proj + margin;
        ifp = clip_half_plane(&ifp, normal, bound);
        if ifp.is_empty() {
            return vec![];
        }
    }
    dedup_ring(ifp)
}

/// Clips a convex polygon to the half-plane `normal · p >= bound` (Sutherland–Hodgman).
fn clip_half_plane(poly: &[Point], normal: Point, bound: f64) -> Vec<Point> {
    let value = |p: &Point| normal.dot(p) - bound;
    let inside = |v: f64| v >= -GEOM_EPS;

    let mut clipped = Vec::with_capacity(poly.len() + 1);
    for i in 0..poly.len() {
        let cur = poly[i];
        let prev = poly[(i + poly.len() - 1) % poly.len()];
        let (v_cur, v_prev) = (value(&cur), value(&prev));
        let crossing = || {
            let t = v_prev / (v_prev - v_cur);
            Point(prev.0 + t * (cur.0 - prev.0), prev.1 + t * (cur.1 - prev.1))
        };
        match (inside(v_prev), inside(v_cur)) {
            (true, true) => clipped.push(cur),
            (false, true) => {
                clipped.push(crossing());
                clipped.push(cur);
            }
            (true, false) => clipped.push(crossing()),
            (false, false) => {}
        }
    }
    clipped
}

/// Removes consecutive vertices closer than [`GEOM_EPS`] to each other
fn dedup_ring(mut ring: Vec<Point>) -> Vec<Point> {
    let close = |a: &Point, b: &Point| (a.0 - b.0).abs() <= GEOM_EPS && (a.1 - b.1).abs() <= GEOM_EPS;
    ring.dedup_by(|a, b| close(a, b));
    while ring.len() > 1 && close(&ring[0], &ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}
