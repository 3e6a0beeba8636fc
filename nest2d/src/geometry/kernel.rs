use geo::{Area, BooleanOps};
use geo_types::{Coord, LineString, MultiPolygon, Polygon};

use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Shape};
use crate::geometry::primitives::{Edge, NSPolygon, Point, SPolygon};
use crate::util::GEOM_EPS;

/// Maximum offset of the probes used to detect coinciding boundaries
const PROBE_OFFSET: f64 = 1e-5;

pub fn to_geo_ring(points: &[Point]) -> LineString<f64> {
    points
        .iter()
        .map(|p| Coord { x: p.0, y: p.1 })
        .collect::<Vec<_>>()
        .into()
}

pub fn to_geo_polygon(points: &[Point]) -> Polygon<f64> {
    Polygon::new(to_geo_ring(points), vec![])
}

pub fn ns_to_geo_polygon(shape: &NSPolygon) -> Polygon<f64> {
    Polygon::new(
        to_geo_ring(&shape.outer.vertices),
        shape.holes.iter().map(|h| to_geo_ring(&h.vertices)).collect(),
    )
}

/// Union of a set of polygons.
/// With [`difference`] and [`region_rings`] this backs [`NfpPlacer::feasible_region`](crate::placer::NfpPlacer::feasible_region),
/// no placement depends on it.
pub fn union_all(polygons: impl IntoIterator<Item = Polygon<f64>>) -> MultiPolygon<f64> {
    polygons
        .into_iter()
        .fold(MultiPolygon::new(vec![]), |acc, p| {
            acc.union(&MultiPolygon::new(vec![p]))
        })
}

/// `a` minus `b`
pub fn difference(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    match b.0.is_empty() {
        true => a.clone(),
        false => a.difference(b),
    }
}

/// All rings (outer boundaries and holes) of a region, as open vertex lists
pub fn region_rings(region: &MultiPolygon<f64>) -> Vec<Vec<Point>> {
    let open_ring = |ls: &LineString<f64>| {
        let mut ring = ls.coords().map(|c| Point(c.x, c.y)).collect::<Vec<_>>();
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    };
    region
        .0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
        .map(open_ring)
        .filter(|r| !r.is_empty())
        .collect()
}

/// Area of the intersection of two polygons
pub fn overlap_area(a: &NSPolygon, b: &NSPolygon) -> f64 {
    ns_to_geo_polygon(a)
        .intersection(&ns_to_geo_polygon(b))
        .unsigned_area()
}

/// True if the interiors of `a` and `b` overlap, or if they are closer than `clearance`.
/// Touching boundaries do not collide when `clearance` is zero.
pub fn collides(a: &NSPolygon, b: &NSPolygon, clearance: f64) -> bool {
    if !a.bbox().inflated(clearance).collides_with(&b.bbox()) {
        return false;
    }
    let edges_b = b.edge_iter().collect::<Vec<_>>();
    if a.edge_iter().any(|ea| edges_b.iter().any(|eb| ea.crosses(eb))) {
        return true;
    }
    //no crossing boundaries: overlap implies containment or coinciding boundaries
    if a.vertex_iter().any(|v| b.strictly_contains(v))
        || b.vertex_iter().any(|v| a.strictly_contains(v))
        || interior_probes(a).any(|p| b.strictly_contains(&p))
        || interior_probes(b).any(|p| a.strictly_contains(&p))
    {
        return true;
    }
    clearance > 0.0 && boundary_distance(a, b, clearance) < clearance - GEOM_EPS
}

/// Minimum distance between the boundaries of `a` and `b`, only accurate below `cutoff`
pub fn boundary_distance(a: &NSPolygon, b: &NSPolygon, cutoff: f64) -> f64 {
    let edges_b = b.edge_iter().collect::<Vec<_>>();
    a.edge_iter()
        .flat_map(|ea| {
            edges_b
                .iter()
                .filter(move |eb| edge_bboxes_within(&ea, eb, cutoff))
                .map(move |eb| ea.sq_distance_to(eb))
        })
        .fold(f64::MAX, f64::min)
        .sqrt()
}

fn edge_bboxes_within(a: &Edge, b: &Edge, d: f64) -> bool {
    a.x_min() - d <= b.x_max()
        && b.x_min() - d <= a.x_max()
        && a.y_min() - d <= b.y_max()
        && b.y_min() - d <= a.y_max()
}

/// Points just inside the material of `shape`, one next to the midpoint of every edge
fn interior_probes(shape: &NSPolygon) -> impl Iterator<Item = Point> + '_ {
    //rings are counterclockwise: material lies left of the outer boundary and right of the holes
    let outer = ring_probes(&shape.outer, 1.0);
    let holes = shape.holes.iter().flat_map(|h| ring_probes(h, -1.0));
    outer.chain(holes)
}

fn ring_probes(ring: &SPolygon, side: f64) -> impl Iterator<Item = Point> + '_ {
    ring.edge_iter().map(move |e| {
        let len = e.length();
        let (dx, dy) = e.direction();
        let offset = side * PROBE_OFFSET.min(len / 4.0) / len;
        let Point(mx, my) = e.centroid();
        Point(mx - dy * offset, my + dx * offset)
    })
}
