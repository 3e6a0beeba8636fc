use std::f64::consts::PI;

use anyhow::Result;
use geo_types::MultiPolygon;
use itertools::Itertools;
use log::{debug, trace};
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::entities::{Bin, Item, Layout};
use crate::geometry::DTransformation;
use crate::geometry::geo_enums::Alignment;
use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Shape};
use crate::geometry::kernel;
use crate::geometry::nfp::{inner_fit_polygon, n_segments, no_fit_polygon};
use crate::geometry::primitives::{Edge, Point, Rect};
use crate::opt::{SimplexOptimizer, StopCriteria};
use crate::placer::{BottomLeftPlacer, NfpConfig, PlacementCandidate, PlacementCost, is_valid_placement};
use crate::util::GEOM_EPS;

/// Costs closer than this are considered equal when ranking candidates
const COST_RESOLUTION: f64 = 1e-9;

/// Placer based on no-fit polygons.
///
/// For every rotation, the region of feasible translations is the inner-fit polygon of the bin
/// minus the no-fit polygons of all placed items. Its vertices are the candidates, ranked by a cost
/// favouring a compact pile close to the configured starting point of the bin.
#[derive(Debug, Clone)]
pub struct NfpPlacer {
    config: NfpConfig,
    clearance: f64,
    n_segments: usize,
    optimizer: SimplexOptimizer,
    fallback: Option<BottomLeftPlacer>,
}

/// Translations inside `ifp` and outside the no-fit polygons listed in `obstacles`
#[derive(Debug, Clone)]
struct FeasibleSet {
    ifp: Vec<Point>,
    obstacles: Vec<usize>,
}

/// Geometry of the item at a single rotation with respect to a layout
#[derive(Debug, Clone)]
struct RotationEval {
    rotation_idx: usize,
    rotation: f64,
    /// Bounding box of the rotated item at zero translation
    bbox: Rect,
    nfps: Vec<Vec<Point>>,
    sets: Vec<FeasibleSet>,
    /// Vertices of the feasible region and their cost
    candidates: Vec<(Point, f64)>,
}

impl RotationEval {
    fn is_feasible(&self, t: &Point) -> bool {
        self.sets.iter().any(|s| {
            inside_convex(&s.ifp, t)
                && !s
                    .obstacles
                    .iter()
                    .any(|&i| strictly_inside_convex(&self.nfps[i], t))
        })
    }
}

impl NfpPlacer {
    /// `spacing` is the minimum clearance between items, `stop` drives the refinement steps
    pub fn new(config: NfpConfig, spacing: f64, stop: StopCriteria) -> Self {
        let fallback = config.fallback.map(|c| BottomLeftPlacer::new(c, spacing));
        Self {
            n_segments: n_segments(config.accuracy),
            clearance: spacing,
            optimizer: SimplexOptimizer::new(stop),
            fallback,
            config,
        }
    }

    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    pub fn config(&self) -> &NfpConfig {
        &self.config
    }

    fn rotations(&self) -> Vec<f64> {
        match self.config.rotations.is_empty() {
            true => vec![0.0],
            false => self.config.rotations.clone(),
        }
    }

    pub fn place(&self, item: &Item, bin: &Bin, layout: &Layout) -> Result<Option<PlacementCandidate>> {
        let rotations = self.rotations();
        let evals: Vec<RotationEval> = match self.config.parallel && rotations.len() > 1 {
            true => rotations
                .par_iter()
                .enumerate()
                .map(|(i, &r)| self.evaluate_rotation(item, bin, layout, i, r))
                .collect(),
            false => rotations
                .iter()
                .enumerate()
                .map(|(i, &r)| self.evaluate_rotation(item, bin, layout, i, r))
                .collect(),
        };

        let placement = match self.select_best(item, bin, layout, &evals) {
            Some((e_idx, best)) => Some(self.refine(item, bin, layout, &evals[e_idx], best)?),
            None => None,
        };

        match (placement, &self.fallback) {
            (Some(p), _) => {
                debug!(
                    "[NFP] placement found at [{}] with cost {:.6} ({} candidates)",
                    p.d_transf,
                    p.cost.value(),
                    evals.iter().map(|e| e.candidates.len()).sum::<usize>()
                );
                Ok(Some(p))
            }
            (None, Some(bl)) => {
                debug!("[NFP] no feasible placement, falling back to bottom-left");
                bl.place(item, bin, layout)
            }
            (None, None) => {
                debug!("[NFP] no feasible placement");
                Ok(None)
            }
        }
    }

    /// Vertices of the feasible translation region of `item` at `rotation`.
    /// These are the only candidates considered without alignment.
    pub fn feasible_vertices(&self, item: &Item, bin: &Bin, layout: &Layout, rotation: f64) -> Vec<Point> {
        let eval = self.rotation_geometry(item, bin, layout, 0, rotation);
        eval.sets
            .iter()
            .flat_map(|s| region_vertices(&s.ifp, &s.obstacles, &eval.nfps))
            .collect()
    }

    /// Feasible translation region of `item` at `rotation`, computed with polygon boolean operations.
    /// Degenerate inner-fit polygons yield an empty region.
    ///
    /// Placement never builds this region, it enumerates the region's vertices directly
    /// (see [`NfpPlacer::feasible_vertices`]). It is meant for inspecting a layout and as a
    /// reference to check those vertices against.
    pub fn feasible_region(&self, item: &Item, bin: &Bin, layout: &Layout, rotation: f64) -> MultiPolygon<f64> {
        let eval = self.rotation_geometry(item, bin, layout, 0, rotation);
        let parts = eval
            .sets
            .iter()
            .filter(|s| s.ifp.len() >= 3)
            .flat_map(|s| {
                let ifp = MultiPolygon(vec![kernel::to_geo_polygon(&s.ifp)]);
                let obstacles = kernel::union_all(
                    s.obstacles
                        .iter()
                        .map(|&i| kernel::to_geo_polygon(&eval.nfps[i])),
                );
                kernel::difference(&ifp, &obstacles).0
            });
        kernel::union_all(parts)
    }

    /// Moves the pile so its bounding box is aligned with the bin.
    /// Only applies to boxes without fixed content.
    pub fn align_pile(&self, bin: &Bin, layout: &mut Layout) {
        let alignment = self.config.alignment;
        if alignment == Alignment::DontAlign || layout.has_fixed_content() {
            return;
        }
        let Bin::Box(_) = bin else {
            return;
        };
        let (Some(pile), Some(anchor)) = (layout.pile_bbox(), bin.anchor(alignment)) else {
            return;
        };
        if let Some(reference) = pile.reference_point(alignment) {
            let (dx, dy) = (anchor.0 - reference.0, anchor.1 - reference.1);
            trace!("[NFP] aligning pile of bin {} by ({dx:.3}, {dy:.3})", layout.bin_idx);
            layout.translate_pile((dx, dy));
        }
    }

    fn rotation_geometry(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        rotation_idx: usize,
        rotation: f64,
    ) -> RotationEval {
        let shape = item.shape_at(&DTransformation::new(rotation, (0.0, 0.0)));
        let hull = shape.convex_hull();
        let bbox = shape.bbox();
        //room for one more item right of a strip's pile, beyond the widest point of the clearance polygon
        let container = bin.container(
            layout.pile_bbox(),
            bbox.width() + 2.0 * self.clearance,
            self.n_segments,
        );
        let nfps = layout
            .placed_items
            .iter()
            .map(|pi| no_fit_polygon(&pi.hull, &hull, self.clearance, self.n_segments))
            .collect_vec();

        let mut sets = vec![FeasibleSet {
            ifp: inner_fit_polygon(&container, &hull, 0.0),
            obstacles: (0..nfps.len()).collect(),
        }];
        if self.config.explore_holes {
            for (i, pi) in layout.placed_items.iter().enumerate() {
                for hole in pi.shape.holes.iter().filter(|h| h.is_convex()) {
                    sets.push(FeasibleSet {
                        ifp: inner_fit_polygon(&hole.vertices, &hull, self.clearance),
                        obstacles: (0..nfps.len()).filter(|&j| j != i).collect(),
                    });
                }
            }
        }
        sets.retain(|s| !s.ifp.is_empty());

        RotationEval {
            rotation_idx,
            rotation,
            bbox,
            nfps,
            sets,
            candidates: vec![],
        }
    }

    fn evaluate_rotation(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        rotation_idx: usize,
        rotation: f64,
    ) -> RotationEval {
        let mut eval = self.rotation_geometry(item, bin, layout, rotation_idx, rotation);
        let mut points = eval
            .sets
            .iter()
            .flat_map(|s| region_vertices(&s.ifp, &s.obstacles, &eval.nfps))
            .collect_vec();
        if self.config.alignment != Alignment::DontAlign {
            points.extend(self.snap_point(bin, &eval));
        }

        let (pile, bbox) = (layout.pile_bbox(), eval.bbox);
        eval.candidates = points
            .into_iter()
            .unique_by(|p| (OrderedFloat(p.0), OrderedFloat(p.1)))
            .map(|t| (t, self.cost(bin, pile, bbox, t)))
            .collect();

        trace!(
            "[NFP] rotation {:.3}: {} regions, {} candidates",
            rotation,
            eval.sets.len(),
            eval.candidates.len()
        );
        eval
    }

    /// Cheapest candidate over all evaluated rotations that passes the exact validity check
    fn select_best(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        evals: &[RotationEval],
    ) -> Option<(usize, PlacementCandidate)> {
        evals
            .iter()
            .enumerate()
            .flat_map(|(e_idx, eval)| {
                eval.candidates
                    .iter()
                    .map(move |&(t, cost)| (e_idx, eval.rotation_idx, t, cost))
            })
            .sorted_by_key(|&(_, r_idx, t, cost)| ranking_key(cost, r_idx, t))
            .find_map(|(e_idx, _, t, cost)| {
                let d_transf = DTransformation::new(evals[e_idx].rotation, (t.0, t.1));
                is_valid_placement(item, &d_transf, bin, layout, self.clearance).then(|| {
                    let candidate = PlacementCandidate {
                        d_transf,
                        cost: PlacementCost::new(cost),
                    };
                    (e_idx, candidate)
                })
            })
    }

    /// Cost of placing an item with bounding box `bbox` (at zero translation) at translation `t`
    fn cost(&self, bin: &Bin, pile: Option<Rect>, bbox: Rect, t: Point) -> f64 {
        let item_bbox = bbox.translated((t.0, t.1));
        let full_bbox = pile.map_or(item_bbox, |p| Rect::bounding_rect(p, item_bbox));
        let (norm_area, norm_len) = bin.cost_normalization();

        let starting_point = bin.effective_alignment(self.config.starting_point);
        let gravity = match (bin.anchor(starting_point), item_bbox.reference_point(starting_point)) {
            (Some(anchor), Some(reference)) => reference.distance_to(&anchor) / norm_len,
            _ => 0.0,
        };
        full_bbox.area() / norm_area + gravity
    }

    /// Translation aligning the item with the bin, or the closest feasible point to it on the region boundary
    fn snap_point(&self, bin: &Bin, eval: &RotationEval) -> Option<Point> {
        let alignment = bin.effective_alignment(self.config.alignment);
        let anchor = bin.anchor(alignment)?;
        let reference = eval.bbox.reference_point(alignment)?;
        let target = Point(anchor.0 - reference.0, anchor.1 - reference.1);
        if eval.is_feasible(&target) {
            return Some(target);
        }

        let mut edges = vec![];
        for set in &eval.sets {
            edges.extend(ring_edges(&set.ifp));
            for &i in &set.obstacles {
                edges.extend(ring_edges(&eval.nfps[i]));
            }
        }
        edges
            .iter()
            .map(|e| e.closest_point_on_edge(&target))
            .filter(|p| eval.is_feasible(p))
            .min_by_key(|p| OrderedFloat(p.sq_distance_to(&target)))
    }

    fn refine(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        eval: &RotationEval,
        best: PlacementCandidate,
    ) -> Result<PlacementCandidate> {
        let (best, rotated_eval) = match self.config.refine_rotation {
            true => match self.refine_rotation(item, bin, layout, eval, best)? {
                Some((e, c)) => (c, Some(e)),
                None => (best, None),
            },
            false => (best, None),
        };
        match self.config.refine_offset && self.config.alignment != Alignment::DontAlign {
            true => self.refine_offset(item, bin, layout, rotated_eval.as_ref().unwrap_or(eval), best),
            false => Ok(best),
        }
    }

    /// Local search of the translation around the best candidate
    fn refine_offset(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        eval: &RotationEval,
        best: PlacementCandidate,
    ) -> Result<PlacementCandidate> {
        let (tx, ty) = best.d_transf.translation();
        let pile = layout.pile_bbox();
        let (rx, ry) = (eval.bbox.width() / 2.0, eval.bbox.height() / 2.0);
        let bounds = [(tx - rx, tx + rx), (ty - ry, ty + ry)];

        let objective = |x: &[f64]| {
            let t = Point(x[0], x[1]);
            match eval.is_feasible(&t) {
                true => self.cost(bin, pile, eval.bbox, t),
                false => f64::INFINITY,
            }
        };
        let optimum = self.optimizer.optimize_min(objective, &[tx, ty], &bounds)?;

        if optimum.score < best.cost.value() - COST_RESOLUTION {
            let d_transf = DTransformation::new(eval.rotation, (optimum.point[0], optimum.point[1]));
            if is_valid_placement(item, &d_transf, bin, layout, self.clearance) {
                trace!(
                    "[NFP] offset refined in {} iterations: {:.6} -> {:.6}",
                    optimum.n_iterations,
                    best.cost.value(),
                    optimum.score
                );
                return Ok(PlacementCandidate {
                    d_transf,
                    cost: PlacementCost::new(optimum.score),
                });
            }
        }
        Ok(best)
    }

    /// Local search of the rotation around the best candidate.
    /// Every evaluated rotation is scored by its best valid candidate.
    fn refine_rotation(
        &self,
        item: &Item,
        bin: &Bin,
        layout: &Layout,
        eval: &RotationEval,
        best: PlacementCandidate,
    ) -> Result<Option<(RotationEval, PlacementCandidate)>> {
        let window = PI / (2.0 * self.rotations().len() as f64);
        let r0 = best.d_transf.rotation();
        let place_at = |r: f64| {
            let e = self.evaluate_rotation(item, bin, layout, eval.rotation_idx, r);
            self.select_best(item, bin, layout, std::slice::from_ref(&e))
                .map(|(_, c)| (e, c))
        };

        let objective = |x: &[f64]| place_at(x[0]).map_or(f64::INFINITY, |(_, c)| c.cost.value());
        let optimum = self
            .optimizer
            .optimize_min(objective, &[r0], &[(r0 - window, r0 + window)])?;

        if optimum.score < best.cost.value() - COST_RESOLUTION {
            trace!(
                "[NFP] rotation refined in {} iterations: {:.3} -> {:.3}",
                optimum.n_iterations,
                r0,
                optimum.point[0]
            );
            return Ok(place_at(optimum.point[0]));
        }
        Ok(None)
    }
}

/// Total order on candidates: cost, then rotation index, then lowest y, then lowest x
fn ranking_key(cost: f64, rotation_idx: usize, t: Point) -> (i64, usize, OrderedFloat<f64>, OrderedFloat<f64>) {
    let quantized = (cost / COST_RESOLUTION).round() as i64;
    (quantized, rotation_idx, OrderedFloat(t.1), OrderedFloat(t.0))
}

/// Vertices of `ifp` minus the union of the `obstacles`:
/// all polygon vertices and edge intersections that lie inside `ifp` and outside every obstacle.
fn region_vertices(ifp: &[Point], obstacles: &[usize], nfps: &[Vec<Point>]) -> Vec<Point> {
    let Some(ifp_bbox) = Rect::from_points(ifp) else {
        return vec![];
    };
    let relevant = obstacles
        .iter()
        .map(|&i| &nfps[i])
        .filter_map(|n| Rect::from_points(n.iter()).map(|b| (n, b)))
        .filter(|(_, b)| b.collides_with(&ifp_bbox))
        .collect_vec();

    let mut points = ifp.to_vec();
    relevant.iter().for_each(|(n, _)| points.extend(n.iter().copied()));

    let ifp_edges = ring_edges(ifp);
    let nfp_edges = relevant.iter().map(|(n, _)| ring_edges(n)).collect_vec();
    for edges in &nfp_edges {
        for (e, f) in ifp_edges.iter().cartesian_product(edges.iter()) {
            points.extend(e.intersection(f));
        }
    }
    for (i, j) in (0..relevant.len()).tuple_combinations() {
        if relevant[i].1.collides_with(&relevant[j].1) {
            for (e, f) in nfp_edges[i].iter().cartesian_product(nfp_edges[j].iter()) {
                points.extend(e.intersection(f));
            }
        }
    }

    points.retain(|p| {
        inside_convex(ifp, p) && !relevant.iter().any(|(n, _)| strictly_inside_convex(n, p))
    });
    points
}

/// Edges of a closed ring, zero-length edges skipped
fn ring_edges(ring: &[Point]) -> Vec<Edge> {
    match ring.len() {
        0 | 1 => vec![],
        2 => Edge::new(ring[0], ring[1]).into_iter().collect(),
        n => (0..n)
            .filter_map(|i| Edge::new(ring[i], ring[(i + 1) % n]).ok())
            .collect(),
    }
}

/// True if `p` lies in the closed convex counterclockwise polygon `ring`, which may be degenerate
fn inside_convex(ring: &[Point], p: &Point) -> bool {
    match ring.len() {
        0 => false,
        1 => ring[0].distance_to(p) <= GEOM_EPS,
        2 => ring_edges(ring).iter().any(|e| e.distance_to(p) <= GEOM_EPS),
        _ => {
            //the bounding box test rejects points beyond the ends of collinear rings
            let in_bbox = Rect::from_points(ring).is_some_and(|b| b.inflated(GEOM_EPS).collides_with(p));
            in_bbox && ring_edges(ring).iter().all(|e| e.signed_distance(p) >= -GEOM_EPS)
        }
    }
}

/// True if `p` lies in the interior of the convex counterclockwise polygon `ring`
fn strictly_inside_convex(ring: &[Point], p: &Point) -> bool {
    ring.len() >= 3 && ring_edges(ring).iter().all(|e| e.signed_distance(p) > GEOM_EPS)
}
