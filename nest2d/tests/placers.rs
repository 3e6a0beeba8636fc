#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use float_cmp::approx_eq;
    use geo::Intersects;
    use test_case::test_case;

    use nest2d::entities::{Bin, Item, Layout};
    use nest2d::geometry::DTransformation;
    use nest2d::geometry::geo_enums::Alignment;
    use nest2d::geometry::geo_traits::{DistanceTo, Shape};
    use nest2d::geometry::kernel;
    use nest2d::geometry::primitives::{Edge, Point};
    use nest2d::opt::StopCriteria;
    use nest2d::placer::{
        BottomLeftConfig, BottomLeftPlacer, NfpConfig, NfpPlacer, Placer, PlacerConfig, is_valid_placement,
    };

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rect_item(w: f64, h: f64) -> Item {
        Item::new(
            vec![Point(0.0, 0.0), Point(w, 0.0), Point(w, h), Point(0.0, h)],
            vec![],
        )
        .unwrap()
    }

    fn bottom_left_nfp() -> NfpConfig {
        NfpConfig {
            rotations: vec![0.0],
            alignment: Alignment::BottomLeft,
            starting_point: Alignment::BottomLeft,
            parallel: false,
            refine_offset: false,
            ..NfpConfig::default()
        }
    }

    fn nfp_placer(config: NfpConfig, spacing: f64) -> NfpPlacer {
        NfpPlacer::new(config, spacing, StopCriteria::default())
    }

    fn assert_translation(d_transf: &DTransformation, (x, y): (f64, f64)) {
        let (tx, ty) = d_transf.translation();
        assert!(
            approx_eq!(f64, tx, x, epsilon = 1e-6) && approx_eq!(f64, ty, y, epsilon = 1e-6),
            "expected ({x}, {y}), got ({tx}, {ty})"
        );
    }

    #[test]
    fn nfp_places_squares_bottom_left() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = nfp_placer(bottom_left_nfp(), 0.0);
        let square = rect_item(10.0, 10.0);
        let mut layout = Layout::new(0);

        let first = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&first.d_transf, (0.0, 0.0));
        assert!(approx_eq!(f64, first.cost.value(), 0.01, epsilon = 1e-9));
        layout.place(0, &square, first.d_transf);

        //(10, 0) and (0, 10) cost the same, the lower one wins
        let second = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&second.d_transf, (10.0, 0.0));
        assert!(approx_eq!(f64, second.cost.value(), 0.12, epsilon = 1e-9));
    }

    #[test]
    fn nfp_keeps_spacing() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = nfp_placer(bottom_left_nfp(), 2.0);
        let square = rect_item(10.0, 10.0);
        let mut layout = Layout::new(0);
        for idx in 0..5 {
            let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
            assert!(is_valid_placement(&square, &c.d_transf, &bin, &layout, 2.0));
            layout.place(idx, &square, c.d_transf);
        }
        for (a, b) in [(0, 1), (1, 2), (0, 4), (3, 4)] {
            let d = kernel::boundary_distance(&layout.placed_items[a].shape, &layout.placed_items[b].shape, 10.0);
            assert!(d >= 2.0 - 1e-6, "items {a} and {b} are {d} apart");
        }
    }

    #[test_case(50.0, 4, true; "four fit")]
    #[test_case(60.0, 1, false; "only one fits")]
    fn nfp_fills_box(size: f64, n_fitting: usize, all_fit: bool) {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = nfp_placer(bottom_left_nfp(), 0.0);
        let square = rect_item(size, size);
        let mut layout = Layout::new(0);
        for idx in 0..n_fitting {
            let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
            layout.place(idx, &square, c.d_transf);
        }
        let next = placer.place(&square, &bin, &layout).unwrap();
        assert!(next.is_none());
        assert_eq!(layout.fill_ratio(&bin) > 0.99, all_fit);
    }

    #[test]
    fn nfp_rotates_when_needed() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 200.0).unwrap();
        let config = NfpConfig {
            rotations: vec![0.0, FRAC_PI_2],
            ..bottom_left_nfp()
        };
        let item = rect_item(150.0, 50.0);
        let c = nfp_placer(config, 0.0)
            .place(&item, &bin, &Layout::new(0))
            .unwrap()
            .unwrap();
        assert!(approx_eq!(f64, c.d_transf.rotation(), FRAC_PI_2));
        assert!(bin.contains(&item.shape_at(&c.d_transf)));
    }

    #[test]
    fn nfp_aligns_to_center() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = NfpConfig {
            rotations: vec![0.0],
            parallel: false,
            ..NfpConfig::default()
        };
        let c = nfp_placer(config, 0.0)
            .place(&rect_item(10.0, 10.0), &bin, &Layout::new(0))
            .unwrap()
            .unwrap();
        assert_translation(&c.d_transf, (45.0, 45.0));
    }

    #[test]
    fn nfp_in_circle_bin() {
        init_logger();
        let bin = Bin::new_circle(Point(0.0, 0.0), 50.0).unwrap();
        let placer = nfp_placer(NfpConfig::default(), 1.0);
        let square = rect_item(20.0, 20.0);
        let mut layout = Layout::new(0);

        let first = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&first.d_transf, (-10.0, -10.0));
        layout.place(0, &square, first.d_transf);
        for idx in 1..4 {
            let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
            assert!(is_valid_placement(&square, &c.d_transf, &bin, &layout, 1.0));
            layout.place(idx, &square, c.d_transf);
        }
        assert!(layout.placed_items.iter().all(|pi| bin.contains(&pi.shape)));
    }

    #[test]
    fn nfp_without_alignment_picks_region_vertex() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = NfpConfig {
            alignment: Alignment::DontAlign,
            ..bottom_left_nfp()
        };
        let placer = nfp_placer(config, 0.0);
        let mut layout = Layout::new(0);
        layout.place(0, &rect_item(10.0, 10.0), DTransformation::empty());

        let item = rect_item(20.0, 20.0);
        let c = placer.place(&item, &bin, &layout).unwrap().unwrap();
        let t = Point(c.d_transf.translation().0, c.d_transf.translation().1);

        assert!(placer.feasible_vertices(&item, &bin, &layout, 0.0).contains(&t));

        let region = placer.feasible_region(&item, &bin, &layout, 0.0);
        assert!(!region.0.is_empty());
        let boundary_distance = kernel::region_rings(&region)
            .iter()
            .flat_map(|ring| {
                (0..ring.len()).filter_map(|i| Edge::new(ring[i], ring[(i + 1) % ring.len()]).ok())
            })
            .map(|e| e.distance_to(&t))
            .fold(f64::MAX, f64::min);
        assert!(boundary_distance <= 1e-3, "{t:?} is {boundary_distance} from the region boundary");
    }

    #[test]
    fn feasible_vertices_match_boolean_region() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = nfp_placer(bottom_left_nfp(), 0.0);
        let mut layout = Layout::new(0);
        layout.place(0, &rect_item(30.0, 20.0), DTransformation::empty());
        layout.place(1, &rect_item(20.0, 40.0), DTransformation::new(0.0, (50.0, 0.0)));
        layout.place(2, &rect_item(10.0, 10.0), DTransformation::new(0.0, (20.0, 60.0)));

        let item = rect_item(15.0, 15.0);
        let vertices = placer.feasible_vertices(&item, &bin, &layout, 0.0);
        let region = placer.feasible_region(&item, &bin, &layout, 0.0);
        let rings = kernel::region_rings(&region);
        assert!(!vertices.is_empty() && !rings.is_empty());

        let boundary_distance = |p: &Point| {
            rings
                .iter()
                .flat_map(|ring| {
                    (0..ring.len()).filter_map(|i| Edge::new(ring[i], ring[(i + 1) % ring.len()]).ok())
                })
                .map(|e| e.distance_to(p))
                .fold(f64::MAX, f64::min)
        };
        //every enumerated vertex lies in the region, every corner of the region is enumerated
        for v in &vertices {
            let inside = region.intersects(&geo_types::Point::new(v.0, v.1));
            assert!(inside || boundary_distance(v) <= 1e-6, "{v:?} lies outside the region");
        }
        for corner in rings.iter().flatten() {
            let nearest = vertices.iter().map(|v| v.distance_to(corner)).fold(f64::MAX, f64::min);
            assert!(nearest <= 1e-6, "region corner {corner:?} was not enumerated");
        }

        let c = placer.place(&item, &bin, &layout).unwrap().unwrap();
        let (tx, ty) = c.d_transf.translation();
        assert!(boundary_distance(&Point(tx, ty)) <= 1e-6);
    }

    #[test]
    fn nfp_explores_holes() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let frame = Item::new(
            vec![Point(0.0, 0.0), Point(100.0, 0.0), Point(100.0, 100.0), Point(0.0, 100.0)],
            vec![vec![Point(10.0, 10.0), Point(90.0, 10.0), Point(90.0, 90.0), Point(10.0, 90.0)]],
        )
        .unwrap();
        let mut layout = Layout::new(0);
        layout.place(0, &frame, DTransformation::empty());
        let square = rect_item(20.0, 20.0);

        let without = nfp_placer(bottom_left_nfp(), 0.0).place(&square, &bin, &layout).unwrap();
        assert!(without.is_none());

        let config = NfpConfig {
            explore_holes: true,
            ..bottom_left_nfp()
        };
        let with = nfp_placer(config, 0.0)
            .place(&square, &bin, &layout)
            .unwrap()
            .unwrap();
        assert_translation(&with.d_transf, (10.0, 10.0));
        assert!(is_valid_placement(&square, &with.d_transf, &bin, &layout, 0.0));
    }

    #[test]
    fn nfp_falls_back_to_bottom_left() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let frame = Item::new(
            vec![Point(0.0, 0.0), Point(100.0, 0.0), Point(100.0, 100.0), Point(0.0, 100.0)],
            vec![vec![Point(10.0, 10.0), Point(90.0, 10.0), Point(90.0, 90.0), Point(10.0, 90.0)]],
        )
        .unwrap();
        let mut layout = Layout::new(0);
        layout.place(0, &frame, DTransformation::empty());

        let config = NfpConfig {
            fallback: Some(BottomLeftConfig {
                epsilon: 5.0,
                ..BottomLeftConfig::default()
            }),
            ..bottom_left_nfp()
        };
        let c = nfp_placer(config, 0.0)
            .place(&rect_item(20.0, 20.0), &bin, &layout)
            .unwrap()
            .unwrap();
        assert_translation(&c.d_transf, (10.0, 10.0));
    }

    #[test]
    fn nfp_refinement_never_worsens() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let triangle = Item::new(vec![Point(0.0, 0.0), Point(30.0, 0.0), Point(0.0, 20.0)], vec![]).unwrap();
        let mut layout = Layout::new(0);
        layout.place(0, &rect_item(40.0, 15.0), DTransformation::new(0.0, (30.0, 42.0)));

        let plain = NfpConfig {
            rotations: vec![0.0, FRAC_PI_2],
            alignment: Alignment::Center,
            starting_point: Alignment::Center,
            ..bottom_left_nfp()
        };
        let refined = NfpConfig {
            refine_offset: true,
            refine_rotation: true,
            ..plain.clone()
        };
        let c_plain = nfp_placer(plain, 1.0).place(&triangle, &bin, &layout).unwrap().unwrap();
        let c_refined = nfp_placer(refined, 1.0).place(&triangle, &bin, &layout).unwrap().unwrap();
        assert!(c_refined.cost.value() <= c_plain.cost.value() + 1e-9);
        assert!(is_valid_placement(&triangle, &c_refined.d_transf, &bin, &layout, 1.0));
    }

    #[test]
    fn bottom_left_slides_squares() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = BottomLeftPlacer::new(BottomLeftConfig::default(), 0.0);
        let square = rect_item(10.0, 10.0);
        let mut layout = Layout::new(0);

        let first = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&first.d_transf, (0.0, 0.0));
        layout.place(0, &square, first.d_transf);
        let second = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&second.d_transf, (10.0, 0.0));
    }

    #[test_case(2.0, 0.0, (0.0, 0.0), (12.0, 0.0); "spacing")]
    #[test_case(0.0, 2.0, (2.0, 2.0), (14.0, 2.0); "min object distance")]
    fn bottom_left_keeps_distance(
        spacing: f64,
        min_obj_distance: f64,
        first: (f64, f64),
        second: (f64, f64),
    ) {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = BottomLeftConfig {
            min_obj_distance,
            ..BottomLeftConfig::default()
        };
        let placer = BottomLeftPlacer::new(config, spacing);
        assert_eq!(placer.clearance(), 2.0);
        let square = rect_item(10.0, 10.0);
        let mut layout = Layout::new(0);
        let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&c.d_transf, first);
        layout.place(0, &square, c.d_transf);
        let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
        assert_translation(&c.d_transf, second);
    }

    #[test]
    fn bottom_left_keeps_min_obj_distance_to_box_walls() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let config = BottomLeftConfig {
            min_obj_distance: 5.0,
            ..BottomLeftConfig::default()
        };
        let placer = BottomLeftPlacer::new(config, 0.0);
        let c = placer.place(&rect_item(10.0, 10.0), &bin, &Layout::new(0)).unwrap().unwrap();
        assert_translation(&c.d_transf, (5.0, 5.0));

        //91 wide fits the box, but not with 5 units on both sides
        assert!(placer.place(&rect_item(91.0, 10.0), &bin, &Layout::new(0)).unwrap().is_none());
        let exact = placer.place(&rect_item(90.0, 10.0), &bin, &Layout::new(0)).unwrap().unwrap();
        assert_translation(&exact.d_transf, (5.0, 5.0));
    }

    #[test]
    fn bottom_left_keeps_min_obj_distance_to_strip_walls() {
        init_logger();
        let bin = Bin::new_strip(0.0, 0.0, 20.0).unwrap();
        let config = BottomLeftConfig {
            min_obj_distance: 3.0,
            ..BottomLeftConfig::default()
        };
        let placer = BottomLeftPlacer::new(config, 0.0);
        let c = placer.place(&rect_item(10.0, 10.0), &bin, &Layout::new(0)).unwrap().unwrap();
        assert_translation(&c.d_transf, (3.0, 3.0));
        //only 14 of the 20 units of height remain usable
        assert!(placer.place(&rect_item(10.0, 15.0), &bin, &Layout::new(0)).unwrap().is_none());
    }

    #[test]
    fn bottom_left_keeps_min_obj_distance_to_circle_wall() {
        init_logger();
        let bin = Bin::new_circle(Point(0.0, 0.0), 10.0).unwrap();
        let config = BottomLeftConfig {
            min_obj_distance: 2.0,
            epsilon: 0.5,
            ..BottomLeftConfig::default()
        };
        let placer = BottomLeftPlacer::new(config, 0.0);
        let square = rect_item(8.0, 8.0);
        let c = placer.place(&square, &bin, &Layout::new(0)).unwrap().unwrap();
        let placed = square.shape_at(&c.d_transf);
        assert!(placed.outer.vertices.iter().all(|v| v.distance_to(&Point(0.0, 0.0)) <= 8.0 + 1e-6));
        assert!(bin.contains_with_margin(&placed, 2.0));
    }

    #[test]
    fn bottom_left_rejects_oversized_item() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let placer = BottomLeftPlacer::new(BottomLeftConfig::default(), 0.0);
        assert!(placer.place(&rect_item(150.0, 10.0), &bin, &Layout::new(0)).unwrap().is_none());
    }

    #[test]
    fn bottom_left_rotates_when_allowed() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 200.0).unwrap();
        let item = rect_item(150.0, 50.0);
        let fixed = BottomLeftPlacer::new(BottomLeftConfig::default(), 0.0);
        assert!(fixed.place(&item, &bin, &Layout::new(0)).unwrap().is_none());

        let config = BottomLeftConfig {
            allow_rotations: true,
            epsilon: 5.0,
            ..BottomLeftConfig::default()
        };
        let c = BottomLeftPlacer::new(config, 0.0)
            .place(&item, &bin, &Layout::new(0))
            .unwrap()
            .unwrap();
        assert!(approx_eq!(f64, c.d_transf.rotation(), FRAC_PI_2));
        let bbox = item.shape_at(&c.d_transf).bbox();
        assert!(bbox.x_min.abs() < 1e-6 && bbox.y_min.abs() < 1e-6);
    }

    #[test]
    fn bottom_left_in_strip() {
        init_logger();
        let bin = Bin::new_strip(0.0, 0.0, 20.0).unwrap();
        let placer = BottomLeftPlacer::new(BottomLeftConfig::default(), 0.0);
        let square = rect_item(15.0, 15.0);
        let mut layout = Layout::new(0);
        for idx in 0..3 {
            let c = placer.place(&square, &bin, &layout).unwrap().unwrap();
            assert_translation(&c.d_transf, (15.0 * idx as f64, 0.0));
            layout.place(idx, &square, c.d_transf);
        }
    }

    #[test]
    fn placer_dispatches_on_config() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let square = rect_item(10.0, 10.0);
        for config in [
            PlacerConfig::Nfp(bottom_left_nfp()),
            PlacerConfig::BottomLeft(BottomLeftConfig::default()),
        ] {
            let placer = Placer::new(&config, 1.5, StopCriteria::default());
            assert_eq!(placer.clearance(), 1.5);
            let c = placer.place(&square, &bin, &Layout::new(0)).unwrap().unwrap();
            assert_translation(&c.d_transf, (0.0, 0.0));
        }
    }
}
