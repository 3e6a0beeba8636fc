#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use itertools::Itertools;
    use test_case::test_case;

    use nest2d::NestControl;
    use nest2d::entities::{Bin, Item};
    use nest2d::geometry::DTransformation;
    use nest2d::geometry::geo_enums::Alignment;
    use nest2d::geometry::primitives::Point;
    use nest2d::opt::StopCriteria;
    use nest2d::placer::{BottomLeftConfig, NfpConfig, Placer, PlacerConfig};
    use nest2d::selection::{
        DJDHeuristicConfig, DjdHeuristic, FirstFit, Selection, SelectionConfig, SelectionOutcome, groups_in_window,
        placement_order,
    };
    use nest2d::util::assertions;

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

    fn placer() -> Placer {
        let config = NfpConfig {
            rotations: vec![0.0],
            alignment: Alignment::BottomLeft,
            starting_point: Alignment::BottomLeft,
            parallel: false,
            refine_offset: false,
            ..NfpConfig::default()
        };
        Placer::new(&PlacerConfig::Nfp(config), 0.0, StopCriteria::default())
    }

    fn squares(sizes: &[f64]) -> Vec<Item> {
        sizes.iter().map(|&s| rect_item(s, s)).collect()
    }

    fn assert_consistent(outcome: &SelectionOutcome, items: &[Item], bin: &Bin) {
        let placed = outcome
            .layouts
            .iter()
            .flat_map(|l| l.placed_items.iter().filter(|pi| pi.is_movable()).map(|pi| pi.item_idx))
            .chain(outcome.unresolved.iter().copied())
            .sorted()
            .collect_vec();
        let placeable = (0..items.len()).filter(|&i| items[i].is_placeable()).collect_vec();
        assert_eq!(placed, placeable);
        for layout in &outcome.layouts {
            assert!(assertions::layout_is_feasible(layout, bin, 0.0));
        }
    }

    #[test_case(&[50.0; 4], 1; "four quarters")]
    #[test_case(&[60.0; 4], 4; "one per bin")]
    #[test_case(&[60.0, 40.0, 40.0, 60.0], 2; "mixed")]
    fn first_fit_bin_count(sizes: &[f64], n_bins: usize) {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(sizes);
        let outcome = FirstFit.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        assert_eq!(outcome.layouts.len(), n_bins);
        assert!(outcome.unresolved.is_empty());
        assert!(!outcome.cancelled);
        assert_consistent(&outcome, &items, &bin);
    }

    #[test]
    fn first_fit_reports_oversized_items() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[40.0, 120.0, 40.0]);
        let outcome = FirstFit.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.unresolved, vec![1]);
        assert_eq!(outcome.n_placed(), 2);
    }

    #[test]
    fn first_fit_never_opens_a_second_strip() {
        init_logger();
        let bin = Bin::new_strip(0.0, 0.0, 50.0).unwrap();
        let items = squares(&[30.0, 30.0, 30.0, 60.0, 20.0]);
        let outcome = FirstFit.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.unresolved, vec![3]);
        assert_consistent(&outcome, &items, &bin);
    }

    #[test]
    fn first_fit_respects_fixed_content() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let mut items = squares(&[50.0, 50.0, 50.0]);
        items.push(rect_item(50.0, 50.0).fixed_at(0, DTransformation::new(0.0, (50.0, 50.0))));
        items.push(rect_item(100.0, 50.0).as_disallowed_area(Some(1)));

        let outcome = FirstFit.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        //bin 0 holds the fixed item and three parts, bin 1 is half blocked
        assert_eq!(outcome.layouts.len(), 2);
        assert_eq!(outcome.layouts[0].n_movable(), 3);
        assert_eq!(outcome.layouts[1].n_movable(), 0);
        assert_consistent(&outcome, &items, &bin);
    }

    #[test]
    fn selection_rejects_unreachable_bin_ids() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let mut items = squares(&[10.0, 10.0]);
        items.push(rect_item(10.0, 10.0).fixed_at(usize::MAX, DTransformation::empty()));
        let control = NestControl::new();
        assert!(FirstFit.select(&items, &bin, &placer(), &control).is_err());
        let djd = DjdHeuristic::new(DJDHeuristicConfig::default());
        assert!(djd.select(&items, &bin, &placer(), &control).is_err());
    }

    #[test]
    fn djd_fills_bin_with_a_pair() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[50.0; 4]);
        let djd = DjdHeuristic::new(DJDHeuristicConfig::default());
        let outcome = djd.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.n_placed(), 4);
        assert_consistent(&outcome, &items, &bin);
    }

    #[test_case(false; "singles only")]
    #[test_case(true; "with groups")]
    fn djd_small_items_fill_a_fresh_bin(groups: bool) {
        init_logger();
        //no greedy phase and a coarse waste step: the allowance overshoots the free space
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[10.0; 4]);
        let config = DJDHeuristicConfig {
            initial_fill_proportion: 0.0,
            waste_increment: 0.3,
            try_pairs: groups,
            try_triplets: groups,
            ..DJDHeuristicConfig::default()
        };
        let outcome = DjdHeuristic::new(config)
            .select(&items, &bin, &placer(), &NestControl::new())
            .unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.n_placed(), 4);
        assert!(outcome.unresolved.is_empty());
        assert_consistent(&outcome, &items, &bin);
    }

    #[test]
    fn djd_many_small_items_with_triplets() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[10.0; 60]);
        let config = BottomLeftConfig {
            epsilon: 10.0,
            ..BottomLeftConfig::default()
        };
        let placer = Placer::new(&PlacerConfig::BottomLeft(config), 0.0, StopCriteria::default());
        let djd = DjdHeuristic::new(DJDHeuristicConfig {
            try_triplets: true,
            ..DJDHeuristicConfig::default()
        });
        let outcome = djd.select(&items, &bin, &placer, &NestControl::new()).unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.n_placed(), 60);
        assert_consistent(&outcome, &items, &bin);
    }

    #[test_case(&[0.5, 0.3, 0.2, 0.1, 0.4], 2, (0.55, 0.75); "pairs")]
    #[test_case(&[0.5, 0.3, 0.2, 0.1, 0.4], 3, (0.65, 0.95); "triplets")]
    #[test_case(&[0.2, 0.05, 0.3, 0.25], 1, (0.15, 0.27); "singles")]
    #[test_case(&[0.9, 0.8], 2, (0.0, 1.0); "nothing fits")]
    fn groups_in_window_matches_all_combinations(fractions: &[f64], size: usize, (lo, hi): (f64, f64)) {
        let expected = (0..fractions.len())
            .combinations(size)
            .filter(|g| {
                let sum = g.iter().map(|&i| fractions[i]).sum::<f64>();
                sum >= lo && sum <= hi
            })
            .collect_vec();
        assert_eq!(groups_in_window(fractions, size, (lo, hi)), expected);
    }

    #[test]
    fn groups_in_window_prunes_tiny_items() {
        //billions of triplets exist, none of them reaches the window
        let fractions = vec![1e-4; 5_000];
        let start = Instant::now();
        assert!(groups_in_window(&fractions, 3, (0.5, 0.6)).is_empty());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn groups_in_window_is_capped() {
        let fractions = vec![1e-4; 1_000];
        let start = Instant::now();
        let groups = groups_in_window(&fractions, 3, (0.0, 1.0));
        assert!(!groups.is_empty() && groups.len() <= 10_000);
        assert_eq!(groups[0], vec![0, 1, 2]);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test_case(&[50.0, 50.0, 30.0, 30.0, 40.0, 70.0, 20.0, 20.0]; "mixed squares")]
    #[test_case(&[60.0, 60.0, 40.0, 40.0, 40.0, 40.0]; "complementary")]
    #[test_case(&[33.0; 12]; "uniform")]
    fn djd_groups_never_hurt(sizes: &[f64]) {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(sizes);
        let without = DJDHeuristicConfig {
            try_pairs: false,
            try_triplets: false,
            ..DJDHeuristicConfig::default()
        };
        let with = DJDHeuristicConfig {
            try_pairs: true,
            try_triplets: true,
            ..DJDHeuristicConfig::default()
        };
        let control = NestControl::new();
        let o_without = DjdHeuristic::new(without).select(&items, &bin, &placer(), &control).unwrap();
        let o_with = DjdHeuristic::new(with).select(&items, &bin, &placer(), &control).unwrap();

        assert!(o_with.layouts.len() <= o_without.layouts.len());
        assert_eq!(o_with.n_placed(), items.len());
        assert_consistent(&o_with, &items, &bin);
        assert_consistent(&o_without, &items, &bin);
    }

    #[test_case(false; "sequential")]
    #[test_case(true; "parallel")]
    fn djd_is_deterministic(force_parallel: bool) {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[45.0, 45.0, 30.0, 25.0, 25.0, 55.0, 50.0, 10.0]);
        let config = DJDHeuristicConfig {
            force_parallel,
            allow_parallel: force_parallel,
            try_triplets: true,
            ..DJDHeuristicConfig::default()
        };
        let djd = DjdHeuristic::new(config);
        let a = djd.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        let b = djd.select(&items, &bin, &placer(), &NestControl::new()).unwrap();
        let indices = |o: &SelectionOutcome| {
            o.layouts
                .iter()
                .map(|l| l.item_indices().collect_vec())
                .collect_vec()
        };
        assert_eq!(indices(&a), indices(&b));
        assert_consistent(&a, &items, &bin);
    }

    #[test]
    fn djd_leaves_oversized_items_unresolved() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[150.0, 50.0, 50.0]);
        let outcome = DjdHeuristic::new(DJDHeuristicConfig::default())
            .select(&items, &bin, &placer(), &NestControl::new())
            .unwrap();
        assert_eq!(outcome.unresolved, vec![0]);
        assert_eq!(outcome.n_placed(), 2);
        assert_eq!(outcome.layouts.len(), 1);
    }

    #[test]
    fn djd_in_strip_places_everything() {
        init_logger();
        let bin = Bin::new_strip(0.0, 0.0, 50.0).unwrap();
        let items = squares(&[20.0, 30.0, 40.0, 10.0, 25.0]);
        let outcome = DjdHeuristic::new(DJDHeuristicConfig::default())
            .select(&items, &bin, &placer(), &NestControl::new())
            .unwrap();
        assert_eq!(outcome.layouts.len(), 1);
        assert_eq!(outcome.n_placed(), 5);
    }

    #[test_case(DJDHeuristicConfig { initial_fill_proportion: 1.5, ..DJDHeuristicConfig::default() }; "fill above one")]
    #[test_case(DJDHeuristicConfig { waste_increment: 0.0, ..DJDHeuristicConfig::default() }; "zero waste increment")]
    fn djd_rejects_invalid_config(config: DJDHeuristicConfig) {
        init_logger();
        assert!(SelectionConfig::DjdHeuristic(config).validate().is_err());
    }

    #[test]
    fn selection_dispatches_on_config() {
        init_logger();
        let bin = Bin::new_box(0.0, 0.0, 100.0, 100.0).unwrap();
        let items = squares(&[50.0; 4]);
        for config in [
            SelectionConfig::FirstFit,
            SelectionConfig::DjdHeuristic(DJDHeuristicConfig::default()),
        ] {
            let outcome = Selection::new(&config)
                .select(&items, &bin, &placer(), &NestControl::new())
                .unwrap();
            assert_eq!(outcome.layouts.len(), 1, "{config:?}");
        }
    }

    #[test]
    fn order_by_priority_then_area() {
        init_logger();
        let items = vec![
            rect_item(10.0, 10.0),
            rect_item(20.0, 20.0),
            rect_item(5.0, 5.0).with_priority(1),
            rect_item(20.0, 20.0),
            rect_item(30.0, 30.0).fixed_at(0, DTransformation::empty()),
            rect_item(40.0, 40.0).as_disallowed_area(None),
        ];
        assert_eq!(placement_order(&items), vec![2, 1, 3, 0]);
    }
}
