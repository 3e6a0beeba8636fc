#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use test_case::test_case;

    use nest2d::geometry::convex_hull::is_convex;
    use nest2d::geometry::nfp::{inner_fit_polygon, minkowski_sum, n_segments, no_fit_polygon};
    use nest2d::geometry::primitives::{Point, SPolygon};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<Point> {
        vec![Point(x, y), Point(x + w, y), Point(x + w, y + h), Point(x, y + h)]
    }

    #[test_case(0.0, 8)]
    #[test_case(0.65, 44)]
    #[test_case(1.0, 64)]
    #[test_case(5.0, 64; "clamped")]
    fn segments_for_accuracy(accuracy: f64, expected: usize) {
        assert_eq!(n_segments(accuracy), expected);
    }

    #[test]
    fn minkowski_sum_of_unit_squares() {
        init_logger();
        let sum = minkowski_sum(&rect(0.0, 0.0, 1.0, 1.0), &rect(0.0, 0.0, 1.0, 1.0));
        assert_eq!(sum.len(), 4);
        assert!(approx_eq!(f64, SPolygon::calculate_area(&sum), 4.0));
    }

    #[test]
    fn nfp_of_two_squares() {
        init_logger();
        let stationary = rect(0.0, 0.0, 10.0, 10.0);
        let orbiting = rect(0.0, 0.0, 10.0, 10.0);
        let nfp = no_fit_polygon(&stationary, &orbiting, 0.0, 64);
        assert_eq!(nfp.len(), 4);
        assert!(approx_eq!(f64, SPolygon::calculate_area(&nfp), 400.0));
        assert!(nfp.contains(&Point(-10.0, -10.0)));
        assert!(nfp.contains(&Point(10.0, 10.0)));
    }

    #[test]
    fn nfp_with_clearance_is_rounded() {
        init_logger();
        let square = rect(0.0, 0.0, 10.0, 10.0);
        let nfp = no_fit_polygon(&square, &square, 1.0, 64);
        let area = SPolygon::calculate_area(&nfp);
        //400 + perimeter * clearance + area of the circumscribed disk polygon
        assert!(area > 483.1 && area < 484.0, "area: {area}");
        assert!(is_convex(&nfp));
    }

    #[test]
    fn ifp_of_square_in_box() {
        init_logger();
        let ifp = inner_fit_polygon(&rect(0.0, 0.0, 100.0, 100.0), &rect(0.0, 0.0, 10.0, 10.0), 0.0);
        assert_eq!(ifp.len(), 4);
        assert!(approx_eq!(f64, SPolygon::calculate_area(&ifp), 8100.0));
        assert!(ifp.contains(&Point(0.0, 0.0)));
        assert!(ifp.contains(&Point(90.0, 90.0)));
    }

    #[test]
    fn ifp_with_margin_shrinks() {
        init_logger();
        let ifp = inner_fit_polygon(&rect(0.0, 0.0, 100.0, 100.0), &rect(0.0, 0.0, 10.0, 10.0), 5.0);
        assert_eq!(ifp.len(), 4);
        assert!(approx_eq!(f64, SPolygon::calculate_area(&ifp), 80.0 * 80.0, epsilon = 1e-6));
    }

    #[test]
    fn ifp_of_exact_fit_is_a_point() {
        init_logger();
        let ifp = inner_fit_polygon(&rect(0.0, 0.0, 100.0, 100.0), &rect(5.0, 5.0, 100.0, 100.0), 0.0);
        assert_eq!(ifp.len(), 1);
        assert!(approx_eq!(f64, ifp[0].0, -5.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, ifp[0].1, -5.0, epsilon = 1e-9));
    }

    #[test]
    fn ifp_of_exact_fit_in_one_axis_is_a_segment() {
        init_logger();
        let ifp = inner_fit_polygon(&rect(0.0, 0.0, 100.0, 100.0), &rect(0.0, 0.0, 100.0, 10.0), 0.0);
        assert_eq!(ifp.len(), 2);
        assert!(ifp.iter().all(|p| p.0.abs() < 1e-9));
    }

    #[test]
    fn ifp_of_oversized_item_is_empty() {
        init_logger();
        let ifp = inner_fit_polygon(&rect(0.0, 0.0, 100.0, 100.0), &rect(0.0, 0.0, 100.5, 10.0), 0.0);
        assert!(ifp.is_empty());
    }

    #[test]
    fn ifp_in_inscribed_polygon() {
        init_logger();
        //regular octagon around the origin with circumradius 10
        let octagon = (0..8)
            .map(|i| {
                let a = i as f64 * std::f64::consts::FRAC_PI_4;
                Point(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect::<Vec<_>>();
        let ifp = inner_fit_polygon(&octagon, &rect(-1.0, -1.0, 2.0, 2.0), 0.0);
        assert!(ifp.len() >= 3);
        assert!(is_convex(&ifp));
        //the small square fits when centered
        assert!(SPolygon::new(ifp).is_ok());
    }
}
