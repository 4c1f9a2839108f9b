//! Property-based tests for the geometry and code rules.
//!
//! These run without a database: they exercise the pure functions every
//! command relies on.

use proptest::prelude::*;
use storage_hierarchy_api::{
    commands::codes,
    geometry::{
        containment::covers, utilization_percent, validate_boundary, validate_coordinates,
        DerivedGeometry, RawGeometry, Shape,
    },
};

const WEST: f64 = -70.6483;
const EAST: f64 = -70.6473;
const NORTH: f64 = -33.4489;
const SOUTH: f64 = -33.4499;

fn warehouse() -> geo::Polygon<f64> {
    validate_boundary(&rectangle(WEST, NORTH, EAST, SOUTH)).expect("warehouse boundary is valid")
}

fn rectangle(west: f64, north: f64, east: f64, south: f64) -> RawGeometry {
    RawGeometry::polygon(&[
        (west, north),
        (east, north),
        (east, south),
        (west, south),
        (west, north),
    ])
}

/// Two ordered fractions of a span, kept off the edges and at least 1% apart.
fn span_strategy() -> impl Strategy<Value = (f64, f64)> {
    (0.01f64..0.49, 0.51f64..0.99)
}

/// Rectangles anywhere on the globe away from the poles and the antimeridian.
fn global_rectangle_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-170.0f64..170.0, -80.0f64..80.0, 0.0001f64..1.0, 0.0001f64..1.0)
        .prop_map(|(west, south, width, height)| (west, south + height, west + width, south))
}

fn code_segment_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,8}".prop_map(|s| s)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn rectangles_inside_warehouse_are_covered(
        (x0, x1) in span_strategy(),
        (y0, y1) in span_strategy(),
    ) {
        let west = WEST + x0 * (EAST - WEST);
        let east = WEST + x1 * (EAST - WEST);
        let north = NORTH + y0 * (SOUTH - NORTH);
        let south = NORTH + y1 * (SOUTH - NORTH);
        let child = validate_boundary(&rectangle(west, north, east, south)).unwrap();

        prop_assert!(covers(&warehouse(), Shape::Polygon(&child)));
    }

    #[test]
    fn rectangles_crossing_an_edge_are_not_covered((x0, _) in span_strategy(), overshoot in 0.0001f64..0.01) {
        let west = WEST + x0 * (EAST - WEST);
        let child = validate_boundary(&rectangle(west, NORTH, EAST + overshoot, SOUTH)).unwrap();

        prop_assert!(!covers(&warehouse(), Shape::Polygon(&child)));
    }

    #[test]
    fn points_outside_the_bounding_box_are_not_covered(
        offset in 0.00001f64..1.0,
        latitude_fraction in 0.0f64..1.0,
    ) {
        let latitude = NORTH + latitude_fraction * (SOUTH - NORTH);
        let point = validate_coordinates(EAST + offset, latitude).unwrap();

        prop_assert!(!covers(&warehouse(), Shape::Point(&point)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn derived_area_is_positive_and_centroid_is_inside_bbox(
        (west, north, east, south) in global_rectangle_strategy(),
    ) {
        let polygon = validate_boundary(&rectangle(west, north, east, south)).unwrap();
        let derived = DerivedGeometry::from_polygon(&polygon);

        prop_assert!(derived.area_m2 > 0.0);
        prop_assert!(derived.bbox.contains_point(derived.centroid[0], derived.centroid[1]));
        prop_assert_eq!(derived.bbox.min_longitude, west);
        prop_assert_eq!(derived.bbox.max_latitude, north);
    }

    #[test]
    fn utilization_stays_within_bounds(total in 1.0f64..1e9, share in 0.0f64..1.0) {
        let percent = utilization_percent(total * share, total);
        prop_assert!((0.0..=100.0 + 1e-9).contains(&percent));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn code_normalisation_is_idempotent(raw in "\\s{0,2}[a-zA-Z0-9_-]{0,12}\\s{0,2}") {
        let once = codes::normalize(&raw);
        prop_assert_eq!(codes::normalize(&once), once.clone());
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn child_codes_extending_the_parent_are_accepted(
        warehouse in "[A-Z]{2}-[0-9]{3}",
        area in code_segment_strategy(),
        location in code_segment_strategy(),
    ) {
        let warehouse = codes::warehouse_code(&warehouse).unwrap();
        let area = codes::area_code(&format!("{}-{}", warehouse, area.to_lowercase()), &warehouse).unwrap();
        let warehouse_prefix = format!("{}-", warehouse);
        prop_assert!(area.starts_with(&warehouse_prefix));
        prop_assert_eq!(area.to_uppercase(), area.clone());

        let location = codes::location_code(&format!("{}-{}", area, location), &area).unwrap();
        let area_prefix = format!("{}-", area);
        prop_assert!(location.starts_with(&area_prefix));
    }

    #[test]
    fn codes_under_a_different_parent_are_rejected(
        area in code_segment_strategy(),
    ) {
        let foreign = format!("XX-999-{}", area);
        prop_assert!(codes::area_code(&foreign, "GH-001").is_err());
    }
}
