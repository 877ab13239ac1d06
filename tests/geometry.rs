use radprof::geometry::{BoundingBox, Point, Shape, ShapeKind, to_masks};

fn rect(min_row: f64, min_col: f64, max_row: f64, max_col: f64) -> Shape {
    Shape::new(
        ShapeKind::Rectangle,
        vec![
            Point::new(min_row, min_col),
            Point::new(min_row, max_col),
            Point::new(max_row, max_col),
            Point::new(max_row, min_col),
        ],
    )
}

#[test]
fn clamp_is_idempotent_for_in_range_box() {
    let b = BoundingBox {
        min_row: 2,
        max_row: 8,
        min_col: 1,
        max_col: 9,
    };
    let clamped = b.clamp(20, 20);
    assert_eq!(clamped, b);
    assert_eq!(clamped.clamp(20, 20), clamped);
}

#[test]
fn bounds_clamp_independently_to_their_side() {
    // Min bound beyond the upper extent pins to the extent, not to zero.
    let b = BoundingBox {
        min_row: 25,
        max_row: 30,
        min_col: -10,
        max_col: 5,
    };
    let clamped = b.clamp(20, 20);
    assert_eq!(clamped.min_row, 20);
    assert_eq!(clamped.max_row, 20);
    assert_eq!(clamped.min_col, 0);
    assert_eq!(clamped.max_col, 5);
    assert!(clamped.is_degenerate());
}

#[test]
fn partially_out_of_frame_box_is_truncated_not_rejected() {
    let b = BoundingBox {
        min_row: -3,
        max_row: 7,
        min_col: 4,
        max_col: 40,
    };
    let clamped = b.clamp(10, 12);
    assert_eq!(clamped.min_row, 0);
    assert_eq!(clamped.max_row, 7);
    assert_eq!(clamped.max_col, 12);
    assert!(!clamped.is_degenerate());
    assert_eq!(clamped.height(), 7);
    assert_eq!(clamped.width(), 8);
}

#[test]
fn rectangle_mask_covers_its_box() {
    let shape = rect(2.0, 3.0, 5.0, 7.0);
    let mask = shape.to_mask(10, 10);
    assert!(mask[[2, 3]]);
    assert!(mask[[4, 6]]);
    assert!(!mask[[1, 3]]);
    assert!(!mask[[2, 8]]);
    let inside = mask.iter().filter(|v| **v).count();
    assert_eq!(inside, 3 * 4);
}

#[test]
fn ellipse_mask_is_inscribed_in_its_box() {
    let shape = Shape::new(
        ShapeKind::Ellipse,
        vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
    );
    let mask = shape.to_mask(12, 12);
    assert!(mask[[5, 5]]);
    assert!(mask[[0, 5]]);
    assert!(mask[[5, 0]]);
    // Corners of the box are outside the inscribed ellipse.
    assert!(!mask[[0, 0]]);
    assert!(!mask[[9, 9]]);
}

#[test]
fn polygon_containment_uses_ray_casting() {
    // L-shaped polygon.
    let shape = Shape::new(
        ShapeKind::Polygon,
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 6.0),
            Point::new(3.0, 6.0),
            Point::new(3.0, 3.0),
            Point::new(6.0, 3.0),
            Point::new(6.0, 0.0),
        ],
    );
    assert!(shape.contains(Point::new(1.0, 1.0)));
    assert!(shape.contains(Point::new(1.0, 5.0)));
    assert!(shape.contains(Point::new(5.0, 1.0)));
    // The notch removed from the L.
    assert!(!shape.contains(Point::new(5.0, 5.0)));
    assert!(!shape.contains(Point::new(7.0, 1.0)));
}

#[test]
fn out_of_frame_shape_yields_empty_mask() {
    let shape = rect(20.0, 20.0, 30.0, 30.0);
    let mask = shape.to_mask(10, 10);
    assert!(mask.iter().all(|v| !*v));
}

#[test]
fn bulk_masks_match_single_shape_masks() {
    let shapes = vec![rect(0.0, 0.0, 2.0, 2.0), rect(3.0, 3.0, 6.0, 6.0)];
    let masks = to_masks(&shapes, 8, 8);
    assert_eq!(masks.len(), 2);
    assert_eq!(masks[0], shapes[0].to_mask(8, 8));
    assert_eq!(masks[1], shapes[1].to_mask(8, 8));
}
