use crate::viewport::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn zoom_scales_position_and_clamps() {
    let mut vp = Viewport::new();
    vp.position = Point::new(10.0, -20.0);
    vp.zoom_in();
    assert!(approx(vp.scale, 1.2));
    assert!(approx(vp.position.x, 12.0));
    assert!(approx(vp.position.y, -24.0));

    for _ in 0..100 {
        vp.zoom_in();
    }
    assert_eq!(vp.scale, MAX_SCALE);
    for _ in 0..100 {
        vp.zoom_out();
    }
    assert_eq!(vp.scale, MIN_SCALE);
}

#[test]
fn wheel_direction() {
    let mut vp = Viewport::new();
    vp.wheel(120.0);
    assert!(approx(vp.scale, 0.97));
    vp.wheel(-120.0);
    vp.wheel(-120.0);
    assert!(approx(vp.scale, 1.03));
}

#[test]
fn fit_centers_content() {
    let mut vp = Viewport::new();
    vp.fit(Size::new(1000.0, 500.0), Size::new(200.0, 200.0));
    assert!(approx(vp.scale, 2.5 * FIT_PADDING));
    assert!(approx(vp.position.x, (1000.0 - 200.0 * vp.scale) / 2.0));
    assert!(approx(vp.position.y, (500.0 - 200.0 * vp.scale) / 2.0));

    let before = vp;
    vp.fit(Size::new(1000.0, 500.0), Size::new(0.0, 10.0));
    assert_eq!(vp, before);

    vp.reset();
    assert_eq!(vp, Viewport::default());
}

#[test]
fn drag_moves_by_pointer_delta() {
    let mut vp = Viewport::new();
    vp.position = Point::new(5.0, 5.0);
    vp.drag_to(Point::new(100.0, 100.0));
    assert_eq!(vp.position, Point::new(5.0, 5.0));

    vp.begin_drag(Point::new(50.0, 60.0));
    assert!(vp.is_dragging());
    vp.drag_to(Point::new(70.0, 50.0));
    assert_eq!(vp.position, Point::new(25.0, -5.0));
    vp.end_drag();
    assert!(!vp.is_dragging());
}

#[test]
fn divider_is_clamped() {
    assert_eq!(clamp_divider(10.0), MIN_DIVIDER_PERCENT);
    assert_eq!(clamp_divider(90.0), MAX_DIVIDER_PERCENT);
    assert_eq!(drag_divider(50.0, 100.0, 1000.0), 60.0);
    assert_eq!(drag_divider(50.0, 900.0, 1000.0), MAX_DIVIDER_PERCENT);
    assert_eq!(drag_divider(45.0, 10.0, 0.0), 45.0);
}
