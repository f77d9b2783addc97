use super::*;

#[test]
fn hex_parsing_accepts_rgb_and_rgba() {
    assert_eq!(Rgba8::from_hex("#ff0000").unwrap(), Rgba8::rgb(255, 0, 0));
    assert_eq!(
        Rgba8::from_hex("0000FF80").unwrap(),
        Rgba8::new(0, 0, 255, 128)
    );
    assert!(Rgba8::from_hex("#fff").is_err());
    assert!(Rgba8::from_hex("#gg0000").is_err());
}

#[test]
fn opacity_scales_alpha_and_clamps() {
    let c = Rgba8::rgb(10, 20, 30);
    assert_eq!(c.with_opacity(0.5).a, 128);
    assert_eq!(c.with_opacity(2.0).a, 255);
    assert_eq!(c.with_opacity(f32::NAN).a, 0);
}

#[test]
fn premul_matches_straight_for_opaque() {
    let c = Rgba8::rgb(200, 100, 50);
    assert_eq!(c.to_premul(), [200, 100, 50, 255]);
    assert_eq!(Rgba8::TRANSPARENT.to_premul(), [0, 0, 0, 0]);
}

#[test]
fn canvas_rejects_oversized_and_empty_surfaces() {
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .to_u16()
        .is_err()
    );
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .to_u16()
        .is_err()
    );
    assert_eq!(
        Canvas {
            width: 64,
            height: 32
        }
        .to_u16()
        .unwrap(),
        (64, 32)
    );
}

#[test]
fn anchor_transform_maps_local_x_axis_onto_direction() {
    let a = anchor_transform(Point::new(10.0, 20.0), std::f64::consts::FRAC_PI_2);
    let tip = a * Point::new(5.0, 0.0);
    assert!((tip.x - 10.0).abs() < 1e-9);
    assert!((tip.y - 25.0).abs() < 1e-9);
}
