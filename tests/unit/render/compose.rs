use super::*;

const SURFACE: [u8; 4] = [0x1a, 0x1a, 0x1a, 255];
const ACCENT: [u8; 4] = [0xf5, 0xcc, 0x42, 255];

fn solid_image(width: u32, height: u32, px: [u8; 4]) -> DecodedImage {
    DecodedImage {
        width,
        height,
        rgba8: px.repeat(width as usize * height as usize),
    }
}

fn canvas(side: u32) -> Canvas {
    Canvas {
        width: side,
        height: side,
    }
}

#[test]
fn crop_origin_centers_and_clamps_left_top_only() {
    // Centered crop of a 1200x600 normalized upload at draw size 90.
    assert_eq!(crop_origin(1200, 600, 90.0, 0.0, 0.0), (555.0, 255.0));

    // Positive offsets pull the origin toward zero and clamp there.
    assert_eq!(crop_origin(1200, 600, 90.0, 600.0, 300.0), (0.0, 0.0));

    // Negative offsets push the origin right/down with no far-edge clamp:
    // the crop may read past the image bounds.
    let (sx, sy) = crop_origin(1200, 600, 90.0, -600.0, -300.0);
    assert_eq!((sx, sy), (1155.0, 555.0));
    assert!(sx + 90.0 > 1200.0);
    assert!(sy + 90.0 > 600.0);
}

#[test]
fn empty_scene_draws_placeholder_glyph() {
    let frame = compose(
        canvas(200),
        AvatarScene::Empty,
        &RenderParams::default(),
        &Theme::default(),
    );
    // Glyph center sits at (w/2, h * 0.35).
    assert_eq!(frame.pixel(100, 70), Some(ACCENT));
    assert_eq!(frame.pixel(100, 160), Some(SURFACE));
    assert_eq!(frame.pixel(5, 5), Some(SURFACE));
}

#[test]
fn unavailable_scene_is_background_only() {
    let frame = compose(
        canvas(100),
        AvatarScene::Unavailable,
        &RenderParams::default(),
        &Theme::default(),
    );
    assert_eq!(frame.pixel(50, 50), Some(SURFACE));
    // No placeholder glyph either: a failed load never shows stale art.
    assert_eq!(frame.pixel(50, 35), Some(SURFACE));
}

#[test]
fn grayscale_disc_is_gray_opaque_and_bordered() {
    let img = solid_image(300, 200, [200, 100, 50, 255]);
    let params = RenderParams {
        filter: FilterKind::Grayscale,
        ..RenderParams::default()
    };
    let frame = compose(canvas(100), AvatarScene::Image(&img), &params, &Theme::default());

    let y = (0.2126 * 200.0 + 0.7152 * 100.0 + 0.0722 * 50.0_f64).round() as u8;
    assert_eq!(frame.pixel(50, 50), Some([y, y, y, 255]));

    // No transparent gap just inside the border ring.
    assert_eq!(frame.pixel(89, 50), Some([y, y, y, 255]));

    // Border ring strokes in the theme border color.
    assert_eq!(frame.pixel(50, 6), Some(ACCENT));

    // Background is untouched outside the disc and never filtered.
    assert_eq!(frame.pixel(0, 0), Some(SURFACE));
}

#[test]
fn compose_is_deterministic() {
    let img = solid_image(64, 48, [90, 120, 30, 255]);
    let params = RenderParams {
        zoom: 1.3,
        filter: FilterKind::Sepia,
        offset_x: 4.5,
        offset_y: -2.0,
    };
    let theme = Theme::default();
    let a = compose(canvas(80), AvatarScene::Image(&img), &params, &theme);
    let b = compose(canvas(80), AvatarScene::Image(&img), &params, &theme);
    assert_eq!(a, b);
}

#[test]
fn far_edge_overread_shows_background_through() {
    // A 50x50 source under a 90px draw size: the crop origin clamps at
    // zero, and the unclamped far edge reads transparent samples.
    let img = solid_image(50, 50, [0, 200, 0, 255]);
    let frame = compose(
        canvas(100),
        AvatarScene::Image(&img),
        &RenderParams::default(),
        &Theme::default(),
    );

    // Left of the disc still maps into the image.
    assert_eq!(frame.pixel(20, 50), Some([0, 200, 0, 255]));

    // Right of the disc maps past the image bounds: the surface shows.
    assert_eq!(frame.pixel(80, 50), Some(SURFACE));
}

#[test]
fn extreme_zoom_keeps_the_crop_window_canvas_sized() {
    // Zoom has no upper bound, so the crop square can be astronomically
    // larger than the canvas; only the canvas-sized window of it may be
    // materialized. The tiny source ends up far outside that window, so
    // the background and the border ring are all that remains visible.
    let img = solid_image(8, 8, [255, 0, 0, 255]);
    let params = RenderParams {
        zoom: 1e8,
        ..RenderParams::default()
    };
    let frame = compose(canvas(100), AvatarScene::Image(&img), &params, &Theme::default());

    assert_eq!(frame.pixel(50, 50), Some(SURFACE));
    assert_eq!(frame.pixel(50, 6), Some(ACCENT));
}

#[test]
fn zoom_below_minimum_is_clamped_not_divided() {
    let img = solid_image(300, 300, [10, 10, 200, 255]);
    let params = RenderParams {
        zoom: 0.0,
        ..RenderParams::default()
    };
    let frame = compose(canvas(100), AvatarScene::Image(&img), &params, &Theme::default());
    // draw size is min_side * 0.9 * MIN_ZOOM = 9px centered on the canvas.
    assert_eq!(frame.pixel(50, 50).unwrap()[3], 255);
    assert_eq!(frame.pixel(30, 50), Some(SURFACE));
}
