use std::cell::Cell;

use super::*;
use crate::foundation::core::{Canvas, Rgba8};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "roundel_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn test_frame() -> FrameRGBA {
    FrameRGBA::solid(
        Canvas {
            width: 12,
            height: 8,
        },
        Rgba8::opaque(40, 50, 60),
    )
}

struct FakeShare {
    accepts: bool,
    fails: bool,
    shared: Cell<bool>,
}

impl FakeShare {
    fn new(accepts: bool, fails: bool) -> Self {
        Self {
            accepts,
            fails,
            shared: Cell::new(false),
        }
    }
}

impl ShareSurface for FakeShare {
    fn can_share(&self, blob: &ExportBlob) -> bool {
        assert_eq!(blob.media_type, EXPORT_MEDIA_TYPE);
        self.accepts
    }

    fn share(&self, _blob: &ExportBlob) -> RoundelResult<()> {
        if self.fails {
            return Err(RoundelError::validation("share sheet dismissed"));
        }
        self.shared.set(true);
        Ok(())
    }
}

#[test]
fn encode_png_round_trips_dimensions() {
    let frame = test_frame();
    let png = encode_png(&frame).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (12, 8));
    assert_eq!(img.get_pixel(0, 0).0, [40, 50, 60, 255]);
}

#[test]
fn encode_png_rejects_mismatched_buffer() {
    let frame = FrameRGBA {
        width: 4,
        height: 4,
        rgba8: vec![0; 7],
    };
    assert!(matches!(
        encode_png(&frame),
        Err(RoundelError::Validation(_))
    ));
}

#[test]
fn export_downloads_when_no_share_surface_exists() {
    let tmp = temp_dir("export_download");
    let outcome = export_frame(&test_frame(), "avatar.png", None, &tmp).unwrap();

    let ExportOutcome::Downloaded(path) = outcome else {
        panic!("expected download outcome");
    };
    assert_eq!(path.file_name().unwrap(), "avatar.png");
    let png = std::fs::read(&path).unwrap();
    assert!(image::load_from_memory(&png).is_ok());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn export_prefers_an_accepting_share_surface() {
    let tmp = temp_dir("export_share");
    let share = FakeShare::new(true, false);
    let outcome = export_frame(&test_frame(), "avatar.png", Some(&share), &tmp).unwrap();

    assert_eq!(outcome, ExportOutcome::Shared);
    assert!(share.shared.get());
    assert!(!tmp.join("avatar.png").exists());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn export_falls_back_when_share_declines_or_fails() {
    let tmp = temp_dir("export_fallback");

    let declining = FakeShare::new(false, false);
    let outcome = export_frame(&test_frame(), "avatar.png", Some(&declining), &tmp).unwrap();
    assert!(matches!(outcome, ExportOutcome::Downloaded(_)));

    let failing = FakeShare::new(true, true);
    let outcome = export_frame(&test_frame(), "avatar.png", Some(&failing), &tmp).unwrap();
    assert!(matches!(outcome, ExportOutcome::Downloaded(_)));

    std::fs::remove_dir_all(&tmp).ok();
}
