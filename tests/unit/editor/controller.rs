use std::io::Cursor;

use super::*;
use crate::editor::persist::JsonFileStore;
use crate::foundation::core::Rgba8;

const SURFACE: [u8; 4] = [0x1a, 0x1a, 0x1a, 255];

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "roundel_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn png_bytes(width: u32, height: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn upload(name: &str, media_type: &str, bytes: Vec<u8>) -> RawUpload {
    RawUpload {
        file_name: name.to_string(),
        media_type: media_type.to_string(),
        bytes,
    }
}

fn empty_editor() -> AvatarEditor {
    let config = EditorConfig {
        avatar_root: temp_dir("editor"),
        catalog: vec![],
        canvas: crate::foundation::core::Canvas {
            width: 100,
            height: 100,
        },
        ..EditorConfig::default()
    };
    AvatarEditor::new(config).unwrap()
}

#[test]
fn starts_empty_and_renders_placeholder_on_demand() {
    let mut editor = empty_editor();
    assert_eq!(editor.state(), EditorState::Empty);
    assert!(editor.needs_render());
    assert!(editor.frame().is_none());

    let frame = editor.render_current().unwrap();
    assert_eq!(frame.width, 100);
    assert!(!editor.needs_render());
    assert!(editor.selected_label().is_none());
}

#[test]
fn select_transitions_and_labels() {
    let mut editor = empty_editor();
    editor.select("7", "mem:u7");
    assert_eq!(editor.state(), EditorState::Selected);
    assert_eq!(
        editor.selection().unwrap(),
        &Selection {
            identity: "7".to_string(),
            url: "mem:u7".to_string(),
        }
    );
    assert_eq!(editor.selected_label().as_deref(), Some("Selected: 7"));
}

#[test]
fn selecting_a_then_b_highlights_exactly_one_entry() {
    let mut editor = empty_editor();
    let outcomes = editor.upload_batch(vec![
        upload("a.png", "image/png", png_bytes(8, 8, [1, 1, 1, 255])),
        upload("b.png", "image/png", png_bytes(8, 8, [2, 2, 2, 255])),
    ]);
    let ids: Vec<String> = outcomes
        .iter()
        .map(|o| match o {
            UploadOutcome::Added { identity } => identity.clone(),
            other => panic!("expected Added, got {other:?}"),
        })
        .collect();

    // The second upload selected itself last; reselect the first.
    editor.select(ids[0].clone(), format!("mem:{}", ids[0]));

    let highlighted: Vec<&str> = editor
        .store()
        .iter()
        .filter(|e| e.highlighted)
        .map(|e| e.handle.identity.as_str())
        .collect();
    assert_eq!(highlighted, vec![ids[0].as_str()]);
}

#[test]
fn zoom_is_clamped_and_non_finite_ignored() {
    let mut editor = empty_editor();
    editor.set_zoom(0.01);
    assert_eq!(editor.params().zoom, MIN_ZOOM);
    editor.set_zoom(2.5);
    assert_eq!(editor.params().zoom, 2.5);
    editor.set_zoom(f64::NAN);
    assert_eq!(editor.params().zoom, 2.5);
}

#[test]
fn huge_zoom_renders_without_exhausting_memory() {
    let mut editor = empty_editor();
    editor.upload_batch(vec![upload(
        "tiny.png",
        "image/png",
        png_bytes(8, 8, [255, 0, 0, 255]),
    )]);

    // Zoom has no upper clamp; the renderer must stay canvas-bounded.
    editor.set_zoom(1e8);
    let frame = editor.render_current().unwrap();
    assert_eq!(frame.pixel(50, 50), Some(SURFACE));
}

#[test]
fn stale_render_completions_are_discarded() {
    let mut editor = empty_editor();
    let canvas = editor.config().canvas;

    let stale = editor.begin_render();
    editor.set_zoom(2.0); // mutation after the render started
    let frame = FrameRGBA::solid(canvas, Rgba8::opaque(9, 9, 9));
    assert!(editor.commit(stale, frame.clone()).is_none());
    assert!(editor.frame().is_none());

    let fresh = editor.begin_render();
    assert!(editor.commit(fresh, frame).is_some());
    assert!(!editor.needs_render());
}

#[test]
fn upload_batch_reports_per_file_outcomes_and_keeps_going() {
    let mut editor = empty_editor();
    let outcomes = editor.upload_batch(vec![
        upload("good.png", "image/png", png_bytes(16, 16, [3, 3, 3, 255])),
        upload("fake.jpg", "image/jpeg", b"plain text in disguise".to_vec()),
        upload("notes.txt", "text/plain", b"not even trying".to_vec()),
    ]);

    assert_eq!(outcomes.len(), 3);
    let UploadOutcome::Added { identity } = &outcomes[0] else {
        panic!("first file should be added");
    };
    assert!(matches!(
        &outcomes[1],
        UploadOutcome::Failed { file_name, error: RoundelError::Decode(_) }
            if file_name == "fake.jpg"
    ));
    assert!(matches!(
        &outcomes[2],
        UploadOutcome::Skipped { file_name } if file_name == "notes.txt"
    ));

    // The valid upload is cached and still selected despite later failures.
    assert!(editor.store().get(identity).is_some());
    assert_eq!(&editor.selection().unwrap().identity, identity);
    assert_eq!(editor.store().iter().next().unwrap().handle.identity, *identity);
}

#[test]
fn uploaded_image_renders_into_the_disc() {
    let mut editor = empty_editor();
    editor.upload_batch(vec![upload(
        "solid.png",
        "image/png",
        png_bytes(300, 300, [0, 120, 240, 255]),
    )]);

    let frame = editor.render_current().unwrap().clone();
    assert_eq!(frame.pixel(50, 50), Some([0, 120, 240, 255]));
    assert_eq!(frame.pixel(0, 0), Some(SURFACE));
}

#[test]
fn dead_selection_url_degrades_to_background_only() {
    let mut editor = empty_editor();
    editor.select("ghost", "mem:ghost-from-last-session");

    let frame = editor.render_current().unwrap().clone();
    assert_eq!(frame.pixel(50, 50), Some(SURFACE));
    // The placeholder glyph is not drawn for a failed load.
    assert_eq!(frame.pixel(50, 35), Some(SURFACE));
}

#[test]
fn save_requires_a_selection_and_leaves_storage_untouched() {
    let tmp = temp_dir("controller_save");
    let storage = JsonFileStore::new(&tmp);
    let editor = empty_editor();

    let err = editor.save(&storage).unwrap_err();
    assert!(matches!(err, RoundelError::NoSelection));
    assert_eq!(storage.read(&editor.config().storage_key).unwrap(), None);
}

#[test]
fn save_then_restore_round_trips_in_a_fresh_session() {
    let tmp = temp_dir("controller_restore");
    let storage = JsonFileStore::new(&tmp);

    let mut first = empty_editor();
    first.select("2", "avatars/professional-2.png");
    first.save(&storage).unwrap();

    let mut second = empty_editor();
    assert!(second.restore(&storage).unwrap());
    assert_eq!(second.state(), EditorState::Selected);
    assert_eq!(second.selection(), first.selection());
    // Restore still requests a draw.
    assert!(second.needs_render());

    std::fs::remove_dir_all(&tmp).ok();
}
