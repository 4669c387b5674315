use std::{io::Cursor, path::Path, sync::Arc};

use super::*;

fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([rgb[0], rgb[1], rgb[2], 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn editor_in(root: &Path) -> Editor {
    let config = EditorConfig {
        assets_root: root.to_path_buf(),
        ..EditorConfig::default()
    };
    let font = FontAsset::from_path("tests/data/fonts/DejaVuSans-Bold.ttf").unwrap();
    Editor::new(config, font).unwrap()
}

fn seed_template(root: &Path, id: &str) {
    let dir = root.join("templates");
    std::fs::create_dir_all(&dir).unwrap();
    let img = image::RgbImage::from_pixel(400, 300, image::Rgb([40, 160, 90]));
    img.save(dir.join(format!("{id}.jpg"))).unwrap();
}

fn last_notice(editor: &mut Editor) -> Notice {
    editor.take_notices().pop().unwrap()
}

#[test]
fn fresh_editor_cannot_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    assert!(!ed.can_export());
    assert!(ed.selection().is_none());
    assert_eq!(ed.inputs().font_size, 40);

    let err = ed.export().unwrap_err();
    assert!(matches!(err, MemeError::Export(_)));
    let notice = last_notice(&mut ed);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, MSG_EXPORT_FAILED);
}

#[test]
fn template_selection_applies_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    seed_template(dir.path(), "drake");
    let mut ed = editor_in(dir.path());

    let outcome = ed.select_template("Drake Pointing").unwrap();
    assert_eq!(outcome, LoadOutcome::Applied);
    assert_eq!(ed.selection().and_then(Selection::template).map(|t| t.id), Some("drake"));
    assert!(ed.can_export());
    assert_eq!(last_notice(&mut ed).message, MSG_TEMPLATE_LOADED);

    let layer = ed.surface().background().unwrap();
    assert_eq!((layer.image().width, layer.image().height), (400, 300));
}

#[test]
fn unknown_template_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    let err = ed.select_template("not-a-template").unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert!(ed.selection().is_none());
    assert_eq!(last_notice(&mut ed).level, NoticeLevel::Error);
}

#[test]
fn template_and_upload_replace_each_other() {
    let dir = tempfile::tempdir().unwrap();
    seed_template(dir.path(), "success-kid");
    let mut ed = editor_in(dir.path());

    ed.upload(Upload::new("image/png", png_bytes(50, 80, [200, 0, 0])))
        .unwrap();
    assert!(ed.selection().unwrap().is_upload());
    assert_eq!(last_notice(&mut ed).message, MSG_UPLOAD_LOADED);

    ed.select_template("success-kid").unwrap();
    let sel = ed.selection().unwrap();
    assert!(!sel.is_upload());
    assert_eq!(sel.template().map(|t| t.id), Some("success-kid"));

    ed.drop_file(Upload::new("image/png", png_bytes(10, 10, [0, 0, 200])))
        .unwrap();
    let sel = ed.selection().unwrap();
    assert!(sel.is_upload());
    assert!(sel.template().is_none());
}

#[test]
fn oversized_upload_is_rejected_without_state_change() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.upload(Upload::new("image/png", png_bytes(20, 20, [1, 2, 3])))
        .unwrap();
    ed.take_notices();
    let before = ed.selection().cloned();

    let big = Upload::new("image/png", vec![0u8; 11_000_000]);
    let err = ed.upload(big).unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert_eq!(ed.selection().cloned(), before);
    assert_eq!(last_notice(&mut ed).message, MSG_TOO_LARGE);
}

#[test]
fn non_image_drop_gets_drop_specific_notice() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    let err = ed
        .drop_file(Upload::new("text/plain", b"hello".to_vec()))
        .unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert_eq!(last_notice(&mut ed).message, MSG_DROP_INVALID);

    ed.upload(Upload::new("application/pdf", b"%PDF".to_vec()))
        .unwrap_err();
    assert_eq!(last_notice(&mut ed).message, MSG_SELECT_INVALID);
}

#[test]
fn corrupt_upload_reports_load_failure_and_keeps_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.upload(Upload::new("image/png", png_bytes(30, 30, [9, 9, 9])))
        .unwrap();
    ed.take_notices();

    let err = ed
        .upload(Upload::new("image/png", b"not really a png".to_vec()))
        .unwrap_err();
    assert!(err.is_load_failure());
    assert!(ed.can_export());
    assert_eq!(
        ed.selection(),
        Some(&Selection::Upload {
            mime: "image/png".to_string(),
            len: png_bytes(30, 30, [9, 9, 9]).len(),
        })
    );
    assert_eq!(last_notice(&mut ed).message, MSG_LOAD_FAILED);
}

#[test]
fn superseded_ticket_is_stale_and_latest_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.png"), png_bytes(100, 50, [255, 0, 0])).unwrap();
    std::fs::write(dir.path().join("b.png"), png_bytes(50, 100, [0, 0, 255])).unwrap();
    let mut ed = editor_in(dir.path());

    let a = ed.request_load(ImageSource::Reference("a.png".into())).unwrap();
    let b = ed.request_load(ImageSource::Reference("b.png".into())).unwrap();
    assert_eq!(
        ed.wait_for_load(a, Duration::from_secs(5)).unwrap(),
        LoadOutcome::Stale
    );
    assert_eq!(
        ed.wait_for_load(b, Duration::from_secs(5)).unwrap(),
        LoadOutcome::Applied
    );
    assert_eq!(ed.selection(), Some(&Selection::Reference("b.png".into())));

    // Whatever is left of `a` must not replace `b`.
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(ed.poll_loads(), 0);
    assert_eq!(ed.selection(), Some(&Selection::Reference("b.png".into())));
    let layer = ed.surface().background().unwrap();
    assert_eq!(layer.image().width, 50);
}

#[test]
fn late_completion_for_old_ticket_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    let old = ed.loads.issue();
    let _current = ed.loads.issue();

    ed.loads
        .sender()
        .send(LoadCompletion {
            ticket: old,
            source: ImageSource::Reference("old.png".into()),
            result: Ok(PreparedImage {
                width: 2,
                height: 2,
                rgba8_premul: Arc::new(vec![255; 16]),
            }),
        })
        .unwrap();

    assert_eq!(ed.poll_loads(), 0);
    assert!(ed.selection().is_none());
    assert!(!ed.can_export());
}

#[test]
fn wait_times_out_and_retires_ticket() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    let ticket = ed.loads.issue();

    let err = ed
        .wait_for_load(ticket, Duration::from_millis(20))
        .unwrap_err();
    assert!(matches!(err, MemeError::Load(_)));
    assert!(!ed.loads.is_current(ticket));
    assert_eq!(last_notice(&mut ed).message, MSG_LOAD_FAILED);
}

#[test]
fn captions_survive_background_change() {
    let dir = tempfile::tempdir().unwrap();
    seed_template(dir.path(), "drake");
    let mut ed = editor_in(dir.path());

    ed.set_top_text("work smart").unwrap();
    ed.set_bottom_text("not hard").unwrap();
    ed.select_template("drake").unwrap();

    assert_eq!(
        ed.caption_state(CaptionPosition::Top),
        CaptionState::Present {
            text: "WORK SMART".into(),
            font_size: 40
        }
    );
    assert_eq!(
        ed.caption_state(CaptionPosition::Bottom),
        CaptionState::Present {
            text: "NOT HARD".into(),
            font_size: 40
        }
    );
    assert_eq!(ed.inputs().top, "work smart");
}

#[test]
fn font_size_change_rebuilds_both_captions() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.set_top_text("top").unwrap();
    ed.set_bottom_text("bottom").unwrap();

    ed.set_font_size(64).unwrap();
    for position in CaptionPosition::ALL {
        match ed.caption_state(position) {
            CaptionState::Present { font_size, .. } => assert_eq!(font_size, 64),
            CaptionState::Absent => panic!("{position} caption vanished"),
        }
    }
}

#[test]
fn out_of_range_font_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.set_top_text("top").unwrap();

    for bad in [0, 19, 81, 200] {
        let err = ed.set_font_size(bad).unwrap_err();
        assert!(matches!(err, MemeError::Validation(_)));
    }
    assert_eq!(ed.inputs().font_size, 40);
    assert_eq!(
        ed.caption_state(CaptionPosition::Top),
        CaptionState::Present {
            text: "TOP".into(),
            font_size: 40
        }
    );
}

#[test]
fn clearing_text_removes_caption_and_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.set_bottom_text("bye").unwrap();
    assert_eq!(ed.set_bottom_text("   ").unwrap(), CaptionState::Absent);
    assert_eq!(ed.caption_state(CaptionPosition::Bottom), CaptionState::Absent);
    assert_eq!(ed.inputs().bottom, "   ");
}

#[test]
fn export_after_load_yields_double_size_png() {
    let dir = tempfile::tempdir().unwrap();
    seed_template(dir.path(), "drake");
    let mut ed = editor_in(dir.path());
    ed.select_template("drake").unwrap();
    ed.take_notices();

    let artifact = ed.export().unwrap();
    assert_eq!((artifact.width, artifact.height), (1000, 1000));
    assert!(artifact.file_name.starts_with("meme-"));
    assert_eq!(last_notice(&mut ed).message, MSG_EXPORTED);
}

#[test]
fn oversized_drop_is_rejected_like_an_upload() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = editor_in(dir.path());
    ed.drop_file(Upload::new("image/png", png_bytes(12, 12, [5, 5, 5])))
        .unwrap();
    ed.take_notices();
    let before = ed.selection().cloned();

    let err = ed
        .drop_file(Upload::new("image/jpeg", vec![0u8; 10 * 1024 * 1024 + 1]))
        .unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)));
    assert_eq!(ed.selection().cloned(), before);
    assert_eq!(ed.surface().background().unwrap().image().width, 12);
    assert_eq!(last_notice(&mut ed).message, MSG_TOO_LARGE);
}

fn unshapeable_editor(root: &Path) -> Editor {
    let config = EditorConfig {
        assets_root: root.to_path_buf(),
        ..EditorConfig::default()
    };
    Editor::new(config, FontAsset::from_bytes(b"definitely not a font".to_vec())).unwrap()
}

#[test]
fn failed_caption_rebuild_keeps_previous_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = unshapeable_editor(dir.path());
    ed.upload(Upload::new("image/png", png_bytes(30, 30, [9, 9, 9])))
        .unwrap();
    let before = ed.selection().cloned();

    ed.inputs.top = "cannot shape".into();
    ed.take_notices();
    ed.upload(Upload::new("image/png", png_bytes(60, 20, [200, 9, 9])))
        .unwrap_err();

    assert_eq!(ed.selection().cloned(), before);
    let layer = ed.surface().background().unwrap();
    assert_eq!((layer.image().width, layer.image().height), (30, 30));
    assert_eq!(last_notice(&mut ed).message, MSG_LOAD_FAILED);
}

#[test]
fn failed_font_size_rebuild_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut ed = unshapeable_editor(dir.path());
    ed.inputs.top = "cannot shape".into();

    ed.set_font_size(60).unwrap_err();
    assert_eq!(ed.inputs().font_size, 40);
    assert_eq!(ed.caption_state(CaptionPosition::Top), CaptionState::Absent);
}
