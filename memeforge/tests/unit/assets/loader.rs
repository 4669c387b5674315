use std::io::Cursor;

use super::*;
use crate::templates::catalog::find_template;

const MIB: usize = 1024 * 1024;

fn loader_at(root: &Path) -> ImageLoader {
    ImageLoader::new(&EditorConfig {
        assets_root: root.to_path_buf(),
        http_timeout_ms: 500,
        ..EditorConfig::default()
    })
}

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([10, 200, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Incompressible RGB noise so the encoded PNG stays close to `w * h * 3` bytes.
fn noise_png_bytes(w: u32, h: u32) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let img = image::RgbImage::from_fn(w, h, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let b = state.to_le_bytes();
        image::Rgb([b[0], b[1], b[2]])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn upload_requires_image_mime_type() {
    let up = Upload::new("text/plain", png_bytes(2, 2));
    assert!(matches!(
        validate_upload(&up, MAX_BYTES),
        Err(MemeError::Validation(_))
    ));

    let up = Upload::new("IMAGE/PNG", png_bytes(2, 2));
    validate_upload(&up, MAX_BYTES).unwrap();
}

const MAX_BYTES: u64 = crate::foundation::config::MAX_UPLOAD_BYTES;

#[test]
fn upload_size_limit_is_inclusive_at_ten_mebibytes() {
    let at_limit = Upload::new("image/jpeg", vec![0u8; 10 * MIB]);
    validate_upload(&at_limit, MAX_BYTES).unwrap();

    let over = Upload::new("image/jpeg", vec![0u8; 10 * MIB + 1]);
    assert!(matches!(
        validate_upload(&over, MAX_BYTES),
        Err(MemeError::Validation(_))
    ));
}

#[test]
fn eleven_megabyte_upload_fails_validation_before_decode() {
    let dir = tempfile::tempdir().unwrap();
    let loader = loader_at(dir.path());
    // Not a decodable image: a decode attempt would surface as `Decode`, not `Validation`.
    let up = Upload::new("image/jpeg", vec![0xFFu8; 11 * MIB]);
    let err = loader.load(&ImageSource::Upload(up)).unwrap_err();
    assert!(matches!(err, MemeError::Validation(_)), "{err}");
}

#[test]
fn five_megabyte_upload_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let loader = loader_at(dir.path());
    let bytes = noise_png_bytes(1300, 1300);
    assert!(bytes.len() > 4 * MIB && bytes.len() < 10 * MIB, "{}", bytes.len());

    let img = loader
        .load(&ImageSource::Upload(Upload::new("image/png", bytes)))
        .unwrap();
    assert_eq!((img.width, img.height), (1300, 1300));
}

#[test]
fn upload_with_image_mime_but_garbage_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = loader_at(dir.path());
    let up = Upload::new("image/png", b"not a png".to_vec());
    assert!(matches!(
        loader.load(&ImageSource::Upload(up)),
        Err(MemeError::Decode(_))
    ));
}

#[test]
fn relative_reference_is_read_from_assets_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("imgs")).unwrap();
    std::fs::write(dir.path().join("imgs/a.png"), png_bytes(3, 5)).unwrap();

    let loader = loader_at(dir.path());
    let img = loader
        .load(&ImageSource::Reference("./imgs//a.png".to_string()))
        .unwrap();
    assert_eq!((img.width, img.height), (3, 5));

    let err = loader
        .load(&ImageSource::Reference("imgs/missing.png".to_string()))
        .unwrap_err();
    assert!(matches!(err, MemeError::Load(_)));
}

#[test]
fn template_prefers_local_copy() {
    let dir = tempfile::tempdir().unwrap();
    let drake = find_template("drake").unwrap();
    let local = dir.path().join(drake.local_path());
    std::fs::create_dir_all(local.parent().unwrap()).unwrap();
    std::fs::write(&local, png_bytes(6, 4)).unwrap();

    let img = loader_at(dir.path())
        .load(&ImageSource::Template(drake))
        .unwrap();
    assert_eq!((img.width, img.height), (6, 4));
}

#[test]
fn unreachable_remote_reference_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = loader_at(dir.path())
        .load(&ImageSource::Reference(
            "http://127.0.0.1:9/missing.png".to_string(),
        ))
        .unwrap_err();
    assert!(matches!(err, MemeError::Load(_)), "{err}");
}

#[test]
fn normalize_rel_path_rejects_escapes() {
    assert_eq!(normalize_rel_path("a/./b\\c.png").unwrap(), "a/b/c.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("a/../../b").is_err());
    assert!(normalize_rel_path("./").is_err());
    assert!(normalize_rel_path("").is_err());
}

#[test]
fn mime_is_inferred_from_extension() {
    assert_eq!(mime_for_path(Path::new("x/Cat.JPG")), "image/jpeg");
    assert_eq!(mime_for_path(Path::new("x.png")), "image/png");
    assert_eq!(
        mime_for_path(Path::new("notes.txt")),
        "application/octet-stream"
    );
}

#[test]
fn only_remote_sources_need_the_network() {
    let dir = tempfile::tempdir().unwrap();
    let loader = loader_at(dir.path());
    let drake = find_template("drake").unwrap();

    assert!(!loader.needs_network(&ImageSource::Upload(Upload::new("image/png", png_bytes(1, 1)))));
    assert!(!loader.needs_network(&ImageSource::Reference("local/a.png".into())));
    assert!(loader.needs_network(&ImageSource::Reference("https://example.com/a.png".into())));
    assert!(loader.needs_network(&ImageSource::Template(drake)));

    std::fs::create_dir_all(dir.path().join("templates")).unwrap();
    std::fs::write(dir.path().join(drake.local_path()), png_bytes(2, 2)).unwrap();
    assert!(!loader.needs_network(&ImageSource::Template(drake)));
}

#[test]
fn fetch_returns_upload_bytes_undecoded() {
    let dir = tempfile::tempdir().unwrap();
    let upload = Upload::new("image/png", b"not decoded yet".to_vec());
    let bytes = loader_at(dir.path())
        .fetch(&ImageSource::Upload(upload.clone()))
        .unwrap();
    assert!(Arc::ptr_eq(&bytes, &upload.bytes));
}
