use image::Rgb;

use super::*;

#[test]
fn remote_uris_are_not_implemented() {
    let img = RgbImage::new(2, 2);
    for uri in [
        "s3://bucket/a.png",
        "azure://c/a.png",
        "dropbox://x/a.png",
        "gs://b/a.png",
    ] {
        let err = save_image(Path::new(uri), &img).unwrap_err();
        assert!(matches!(err, ForgeError::Storage(ref m) if m.contains("not implemented")));
    }
    assert!(write_json(Path::new("s3://bucket/x.json"), &1).is_err());
}

#[test]
fn save_image_creates_parents_and_roundtrips_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a/b/c/post.png");
    let img = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
    let saved = save_image(&path, &img).unwrap();
    assert_eq!(saved, path);
    let back = image::open(&path).unwrap().to_rgb8();
    assert_eq!(back.as_raw(), img.as_raw());
}

#[test]
fn write_json_is_pretty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/v.json");
    write_json(&path, &serde_json::json!({"a": 1})).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"a\": 1"));
}
