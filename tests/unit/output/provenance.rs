use super::*;

fn record(logo: Option<f64>) -> Provenance {
    Provenance {
        provider: "local".to_string(),
        product_id: "p1".to_string(),
        ratio: "1:1".to_string(),
        locale: "en-US".to_string(),
        logo_area_pct: logo,
        seed: Some(1234),
        variant_index: 0,
        prompt: None,
        canvas: CanvasSize::new(1024, 1024).unwrap(),
        logo_box: None,
        text_box: None,
        contrast_ratio: 21.0,
        backdrop: false,
        pixels_sha256: pixels_sha256(&[]),
    }
}

#[test]
fn sidecar_sits_next_to_asset() {
    assert_eq!(
        sidecar_path(Path::new("out/c/p/1x1/post-en-US-v0.png")),
        PathBuf::from("out/c/p/1x1/post-en-US-v0.png.prov.json")
    );
}

#[test]
fn null_logo_pct_is_written_explicitly() {
    let dir = tempfile::tempdir().unwrap();
    let asset = dir.path().join("post.png");
    let path = write_provenance(&asset, &record(None)).unwrap();
    assert!(path.ends_with("post.png.prov.json"));

    let v = read_provenance_value(&asset).unwrap();
    let obj = v.as_object().unwrap();
    assert!(obj.contains_key("logo_area_pct"));
    assert!(obj["logo_area_pct"].is_null());
    for key in ["provider", "product_id", "ratio", "locale"] {
        assert!(obj.contains_key(key), "missing {key}");
    }
}

#[test]
fn sha_of_empty_input_is_well_known() {
    assert_eq!(
        pixels_sha256(&[]),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn missing_sidecar_is_a_storage_error() {
    let err = read_provenance_value(Path::new("nope/post.png")).unwrap_err();
    assert!(matches!(err, ForgeError::Storage(_)));
}
