use std::{collections::BTreeMap, sync::Arc};

use image::{Rgb, RgbaImage};

use super::*;
use crate::{
    brief::model::{BrandPalette, Product},
    resolve::source::HeroOrigin,
};

fn brief() -> Brief {
    Brief {
        campaign_id: "spring".into(),
        brand: "Acme".into(),
        markets: vec![],
        audience: String::new(),
        locales: vec!["en-US".into()],
        aspect_ratios: vec!["1:1".into()],
        message: BTreeMap::from([("en-US".to_string(), "Stay fresh".to_string())]),
        call_to_action: BTreeMap::from([("en-US".to_string(), "Shop now".to_string())]),
        brand_palette: BrandPalette {
            primary_hex: "#0044cc".into(),
            secondary_hex: None,
        },
        products: vec![Product {
            id: "p1".into(),
            name: "Soda".into(),
            prompt_hints: None,
            base_asset: None,
        }],
    }
}

fn hero() -> ResolvedHero {
    ResolvedHero {
        image: RgbImage::from_pixel(64, 48, Rgb([200, 180, 40])),
        origin: HeroOrigin::BaseAsset(PathBuf::from("hero.png")),
    }
}

fn white_logo() -> Logo {
    Logo::Raster(Arc::new(RgbaImage::from_pixel(
        30,
        10,
        image::Rgba([255, 255, 255, 255]),
    )))
}

#[test]
fn variant_dir_replaces_ratio_colon() {
    assert_eq!(
        variant_dir(Path::new("out"), "c", "p", "16:9"),
        PathBuf::from("out/c/p/16x9")
    );
}

#[test]
fn overrides_replace_copy_lines() {
    let b = brief();
    let plain = Compositor::new(BrandRules::default(), None, None, DesignOverrides::default(), "o");
    assert_eq!(plain.copy_lines(&b, "en-US"), ("Stay fresh", "Shop now"));

    let overrides = DesignOverrides {
        headline: Some("Big news".into()),
        ..DesignOverrides::default()
    };
    let c = Compositor::new(BrandRules::default(), None, None, overrides, "o");
    assert_eq!(c.copy_lines(&b, "en-US"), ("Big news", "Shop now"));
}

#[test]
fn render_variant_writes_hero_post_and_sidecar() {
    let dir = tempfile::tempdir().unwrap();
    let c = Compositor::new(
        BrandRules::default(),
        Some(white_logo()),
        None,
        DesignOverrides::default(),
        dir.path(),
    );
    let key = VariantKey {
        product_id: "p1".into(),
        ratio: "1:1".into(),
        locale: "en-US".into(),
        variant_index: 0,
        seed: Some(1234),
    };
    let mut engine = TextLayoutEngine::new();
    let result = c
        .render_variant(&brief(), &key, &hero(), "local", &mut engine)
        .unwrap();

    let expected_dir = dir.path().join("spring/p1/1x1");
    assert_eq!(result.path_post, expected_dir.join("post-en-US-v0.png"));
    assert_eq!(result.path_hero.as_deref(), Some(expected_dir.join("hero-en-US-v0.png").as_path()));
    assert_eq!(result.provider, "local");

    let post = image::open(&result.path_post).unwrap();
    assert_eq!((post.width(), post.height()), (1024, 1024));

    let prov = crate::output::provenance::read_provenance_value(&result.path_post).unwrap();
    assert_eq!(prov["logo_area_pct"], serde_json::json!(4.5));
    assert_eq!(prov["ratio"], "1:1");
    assert!(prov["prompt"].is_null());
}

#[test]
fn missing_logo_records_null_pct() {
    let dir = tempfile::tempdir().unwrap();
    let c = Compositor::new(
        BrandRules::default(),
        None,
        None,
        DesignOverrides {
            logo_area_pct: Some(5.0),
            ..DesignOverrides::default()
        },
        dir.path(),
    );
    let key = VariantKey {
        product_id: "p1".into(),
        ratio: "16:9".into(),
        locale: "en-US".into(),
        variant_index: 2,
        seed: None,
    };
    let mut engine = TextLayoutEngine::new();
    let result = c
        .render_variant(&brief(), &key, &hero(), "local", &mut engine)
        .unwrap();
    assert!(result.path_post.ends_with("16x9/post-en-US-v2.png"));
    let prov = crate::output::provenance::read_provenance_value(&result.path_post).unwrap();
    assert!(prov["logo_area_pct"].is_null());
    assert!(prov["logo_box"].is_null());
}

#[test]
fn compose_outputs_exact_canvas() {
    let c = Compositor::new(BrandRules::default(), Some(white_logo()), None, DesignOverrides::default(), "o");
    let size = CanvasSize::new(1080, 1920).unwrap();
    let mut engine = TextLayoutEngine::new();
    let out = c
        .compose(&hero().image, size, "Hello", "World", &mut engine)
        .unwrap();
    assert_eq!(out.post.dimensions(), (1080, 1920));
    assert_eq!(out.hero.dimensions(), (1080, 1920));
    assert!(out.logo.is_some());
}
