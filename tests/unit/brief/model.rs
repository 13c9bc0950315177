use super::*;

fn sample_json() -> &'static str {
    r##"{
  "campaign_id": "fall-refresh",
  "brand": "Acme",
  "markets": ["US", "MX"],
  "audience": "young adults",
  "locales": ["en-US", "es-MX"],
  "aspect_ratios": ["1:1", "16:9"],
  "message": {"en-US": "Stay fresh", "es-MX": "Mantente fresco"},
  "call_to_action": {"en-US": "Shop now", "es-MX": "Compra ya"},
  "brand_palette": {"primary_hex": "#0044cc"},
  "products": [{"id": "cool-lime", "name": "Cool Lime"}]
}"##
}

#[test]
fn parses_and_validates_sample() {
    let brief: Brief = serde_json::from_str(sample_json()).unwrap();
    brief.validate().unwrap();
    assert_eq!(brief.products[0].prompt_hints, None);
    assert_eq!(brief.brand_palette.secondary_hex, None);
    assert_eq!(brief.cta_for("es-MX"), "Compra ya");
}

#[test]
fn missing_locale_copy_is_a_configuration_error() {
    let mut brief: Brief = serde_json::from_str(sample_json()).unwrap();
    brief.locales.push("fr-FR".to_string());
    let err = brief.validate().unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)));
    assert!(err.to_string().contains("fr-FR"));
}

#[test]
fn path_like_product_ids_are_rejected() {
    let mut brief: Brief = serde_json::from_str(sample_json()).unwrap();
    brief.products[0].id = "../escape".to_string();
    assert!(brief.validate().is_err());
}

#[test]
fn path_like_locales_are_rejected() {
    let mut brief: Brief = serde_json::from_str(sample_json()).unwrap();
    let copy = brief.message.values().next().unwrap().clone();
    brief.message.insert("../x".to_string(), copy.clone());
    brief.call_to_action.insert("../x".to_string(), copy);
    brief.locales.push("../x".to_string());
    let err = brief.validate().unwrap_err();
    assert!(matches!(err, ForgeError::Configuration(_)));
    assert!(err.to_string().contains("locale"));

    assert!(check_path_token("locale", "en-US").is_ok());
    assert!(check_path_token("locale", "..").is_err());
    assert!(check_path_token("locale", "a\\b").is_err());
    assert!(check_path_token("locale", " ").is_err());
}

#[test]
fn localized_falls_back_to_first_entry() {
    let brief: Brief = serde_json::from_str(sample_json()).unwrap();
    assert_eq!(brief.message_for("de-DE"), "Stay fresh");
    assert_eq!(localized(&BTreeMap::new(), "en-US"), "");
}

#[test]
fn load_brief_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brief.json");
    std::fs::write(&path, sample_json()).unwrap();
    let brief = load_brief(&path).unwrap();
    assert_eq!(brief.campaign_id, "fall-refresh");

    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(
        load_brief(&path).unwrap_err(),
        ForgeError::Configuration(_)
    ));
}
