use super::*;
use crate::foundation::core::CanvasSize;

fn req(prompt: &str, seed: Option<u64>) -> GenerateRequest {
    GenerateRequest::new(prompt, CanvasSize::new(64, 48).unwrap(), seed)
}

#[test]
fn output_matches_requested_size() {
    let out = LocalRenderer.generate_image(&req("Acme Soda", Some(7))).unwrap();
    assert_eq!(out.image.dimensions(), (64, 48));
    assert_eq!(out.metadata["provider"], "local");
    assert_eq!(out.metadata["seed"], 7);
}

#[test]
fn same_inputs_reproduce_identical_pixels() {
    let a = LocalRenderer::render(&req("Acme Soda", Some(42)));
    let b = LocalRenderer::render(&req("Acme Soda", Some(42)));
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn seed_and_prompt_change_the_output() {
    let base = LocalRenderer::render(&req("Acme Soda", Some(42)));
    let other_seed = LocalRenderer::render(&req("Acme Soda", Some(43)));
    let other_prompt = LocalRenderer::render(&req("Acme Chips", Some(42)));
    assert_ne!(base.as_raw(), other_seed.as_raw());
    assert_ne!(base.as_raw(), other_prompt.as_raw());
}

#[test]
fn missing_seed_uses_default() {
    assert_eq!(
        LocalRenderer::base_color(None),
        LocalRenderer::base_color(Some(DEFAULT_SEED))
    );
    let [r, g, b] = LocalRenderer::base_color(Some(99));
    for c in [r, g, b] {
        assert!((32..=224).contains(&c));
    }
}
