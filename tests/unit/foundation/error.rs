use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ForgeError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ForgeError::generation("x")
            .to_string()
            .contains("generation error:")
    );
    assert!(ForgeError::asset("x").to_string().contains("asset error:"));
    assert!(
        ForgeError::storage("x")
            .to_string()
            .contains("storage error:")
    );
    assert!(
        ForgeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ForgeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
