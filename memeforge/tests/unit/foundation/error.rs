use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MemeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MemeError::load("x").to_string().contains("load error:"));
    assert!(MemeError::decode("x").to_string().contains("decode error:"));
    assert!(MemeError::export("x").to_string().contains("export error:"));
}

#[test]
fn load_failures_cover_fetch_and_decode() {
    assert!(MemeError::load("x").is_load_failure());
    assert!(MemeError::decode("x").is_load_failure());
    assert!(!MemeError::validation("x").is_load_failure());
    assert!(!MemeError::export("x").is_load_failure());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MemeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
