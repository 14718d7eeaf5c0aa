use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SlideError::invalid_settings("x")
            .to_string()
            .contains("invalid settings:")
    );
    assert!(SlideError::render("x").to_string().contains("render error:"));
    assert!(
        SlideError::decode("a.png", "bad header")
            .to_string()
            .contains("decode error for 'a.png': bad header")
    );
    assert!(
        SlideError::EmptyCatalog {
            dir: PathBuf::from("media")
        }
        .to_string()
        .contains("'media'")
    );
}

#[test]
fn only_decode_errors_are_recoverable() {
    assert!(!SlideError::decode("a.png", "x").is_fatal());
    assert!(SlideError::render("x").is_fatal());
    assert!(SlideError::Cancelled.is_fatal());
    assert!(SlideError::invalid_settings("x").is_fatal());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlideError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
