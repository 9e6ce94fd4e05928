use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ClipweaveError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ClipweaveError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        ClipweaveError::media("x")
            .to_string()
            .contains("media error:")
    );
    assert!(
        ClipweaveError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        ClipweaveError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ClipweaveError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_cancelled_reports_cancellation() {
    assert!(ClipweaveError::Cancelled.is_cancelled());
    assert!(!ClipweaveError::encode("x").is_cancelled());
}
