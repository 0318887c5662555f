//! Integration tests for drape-types.

use drape_types::{DrapeError, ParticleId, SpringId};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = ParticleId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn spring_id_from_u32() {
    let id: SpringId = 7.into();
    assert_eq!(id.index(), 7);
}

#[test]
fn ids_are_serializable() {
    let id = ParticleId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: ParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = DrapeError::InvalidConfig("rows must be > 1 (got 1)".into());
    assert!(err.to_string().contains("rows must be > 1"));
}

#[test]
fn singular_system_display() {
    let err = DrapeError::SingularSystem {
        dofs: 24,
        reason: "not positive definite".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("24"));
    assert!(msg.contains("not positive definite"));
}

#[test]
fn recoverable_classification() {
    assert!(DrapeError::DegenerateStep("zero-length spring".into()).is_recoverable());
    assert!(DrapeError::SingularSystem { dofs: 3, reason: String::new() }.is_recoverable());
    assert!(!DrapeError::InvalidConfig("mass".into()).is_recoverable());
    assert!(!DrapeError::InvalidInput("dt".into()).is_recoverable());
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.toml");
    let err: DrapeError = io.into();
    assert!(matches!(err, DrapeError::Io(_)));
}
