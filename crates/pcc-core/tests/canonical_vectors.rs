//! # Canonical Form Vectors
//!
//! Pins the exact canonical bytes of the records the engine signs. Any
//! change here changes every signature and certificate hash in the field,
//! so these strings are spelled out literally instead of derived.

use pcc_core::{
    sha256_bytes_hex, sha256_hex, AttestationPayload, AttestationType, CanonicalBytes,
    IdentityHandle, MilestoneId, Timestamp,
};

fn actor() -> IdentityHandle {
    IdentityHandle::from_public_key(&[0x11; 32]).expect("32-byte key")
}

#[test]
fn attestation_payload_canonical_form() {
    let payload = AttestationPayload::new(
        MilestoneId::new("ms-001").unwrap(),
        actor(),
        AttestationType::CitizenApproval,
        b"bridge deck poured",
        Timestamp::parse("2026-04-02T10:00:00Z").unwrap(),
    );

    let expected = format!(
        r#"{{"actorId":"{}","evidenceHash":"{}","milestoneId":"ms-001","submittedAt":"2026-04-02T10:00:00Z","type":"citizen_approval"}}"#,
        actor(),
        sha256_bytes_hex(b"bridge deck poured"),
    );

    let canonical = payload.canonical_bytes().unwrap();
    assert_eq!(std::str::from_utf8(canonical.as_bytes()).unwrap(), expected);
    assert_eq!(payload.signing_digest().unwrap(), sha256_bytes_hex(expected.as_bytes()));
}

#[test]
fn construction_order_does_not_change_digest() {
    let a = serde_json::json!({
        "milestoneId": "ms-9",
        "quorum": {"inspectorCount": 1, "auditorCount": 1, "citizenCount": 2},
        "version": "1.0"
    });
    let b = serde_json::json!({
        "version": "1.0",
        "quorum": {"citizenCount": 2, "auditorCount": 1, "inspectorCount": 1},
        "milestoneId": "ms-9"
    });
    assert_eq!(
        sha256_hex(&CanonicalBytes::new(&a).unwrap()),
        sha256_hex(&CanonicalBytes::new(&b).unwrap())
    );
}

#[test]
fn identity_handle_survives_json_inside_records() {
    let payload = AttestationPayload::new(
        MilestoneId::new("ms-002").unwrap(),
        actor(),
        AttestationType::AuditorReview,
        b"",
        Timestamp::parse("2026-05-01T00:00:00Z").unwrap(),
    );
    let json = serde_json::to_string(&payload).unwrap();
    let back: AttestationPayload = serde_json::from_str(&json).unwrap();
    assert_eq!(back, payload);
    assert_eq!(back.actor_id.public_key_bytes(), &[0x11; 32]);
}
