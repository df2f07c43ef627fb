//! # Credential Trust
//!
//! An accreditation body issues an auditor accreditation, the credential
//! travels as JSON, and a relying party verifies it at different times and
//! against a revocation registry.

use pcc_core::{resolve_identity_handle, CanonicalBytes, Timestamp};
use pcc_crypto::KeyPair;
use pcc_vc::{
    issue_credential, verify_credential, AuditorAccreditation, CredentialIssue, CredentialSubject,
    IssueOptions, RevocationRegistry, VerifiableCredential, VerifyOptions,
};

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

fn accreditation() -> (KeyPair, VerifiableCredential) {
    let body = KeyPair::from_private_key(&[90u8; 32]).unwrap();
    let auditor = KeyPair::from_private_key(&[91u8; 32]).unwrap();
    let subject = CredentialSubject::AuditorAccreditation(AuditorAccreditation {
        id: auditor.identity_handle(),
        accreditation_body: "Institute of Public Auditors".to_string(),
        accreditation_number: "IPA-2026-118".to_string(),
        jurisdictions: vec!["region-north".to_string()],
        accredited_until: Some(ts("2027-12-31T00:00:00Z")),
    });
    let vc = issue_credential(
        subject,
        &body.identity_handle(),
        &body,
        IssueOptions {
            issued_at: Some(ts("2026-01-10T00:00:00Z")),
            expiration_date: Some(ts("2027-12-31T00:00:00Z")),
        },
    )
    .unwrap();
    (body, vc)
}

#[test]
fn verifies_after_transport() {
    let (body, vc) = accreditation();
    let json = serde_json::to_string_pretty(&vc).unwrap();
    let received: VerifiableCredential = serde_json::from_str(&json).unwrap();
    let report = verify_credential(&received, VerifyOptions::at(ts("2026-06-01T00:00:00Z")));
    assert!(report.valid, "{:?}", report.errors);

    let proof = received.proof.as_ref().unwrap();
    let resolved = resolve_identity_handle(&received.issuer).unwrap();
    assert_eq!(&resolved.public_key, body.public_key().as_bytes());
    assert_eq!(proof.verification_method, resolved.verification_method_id);
}

#[test]
fn digest_survives_a_json_value_round_trip() {
    let (_, vc) = accreditation();
    let value = serde_json::to_value(&vc).unwrap();
    let back: VerifiableCredential = serde_json::from_value(value.clone()).unwrap();
    assert_eq!(back.body_digest().unwrap(), vc.body_digest().unwrap());

    let direct = CanonicalBytes::new(&vc).unwrap();
    let via_value = CanonicalBytes::from_value(value).unwrap();
    assert_eq!(direct, via_value);
}

#[test]
fn every_issue_is_reported_together() {
    let (_, mut vc) = accreditation();
    if let CredentialSubject::AuditorAccreditation(a) = &mut vc.credential_subject {
        a.jurisdictions.push("region-south".to_string());
    }
    let mut registry = RevocationRegistry::new();
    registry
        .revoke(&vc, "accreditation withdrawn", ts("2026-03-01T00:00:00Z"))
        .unwrap();

    let report = verify_credential(
        &vc,
        VerifyOptions::at(ts("2028-01-01T00:00:00Z")).with_revocations(&registry),
    );
    assert!(!report.valid);
    assert!(report.errors.iter().any(|e| matches!(e, CredentialIssue::Expired { .. })));
    assert!(report.errors.iter().any(|e| matches!(e, CredentialIssue::BadSignature)));
    assert!(report.errors.iter().any(|e| matches!(e, CredentialIssue::Revoked { .. })));
}

#[test]
fn expiration_check_can_be_disabled() {
    let (_, vc) = accreditation();
    let mut options = VerifyOptions::at(ts("2030-01-01T00:00:00Z"));
    options.check_expiration = false;
    assert!(verify_credential(&vc, options).valid);
}
