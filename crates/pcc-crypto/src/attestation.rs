//! # Attestation Signing
//!
//! An actor signs the UTF-8 bytes of the SHA-256 hex digest of the canonical
//! [`AttestationPayload`]. Verification recomputes that digest from the
//! record and checks the signature against the key embedded in `actorId`.

use pcc_core::{AttestationPayload, AttestationRecord, PccError, ValidationError};

use crate::ed25519::{verify_hex, KeyPair};

/// Sign a payload as its actor, producing an attestation record.
///
/// # Errors
///
/// - [`ValidationError::SignerKeyMismatch`] if `key` is not the key behind
///   `payload.actor_id`.
/// - [`PccError::Canonicalization`] if the payload cannot be canonicalized.
pub fn sign_attestation(
    payload: AttestationPayload,
    key: &KeyPair,
) -> Result<AttestationRecord, PccError> {
    if payload.actor_id.public_key_bytes() != key.public_key().as_bytes() {
        return Err(ValidationError::SignerKeyMismatch {
            signer: payload.actor_id.to_string(),
        }
        .into());
    }
    let digest = payload.signing_digest()?;
    let signature = key.sign(digest.as_bytes());
    tracing::debug!(
        milestone_id = %payload.milestone_id,
        attestation_type = %payload.attestation_type,
        "attestation signed"
    );
    Ok(payload.into_record(signature.to_hex()))
}

/// Check a record's signature against its actor's handle.
///
/// Revocation does not affect the result; callers filter revoked records
/// separately.
pub fn verify_attestation(record: &AttestationRecord) -> bool {
    let Ok(digest) = record.payload().signing_digest() else {
        return false;
    };
    verify_hex(
        digest.as_bytes(),
        &record.digital_signature,
        record.actor_id.public_key_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_core::{sha256_bytes_hex, AttestationType, MilestoneId, Timestamp};

    fn payload_for(key: &KeyPair) -> AttestationPayload {
        AttestationPayload::new(
            MilestoneId::new("ms-001").unwrap(),
            key.identity_handle(),
            AttestationType::AuditorReview,
            b"audit report v2",
            Timestamp::parse("2026-04-02T10:00:00Z").unwrap(),
        )
    }

    #[test]
    fn signed_record_verifies() {
        let key = KeyPair::from_private_key(&[3u8; 32]).unwrap();
        let record = sign_attestation(payload_for(&key), &key).unwrap();
        assert_eq!(record.digital_signature.len(), 128);
        assert!(verify_attestation(&record));
    }

    #[test]
    fn wrong_signer_is_rejected() {
        let actor = KeyPair::from_private_key(&[3u8; 32]).unwrap();
        let other = KeyPair::from_private_key(&[4u8; 32]).unwrap();
        let err = sign_attestation(payload_for(&actor), &other).unwrap_err();
        assert!(matches!(
            err,
            PccError::Validation(ValidationError::SignerKeyMismatch { .. })
        ));
    }

    #[test]
    fn tampered_fields_fail_verification() {
        let key = KeyPair::from_private_key(&[3u8; 32]).unwrap();
        let record = sign_attestation(payload_for(&key), &key).unwrap();

        let mut r = record.clone();
        r.evidence_hash = sha256_bytes_hex(b"forged report");
        assert!(!verify_attestation(&r));

        let mut r = record.clone();
        r.attestation_type = AttestationType::InspectorVerification;
        assert!(!verify_attestation(&r));

        let mut r = record.clone();
        r.milestone_id = MilestoneId::new("ms-002").unwrap();
        assert!(!verify_attestation(&r));

        let mut r = record.clone();
        r.actor_id = KeyPair::from_private_key(&[5u8; 32]).unwrap().identity_handle();
        assert!(!verify_attestation(&r));

        let mut r = record;
        r.digital_signature = "zz".repeat(64);
        assert!(!verify_attestation(&r));
    }

    #[test]
    fn revocation_marks_do_not_break_signature() {
        let key = KeyPair::from_private_key(&[3u8; 32]).unwrap();
        let mut record = sign_attestation(payload_for(&key), &key).unwrap();
        record
            .revoke("superseded", Timestamp::parse("2026-04-05T00:00:00Z").unwrap())
            .unwrap();
        assert!(verify_attestation(&record));
    }

    #[test]
    fn alternate_signature_encodings_are_rejected() {
        // Find a signature with a byte that hex-encodes with a leading '0'.
        let (record, i) = (1u8..=64)
            .find_map(|seed| {
                let key = KeyPair::from_private_key(&[seed; 32]).unwrap();
                let record = sign_attestation(payload_for(&key), &key).unwrap();
                let i = (0..record.digital_signature.len())
                    .step_by(2)
                    .find(|&i| record.digital_signature.as_bytes()[i] == b'0')?;
                Some((record, i))
            })
            .unwrap();
        assert!(verify_attestation(&record));

        let mut upper = record.clone();
        upper.digital_signature = record.digital_signature.to_uppercase();
        assert_ne!(upper.digital_signature, record.digital_signature);
        assert!(!verify_attestation(&upper));

        let mut plus = record.clone();
        plus.digital_signature.replace_range(i..i + 1, "+");
        assert!(!verify_attestation(&plus));

        let mut padded = record;
        padded.digital_signature.push(' ');
        assert!(!verify_attestation(&padded));
    }
}
