//! # Credential Proofs
//!
//! The proof object attached to a credential. Its structure is rigid:
//! unknown fields are rejected on deserialization.

use serde::{Deserialize, Serialize};

use pcc_core::Timestamp;

/// The signature suite of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofType {
    /// Ed25519 signature over the SHA-256 hex digest of the JCS-canonical
    /// credential body.
    Ed25519Signature2020,
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofType::Ed25519Signature2020 => write!(f, "Ed25519Signature2020"),
        }
    }
}

/// The purpose of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProofPurpose {
    /// The issuer asserts the credential claims are true.
    AssertionMethod,
    /// Authentication of the credential holder.
    Authentication,
}

impl std::fmt::Display for ProofPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofPurpose::AssertionMethod => write!(f, "assertionMethod"),
            ProofPurpose::Authentication => write!(f, "authentication"),
        }
    }
}

/// A cryptographic proof on a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: ProofType,
    /// When the proof was created. Equal to the credential's issuance date.
    pub created: Timestamp,
    /// DID URL of the signing key.
    pub verification_method: String,
    pub proof_purpose: ProofPurpose,
    /// Hex-encoded Ed25519 signature (128 hex characters).
    pub proof_value: String,
}

impl Proof {
    /// An `Ed25519Signature2020` assertion proof.
    pub fn new_ed25519(
        verification_method: String,
        proof_value: String,
        created: Timestamp,
    ) -> Self {
        Self {
            proof_type: ProofType::Ed25519Signature2020,
            created,
            verification_method,
            proof_purpose: ProofPurpose::AssertionMethod,
            proof_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_wire_format() {
        let proof = Proof::new_ed25519(
            "did:key:z6MkX#z6MkX".into(),
            "00".repeat(64),
            Timestamp::parse("2026-01-01T00:00:00Z").unwrap(),
        );
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["type"], "Ed25519Signature2020");
        assert_eq!(json["proofPurpose"], "assertionMethod");
        assert_eq!(json["verificationMethod"], "did:key:z6MkX#z6MkX");
        assert_eq!(json["created"], "2026-01-01T00:00:00Z");
        let back: Proof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }

    #[test]
    fn unknown_fields_and_suites_are_rejected() {
        let json = serde_json::json!({
            "type": "Ed25519Signature2020",
            "created": "2026-01-01T00:00:00Z",
            "verificationMethod": "vm",
            "proofPurpose": "assertionMethod",
            "proofValue": "00",
            "nonce": "injected"
        });
        assert!(serde_json::from_value::<Proof>(json).is_err());

        let json = serde_json::json!({
            "type": "RsaSignature2018",
            "created": "2026-01-01T00:00:00Z",
            "verificationMethod": "vm",
            "proofPurpose": "assertionMethod",
            "proofValue": "00"
        });
        assert!(serde_json::from_value::<Proof>(json).is_err());
    }

    #[test]
    fn purpose_display() {
        assert_eq!(ProofPurpose::Authentication.to_string(), "authentication");
        assert_eq!(ProofType::Ed25519Signature2020.to_string(), "Ed25519Signature2020");
    }
}
