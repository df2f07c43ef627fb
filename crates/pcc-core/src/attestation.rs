//! # Attestation Records
//!
//! An attestation is an actor's signed statement that a milestone was
//! delivered, backed by the hash of the evidence they submitted.
//!
//! Records are logically append-only. Revocation marks a record
//! (`revokedAt`, `revocationReason`) and never removes it, so that any
//! chain hash computed over the original set remains auditable.
//!
//! The signed portion of a record is its [`AttestationPayload`]: everything
//! except the signature itself and the revocation marks.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_bytes_hex, sha256_hex};
use crate::error::{CanonicalizationError, StateTransitionError};
use crate::identity::{IdentityHandle, MilestoneId};
use crate::temporal::Timestamp;

/// The attestation channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationType {
    /// A field inspector verified the physical work.
    InspectorVerification,
    /// An independent auditor reviewed the milestone.
    AuditorReview,
    /// A sampled citizen approved the delivery.
    CitizenApproval,
}

impl AttestationType {
    /// The canonical string name (also the serde wire name).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InspectorVerification => "inspector_verification",
            Self::AuditorReview => "auditor_review",
            Self::CitizenApproval => "citizen_approval",
        }
    }
}

impl std::fmt::Display for AttestationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a citizen's identity was assured at enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssuranceTier {
    /// Biometric verification against the national registry.
    Biometric,
    /// USSD/SMS enrollment with phone-number binding only.
    Ussd,
    /// Enrollment mediated by a civil-society organization.
    CsoMediated,
}

impl AssuranceTier {
    /// Default scoring weight: 1.0, 0.6, 0.4.
    pub fn default_weight(&self) -> f64 {
        match self {
            Self::Biometric => 1.0,
            Self::Ussd => 0.6,
            Self::CsoMediated => 0.4,
        }
    }

    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biometric => "biometric",
            Self::Ussd => "ussd",
            Self::CsoMediated => "cso_mediated",
        }
    }
}

impl std::fmt::Display for AssuranceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed body of an attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationPayload {
    /// Milestone being attested.
    pub milestone_id: MilestoneId,
    /// The attesting actor.
    pub actor_id: IdentityHandle,
    /// Attestation channel.
    #[serde(rename = "type")]
    pub attestation_type: AttestationType,
    /// SHA-256 hex of the raw evidence bytes.
    pub evidence_hash: String,
    /// When the attestation was submitted.
    pub submitted_at: Timestamp,
}

impl AttestationPayload {
    /// Build a payload, hashing the raw evidence bytes.
    pub fn new(
        milestone_id: MilestoneId,
        actor_id: IdentityHandle,
        attestation_type: AttestationType,
        evidence: &[u8],
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            milestone_id,
            actor_id,
            attestation_type,
            evidence_hash: sha256_bytes_hex(evidence),
            submitted_at,
        }
    }

    /// Canonical bytes of the payload.
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// SHA-256 hex of the canonical payload. This string's UTF-8 bytes are
    /// what the actor signs.
    pub fn signing_digest(&self) -> Result<String, CanonicalizationError> {
        Ok(sha256_hex(&self.canonical_bytes()?))
    }

    /// Attach a hex signature, producing a record.
    pub fn into_record(self, digital_signature: String) -> AttestationRecord {
        AttestationRecord {
            milestone_id: self.milestone_id,
            actor_id: self.actor_id,
            attestation_type: self.attestation_type,
            evidence_hash: self.evidence_hash,
            digital_signature,
            submitted_at: self.submitted_at,
            revoked_at: None,
            revocation_reason: None,
        }
    }
}

/// A submitted attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    /// Milestone being attested.
    pub milestone_id: MilestoneId,
    /// The attesting actor.
    pub actor_id: IdentityHandle,
    /// Attestation channel.
    #[serde(rename = "type")]
    pub attestation_type: AttestationType,
    /// SHA-256 hex of the raw evidence bytes.
    pub evidence_hash: String,
    /// Hex Ed25519 signature over the payload's signing digest.
    pub digital_signature: String,
    /// When the attestation was submitted.
    pub submitted_at: Timestamp,
    /// Set when the attestation was revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<Timestamp>,
    /// Why the attestation was revoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
}

impl AttestationRecord {
    /// The signed portion of this record.
    pub fn payload(&self) -> AttestationPayload {
        AttestationPayload {
            milestone_id: self.milestone_id.clone(),
            actor_id: self.actor_id.clone(),
            attestation_type: self.attestation_type,
            evidence_hash: self.evidence_hash.clone(),
            submitted_at: self.submitted_at,
        }
    }

    /// Whether this record has been revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Mark the record revoked.
    ///
    /// # Errors
    ///
    /// Rejects an empty reason and a second revocation of the same record.
    pub fn revoke(&mut self, reason: &str, at: Timestamp) -> Result<(), StateTransitionError> {
        if reason.trim().is_empty() {
            return Err(StateTransitionError::MissingReason {
                action: "attestation revocation",
            });
        }
        if self.is_revoked() {
            return Err(StateTransitionError::InvalidTransition {
                from: "revoked".to_string(),
                to: "revoked".to_string(),
                reason: "attestation is already revoked".to_string(),
            });
        }
        self.revoked_at = Some(at);
        self.revocation_reason = Some(reason.to_string());
        Ok(())
    }

    /// The total order used by the attestation chain hash.
    pub fn chain_order_key(&self) -> (&str, &str, &'static str) {
        (
            self.milestone_id.as_str(),
            self.actor_id.as_str(),
            self.attestation_type.as_str(),
        )
    }
}
