//! # Error Taxonomy
//!
//! Structured error types for the engine, built with `thiserror`.
//!
//! Every failure class carries a stable [`ErrorCode`] so that the service
//! layer can map errors to responses, retry policy, and audit events without
//! matching on message text.
//!
//! | Code                 | Retryable | Security event |
//! |----------------------|-----------|----------------|
//! | `MALFORMED_IDENTITY` | no        | no             |
//! | `INVALID_SIGNATURE`  | no        | yes            |
//! | `TAMPERED_DATA`      | no        | yes            |
//! | `EXPIRED_CREDENTIAL` | no        | no             |
//! | `REVOKED_CREDENTIAL` | no        | no             |
//! | `KEY_GENERATION`     | bounded   | no             |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum PccError {
    /// An identity handle failed structural validation.
    #[error("malformed identity handle \"{handle}\": {defect}")]
    MalformedIdentity {
        /// The rejected handle as supplied.
        handle: String,
        /// Which structural rule it violated.
        defect: IdentityDefect,
    },

    /// A signature did not verify against the claimed key.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A recomputed hash does not match the stored one.
    #[error("tampered data: {field} is {expected} but recomputes to {actual}")]
    TamperedData {
        /// The field whose stored hash disagrees.
        field: String,
        /// The stored value.
        expected: String,
        /// The recomputed value.
        actual: String,
    },

    /// A credential is past its expiration date.
    #[error("credential expired at {expired_at}")]
    ExpiredCredential {
        /// Expiration instant (ISO 8601).
        expired_at: String,
    },

    /// A credential appears in the revoked set.
    #[error("credential revoked: {0}")]
    RevokedCredential(String),

    /// Key generation or derivation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Canonicalization failure during digest computation.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Domain validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Lifecycle transition violation.
    #[error("state transition error: {0}")]
    StateTransition(#[from] StateTransitionError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable discriminant for every [`PccError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MalformedIdentity,
    InvalidSignature,
    TamperedData,
    ExpiredCredential,
    RevokedCredential,
    KeyGeneration,
    Canonicalization,
    Validation,
    StateTransition,
    Serialization,
}

impl ErrorCode {
    /// The wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedIdentity => "MALFORMED_IDENTITY",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::TamperedData => "TAMPERED_DATA",
            Self::ExpiredCredential => "EXPIRED_CREDENTIAL",
            Self::RevokedCredential => "REVOKED_CREDENTIAL",
            Self::KeyGeneration => "KEY_GENERATION",
            Self::Canonicalization => "CANONICALIZATION",
            Self::Validation => "VALIDATION",
            Self::StateTransition => "STATE_TRANSITION",
            Self::Serialization => "SERIALIZATION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PccError {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedIdentity { .. } => ErrorCode::MalformedIdentity,
            Self::InvalidSignature(_) => ErrorCode::InvalidSignature,
            Self::TamperedData { .. } => ErrorCode::TamperedData,
            Self::ExpiredCredential { .. } => ErrorCode::ExpiredCredential,
            Self::RevokedCredential(_) => ErrorCode::RevokedCredential,
            Self::KeyGeneration(_) => ErrorCode::KeyGeneration,
            Self::Canonicalization(_) => ErrorCode::Canonicalization,
            Self::Validation(_) => ErrorCode::Validation,
            Self::StateTransition(_) => ErrorCode::StateTransition,
            Self::Json(_) => ErrorCode::Serialization,
        }
    }

    /// Whether a caller may retry the failed operation (a bounded number of
    /// times). Only entropy/library failures during key generation qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::KeyGeneration(_))
    }

    /// Whether the error must be recorded as a security event by the
    /// surrounding audit layer.
    pub fn is_security_event(&self) -> bool {
        matches!(self, Self::InvalidSignature(_) | Self::TamperedData { .. })
    }

    /// Shorthand for a malformed-identity error.
    pub fn malformed_identity(handle: impl Into<String>, defect: IdentityDefect) -> Self {
        Self::MalformedIdentity {
            handle: handle.into(),
            defect,
        }
    }
}

/// The structural rule an identity handle violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityDefect {
    /// The handle does not start with the `did:key:z` prefix.
    #[error("expected prefix \"did:key:z\"")]
    WrongPrefix,

    /// The payload after the prefix is not valid base58btc.
    #[error("payload is not base58: {0}")]
    InvalidEncoding(String),

    /// The decoded payload does not begin with the Ed25519 type tag.
    #[error("expected Ed25519 type tag 0xed01, found {0}")]
    WrongTypeTag(String),

    /// The key material is not 32 bytes.
    #[error("expected a 32-byte public key, got {0} bytes")]
    WrongKeyLength(usize),
}

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; use integers or strings: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain values and engine inputs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required identifier was empty.
    #[error("{kind} must be non-empty")]
    EmptyIdentifier {
        /// The identifier kind (e.g. "milestone id").
        kind: &'static str,
    },

    /// Timestamp string is not valid UTC ISO 8601.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Engine configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A credential envelope is structurally wrong.
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The claimed signer handle does not belong to the supplied key.
    #[error("signer {signer} does not match the signing key")]
    SignerKeyMismatch {
        /// The claimed signer handle.
        signer: String,
    },

    /// An attestation belongs to a different milestone than the one being
    /// certified.
    #[error("attestation by {actor} targets milestone {found}, expected {expected}")]
    ForeignAttestation {
        /// Milestone being certified.
        expected: String,
        /// Milestone named on the attestation.
        found: String,
        /// The attesting actor.
        actor: String,
    },

    /// Certification was requested before quorum was reached.
    #[error("quorum not met for milestone {milestone_id}")]
    QuorumNotMet {
        /// The milestone that fell short.
        milestone_id: String,
    },

    /// A certificate was already issued for this milestone.
    #[error("certificate already issued for milestone {milestone_id}")]
    DuplicateCertificate {
        /// The milestone that already has a certificate.
        milestone_id: String,
    },
}

/// Errors during lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    /// The attempted transition is not valid from the current state.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// The current state name.
        from: String,
        /// The attempted target state name.
        to: String,
        /// Human-readable reason for the rejection.
        reason: String,
    },

    /// A revocation or recusal was attempted without a reason.
    #[error("{action} requires a non-empty reason")]
    MissingReason {
        /// The action that needs a reason.
        action: &'static str,
    },
}
