//! # Credential issuance and verification
//!
//! ## Signing
//!
//! The credential body is the credential with `proof` removed, canonicalized
//! with [`CanonicalBytes::from_value()`]. The issuer signs the UTF-8 bytes of
//! the body's SHA-256 hex digest and attaches a [`Proof`] naming the
//! verification method derived from the issuer handle.
//!
//! ## Verification
//!
//! [`verify_credential()`] never returns an error. It checks the envelope,
//! expiration, issuer resolution, verification method binding, signature,
//! and revocation status, and reports every issue it finds in a
//! [`VerificationReport`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pcc_core::{
    resolve_identity_handle, sha256_hex, CanonicalBytes, ErrorCode, IdentityHandle, PccError,
    Timestamp, ValidationError,
};
use pcc_crypto::{verify_hex, KeyPair};

use crate::proof::{Proof, ProofPurpose};
use crate::registry::RevocationRegistry;
use crate::subject::CredentialSubject;

/// The W3C credentials JSON-LD context.
pub const CREDENTIALS_CONTEXT_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// The base type every credential carries.
pub const VERIFIABLE_CREDENTIAL_TYPE: &str = "VerifiableCredential";

/// A signed credential about an actor.
///
/// `issuer` is kept as the raw handle string so that a credential with an
/// unresolvable issuer can still be loaded and reported on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    #[serde(rename = "type")]
    pub credential_type: Vec<String>,

    /// Identity handle of the issuer.
    pub issuer: String,

    pub issuance_date: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<Timestamp>,

    pub credential_subject: CredentialSubject,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Canonical bytes of the credential body (everything but `proof`).
    pub fn signing_input(&self) -> Result<CanonicalBytes, PccError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("proof");
        }
        Ok(CanonicalBytes::from_value(value)?)
    }

    /// SHA-256 hex of the credential body. This is the signed message and
    /// the key under which revocations are recorded.
    pub fn body_digest(&self) -> Result<String, PccError> {
        Ok(sha256_hex(&self.signing_input()?))
    }

    /// The credential's specific type name, if present.
    pub fn specific_type(&self) -> Option<&str> {
        self.credential_type
            .iter()
            .map(String::as_str)
            .find(|t| *t != VERIFIABLE_CREDENTIAL_TYPE)
    }
}

/// Optional inputs to [`issue_credential()`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueOptions {
    /// Issuance instant. Defaults to now.
    pub issued_at: Option<Timestamp>,
    /// Expiration instant. Must be after the issuance instant.
    pub expiration_date: Option<Timestamp>,
}

/// Issue a signed credential.
///
/// The credential type is `["VerifiableCredential", <subject kind>]`.
/// Issuance is deterministic given identical inputs and `issued_at`.
///
/// # Errors
///
/// - [`ValidationError::SignerKeyMismatch`] if `issuer` is not the handle of
///   `issuer_key`.
/// - [`ValidationError::InvalidTimestamp`] if the expiration is not after
///   issuance.
pub fn issue_credential(
    subject: CredentialSubject,
    issuer: &IdentityHandle,
    issuer_key: &KeyPair,
    options: IssueOptions,
) -> Result<VerifiableCredential, PccError> {
    if issuer.public_key_bytes() != issuer_key.public_key().as_bytes() {
        return Err(ValidationError::SignerKeyMismatch {
            signer: issuer.to_string(),
        }
        .into());
    }

    let issued_at = options.issued_at.unwrap_or_else(Timestamp::now);
    if let Some(expiration) = options.expiration_date {
        if expiration <= issued_at {
            return Err(ValidationError::InvalidTimestamp {
                value: expiration.to_string(),
                reason: format!("expiration must be after issuance ({issued_at})"),
            }
            .into());
        }
    }

    let kind = subject.kind();
    let mut credential = VerifiableCredential {
        context: vec![CREDENTIALS_CONTEXT_V1.to_string()],
        credential_type: vec![
            VERIFIABLE_CREDENTIAL_TYPE.to_string(),
            kind.type_name().to_string(),
        ],
        issuer: issuer.to_string(),
        issuance_date: issued_at,
        expiration_date: options.expiration_date,
        credential_subject: subject,
        proof: None,
    };

    let digest = credential.body_digest()?;
    let signature = issuer_key.sign(digest.as_bytes());
    credential.proof = Some(Proof::new_ed25519(
        issuer.verification_method_id(),
        signature.to_hex(),
        issued_at,
    ));

    tracing::debug!(
        credential_type = kind.type_name(),
        subject = %credential.credential_subject.subject_id(),
        "credential issued"
    );
    Ok(credential)
}

/// Inputs to [`verify_credential()`].
#[derive(Debug, Clone, Copy)]
pub struct VerifyOptions<'a> {
    /// The instant expiration is judged against.
    pub current_time: Timestamp,
    /// Whether to report expired credentials.
    pub check_expiration: bool,
    /// Revocations to consult. `None` skips the revocation check.
    pub revocations: Option<&'a RevocationRegistry>,
}

impl<'a> VerifyOptions<'a> {
    /// Check expiration at `current_time`, without a revocation registry.
    pub fn at(current_time: Timestamp) -> Self {
        Self {
            current_time,
            check_expiration: true,
            revocations: None,
        }
    }

    /// Also consult `registry`.
    pub fn with_revocations<'b>(self, registry: &'b RevocationRegistry) -> VerifyOptions<'b> {
        VerifyOptions {
            current_time: self.current_time,
            check_expiration: self.check_expiration,
            revocations: Some(registry),
        }
    }
}

/// One problem found while verifying a credential.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum CredentialIssue {
    #[error("malformed envelope: {detail}")]
    MalformedEnvelope { detail: String },

    #[error("credential expired at {expired_at}")]
    Expired { expired_at: Timestamp },

    #[error("issuer {issuer} cannot be resolved: {reason}")]
    UnresolvableIssuer { issuer: String, reason: String },

    #[error("credential carries no proof")]
    MissingProof,

    #[error("proof purpose is {found}, expected assertionMethod")]
    WrongProofPurpose { found: String },

    #[error("proof names verification method {found}, expected {expected}")]
    VerificationMethodMismatch { expected: String, found: String },

    #[error("proof signature does not verify against the issuer key")]
    BadSignature,

    #[error("credential revoked at {revoked_at}: {reason}")]
    Revoked { revoked_at: Timestamp, reason: String },

    #[error("credential body cannot be canonicalized: {detail}")]
    Canonicalization { detail: String },
}

impl CredentialIssue {
    /// The error code this issue corresponds to.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedEnvelope { .. } => ErrorCode::Validation,
            Self::Expired { .. } => ErrorCode::ExpiredCredential,
            Self::UnresolvableIssuer { .. } => ErrorCode::MalformedIdentity,
            Self::MissingProof
            | Self::WrongProofPurpose { .. }
            | Self::VerificationMethodMismatch { .. }
            | Self::BadSignature => ErrorCode::InvalidSignature,
            Self::Revoked { .. } => ErrorCode::RevokedCredential,
            Self::Canonicalization { .. } => ErrorCode::Canonicalization,
        }
    }

    /// Convert into the matching [`PccError`].
    pub fn into_error(self) -> PccError {
        match self {
            Self::Expired { expired_at } => PccError::ExpiredCredential {
                expired_at: expired_at.to_string(),
            },
            Self::Revoked { reason, .. } => PccError::RevokedCredential(reason),
            Self::UnresolvableIssuer { issuer, reason } => {
                match resolve_identity_handle(&issuer) {
                    Err(e) => e,
                    Ok(_) => PccError::InvalidSignature(reason),
                }
            }
            Self::MalformedEnvelope { detail } => {
                PccError::Validation(ValidationError::MalformedCredential(detail))
            }
            other => PccError::InvalidSignature(other.to_string()),
        }
    }
}

/// Outcome of [`verify_credential()`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub valid: bool,
    pub errors: Vec<CredentialIssue>,
}

impl VerificationReport {
    /// `Ok(())` when valid, otherwise the first issue as an error.
    pub fn into_result(self) -> Result<(), PccError> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(issue) => Err(issue.into_error()),
        }
    }
}

/// Verify a credential. Never errors; every applicable issue is reported.
pub fn verify_credential(
    credential: &VerifiableCredential,
    options: VerifyOptions<'_>,
) -> VerificationReport {
    let mut errors = Vec::new();

    if !credential.context.iter().any(|c| c == CREDENTIALS_CONTEXT_V1) {
        errors.push(CredentialIssue::MalformedEnvelope {
            detail: format!("@context must include {CREDENTIALS_CONTEXT_V1}"),
        });
    }
    let expected_type = credential.credential_subject.kind().type_name();
    if !credential
        .credential_type
        .iter()
        .any(|t| t == VERIFIABLE_CREDENTIAL_TYPE)
        || credential.specific_type() != Some(expected_type)
    {
        errors.push(CredentialIssue::MalformedEnvelope {
            detail: format!("type must be [{VERIFIABLE_CREDENTIAL_TYPE}, {expected_type}]"),
        });
    }

    if options.check_expiration {
        if let Some(expired_at) = credential.expiration_date {
            if options.current_time > expired_at {
                errors.push(CredentialIssue::Expired { expired_at });
            }
        }
    }

    let issuer = match IdentityHandle::new(credential.issuer.as_str()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            errors.push(CredentialIssue::UnresolvableIssuer {
                issuer: credential.issuer.clone(),
                reason: e.to_string(),
            });
            None
        }
    };

    let digest = match credential.body_digest() {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(CredentialIssue::Canonicalization {
                detail: e.to_string(),
            });
            None
        }
    };

    match &credential.proof {
        None => errors.push(CredentialIssue::MissingProof),
        Some(proof) => {
            if proof.proof_purpose != ProofPurpose::AssertionMethod {
                errors.push(CredentialIssue::WrongProofPurpose {
                    found: proof.proof_purpose.to_string(),
                });
            }
            if let Some(issuer) = &issuer {
                let expected = issuer.verification_method_id();
                if proof.verification_method != expected {
                    errors.push(CredentialIssue::VerificationMethodMismatch {
                        expected,
                        found: proof.verification_method.clone(),
                    });
                } else if let Some(digest) = &digest {
                    if !verify_hex(
                        digest.as_bytes(),
                        &proof.proof_value,
                        issuer.public_key_bytes(),
                    ) {
                        errors.push(CredentialIssue::BadSignature);
                    }
                }
            }
        }
    }

    if let (Some(registry), Some(digest)) = (options.revocations, &digest) {
        if let Some(entry) = registry.lookup_digest(digest) {
            errors.push(CredentialIssue::Revoked {
                revoked_at: entry.revoked_at,
                reason: entry.reason.clone(),
            });
        }
    }

    if errors
        .iter()
        .any(|e| e.code() == ErrorCode::InvalidSignature)
    {
        tracing::warn!(issuer = %credential.issuer, "credential failed signature checks");
    }

    VerificationReport {
        valid: errors.is_empty(),
        errors,
    }
}
