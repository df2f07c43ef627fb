//! # Certificate Protocol
//!
//! ## Body and hash
//!
//! The certificate body is every field except `certificateHash` and
//! `digitalSignature`. It is canonicalized (JCS, floats rejected) and hashed
//! with SHA-256; the system key signs the UTF-8 bytes of that hex string.
//! Quorum counts are integers so the body never carries a float.
//!
//! ## Embedded attestations
//!
//! Revoked records are dropped before signing. The remaining records are
//! embedded in chain order, so two calls over the same set in different
//! orders produce byte-identical certificates.
//!
//! ## Verification order
//!
//! 1. Recompute the body hash. Mismatch is `TamperedData`.
//! 2. Recompute the chain hash and the counts from the embedded
//!    attestations. Mismatch is `TamperedData`.
//! 3. Verify the signature over the stored hash. Failure is
//!    `InvalidSignature`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use pcc_core::{
    sha256_hex, AttestationRecord, AttestationType, CanonicalBytes, IdentityHandle, MilestoneId,
    PccError, ProjectId, TierWeights, Timestamp, ValidationError,
};
use pcc_crypto::{verify_attestation, verify_hex, KeyPair};
use pcc_quorum::{chain_order, evaluate_quorum, hash_attestation_chain, QuorumRequirement, TierLookup};

/// Version stamped on certificates when the caller does not choose one.
pub const DEFAULT_CERTIFICATE_VERSION: &str = "1.0";

// ── Quorum counts ──────────────────────────────────────────────────────

/// Distinct non-revoked attesters per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumCounts {
    pub inspector_count: u32,
    pub auditor_count: u32,
    pub citizen_count: u32,
}

impl QuorumCounts {
    /// Count distinct actors per attestation type, skipping revoked records.
    pub fn from_attestations(records: &[AttestationRecord]) -> Self {
        let mut inspectors: BTreeSet<&IdentityHandle> = BTreeSet::new();
        let mut auditors: BTreeSet<&IdentityHandle> = BTreeSet::new();
        let mut citizens: BTreeSet<&IdentityHandle> = BTreeSet::new();
        for record in records.iter().filter(|r| !r.is_revoked()) {
            match record.attestation_type {
                AttestationType::InspectorVerification => inspectors.insert(&record.actor_id),
                AttestationType::AuditorReview => auditors.insert(&record.actor_id),
                AttestationType::CitizenApproval => citizens.insert(&record.actor_id),
            };
        }
        Self {
            inspector_count: count(inspectors.len()),
            auditor_count: count(auditors.len()),
            citizen_count: count(citizens.len()),
        }
    }
}

impl std::fmt::Display for QuorumCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "inspectors={} auditors={} citizens={}",
            self.inspector_count, self.auditor_count, self.citizen_count
        )
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ── Certificate ────────────────────────────────────────────────────────

/// A signed Payment Clearance Certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PaymentClearanceCertificate {
    pub version: String,
    pub milestone_id: MilestoneId,
    pub project_id: ProjectId,
    /// Chain hash over `attestations`.
    pub attestation_chain_hash: String,
    pub attestations: Vec<AttestationRecord>,
    pub quorum: QuorumCounts,
    pub issued_at: Timestamp,
    /// SHA-256 hex of the canonical body.
    pub certificate_hash: String,
    /// Hex Ed25519 signature over the UTF-8 bytes of `certificate_hash`.
    pub digital_signature: String,
}

/// The hashed portion of a certificate.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CertificateBody<'a> {
    version: &'a str,
    milestone_id: &'a MilestoneId,
    project_id: &'a ProjectId,
    attestation_chain_hash: &'a str,
    attestations: &'a [AttestationRecord],
    quorum: &'a QuorumCounts,
    issued_at: &'a Timestamp,
}

impl PaymentClearanceCertificate {
    fn body(&self) -> CertificateBody<'_> {
        CertificateBody {
            version: &self.version,
            milestone_id: &self.milestone_id,
            project_id: &self.project_id,
            attestation_chain_hash: &self.attestation_chain_hash,
            attestations: &self.attestations,
            quorum: &self.quorum,
            issued_at: &self.issued_at,
        }
    }

    /// Canonical bytes of the body.
    pub fn body_canonical_bytes(&self) -> Result<CanonicalBytes, PccError> {
        Ok(CanonicalBytes::new(&self.body())?)
    }

    /// Recompute the body hash from the current field values.
    pub fn compute_hash(&self) -> Result<String, PccError> {
        Ok(sha256_hex(&self.body_canonical_bytes()?))
    }
}

// ── Generation ─────────────────────────────────────────────────────────

/// Inputs for one certificate.
#[derive(Debug, Clone)]
pub struct CertificateRequest<'a> {
    pub milestone_id: MilestoneId,
    pub project_id: ProjectId,
    /// Attestations for the milestone. Revoked ones are skipped.
    pub attestations: &'a [AttestationRecord],
    pub version: String,
    /// Defaults to the current time.
    pub issued_at: Option<Timestamp>,
}

impl<'a> CertificateRequest<'a> {
    pub fn new(
        milestone_id: MilestoneId,
        project_id: ProjectId,
        attestations: &'a [AttestationRecord],
    ) -> Self {
        Self {
            milestone_id,
            project_id,
            attestations,
            version: DEFAULT_CERTIFICATE_VERSION.to_string(),
            issued_at: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn issued_at(mut self, at: Timestamp) -> Self {
        self.issued_at = Some(at);
        self
    }
}

/// Build and sign a certificate.
///
/// Does not check quorum; see [`certify_milestone()`].
///
/// # Errors
///
/// - [`ValidationError::InvalidConfig`] for an empty version.
/// - [`ValidationError::ForeignAttestation`] if a non-revoked record targets
///   another milestone.
/// - [`PccError::InvalidSignature`] if a non-revoked record's signature does
///   not verify against its actor.
/// - [`PccError::Canonicalization`] if the body cannot be canonicalized.
pub fn generate_certificate(
    request: &CertificateRequest<'_>,
    system_key: &KeyPair,
) -> Result<PaymentClearanceCertificate, PccError> {
    if request.version.trim().is_empty() {
        return Err(ValidationError::InvalidConfig("certificate version must be non-empty".into()).into());
    }

    let mut attestations = Vec::with_capacity(request.attestations.len());
    for record in request.attestations {
        if record.is_revoked() {
            tracing::debug!(
                milestone_id = %record.milestone_id,
                actor = %record.actor_id,
                "skipping revoked attestation"
            );
            continue;
        }
        if record.milestone_id != request.milestone_id {
            return Err(ValidationError::ForeignAttestation {
                expected: request.milestone_id.to_string(),
                found: record.milestone_id.to_string(),
                actor: record.actor_id.to_string(),
            }
            .into());
        }
        if !verify_attestation(record) {
            tracing::warn!(
                milestone_id = %record.milestone_id,
                actor = %record.actor_id,
                attestation_type = %record.attestation_type,
                "attestation signature does not verify"
            );
            return Err(PccError::InvalidSignature(format!(
                "{} attestation by {} does not verify",
                record.attestation_type, record.actor_id
            )));
        }
        attestations.push(record.clone());
    }
    attestations.sort_by(chain_order);

    let mut certificate = PaymentClearanceCertificate {
        version: request.version.clone(),
        milestone_id: request.milestone_id.clone(),
        project_id: request.project_id.clone(),
        attestation_chain_hash: hash_attestation_chain(&attestations),
        quorum: QuorumCounts::from_attestations(&attestations),
        attestations,
        issued_at: request.issued_at.unwrap_or_else(Timestamp::now),
        certificate_hash: String::new(),
        digital_signature: String::new(),
    };
    certificate.certificate_hash = certificate.compute_hash()?;
    certificate.digital_signature = system_key.sign(certificate.certificate_hash.as_bytes()).to_hex();

    tracing::info!(
        milestone_id = %certificate.milestone_id,
        project_id = %certificate.project_id,
        certificate_hash = %certificate.certificate_hash,
        quorum = %certificate.quorum,
        "payment clearance certificate issued"
    );
    Ok(certificate)
}

/// Evaluate quorum over the request's attestations and, if met, generate
/// the certificate.
///
/// # Errors
///
/// [`ValidationError::QuorumNotMet`] if any channel falls short, plus every
/// error of [`evaluate_quorum()`] and [`generate_certificate()`].
pub fn certify_milestone(
    request: &CertificateRequest<'_>,
    requirement: &QuorumRequirement,
    tiers: &dyn TierLookup,
    weights: &TierWeights,
    system_key: &KeyPair,
) -> Result<PaymentClearanceCertificate, PccError> {
    let breakdown = evaluate_quorum(
        &request.milestone_id,
        request.attestations,
        requirement,
        tiers,
        weights,
    )?;
    if !breakdown.overall_met {
        tracing::info!(
            milestone_id = %request.milestone_id,
            inspectors = breakdown.inspector.current,
            auditors = breakdown.auditor.current,
            citizen_score = breakdown.citizen.weighted_score,
            "certification refused: quorum not met"
        );
        return Err(ValidationError::QuorumNotMet {
            milestone_id: request.milestone_id.to_string(),
        }
        .into());
    }
    generate_certificate(request, system_key)
}

// ── Verification ───────────────────────────────────────────────────────

/// Verify a certificate against the system public key.
///
/// # Errors
///
/// - [`PccError::TamperedData`] if the body hash, chain hash, or counts do
///   not recompute to the stored values.
/// - [`PccError::InvalidSignature`] if the signature does not verify.
pub fn verify_certificate(
    certificate: &PaymentClearanceCertificate,
    system_public_key: &[u8],
) -> Result<(), PccError> {
    let recomputed = certificate.compute_hash()?;
    if recomputed != certificate.certificate_hash {
        return Err(tampered(certificate, "certificateHash", &certificate.certificate_hash, recomputed));
    }

    let chain = hash_attestation_chain(&certificate.attestations);
    if chain != certificate.attestation_chain_hash {
        return Err(tampered(
            certificate,
            "attestationChainHash",
            &certificate.attestation_chain_hash,
            chain,
        ));
    }

    let counts = QuorumCounts::from_attestations(&certificate.attestations);
    if counts != certificate.quorum {
        return Err(tampered(
            certificate,
            "quorum",
            &certificate.quorum.to_string(),
            counts.to_string(),
        ));
    }

    if !verify_hex(
        certificate.certificate_hash.as_bytes(),
        &certificate.digital_signature,
        system_public_key,
    ) {
        tracing::warn!(
            milestone_id = %certificate.milestone_id,
            certificate_hash = %certificate.certificate_hash,
            "certificate signature does not verify against the system key"
        );
        return Err(PccError::InvalidSignature(format!(
            "certificate for milestone {} is not signed by the supplied system key",
            certificate.milestone_id
        )));
    }

    tracing::debug!(milestone_id = %certificate.milestone_id, "certificate verified");
    Ok(())
}

fn tampered(
    certificate: &PaymentClearanceCertificate,
    field: &str,
    expected: &str,
    actual: String,
) -> PccError {
    tracing::warn!(
        milestone_id = %certificate.milestone_id,
        field,
        "certificate body does not match its hash"
    );
    PccError::TamperedData {
        field: field.to_string(),
        expected: expected.to_string(),
        actual,
    }
}
