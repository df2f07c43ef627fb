//! # Issuance Guard
//!
//! Certificate generation must happen at most once per milestone: two
//! concurrent calls would both pass quorum and produce two valid
//! authorizations for one delivery. The guard is the in-process form of the
//! "only if no certificate exists yet" check a persistence layer would
//! enforce with a unique constraint.

use std::collections::BTreeMap;

use pcc_core::{MilestoneId, PccError, TierWeights, ValidationError};
use pcc_crypto::KeyPair;
use pcc_quorum::{QuorumRequirement, TierLookup};

use crate::certificate::{
    certify_milestone, generate_certificate, CertificateRequest, PaymentClearanceCertificate,
};
use crate::lifecycle::CertificateRecord;

/// Tracks issued certificates by milestone and refuses duplicates.
#[derive(Debug, Clone, Default)]
pub struct IssuanceGuard {
    issued: BTreeMap<MilestoneId, CertificateRecord>,
}

impl IssuanceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the guard with previously issued certificates.
    pub fn from_records(records: impl IntoIterator<Item = CertificateRecord>) -> Self {
        Self {
            issued: records
                .into_iter()
                .map(|r| (r.milestone_id().clone(), r))
                .collect(),
        }
    }

    pub fn is_issued(&self, milestone_id: &MilestoneId) -> bool {
        self.issued.contains_key(milestone_id)
    }

    pub fn get(&self, milestone_id: &MilestoneId) -> Option<&CertificateRecord> {
        self.issued.get(milestone_id)
    }

    pub fn get_mut(&mut self, milestone_id: &MilestoneId) -> Option<&mut CertificateRecord> {
        self.issued.get_mut(milestone_id)
    }

    pub fn len(&self) -> usize {
        self.issued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }

    /// Generate a certificate unless one already exists for the milestone.
    ///
    /// A revoked certificate still occupies its milestone.
    ///
    /// # Errors
    ///
    /// [`ValidationError::DuplicateCertificate`] on a second issuance, plus
    /// every error of [`generate_certificate()`].
    pub fn issue(
        &mut self,
        request: &CertificateRequest<'_>,
        system_key: &KeyPair,
    ) -> Result<&CertificateRecord, PccError> {
        self.check(&request.milestone_id)?;
        let certificate = generate_certificate(request, system_key)?;
        Ok(self.record(certificate))
    }

    /// [`IssuanceGuard::issue`] preceded by a quorum check.
    pub fn certify(
        &mut self,
        request: &CertificateRequest<'_>,
        requirement: &QuorumRequirement,
        tiers: &dyn TierLookup,
        weights: &TierWeights,
        system_key: &KeyPair,
    ) -> Result<&CertificateRecord, PccError> {
        self.check(&request.milestone_id)?;
        let certificate = certify_milestone(request, requirement, tiers, weights, system_key)?;
        Ok(self.record(certificate))
    }

    fn check(&self, milestone_id: &MilestoneId) -> Result<(), PccError> {
        if self.is_issued(milestone_id) {
            tracing::warn!(milestone_id = %milestone_id, "duplicate certificate issuance refused");
            return Err(ValidationError::DuplicateCertificate {
                milestone_id: milestone_id.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn record(&mut self, certificate: PaymentClearanceCertificate) -> &CertificateRecord {
        let milestone_id = certificate.milestone_id.clone();
        self.issued
            .entry(milestone_id)
            .or_insert_with(|| CertificateRecord::new(certificate))
    }
}
