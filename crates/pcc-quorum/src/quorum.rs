//! # Quorum Engine
//!
//! A milestone is proven when all three channels meet their requirement:
//!
//! | Channel   | Counts                                    | Met when              |
//! |-----------|-------------------------------------------|-----------------------|
//! | inspector | distinct actors, `inspector_verification` | `current >= required` |
//! | auditor   | distinct actors, `auditor_review`         | `current >= required` |
//! | citizen   | Σ tier weight over distinct citizens      | `score >= required`   |
//!
//! Revoked attestations and attestations for other milestones are ignored.
//! Each citizen contributes once, at the weight of their most recent
//! assurance tier as reported by the [`TierLookup`]. A citizen with no known
//! tier contributes nothing.
//!
//! Weights and the citizen requirement are compared in integer thousandths,
//! so `0.4 + 0.6 >= 1.0` holds exactly.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use pcc_core::{
    AssuranceTier, AttestationRecord, AttestationType, IdentityHandle, MilestoneId, PccError,
    TierWeights, ValidationError,
};

/// Per-milestone quorum thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumRequirement {
    pub required_inspector_count: u32,
    pub required_auditor_count: u32,
    /// Weighted citizen score required.
    pub required_citizen_count: f64,
}

impl QuorumRequirement {
    /// The citizen requirement must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let c = self.required_citizen_count;
        if !c.is_finite() || c < 0.0 {
            return Err(ValidationError::InvalidConfig(format!(
                "requiredCitizenCount must be a finite non-negative number, got {c}"
            )));
        }
        Ok(())
    }
}

/// Tally for a count-based channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTally {
    pub current: u32,
    pub required: u32,
    pub met: bool,
}

/// Tally for the weighted citizen channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenTally {
    pub weighted_score: f64,
    pub required: f64,
    pub met: bool,
    /// Distinct approving citizens, including any with unknown tier.
    pub distinct_citizens: u32,
}

/// Derived quorum status of a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumBreakdown {
    pub inspector: ChannelTally,
    pub auditor: ChannelTally,
    pub citizen: CitizenTally,
    pub overall_met: bool,
}

/// Source of each citizen's most recent assurance tier.
pub trait TierLookup {
    fn assurance_tier(&self, citizen: &IdentityHandle) -> Option<AssuranceTier>;
}

impl TierLookup for HashMap<IdentityHandle, AssuranceTier> {
    fn assurance_tier(&self, citizen: &IdentityHandle) -> Option<AssuranceTier> {
        self.get(citizen).copied()
    }
}

impl TierLookup for BTreeMap<IdentityHandle, AssuranceTier> {
    fn assurance_tier(&self, citizen: &IdentityHandle) -> Option<AssuranceTier> {
        self.get(citizen).copied()
    }
}

/// Read access to attestations and citizen tiers.
pub trait AttestationStore: TierLookup {
    /// All attestation records for a milestone, revoked ones included.
    fn milestone_attestations(&self, milestone_id: &MilestoneId) -> Vec<AttestationRecord>;
}

const MILLI: f64 = 1000.0;

fn to_milli(value: f64) -> u64 {
    (value * MILLI).round() as u64
}

/// Evaluate quorum for `milestone_id` over `records`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidConfig`] if the requirement or the
/// weights are out of range.
pub fn evaluate_quorum(
    milestone_id: &MilestoneId,
    records: &[AttestationRecord],
    requirement: &QuorumRequirement,
    tiers: &dyn TierLookup,
    weights: &TierWeights,
) -> Result<QuorumBreakdown, PccError> {
    requirement.validate()?;
    weights.validate()?;

    let mut inspectors: BTreeSet<&IdentityHandle> = BTreeSet::new();
    let mut auditors: BTreeSet<&IdentityHandle> = BTreeSet::new();
    let mut citizens: BTreeSet<&IdentityHandle> = BTreeSet::new();

    for record in records {
        if record.is_revoked() {
            continue;
        }
        if &record.milestone_id != milestone_id {
            tracing::warn!(
                expected = %milestone_id,
                found = %record.milestone_id,
                actor = %record.actor_id,
                "ignoring attestation for another milestone"
            );
            continue;
        }
        match record.attestation_type {
            AttestationType::InspectorVerification => inspectors.insert(&record.actor_id),
            AttestationType::AuditorReview => auditors.insert(&record.actor_id),
            AttestationType::CitizenApproval => citizens.insert(&record.actor_id),
        };
    }

    let mut score_milli: u64 = 0;
    for citizen in &citizens {
        match tiers.assurance_tier(citizen) {
            Some(tier) => score_milli += to_milli(weights.weight(tier)),
            None => tracing::warn!(
                citizen = %citizen,
                milestone_id = %milestone_id,
                "citizen has no assurance tier; approval carries no weight"
            ),
        }
    }

    let inspector = tally(inspectors.len(), requirement.required_inspector_count);
    let auditor = tally(auditors.len(), requirement.required_auditor_count);
    let citizen = CitizenTally {
        weighted_score: score_milli as f64 / MILLI,
        required: requirement.required_citizen_count,
        met: score_milli >= to_milli(requirement.required_citizen_count),
        distinct_citizens: count_u32(citizens.len()),
    };
    let breakdown = QuorumBreakdown {
        inspector,
        auditor,
        citizen,
        overall_met: inspector.met && auditor.met && citizen.met,
    };

    tracing::debug!(
        milestone_id = %milestone_id,
        inspectors = inspector.current,
        auditors = auditor.current,
        citizen_score = citizen.weighted_score,
        overall_met = breakdown.overall_met,
        "quorum evaluated"
    );
    Ok(breakdown)
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn tally(current: usize, required: u32) -> ChannelTally {
    let current = count_u32(current);
    ChannelTally {
        current,
        required,
        met: current >= required,
    }
}

/// Evaluates quorum against a store with configured tier weights.
#[derive(Debug, Clone, Default)]
pub struct QuorumEngine {
    weights: TierWeights,
}

impl QuorumEngine {
    pub fn new(weights: TierWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &TierWeights {
        &self.weights
    }

    /// Load the milestone's attestations from `store` and evaluate them.
    pub fn evaluate<S: AttestationStore>(
        &self,
        store: &S,
        milestone_id: &MilestoneId,
        requirement: &QuorumRequirement,
    ) -> Result<QuorumBreakdown, PccError> {
        let records = store.milestone_attestations(milestone_id);
        evaluate_quorum(milestone_id, &records, requirement, store, &self.weights)
    }
}
