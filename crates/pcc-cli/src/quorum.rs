//! # Quorum Subcommand
//!
//! `pcc quorum evaluate` prints the breakdown for a milestone and exits 0
//! when quorum is met, 2 when it is not. A live attestation whose signature
//! does not verify fails the command, the same set `certificate issue`
//! refuses.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use pcc_core::{AssuranceTier, AttestationRecord, EngineConfig, IdentityHandle, MilestoneId};
use pcc_crypto::verify_attestation;
use pcc_quorum::{evaluate_quorum, QuorumBreakdown, QuorumRequirement};

/// Citizen tiers as stored on disk: handle → most recent tier.
pub type TierFile = BTreeMap<IdentityHandle, AssuranceTier>;

/// Exit code for a well-formed evaluation that fell short.
pub const EXIT_QUORUM_NOT_MET: u8 = 2;

/// Per-channel thresholds shared by `quorum evaluate` and
/// `certificate issue`.
#[derive(Args, Debug, Clone, Copy)]
pub struct RequirementArgs {
    /// Distinct inspectors required.
    #[arg(long)]
    pub inspectors: u32,

    /// Distinct auditors required.
    #[arg(long)]
    pub auditors: u32,

    /// Weighted citizen score required.
    #[arg(long)]
    pub citizens: f64,
}

impl RequirementArgs {
    pub fn requirement(&self) -> QuorumRequirement {
        QuorumRequirement {
            required_inspector_count: self.inspectors,
            required_auditor_count: self.auditors,
            required_citizen_count: self.citizens,
        }
    }
}

/// Arguments for `pcc quorum`.
#[derive(Args, Debug)]
pub struct QuorumArgs {
    #[command(subcommand)]
    pub command: QuorumCommand,
}

#[derive(Subcommand, Debug)]
pub enum QuorumCommand {
    /// Evaluate quorum for a milestone.
    Evaluate {
        /// Milestone identifier.
        #[arg(long)]
        milestone: String,

        /// JSON array of attestation records.
        #[arg(long)]
        attestations: PathBuf,

        /// JSON object mapping citizen handles to assurance tiers.
        #[arg(long)]
        tiers: Option<PathBuf>,

        #[command(flatten)]
        requirement: RequirementArgs,
    },
}

/// Load a tier file; no path means no known tiers.
pub fn load_tiers(path: Option<&Path>) -> Result<TierFile> {
    match path {
        Some(p) => crate::read_json(p),
        None => Ok(TierFile::new()),
    }
}

pub fn evaluate(
    milestone: &str,
    attestations: &Path,
    tiers: Option<&Path>,
    requirement: &QuorumRequirement,
    config: &EngineConfig,
) -> Result<QuorumBreakdown> {
    let milestone_id = MilestoneId::new(milestone)?;
    let records: Vec<AttestationRecord> = crate::read_json(attestations)?;
    let forged: Vec<String> = records
        .iter()
        .filter(|r| !r.is_revoked() && !verify_attestation(r))
        .map(|r| format!("{} ({})", r.actor_id, r.attestation_type))
        .collect();
    if !forged.is_empty() {
        tracing::warn!(%milestone_id, count = forged.len(), "attestations failed signature checks");
        bail!(
            "{} attestation(s) for milestone {milestone_id} have invalid signatures: {}",
            forged.len(),
            forged.join(", ")
        );
    }
    let tiers = load_tiers(tiers)?;
    Ok(evaluate_quorum(
        &milestone_id,
        &records,
        requirement,
        &tiers,
        &config.tier_weights,
    )?)
}

pub fn run_quorum(args: &QuorumArgs, config: &EngineConfig) -> Result<u8> {
    match &args.command {
        QuorumCommand::Evaluate {
            milestone,
            attestations,
            tiers,
            requirement,
        } => {
            let breakdown = evaluate(
                milestone,
                attestations,
                tiers.as_deref(),
                &requirement.requirement(),
                config,
            )?;
            crate::emit_json(None, &breakdown)?;
            Ok(if breakdown.overall_met { 0 } else { EXIT_QUORUM_NOT_MET })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_core::{AttestationPayload, AttestationType, Timestamp};
    use pcc_crypto::{sign_attestation, KeyPair};

    fn attest(seed: u8, kind: AttestationType) -> AttestationRecord {
        let key = KeyPair::from_private_key(&[seed; 32]).unwrap();
        let payload = AttestationPayload::new(
            MilestoneId::new("ms-1").unwrap(),
            key.identity_handle(),
            kind,
            b"evidence",
            Timestamp::parse("2026-04-01T00:00:00Z").unwrap(),
        );
        sign_attestation(payload, &key).unwrap()
    }

    fn citizen(seed: u8) -> IdentityHandle {
        KeyPair::from_private_key(&[seed; 32]).unwrap().identity_handle()
    }

    fn args(dir: &Path, citizens: f64) -> QuorumArgs {
        QuorumArgs {
            command: QuorumCommand::Evaluate {
                milestone: "ms-1".to_string(),
                attestations: dir.join("attestations.json"),
                tiers: Some(dir.join("tiers.json")),
                requirement: RequirementArgs {
                    inspectors: 1,
                    auditors: 1,
                    citizens,
                },
            },
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            attest(1, AttestationType::InspectorVerification),
            attest(2, AttestationType::AuditorReview),
            attest(3, AttestationType::CitizenApproval),
            attest(4, AttestationType::CitizenApproval),
        ];
        crate::write_json(&dir.path().join("attestations.json"), &records).unwrap();
        let mut tiers = TierFile::new();
        tiers.insert(citizen(3), AssuranceTier::Biometric);
        tiers.insert(citizen(4), AssuranceTier::Ussd);
        crate::write_json(&dir.path().join("tiers.json"), &tiers).unwrap();
        dir
    }

    #[test]
    fn met_and_unmet_exit_codes() {
        let dir = fixture();
        let config = EngineConfig::default();
        assert_eq!(run_quorum(&args(dir.path(), 1.6), &config).unwrap(), 0);
        assert_eq!(
            run_quorum(&args(dir.path(), 2.0), &config).unwrap(),
            EXIT_QUORUM_NOT_MET
        );
    }

    #[test]
    fn breakdown_uses_configured_weights() {
        let dir = fixture();
        let mut config = EngineConfig::default();
        config.tier_weights.ussd = 1.0;
        let breakdown = evaluate(
            "ms-1",
            &dir.path().join("attestations.json"),
            Some(&dir.path().join("tiers.json")),
            &RequirementArgs {
                inspectors: 1,
                auditors: 1,
                citizens: 2.0,
            }
            .requirement(),
            &config,
        )
        .unwrap();
        assert!(breakdown.overall_met);
        assert_eq!(breakdown.citizen.weighted_score, 2.0);
    }

    #[test]
    fn forged_attestation_fails_the_evaluation() {
        let dir = fixture();
        let path = dir.path().join("attestations.json");
        let mut records: Vec<AttestationRecord> = crate::read_json(&path).unwrap();
        records[1].evidence_hash = pcc_core::sha256_bytes_hex(b"a different report");
        crate::write_json(&path, &records).unwrap();

        let err = run_quorum(&args(dir.path(), 1.6), &EngineConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid signatures"), "{err:#}");
    }

    #[test]
    fn revoked_forgeries_are_ignored() {
        let dir = fixture();
        let path = dir.path().join("attestations.json");
        let mut records: Vec<AttestationRecord> = crate::read_json(&path).unwrap();
        let mut extra = attest(5, AttestationType::CitizenApproval);
        extra.digital_signature = "00".repeat(64);
        extra
            .revoke("withdrawn", Timestamp::parse("2026-04-02T00:00:00Z").unwrap())
            .unwrap();
        records.push(extra);
        crate::write_json(&path, &records).unwrap();

        assert_eq!(run_quorum(&args(dir.path(), 1.6), &EngineConfig::default()).unwrap(), 0);
    }

    #[test]
    fn missing_tiers_score_zero() {
        let dir = fixture();
        let breakdown = evaluate(
            "ms-1",
            &dir.path().join("attestations.json"),
            None,
            &QuorumRequirement {
                required_inspector_count: 1,
                required_auditor_count: 1,
                required_citizen_count: 0.5,
            },
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(breakdown.citizen.distinct_citizens, 2);
        assert!(!breakdown.citizen.met);
    }
}
