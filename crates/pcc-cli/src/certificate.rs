//! # Certificate Subcommand
//!
//! - `issue`: Check quorum and sign a certificate with the system key.
//! - `verify`: Verify a certificate against the system public key. Exits
//!   1 and prints the error code on failure.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use pcc_certificate::{
    certify_milestone, verify_certificate, CertificateRequest, PaymentClearanceCertificate,
};
use pcc_core::{AttestationRecord, EngineConfig, MilestoneId, ProjectId};
use pcc_crypto::Ed25519PublicKey;

use crate::keys::load_key;
use crate::quorum::{load_tiers, RequirementArgs};

/// Arguments for `pcc certificate`.
#[derive(Args, Debug)]
pub struct CertificateArgs {
    #[command(subcommand)]
    pub command: CertificateCommand,
}

#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
    /// Issue a certificate for a milestone that has reached quorum.
    Issue {
        #[arg(long)]
        milestone: String,

        #[arg(long)]
        project: String,

        /// JSON array of attestation records.
        #[arg(long)]
        attestations: PathBuf,

        /// JSON object mapping citizen handles to assurance tiers.
        #[arg(long)]
        tiers: Option<PathBuf>,

        #[command(flatten)]
        requirement: RequirementArgs,

        /// System key file.
        #[arg(long)]
        key: PathBuf,

        /// Issuance time (RFC 3339, UTC). Defaults to now.
        #[arg(long)]
        issued_at: Option<String>,

        /// Where to write the certificate. Printed when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify a certificate.
    Verify {
        /// Certificate JSON file.
        certificate: PathBuf,

        /// System public key, hex.
        #[arg(long)]
        public_key: String,
    },
}

pub fn run_certificate(args: &CertificateArgs, config: &EngineConfig) -> Result<u8> {
    match &args.command {
        CertificateCommand::Issue {
            milestone,
            project,
            attestations,
            tiers,
            requirement,
            key,
            issued_at,
            out,
        } => {
            let records: Vec<AttestationRecord> = crate::read_json(attestations)?;
            let tiers = load_tiers(tiers.as_deref())?;
            let system_key = load_key(key)?;
            let request = CertificateRequest::new(
                MilestoneId::new(milestone.as_str())?,
                ProjectId::new(project.as_str())?,
                &records,
            )
            .with_version(config.certificate_version.clone())
            .issued_at(crate::timestamp_or_now(issued_at.as_deref())?);

            let certificate = certify_milestone(
                &request,
                &requirement.requirement(),
                &tiers,
                &config.tier_weights,
                &system_key,
            )
            .with_context(|| format!("certification failed for milestone {milestone}"))?;

            crate::emit_json(out.as_deref(), &certificate)?;
            if let Some(out) = out {
                println!(
                    "OK: certificate {} for milestone {} written to {}",
                    certificate.certificate_hash,
                    certificate.milestone_id,
                    out.display()
                );
            }
            Ok(0)
        }
        CertificateCommand::Verify {
            certificate,
            public_key,
        } => cmd_verify(certificate, public_key),
    }
}

fn cmd_verify(path: &Path, public_key: &str) -> Result<u8> {
    let certificate: PaymentClearanceCertificate = crate::read_json(path)?;
    let public_key = Ed25519PublicKey::from_hex(public_key).context("invalid system public key")?;
    match verify_certificate(&certificate, public_key.as_bytes()) {
        Ok(()) => {
            println!(
                "OK: certificate {} for milestone {} verified",
                certificate.certificate_hash, certificate.milestone_id
            );
            Ok(0)
        }
        Err(e) => {
            eprintln!("FAIL: {}: {e}", e.code());
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_core::{AssuranceTier, AttestationPayload, AttestationType, Timestamp};
    use pcc_crypto::{sign_attestation, KeyPair};

    use crate::keys::KeyFile;
    use crate::quorum::TierFile;

    fn key(seed: u8) -> KeyPair {
        KeyPair::from_private_key(&[seed; 32]).unwrap()
    }

    fn attest(seed: u8, kind: AttestationType) -> AttestationRecord {
        let k = key(seed);
        let payload = AttestationPayload::new(
            MilestoneId::new("ms-1").unwrap(),
            k.identity_handle(),
            kind,
            b"evidence",
            Timestamp::parse("2026-04-01T00:00:00Z").unwrap(),
        );
        sign_attestation(payload, &k).unwrap()
    }

    fn fixture(dir: &Path) {
        let records = vec![
            attest(1, AttestationType::InspectorVerification),
            attest(2, AttestationType::AuditorReview),
            attest(3, AttestationType::CitizenApproval),
            attest(4, AttestationType::CitizenApproval),
        ];
        crate::write_json(&dir.join("attestations.json"), &records).unwrap();
        let mut tiers = TierFile::new();
        tiers.insert(key(3).identity_handle(), AssuranceTier::Biometric);
        tiers.insert(key(4).identity_handle(), AssuranceTier::Biometric);
        crate::write_json(&dir.join("tiers.json"), &tiers).unwrap();
        crate::write_json(&dir.join("system.json"), &KeyFile::from_key_pair(&key(99))).unwrap();
    }

    fn issue_args(dir: &Path, citizens: f64) -> CertificateArgs {
        CertificateArgs {
            command: CertificateCommand::Issue {
                milestone: "ms-1".to_string(),
                project: "proj-1".to_string(),
                attestations: dir.join("attestations.json"),
                tiers: Some(dir.join("tiers.json")),
                requirement: RequirementArgs {
                    inspectors: 1,
                    auditors: 1,
                    citizens,
                },
                key: dir.join("system.json"),
                issued_at: Some("2026-04-02T00:00:00Z".to_string()),
                out: Some(dir.join("certificate.json")),
            },
        }
    }

    #[test]
    fn issue_then_verify() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let mut config = EngineConfig::default();
        config.certificate_version = "1.1".to_string();
        assert_eq!(run_certificate(&issue_args(dir.path(), 2.0), &config).unwrap(), 0);

        let cert: PaymentClearanceCertificate =
            crate::read_json(&dir.path().join("certificate.json")).unwrap();
        assert_eq!(cert.version, "1.1");
        assert_eq!(cert.quorum.citizen_count, 2);

        let good = key(99).public_key().to_hex();
        assert_eq!(cmd_verify(&dir.path().join("certificate.json"), &good).unwrap(), 0);
        let other = key(98).public_key().to_hex();
        assert_eq!(cmd_verify(&dir.path().join("certificate.json"), &other).unwrap(), 1);
    }

    #[test]
    fn tampered_file_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        run_certificate(&issue_args(dir.path(), 2.0), &EngineConfig::default()).unwrap();
        let path = dir.path().join("certificate.json");
        let mut cert: PaymentClearanceCertificate = crate::read_json(&path).unwrap();
        cert.project_id = ProjectId::new("proj-2").unwrap();
        crate::write_json(&path, &cert).unwrap();
        assert_eq!(cmd_verify(&path, &key(99).public_key().to_hex()).unwrap(), 1);
    }

    #[test]
    fn unmet_quorum_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fixture(dir.path());
        let err = run_certificate(&issue_args(dir.path(), 3.0), &EngineConfig::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("quorum not met"), "{err:#}");
        assert!(!dir.path().join("certificate.json").exists());
    }
}
