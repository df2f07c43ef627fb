//! # Credential Subcommand
//!
//! - `issue`: Sign a credential subject with an issuer key file.
//! - `verify`: Print the verification report; exit 0 only when valid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use pcc_vc::{
    issue_credential, verify_credential, CredentialSubject, IssueOptions, RevocationRegistry,
    VerifiableCredential, VerificationReport, VerifyOptions,
};

use crate::keys::load_key;

/// Arguments for `pcc credential`.
#[derive(Args, Debug)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommand,
}

#[derive(Subcommand, Debug)]
pub enum CredentialCommand {
    /// Issue a credential.
    Issue {
        /// Credential subject JSON, tagged by `kind`.
        #[arg(long)]
        subject: PathBuf,

        /// Issuer key file. The issuer is the key's identity handle.
        #[arg(long)]
        key: PathBuf,

        /// Expiration (RFC 3339, UTC).
        #[arg(long)]
        expires: Option<String>,

        /// Issuance time. Defaults to now.
        #[arg(long)]
        issued_at: Option<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Verify a credential.
    Verify {
        /// Credential JSON file.
        credential: PathBuf,

        /// Judge expiration at this instant instead of now.
        #[arg(long)]
        at: Option<String>,

        /// Do not report expiration.
        #[arg(long)]
        skip_expiration: bool,

        /// Revocation registry JSON file.
        #[arg(long)]
        revocations: Option<PathBuf>,
    },
}

pub fn run_credential(args: &CredentialArgs) -> Result<u8> {
    match &args.command {
        CredentialCommand::Issue {
            subject,
            key,
            expires,
            issued_at,
            out,
        } => {
            let subject: CredentialSubject = crate::read_json(subject)?;
            let issuer_key = load_key(key)?;
            let options = IssueOptions {
                issued_at: Some(crate::timestamp_or_now(issued_at.as_deref())?),
                expiration_date: expires
                    .as_deref()
                    .map(|s| crate::timestamp_or_now(Some(s)))
                    .transpose()?,
            };
            let credential = issue_credential(
                subject,
                &issuer_key.identity_handle(),
                &issuer_key,
                options,
            )
            .context("credential issuance failed")?;
            crate::emit_json(out.as_deref(), &credential)?;
            Ok(0)
        }
        CredentialCommand::Verify {
            credential,
            at,
            skip_expiration,
            revocations,
        } => {
            let credential: VerifiableCredential = crate::read_json(credential)?;
            let registry: Option<RevocationRegistry> = match revocations {
                Some(path) => Some(crate::read_json(path)?),
                None => None,
            };
            let report = verify(&credential, at.as_deref(), *skip_expiration, registry.as_ref())?;
            crate::emit_json(None, &report)?;
            Ok(if report.valid { 0 } else { 1 })
        }
    }
}

fn verify(
    credential: &VerifiableCredential,
    at: Option<&str>,
    skip_expiration: bool,
    registry: Option<&RevocationRegistry>,
) -> Result<VerificationReport> {
    let mut options = VerifyOptions::at(crate::timestamp_or_now(at)?);
    options.check_expiration = !skip_expiration;
    options.revocations = registry;
    Ok(verify_credential(credential, options))
}
