//! # pcc CLI entry point
//!
//! Parses command-line arguments, installs logging, loads the engine
//! configuration, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pcc_cli::certificate::{run_certificate, CertificateArgs};
use pcc_cli::credential::{run_credential, CredentialArgs};
use pcc_cli::keys::{run_did, run_keygen, DidArgs, KeygenArgs};
use pcc_cli::quorum::{run_quorum, QuorumArgs};
use pcc_cli::rotation::{run_rotation, RotationArgs};

/// Payment Clearance engine CLI.
///
/// Identity handles, attestation quorum, rotation draws, and signed
/// Payment Clearance Certificates for public-works milestones.
#[derive(Parser, Debug)]
#[command(name = "pcc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to the engine configuration (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key file.
    Keygen(KeygenArgs),

    /// Derive and resolve identity handles.
    Did(DidArgs),

    /// Evaluate milestone quorum.
    Quorum(QuorumArgs),

    /// Draw auditors or citizens for a milestone.
    Rotation(RotationArgs),

    /// Issue and verify Payment Clearance Certificates.
    Certificate(CertificateArgs),

    /// Issue and verify credentials.
    Credential(CredentialArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match pcc_cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args),
        Commands::Did(args) => run_did(args),
        Commands::Quorum(args) => run_quorum(args, &config),
        Commands::Rotation(args) => run_rotation(args, &config),
        Commands::Certificate(args) => run_certificate(args, &config),
        Commands::Credential(args) => run_credential(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcc_cli::certificate::CertificateCommand;
    use pcc_cli::quorum::QuorumCommand;
    use pcc_cli::rotation::{RoleArg, RotationCommand};

    #[test]
    fn cli_parse_keygen() {
        let cli = Cli::try_parse_from(["pcc", "keygen", "--out", "k.json"]).unwrap();
        if let Commands::Keygen(args) = cli.command {
            assert_eq!(args.out, Some(PathBuf::from("k.json")));
            assert!(!args.force);
        } else {
            panic!("expected keygen");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "pcc",
            "did",
            "resolve",
            "did:key:z6Mk",
            "-vv",
            "--config",
            "engine.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("engine.yaml")));
        assert!(!cli.log_json);
    }

    #[test]
    fn cli_parse_quorum_evaluate() {
        let cli = Cli::try_parse_from([
            "pcc",
            "quorum",
            "evaluate",
            "--milestone",
            "ms-1",
            "--attestations",
            "a.json",
            "--inspectors",
            "1",
            "--auditors",
            "2",
            "--citizens",
            "2.5",
        ])
        .unwrap();
        let Commands::Quorum(args) = cli.command else {
            panic!("expected quorum");
        };
        let QuorumCommand::Evaluate {
            requirement, tiers, ..
        } = args.command;
        assert_eq!(requirement.auditors, 2);
        assert_eq!(requirement.citizens, 2.5);
        assert!(tiers.is_none());
    }

    #[test]
    fn cli_parse_rotation_select() {
        let cli = Cli::try_parse_from([
            "pcc",
            "rotation",
            "select",
            "--milestone",
            "ms-1",
            "--project",
            "p",
            "--role",
            "citizen",
            "--count",
            "3",
            "--pool",
            "pool.json",
            "--history",
            "h.json",
        ])
        .unwrap();
        let Commands::Rotation(args) = cli.command else {
            panic!("expected rotation");
        };
        let RotationCommand::Select { role, count, .. } = args.command;
        assert_eq!(role, RoleArg::Citizen);
        assert_eq!(count, 3);
    }

    #[test]
    fn cli_rotation_has_no_seed_flag() {
        assert!(Cli::try_parse_from([
            "pcc",
            "rotation",
            "select",
            "--milestone",
            "ms-1",
            "--project",
            "p",
            "--role",
            "auditor",
            "--count",
            "1",
            "--pool",
            "pool.json",
            "--history",
            "h.json",
            "--seed",
            "42",
        ])
        .is_err());
    }

    #[test]
    fn cli_parse_certificate_verify() {
        let cli = Cli::try_parse_from([
            "pcc",
            "certificate",
            "verify",
            "cert.json",
            "--public-key",
            "ab",
        ])
        .unwrap();
        let Commands::Certificate(args) = cli.command else {
            panic!("expected certificate");
        };
        assert!(matches!(
            args.command,
            CertificateCommand::Verify { ref public_key, .. } if public_key == "ab"
        ));
    }

    #[test]
    fn cli_rejects_missing_requirement() {
        assert!(Cli::try_parse_from([
            "pcc",
            "quorum",
            "evaluate",
            "--milestone",
            "ms-1",
            "--attestations",
            "a.json",
        ])
        .is_err());
    }
}
