//! # Key and Identity Subcommands
//!
//! - `keygen`: Write a fresh Ed25519 key file.
//! - `did from-key`: Derive the identity handle for a hex public key.
//! - `did resolve`: Resolve a handle into its key and verification method.
//!
//! Key files are JSON: `{ "did", "publicKey", "privateKey" }`, hex keys.
//! The private key is never logged.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};

use pcc_core::{resolve_identity_handle, IdentityHandle};
use pcc_crypto::{create_identity_handle, generate_key_pair, Ed25519PublicKey, KeyPair};

/// On-disk form of a key pair.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    pub did: IdentityHandle,
    pub public_key: Ed25519PublicKey,
    pub private_key: String,
}

impl KeyFile {
    pub fn from_key_pair(key: &KeyPair) -> Self {
        Self {
            did: key.identity_handle(),
            public_key: key.public_key(),
            private_key: key.private_key_hex().to_string(),
        }
    }
}

/// Load a key pair from a key file, checking that its parts agree.
pub fn load_key(path: &Path) -> Result<KeyPair> {
    let file: KeyFile = crate::read_json(path)?;
    let key = KeyPair::from_private_key_hex(&file.private_key)
        .with_context(|| format!("invalid private key in {}", path.display()))?;
    if key.public_key() != file.public_key || key.identity_handle() != file.did {
        bail!(
            "key file {} is inconsistent: private key does not match its public key or did",
            path.display()
        );
    }
    tracing::debug!(did = %file.did, "key loaded");
    Ok(key)
}

/// Arguments for `pcc keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key file. Printed to stdout when omitted.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    if let Some(out) = &args.out {
        if out.exists() && !args.force {
            bail!("key file already exists: {} (use --force to overwrite)", out.display());
        }
    }
    let key = generate_key_pair().context("key generation failed")?;
    let file = KeyFile::from_key_pair(&key);
    tracing::info!(did = %file.did, "key pair generated");
    match &args.out {
        Some(out) => {
            crate::write_json(out, &file)?;
            println!("{}", file.did);
        }
        None => crate::emit_json(None, &file)?,
    }
    Ok(0)
}

/// Arguments for `pcc did`.
#[derive(Args, Debug)]
pub struct DidArgs {
    #[command(subcommand)]
    pub command: DidCommand,
}

#[derive(Subcommand, Debug)]
pub enum DidCommand {
    /// Derive the identity handle for a public key.
    FromKey {
        /// 32-byte Ed25519 public key, hex.
        #[arg(long)]
        public_key: String,
    },

    /// Resolve an identity handle.
    Resolve {
        /// The `did:key:z...` handle.
        handle: String,
    },
}

/// Output of `pcc did resolve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOutput {
    pub did: String,
    pub public_key: Ed25519PublicKey,
    pub verification_method_id: String,
}

pub fn resolve(handle: &str) -> Result<ResolvedOutput> {
    let resolved = resolve_identity_handle(handle)?;
    Ok(ResolvedOutput {
        did: handle.to_string(),
        public_key: Ed25519PublicKey(resolved.public_key),
        verification_method_id: resolved.verification_method_id,
    })
}

pub fn run_did(args: &DidArgs) -> Result<u8> {
    match &args.command {
        DidCommand::FromKey { public_key } => {
            let key = Ed25519PublicKey::from_hex(public_key).context("invalid public key")?;
            println!("{}", create_identity_handle(key.as_bytes())?);
            Ok(0)
        }
        DidCommand::Resolve { handle } => {
            crate::emit_json(None, &resolve(handle)?)?;
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_writes_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("system.key.json");
        let args = KeygenArgs {
            out: Some(path.clone()),
            force: false,
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);
        let key = load_key(&path).unwrap();
        let file: KeyFile = crate::read_json(&path).unwrap();
        assert_eq!(key.identity_handle(), file.did);

        assert!(run_keygen(&args).is_err());
        let forced = KeygenArgs {
            out: Some(path.clone()),
            force: true,
        };
        assert_eq!(run_keygen(&forced).unwrap(), 0);
        assert_ne!(load_key(&path).unwrap().public_key(), key.public_key());
    }

    #[test]
    fn inconsistent_key_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("k.json");
        let a = KeyPair::from_private_key(&[1u8; 32]).unwrap();
        let b = KeyPair::from_private_key(&[2u8; 32]).unwrap();
        let mut file = KeyFile::from_key_pair(&a);
        file.public_key = b.public_key();
        crate::write_json(&path, &file).unwrap();
        assert!(load_key(&path).is_err());
    }

    #[test]
    fn resolve_round_trips_the_key() {
        let key = KeyPair::from_private_key(&[3u8; 32]).unwrap();
        let handle = key.identity_handle();
        let out = resolve(handle.as_str()).unwrap();
        assert_eq!(out.public_key, key.public_key());
        assert_eq!(out.verification_method_id, handle.verification_method_id());
        assert!(resolve("did:web:example.org").is_err());
    }

    #[test]
    fn from_key_rejects_short_keys() {
        let args = DidArgs {
            command: DidCommand::FromKey {
                public_key: "abcd".to_string(),
            },
        };
        assert!(run_did(&args).is_err());
    }
}
