//! # pcc-cli — Command-Line Tool for the Payment Clearance Engine
//!
//! Provides the `pcc` command-line interface over the engine crates.
//!
//! ## Subcommands
//!
//! - `pcc keygen`: Generate an Ed25519 key file.
//! - `pcc did`: Derive and resolve identity handles.
//! - `pcc quorum`: Evaluate a milestone's quorum.
//! - `pcc rotation`: Draw auditors or citizens for a milestone.
//! - `pcc certificate`: Issue and verify Payment Clearance Certificates.
//! - `pcc credential`: Issue and verify credentials.
//!
//! Inputs and outputs are camelCase JSON, the same shape the engine
//! persists. Engine configuration is YAML, loaded with `--config`.

pub mod certificate;
pub mod credential;
pub mod keys;
pub mod quorum;
pub mod rotation;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use pcc_core::{EngineConfig, Timestamp};

/// Load the engine configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        None => EngineConfig::default(),
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
    };
    config.validate().context("invalid engine configuration")?;
    tracing::debug!(
        anti_collusion_window = config.anti_collusion_window,
        certificate_version = %config.certificate_version,
        "engine configuration loaded"
    );
    Ok(config)
}

/// Read and deserialize a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Like [`read_json`], but a missing file yields the default value.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if path.exists() {
        read_json(path)
    } else {
        Ok(T::default())
    }
}

/// Write pretty JSON to `path`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Write pretty JSON to `out`, or print it when no path is given.
pub fn emit_json<T: Serialize + ?Sized>(out: Option<&Path>, value: &T) -> Result<()> {
    match out {
        Some(path) => write_json(path, value),
        None => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}

/// Parse an optional `--at`-style argument, defaulting to now.
pub fn timestamp_or_now(value: Option<&str>) -> Result<Timestamp> {
    match value {
        Some(s) => Timestamp::parse(s).with_context(|| format!("invalid timestamp: {s}")),
        None => Ok(Timestamp::now()),
    }
}
