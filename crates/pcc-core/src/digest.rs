//! # Content Digests
//!
//! SHA-256 digests over [`CanonicalBytes`] for structured records, and over
//! raw bytes for opaque evidence blobs (photos, survey files, scanned
//! reports) whose bytes are already fixed by the submitter.
//!
//! ## Security Invariant
//!
//! Structured records can only be digested through `CanonicalBytes`; the
//! raw-bytes entry point [`sha256_bytes_hex()`] exists for evidence content
//! and for chain concatenations that are built from hex strings, never for
//! serialized records.

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// Lowercase hex SHA-256 of a record's canonical bytes.
pub fn sha256_hex(data: &CanonicalBytes) -> String {
    hex_digest(data.as_bytes())
}

/// Lowercase hex SHA-256 over raw bytes.
///
/// This is the evidence-hash path: the input is the submitted evidence file
/// exactly as received. Do not pass serialized records here; use
/// [`sha256_hex()`] with `CanonicalBytes` instead.
pub fn sha256_bytes_hex(data: &[u8]) -> String {
    hex_digest(data)
}

fn hex_digest(data: &[u8]) -> String {
    Sha256::digest(data).iter().map(|b| format!("{b:02x}")).collect()
}
