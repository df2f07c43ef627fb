//! # Attestation Chain Hash
//!
//! Records are sorted by `(milestoneId, actorId, type)`, then by
//! `(evidenceHash, digitalSignature)` so that duplicate keys still order
//! deterministically. Each record contributes its evidence hash followed by
//! its signature; the concatenation is hashed with SHA-256.

use std::cmp::Ordering;

use pcc_core::{sha256_bytes_hex, AttestationRecord};

/// SHA-256 of the empty string: the chain hash of no attestations.
pub const EMPTY_CHAIN_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// The total order records take inside a chain.
pub fn chain_order(a: &AttestationRecord, b: &AttestationRecord) -> Ordering {
    a.chain_order_key()
        .cmp(&b.chain_order_key())
        .then_with(|| a.evidence_hash.cmp(&b.evidence_hash))
        .then_with(|| a.digital_signature.cmp(&b.digital_signature))
}

/// Hash a set of attestations. Permutation-invariant.
pub fn hash_attestation_chain(records: &[AttestationRecord]) -> String {
    let mut ordered: Vec<&AttestationRecord> = records.iter().collect();
    ordered.sort_by(|a, b| chain_order(a, b));

    let mut concatenated = String::with_capacity(ordered.len() * (64 + 128));
    for record in ordered {
        concatenated.push_str(&record.evidence_hash);
        concatenated.push_str(&record.digital_signature);
    }
    sha256_bytes_hex(concatenated.as_bytes())
}
