//! # pcc-crypto — Signing Primitives
//!
//! Ed25519 key pairs, raw and canonical signing, and verification for every
//! signed artifact in the engine:
//!
//! - **Key material**: generation from the OS CSPRNG and derivation from a
//!   stored 32-byte private key.
//! - **Signatures**: hex-encoded 64-byte Ed25519 signatures. Verification
//!   returns `bool` and never errors; malformed keys or signatures simply
//!   fail to verify.
//! - **Attestations**: signing an [`AttestationPayload`](pcc_core::AttestationPayload)
//!   into a record and checking a record against its actor's handle.
//!
//! ## Crate Policy
//!
//! - Depends only on `pcc-core` internally.
//! - Private keys are never serialized, logged, or printed.
//! - No mocking of cryptographic operations in tests.

pub mod attestation;
pub mod ed25519;
mod hex;

pub use attestation::{sign_attestation, verify_attestation};
pub use ed25519::{
    create_identity_handle, derive_from_private_key, generate_key_pair, sign, verify,
    verify_hex, Ed25519PublicKey, Ed25519Signature, KeyPair,
};
