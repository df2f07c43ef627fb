//! # pcc-core — Foundational Types for the Payment Clearance Engine
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate builds on: canonical bytes, digests,
//! identity handles, attestation records, engine configuration, and the
//! error taxonomy.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Every structured record that is hashed or
//!    signed flows through `CanonicalBytes::new()`. Two logically equal
//!    records produce identical bytes no matter how they were built.
//!
//! 2. **Identity handles are validated at construction.** An
//!    [`IdentityHandle`] can only exist if it decodes to a 32-byte Ed25519
//!    public key with the correct type tag. Every verification path resolves
//!    keys through it.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision so
//!    that signed bodies canonicalize identically across hosts.
//!
//! 4. **One error taxonomy.** [`PccError`] carries a stable [`ErrorCode`] for
//!    every failure class the engine can report.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pcc-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod attestation;
pub mod canonical;
pub mod config;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use attestation::{AssuranceTier, AttestationPayload, AttestationRecord, AttestationType};
pub use canonical::CanonicalBytes;
pub use config::{EngineConfig, TierWeights};
pub use digest::{sha256_bytes_hex, sha256_hex};
pub use error::{
    CanonicalizationError, ErrorCode, IdentityDefect, PccError, StateTransitionError,
    ValidationError,
};
pub use identity::{
    resolve_identity_handle, AssignmentId, IdentityHandle, MilestoneId, ProjectId,
    ResolvedIdentity, DID_KEY_PREFIX, ED25519_TYPE_TAG,
};
pub use temporal::Timestamp;
