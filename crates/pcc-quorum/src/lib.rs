//! # pcc-quorum — Chain Hash and Quorum Engine
//!
//! - [`hash_attestation_chain()`] binds a set of attestations into one
//!   order-independent digest.
//! - [`evaluate_quorum()`] decides, from the non-revoked attestations of a
//!   milestone, whether every channel (inspector, auditor, weighted
//!   citizen) has met its requirement. The breakdown is derived on every
//!   call and never cached.

pub mod chain;
pub mod quorum;

pub use chain::{chain_order, hash_attestation_chain, EMPTY_CHAIN_HASH};
pub use quorum::{
    evaluate_quorum, AttestationStore, ChannelTally, CitizenTally, QuorumBreakdown, QuorumEngine,
    QuorumRequirement, TierLookup,
};
