//! # pcc-vc — Verifiable Credentials
//!
//! Signed, typed assertions about actors, following the W3C Verifiable
//! Credentials data model:
//!
//! - **Credential structure** ([`VerifiableCredential`]) with a typed
//!   [`CredentialSubject`] union.
//! - **Ed25519 proofs** over the canonicalized credential body.
//! - **Verification** that never errors and reports every applicable issue.
//! - **Revocation** through an explicit [`RevocationRegistry`] keyed by the
//!   credential body digest.
//!
//! ## Security Invariants
//!
//! - The signing input is the JCS-canonical credential with `proof`
//!   removed. Its SHA-256 hex digest is what the issuer signs.
//! - The proof's verification method must be the one derived from the
//!   issuer handle; a proof naming any other key is rejected.

pub mod credential;
pub mod proof;
pub mod registry;
pub mod subject;

pub use credential::{
    issue_credential, verify_credential, CredentialIssue, IssueOptions, VerifiableCredential,
    VerificationReport, VerifyOptions, CREDENTIALS_CONTEXT_V1, VERIFIABLE_CREDENTIAL_TYPE,
};
pub use proof::{Proof, ProofPurpose, ProofType};
pub use registry::{RevocationEntry, RevocationRegistry};
pub use subject::{
    AuditorAccreditation, CredentialKind, CredentialSubject, DelegatedAuthority,
    NationalIdentityBinding, ProfessionalEngineerLicense,
};
