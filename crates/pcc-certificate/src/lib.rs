//! # pcc-certificate — Payment Clearance Certificates
//!
//! A Payment Clearance Certificate is the signed artifact a treasury system
//! accepts as proof that a milestone reached quorum. It embeds the
//! attestations it was built from, their chain hash, and the per-channel
//! counts, so a verifier can re-derive everything from the certificate and
//! the system public key alone.
//!
//! - [`generate_certificate()`] builds and signs a certificate.
//! - [`certify_milestone()`] does the same after confirming quorum.
//! - [`verify_certificate()`] recomputes the body hash, the chain hash, and
//!   the counts before checking the signature.
//! - [`CertificateRecord`] tracks delivery status outside the signed body.
//! - [`IssuanceGuard`] refuses a second certificate for a milestone.

pub mod certificate;
pub mod guard;
pub mod lifecycle;

pub use certificate::{
    certify_milestone, generate_certificate, verify_certificate, CertificateRequest,
    PaymentClearanceCertificate, QuorumCounts, DEFAULT_CERTIFICATE_VERSION,
};
pub use guard::IssuanceGuard;
pub use lifecycle::{CertificateRecord, CertificateStatus, StatusChange};
