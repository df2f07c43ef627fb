//! # Credential Revocation Registry
//!
//! Credentials are immutable once issued, so revocation is recorded outside
//! them: an explicit set keyed by the SHA-256 hex of the credential body.
//! Entries are never removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use pcc_core::{PccError, StateTransitionError, Timestamp};

use crate::credential::VerifiableCredential;

/// A single revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevocationEntry {
    /// Body digest of the revoked credential.
    pub credential_digest: String,
    pub revoked_at: Timestamp,
    pub reason: String,
}

/// The revoked-set consulted by credential verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevocationRegistry {
    entries: BTreeMap<String, RevocationEntry>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a credential.
    ///
    /// # Errors
    ///
    /// - [`StateTransitionError::MissingReason`] for an empty reason.
    /// - [`StateTransitionError::InvalidTransition`] if already revoked.
    pub fn revoke(
        &mut self,
        credential: &VerifiableCredential,
        reason: &str,
        at: Timestamp,
    ) -> Result<&RevocationEntry, PccError> {
        let digest = credential.body_digest()?;
        self.revoke_digest(digest, reason, at)
    }

    /// Revoke by body digest, for callers that only hold the digest.
    pub fn revoke_digest(
        &mut self,
        digest: String,
        reason: &str,
        at: Timestamp,
    ) -> Result<&RevocationEntry, PccError> {
        if reason.trim().is_empty() {
            return Err(StateTransitionError::MissingReason {
                action: "credential revocation",
            }
            .into());
        }
        if self.entries.contains_key(&digest) {
            return Err(StateTransitionError::InvalidTransition {
                from: "revoked".to_string(),
                to: "revoked".to_string(),
                reason: format!("credential {digest} is already revoked"),
            }
            .into());
        }
        tracing::info!(credential_digest = %digest, %reason, "credential revoked");
        let entry = RevocationEntry {
            credential_digest: digest.clone(),
            revoked_at: at,
            reason: reason.to_string(),
        };
        Ok(self.entries.entry(digest).or_insert(entry))
    }

    /// The revocation entry for a body digest, if any.
    pub fn lookup_digest(&self, digest: &str) -> Option<&RevocationEntry> {
        self.entries.get(digest)
    }

    /// Whether `credential` has been revoked. A credential whose body cannot
    /// be digested is reported as not revoked; verification flags it
    /// separately.
    pub fn is_revoked(&self, credential: &VerifiableCredential) -> bool {
        credential
            .body_digest()
            .map(|d| self.entries.contains_key(&d))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by digest.
    pub fn entries(&self) -> impl Iterator<Item = &RevocationEntry> {
        self.entries.values()
    }
}
