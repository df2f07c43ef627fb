//! # Certificate Lifecycle
//!
//! Delivery status lives outside the signed body, so moving a certificate
//! through its lifecycle never invalidates its signature.
//!
//! ```text
//! Issued ──deliver_to_tgr()──▶ DeliveredToTgr ──acknowledge()──▶ Acknowledged
//!    │                              │
//!    └──revoke(reason)──────────────┴──revoke(reason)──▶ Revoked
//! ```
//!
//! `Acknowledged` and `Revoked` are terminal. Every transition is appended
//! to the record's history.

use serde::{Deserialize, Serialize};

use pcc_core::{MilestoneId, StateTransitionError, Timestamp};

use crate::certificate::PaymentClearanceCertificate;

/// External status of an issued certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Issued,
    /// Handed to the treasury gateway for payment release.
    DeliveredToTgr,
    Acknowledged,
    Revoked,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::DeliveredToTgr => "delivered_to_tgr",
            Self::Acknowledged => "acknowledged",
            Self::Revoked => "revoked",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::Revoked)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [CertificateStatus] {
        match self {
            Self::Issued => &[Self::DeliveredToTgr, Self::Revoked],
            Self::DeliveredToTgr => &[Self::Acknowledged, Self::Revoked],
            Self::Acknowledged | Self::Revoked => &[],
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: CertificateStatus,
    pub to: CertificateStatus,
    pub at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A certificate together with its delivery status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    pub certificate: PaymentClearanceCertificate,
    pub status: CertificateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<String>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl CertificateRecord {
    /// Track a freshly issued certificate.
    pub fn new(certificate: PaymentClearanceCertificate) -> Self {
        Self {
            certificate,
            status: CertificateStatus::Issued,
            revocation_reason: None,
            history: Vec::new(),
        }
    }

    pub fn milestone_id(&self) -> &MilestoneId {
        &self.certificate.milestone_id
    }

    pub fn deliver_to_tgr(&mut self, at: Timestamp) -> Result<(), StateTransitionError> {
        self.transition(CertificateStatus::DeliveredToTgr, at, None)
    }

    pub fn acknowledge(&mut self, at: Timestamp) -> Result<(), StateTransitionError> {
        self.transition(CertificateStatus::Acknowledged, at, None)
    }

    /// Revoke the certificate.
    ///
    /// # Errors
    ///
    /// [`StateTransitionError::MissingReason`] for an empty reason;
    /// [`StateTransitionError::InvalidTransition`] from a terminal status.
    pub fn revoke(&mut self, reason: &str, at: Timestamp) -> Result<(), StateTransitionError> {
        if reason.trim().is_empty() {
            return Err(StateTransitionError::MissingReason {
                action: "certificate revocation",
            });
        }
        self.transition(CertificateStatus::Revoked, at, Some(reason.to_string()))?;
        self.revocation_reason = Some(reason.to_string());
        Ok(())
    }

    fn transition(
        &mut self,
        target: CertificateStatus,
        at: Timestamp,
        reason: Option<String>,
    ) -> Result<(), StateTransitionError> {
        if !self.status.valid_transitions().contains(&target) {
            let reason = if self.status.is_terminal() {
                format!("{} is a terminal status", self.status)
            } else {
                format!("{} may only move to {:?}", self.status, self.status.valid_transitions())
            };
            return Err(StateTransitionError::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: target.as_str().to_string(),
                reason,
            });
        }
        tracing::info!(
            milestone_id = %self.certificate.milestone_id,
            from = %self.status,
            to = %target,
            "certificate status changed"
        );
        self.history.push(StatusChange {
            from: self.status,
            to: target,
            at,
            reason,
        });
        self.status = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::{generate_certificate, CertificateRequest};
    use pcc_core::ProjectId;
    use pcc_crypto::KeyPair;

    fn at(day: u32) -> Timestamp {
        Timestamp::parse(&format!("2026-06-{day:02}T08:00:00Z")).unwrap()
    }

    fn record() -> CertificateRecord {
        let request = CertificateRequest::new(
            MilestoneId::new("ms-1").unwrap(),
            ProjectId::new("proj-1").unwrap(),
            &[],
        )
        .issued_at(at(1));
        let key = KeyPair::from_private_key(&[9u8; 32]).unwrap();
        CertificateRecord::new(generate_certificate(&request, &key).unwrap())
    }

    #[test]
    fn delivery_then_acknowledgement() {
        let mut r = record();
        assert_eq!(r.status, CertificateStatus::Issued);
        r.deliver_to_tgr(at(2)).unwrap();
        r.acknowledge(at(3)).unwrap();
        assert_eq!(r.status, CertificateStatus::Acknowledged);
        assert!(r.status.is_terminal());
        assert_eq!(r.history.len(), 2);
        assert_eq!(r.history[1].from, CertificateStatus::DeliveredToTgr);
        assert!(r.revoke("too late", at(4)).is_err());
    }

    #[test]
    fn revocation_from_each_non_terminal_state() {
        let mut r = record();
        r.revoke("evidence fabricated", at(2)).unwrap();
        assert_eq!(r.status, CertificateStatus::Revoked);
        assert_eq!(r.revocation_reason.as_deref(), Some("evidence fabricated"));
        assert_eq!(r.history[0].reason.as_deref(), Some("evidence fabricated"));

        let mut r = record();
        r.deliver_to_tgr(at(2)).unwrap();
        r.revoke("payment halted", at(3)).unwrap();
        assert!(matches!(
            r.deliver_to_tgr(at(4)),
            Err(StateTransitionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn revocation_needs_a_reason() {
        let mut r = record();
        assert!(matches!(
            r.revoke("", at(2)),
            Err(StateTransitionError::MissingReason { .. })
        ));
        assert_eq!(r.status, CertificateStatus::Issued);
        assert!(r.history.is_empty());
    }

    #[test]
    fn cannot_skip_delivery() {
        let mut r = record();
        let err = r.acknowledge(at(2)).unwrap_err();
        assert!(matches!(err, StateTransitionError::InvalidTransition { ref from, ref to, .. }
            if from == "issued" && to == "acknowledged"));
    }

    #[test]
    fn status_wire_names() {
        let json = serde_json::to_string(&CertificateStatus::DeliveredToTgr).unwrap();
        assert_eq!(json, "\"delivered_to_tgr\"");
        let r = record();
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["status"], "issued");
        assert!(value.get("revocationReason").is_none());
        let back: CertificateRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, r);
    }
}
