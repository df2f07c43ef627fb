//! # Rotation Assignments
//!
//! An assignment records that a participant was drawn to attest a milestone
//! in a given rotation round. Its status moves through a validated state
//! machine:
//!
//! ```text
//! Assigned ──accept()──▶ Accepted ──complete()──▶ Completed
//!    │                      │
//!    └──recuse()────────────┴──recuse()──▶ Recused ──mark_replaced()──▶ Replaced
//! ```
//!
//! `declare_conflict()` flags the assignment and recuses it in one step.
//! `Completed` and `Replaced` are terminal.

use serde::{Deserialize, Serialize};

use pcc_core::{
    AssignmentId, IdentityHandle, MilestoneId, ProjectId, StateTransitionError, Timestamp,
};

/// What the participant was drawn to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Auditor,
    Citizen,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auditor => "auditor",
            Self::Citizen => "citizen",
        }
    }
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assignment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    Accepted,
    Completed,
    Recused,
    Replaced,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
            Self::Recused => "recused",
            Self::Replaced => "replaced",
        }
    }

    /// Whether no further transitions are allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Replaced)
    }

    /// Whether the assignment still occupies its (milestone, participant)
    /// slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Assigned | Self::Accepted | Self::Completed)
    }

    /// Valid target states from this state.
    pub fn valid_transitions(&self) -> &'static [AssignmentStatus] {
        match self {
            Self::Assigned => &[Self::Accepted, Self::Recused],
            Self::Accepted => &[Self::Completed, Self::Recused],
            Self::Recused => &[Self::Replaced],
            Self::Completed | Self::Replaced => &[],
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant's assignment to a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationAssignment {
    pub id: AssignmentId,
    pub milestone_id: MilestoneId,
    pub project_id: ProjectId,
    pub participant_id: IdentityHandle,
    pub role: ParticipantRole,
    /// 1-based round number, per milestone.
    pub rotation_round: u32,
    pub conflict_declared: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict_reason: Option<String>,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recusal_reason: Option<String>,
    /// The assignment that took over after recusal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_by: Option<AssignmentId>,
    pub assigned_at: Timestamp,
}

impl RotationAssignment {
    /// A fresh assignment in the `Assigned` state.
    pub fn new(
        milestone_id: MilestoneId,
        project_id: ProjectId,
        participant_id: IdentityHandle,
        role: ParticipantRole,
        rotation_round: u32,
        assigned_at: Timestamp,
    ) -> Self {
        Self {
            id: AssignmentId::new(),
            milestone_id,
            project_id,
            participant_id,
            role,
            rotation_round,
            conflict_declared: false,
            conflict_reason: None,
            status: AssignmentStatus::Assigned,
            recusal_reason: None,
            replaced_by: None,
            assigned_at,
        }
    }

    /// The participant accepts the assignment.
    pub fn accept(&mut self) -> Result<(), StateTransitionError> {
        self.transition(AssignmentStatus::Accepted)
    }

    /// The participant submitted their attestation.
    pub fn complete(&mut self) -> Result<(), StateTransitionError> {
        self.transition(AssignmentStatus::Completed)
    }

    /// The participant steps down.
    pub fn recuse(&mut self, reason: &str) -> Result<(), StateTransitionError> {
        if reason.trim().is_empty() {
            return Err(StateTransitionError::MissingReason { action: "recusal" });
        }
        self.transition(AssignmentStatus::Recused)?;
        self.recusal_reason = Some(reason.to_string());
        Ok(())
    }

    /// The participant declares a conflict of interest, which recuses them
    /// and excludes them from every later draw on this milestone.
    pub fn declare_conflict(&mut self, reason: &str) -> Result<(), StateTransitionError> {
        if reason.trim().is_empty() {
            return Err(StateTransitionError::MissingReason {
                action: "conflict declaration",
            });
        }
        self.transition(AssignmentStatus::Recused)?;
        self.conflict_declared = true;
        self.conflict_reason = Some(reason.to_string());
        self.recusal_reason = Some(format!("conflict of interest: {reason}"));
        Ok(())
    }

    /// A replacement has been drawn for this recused assignment.
    pub fn mark_replaced(&mut self, replacement: AssignmentId) -> Result<(), StateTransitionError> {
        self.transition(AssignmentStatus::Replaced)?;
        self.replaced_by = Some(replacement);
        Ok(())
    }

    fn transition(&mut self, target: AssignmentStatus) -> Result<(), StateTransitionError> {
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
        tracing::debug!(
            assignment = %self.id,
            from = %self.status,
            to = %target,
            "assignment transition"
        );
        self.status = target;
        Ok(())
    }
}
