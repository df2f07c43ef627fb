//! # Assignment History Store
//!
//! The selection engine's only collaborator with state. Writes take
//! `&mut self`, so one selection call is one unit of work against the
//! store. A store must reject a second active assignment for the same
//! (milestone, participant) pair with [`RotationError::Conflict`].

use std::collections::BTreeMap;

use pcc_core::{MilestoneId, ProjectId};

use crate::assignment::{ParticipantRole, RotationAssignment};
use crate::error::RotationError;

pub trait AssignmentStore {
    /// Highest rotation round recorded for a milestone; 0 if none.
    fn max_rotation_round(&self, milestone_id: &MilestoneId) -> Result<u32, RotationError>;

    /// Every assignment on a milestone, in any status.
    fn milestone_assignments(
        &self,
        milestone_id: &MilestoneId,
    ) -> Result<Vec<RotationAssignment>, RotationError>;

    /// Assignments from the project's most recent `last_n_rounds` rotation
    /// rounds for `role`, across all of its milestones. Rounds drawn for
    /// another role do not count toward the window.
    fn recent_assignments(
        &self,
        project_id: &ProjectId,
        role: ParticipantRole,
        last_n_rounds: u32,
    ) -> Result<Vec<RotationAssignment>, RotationError>;

    /// Persist a new assignment.
    fn record_assignment(&mut self, assignment: RotationAssignment) -> Result<(), RotationError>;

    /// Overwrite an existing assignment after a status transition.
    fn update_assignment(&mut self, assignment: &RotationAssignment) -> Result<(), RotationError>;
}

/// A `Vec`-backed store for tests, the CLI, and single-process embedding.
///
/// A project's rotation rounds for a role are the distinct
/// `(milestone, round)` pairs recorded on it for that role, ordered by the
/// latest `assignedAt` in each pair.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentStore {
    assignments: Vec<RotationAssignment>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing history. Records are taken as-is.
    pub fn from_assignments(assignments: Vec<RotationAssignment>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[RotationAssignment] {
        &self.assignments
    }

    pub fn into_assignments(self) -> Vec<RotationAssignment> {
        self.assignments
    }
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn max_rotation_round(&self, milestone_id: &MilestoneId) -> Result<u32, RotationError> {
        Ok(self
            .assignments
            .iter()
            .filter(|a| &a.milestone_id == milestone_id)
            .map(|a| a.rotation_round)
            .max()
            .unwrap_or(0))
    }

    fn milestone_assignments(
        &self,
        milestone_id: &MilestoneId,
    ) -> Result<Vec<RotationAssignment>, RotationError> {
        Ok(self
            .assignments
            .iter()
            .filter(|a| &a.milestone_id == milestone_id)
            .cloned()
            .collect())
    }

    fn recent_assignments(
        &self,
        project_id: &ProjectId,
        role: ParticipantRole,
        last_n_rounds: u32,
    ) -> Result<Vec<RotationAssignment>, RotationError> {
        let in_scope = |a: &&RotationAssignment| &a.project_id == project_id && a.role == role;
        let mut rounds: BTreeMap<(&MilestoneId, u32), pcc_core::Timestamp> = BTreeMap::new();
        for a in self.assignments.iter().filter(in_scope) {
            let latest = rounds
                .entry((&a.milestone_id, a.rotation_round))
                .or_insert(a.assigned_at);
            if a.assigned_at > *latest {
                *latest = a.assigned_at;
            }
        }

        let mut ordered: Vec<_> = rounds.into_iter().collect();
        ordered.sort_by(|(ka, ta), (kb, tb)| tb.cmp(ta).then_with(|| kb.cmp(ka)));
        let window: Vec<(MilestoneId, u32)> = ordered
            .into_iter()
            .take(last_n_rounds as usize)
            .map(|((m, r), _)| (m.clone(), r))
            .collect();

        Ok(self
            .assignments
            .iter()
            .filter(in_scope)
            .filter(|a| {
                window
                    .iter()
                    .any(|(m, r)| m == &a.milestone_id && *r == a.rotation_round)
            })
            .cloned()
            .collect())
    }

    fn record_assignment(&mut self, assignment: RotationAssignment) -> Result<(), RotationError> {
        let taken = self.assignments.iter().any(|a| {
            a.milestone_id == assignment.milestone_id
                && a.participant_id == assignment.participant_id
                && a.status.is_active()
        });
        if taken {
            return Err(RotationError::Conflict {
                milestone_id: assignment.milestone_id.to_string(),
                participant_id: assignment.participant_id.to_string(),
            });
        }
        self.assignments.push(assignment);
        Ok(())
    }

    fn update_assignment(&mut self, assignment: &RotationAssignment) -> Result<(), RotationError> {
        let slot = self
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment.id)
            .ok_or(RotationError::NotFound(assignment.id))?;
        *slot = assignment.clone();
        Ok(())
    }
}
