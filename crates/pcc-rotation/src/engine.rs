//! # Selection Engine
//!
//! Draws participants for a milestone from an eligible pool. The pool is
//! filtered by the anti-collusion exclusions, shuffled with the supplied
//! CSPRNG, and taken in order. A candidate the store rejects as already
//! assigned is skipped in favour of the next one.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore};

use pcc_core::{
    AssignmentId, EngineConfig, IdentityHandle, MilestoneId, ProjectId, StateTransitionError,
    Timestamp,
};

use crate::assignment::{AssignmentStatus, ParticipantRole, RotationAssignment};
use crate::error::RotationError;
use crate::store::AssignmentStore;

/// A request to draw `count` participants for a milestone.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub milestone_id: &'a MilestoneId,
    pub project_id: &'a ProjectId,
    pub role: ParticipantRole,
    pub count: usize,
    /// Candidates to draw from. Duplicates are ignored.
    pub pool: &'a [IdentityHandle],
}

/// Anti-collusion selection over an [`AssignmentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationEngine {
    anti_collusion_window: u32,
}

impl Default for RotationEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl RotationEngine {
    /// An engine excluding participants from the project's last
    /// `anti_collusion_window` rounds.
    pub fn new(anti_collusion_window: u32) -> Self {
        Self {
            anti_collusion_window,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.anti_collusion_window)
    }

    pub fn anti_collusion_window(&self) -> u32 {
        self.anti_collusion_window
    }

    /// The pool members currently eligible for a `role` draw on the
    /// milestone, in pool order. The anti-collusion window looks back over
    /// the project's recent rounds for the same role only.
    pub fn eligible<S: AssignmentStore + ?Sized>(
        &self,
        store: &S,
        milestone_id: &MilestoneId,
        project_id: &ProjectId,
        role: ParticipantRole,
        pool: &[IdentityHandle],
    ) -> Result<Vec<IdentityHandle>, RotationError> {
        let mut excluded: BTreeSet<IdentityHandle> = BTreeSet::new();

        for a in store.milestone_assignments(milestone_id)? {
            if a.status.is_active() || a.conflict_declared {
                excluded.insert(a.participant_id);
            }
        }
        for a in store.recent_assignments(project_id, role, self.anti_collusion_window)? {
            excluded.insert(a.participant_id);
        }

        let mut seen = BTreeSet::new();
        Ok(pool
            .iter()
            .filter(|p| !excluded.contains(*p) && seen.insert(*p))
            .cloned()
            .collect())
    }

    /// Draw `request.count` participants and record their assignments in a
    /// new rotation round.
    ///
    /// # Errors
    ///
    /// - [`RotationError::EmptyRequest`] for a zero count.
    /// - [`RotationError::InsufficientCandidates`] when the eligible pool is
    ///   smaller than the request. Nothing is recorded in that case, unless
    ///   store conflicts exhausted the pool mid-draw; assignments recorded
    ///   before that point remain.
    pub fn select<S, R>(
        &self,
        store: &mut S,
        request: SelectionRequest<'_>,
        rng: &mut R,
        now: Timestamp,
    ) -> Result<Vec<RotationAssignment>, RotationError>
    where
        S: AssignmentStore + ?Sized,
        R: RngCore + CryptoRng,
    {
        if request.count == 0 {
            return Err(RotationError::EmptyRequest);
        }

        let mut eligible = self.eligible(
            &*store,
            request.milestone_id,
            request.project_id,
            request.role,
            request.pool,
        )?;
        if eligible.len() < request.count {
            tracing::warn!(
                milestone_id = %request.milestone_id,
                requested = request.count,
                eligible = eligible.len(),
                "not enough eligible candidates"
            );
            return Err(RotationError::InsufficientCandidates {
                requested: request.count,
                eligible: eligible.len(),
            });
        }

        let round = store.max_rotation_round(request.milestone_id)? + 1;
        eligible.shuffle(rng);

        let mut selected = Vec::with_capacity(request.count);
        for candidate in eligible {
            if selected.len() == request.count {
                break;
            }
            let assignment = RotationAssignment::new(
                request.milestone_id.clone(),
                request.project_id.clone(),
                candidate,
                request.role,
                round,
                now,
            );
            match store.record_assignment(assignment.clone()) {
                Ok(()) => selected.push(assignment),
                Err(RotationError::Conflict { participant_id, .. }) => {
                    tracing::debug!(%participant_id, "candidate taken concurrently; drawing next");
                }
                Err(e) => return Err(e),
            }
        }

        if selected.len() < request.count {
            return Err(RotationError::InsufficientCandidates {
                requested: request.count,
                eligible: selected.len(),
            });
        }

        tracing::info!(
            milestone_id = %request.milestone_id,
            project_id = %request.project_id,
            role = %request.role,
            round,
            count = selected.len(),
            "rotation round selected"
        );
        Ok(selected)
    }

    /// Draw a replacement for a recused assignment and mark the recused one
    /// replaced. The replacement opens a new round and is never the recused
    /// participant.
    ///
    /// # Errors
    ///
    /// - [`RotationError::NotFound`] if `recused_id` is not on `milestone_id`.
    /// - [`RotationError::StateTransition`] if it is not recused.
    /// - Any selection error.
    pub fn replace_recused<S, R>(
        &self,
        store: &mut S,
        milestone_id: &MilestoneId,
        recused_id: AssignmentId,
        pool: &[IdentityHandle],
        rng: &mut R,
        now: Timestamp,
    ) -> Result<RotationAssignment, RotationError>
    where
        S: AssignmentStore + ?Sized,
        R: RngCore + CryptoRng,
    {
        let mut recused = store
            .milestone_assignments(milestone_id)?
            .into_iter()
            .find(|a| a.id == recused_id)
            .ok_or(RotationError::NotFound(recused_id))?;
        if recused.status != AssignmentStatus::Recused {
            return Err(StateTransitionError::InvalidTransition {
                from: recused.status.as_str().to_string(),
                to: AssignmentStatus::Replaced.as_str().to_string(),
                reason: "only recused assignments can be replaced".to_string(),
            }
            .into());
        }

        let project_id = recused.project_id.clone();
        let candidates: Vec<IdentityHandle> = pool
            .iter()
            .filter(|p| **p != recused.participant_id)
            .cloned()
            .collect();
        let request = SelectionRequest {
            milestone_id,
            project_id: &project_id,
            role: recused.role,
            count: 1,
            pool: &candidates,
        };
        let mut drawn = self.select(store, request, rng, now)?;
        let replacement = drawn.pop().ok_or(RotationError::InsufficientCandidates {
            requested: 1,
            eligible: 0,
        })?;

        recused.mark_replaced(replacement.id)?;
        store.update_assignment(&recused)?;
        Ok(replacement)
    }
}
