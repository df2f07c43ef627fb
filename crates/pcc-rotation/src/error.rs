//! Rotation errors.

use pcc_core::{AssignmentId, StateTransitionError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RotationError {
    /// The eligible pool is smaller than the requested selection.
    #[error("insufficient candidates: requested {requested}, eligible {eligible}")]
    InsufficientCandidates { requested: usize, eligible: usize },

    /// The store already holds an active assignment for this pair.
    #[error("participant {participant_id} already has an active assignment on milestone {milestone_id}")]
    Conflict {
        milestone_id: String,
        participant_id: String,
    },

    #[error("assignment {0} not found")]
    NotFound(AssignmentId),

    /// A selection of zero participants was requested.
    #[error("selection count must be at least 1")]
    EmptyRequest,

    #[error(transparent)]
    StateTransition(#[from] StateTransitionError),

    /// Backend failure reported by an assignment store.
    #[error("assignment store error: {0}")]
    Store(String),
}
