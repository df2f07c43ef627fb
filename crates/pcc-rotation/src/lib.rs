//! # pcc-rotation — Rotation and Selection Engine
//!
//! Picks which auditors and citizens may attest a milestone, under three
//! anti-collusion exclusions:
//!
//! 1. anyone already assigned, accepted, or completed on the milestone;
//! 2. anyone assigned to the same project within the last N rotation rounds;
//! 3. anyone who declared a conflict of interest on the milestone.
//!
//! Selection is uniform over the remaining pool, drawn from a caller-supplied
//! CSPRNG. Every call opens a new rotation round. Recusal and replacement
//! are status transitions; assignments are never deleted.

pub mod assignment;
pub mod engine;
pub mod error;
pub mod store;

pub use assignment::{AssignmentStatus, ParticipantRole, RotationAssignment};
pub use engine::{RotationEngine, SelectionRequest};
pub use error::RotationError;
pub use store::{AssignmentStore, InMemoryAssignmentStore};
