//! # Rotation Subcommand
//!
//! `pcc rotation select` draws participants for a milestone against a JSON
//! assignment history file, appends the new round to it, and prints the
//! drawn assignments. Draws always use OS entropy; there is no way to pick
//! the random stream from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use rand::rngs::OsRng;

use pcc_core::{EngineConfig, IdentityHandle, MilestoneId, ProjectId};
use pcc_rotation::{
    InMemoryAssignmentStore, ParticipantRole, RotationAssignment, RotationEngine, SelectionRequest,
};

/// Role to draw for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Auditor,
    Citizen,
}

impl From<RoleArg> for ParticipantRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Auditor => ParticipantRole::Auditor,
            RoleArg::Citizen => ParticipantRole::Citizen,
        }
    }
}

/// Arguments for `pcc rotation`.
#[derive(Args, Debug)]
pub struct RotationArgs {
    #[command(subcommand)]
    pub command: RotationCommand,
}

#[derive(Subcommand, Debug)]
pub enum RotationCommand {
    /// Draw participants for a milestone.
    Select {
        #[arg(long)]
        milestone: String,

        #[arg(long)]
        project: String,

        #[arg(long, value_enum)]
        role: RoleArg,

        /// Number of participants to draw.
        #[arg(long)]
        count: usize,

        /// JSON array of candidate identity handles.
        #[arg(long)]
        pool: PathBuf,

        /// JSON array of prior assignments. Created if missing; the new
        /// round is appended.
        #[arg(long)]
        history: PathBuf,
    },
}

pub fn run_rotation(args: &RotationArgs, config: &EngineConfig) -> Result<u8> {
    match &args.command {
        RotationCommand::Select {
            milestone,
            project,
            role,
            count,
            pool,
            history,
        } => {
            let milestone_id = MilestoneId::new(milestone.as_str())?;
            let project_id = ProjectId::new(project.as_str())?;
            let pool: Vec<IdentityHandle> = crate::read_json(pool)?;
            let prior: Vec<RotationAssignment> = crate::read_json_or_default(history)?;
            let mut store = InMemoryAssignmentStore::from_assignments(prior);

            let engine = RotationEngine::from_config(config);
            let request = SelectionRequest {
                milestone_id: &milestone_id,
                project_id: &project_id,
                role: (*role).into(),
                count: *count,
                pool: &pool,
            };
            let selected = engine
                .select(&mut store, request, &mut OsRng, pcc_core::Timestamp::now())
                .with_context(|| format!("selection failed for milestone {milestone_id}"))?;

            crate::write_json(history, store.assignments())?;
            crate::emit_json(None, &selected)?;
            Ok(0)
        }
    }
}
