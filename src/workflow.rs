//! End-to-end ticket closure: details, claim, close
//!
//! Runs the service desk operations in order and stops at the first failure.
//! The ticket moves `Unclaimed -> Claimed -> AwaitingAcceptance`; only the
//! claim and close stages touch remote state.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::api::{Attachment, NaumenError, ServiceDesk, TaskDetails, TaskId, TicketState};

/// Step of the closure workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Details,
    Claim,
    Close,
}

impl Stage {
    /// Whether a failure here may have left the remote ticket changed
    pub fn mutates_remote(&self) -> bool {
        matches!(self, Stage::Claim | Stage::Close)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Details => f.write_str("fetching task details"),
            Stage::Claim => f.write_str("taking responsibility"),
            Stage::Close => f.write_str("submitting closure"),
        }
    }
}

/// Failure of one workflow stage
#[derive(Debug, Error)]
#[error("{stage} failed (ticket last seen {state}): {source}")]
pub struct WorkflowError {
    pub stage: Stage,
    /// State the ticket was last known to be in
    pub state: TicketState,
    #[source]
    pub source: NaumenError,
}

#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Take responsibility before closing; off for tickets already owned
    pub claim: bool,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self { claim: true }
    }
}

/// Outcome of a completed workflow
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub details: TaskDetails,
    pub attachments: Vec<Attachment>,
    pub state: TicketState,
}

/// Close the task's service call with the given attachments
pub fn close_task<D: ServiceDesk + ?Sized>(
    desk: &D,
    task_id: &TaskId,
    files: &[PathBuf],
    options: &WorkflowOptions,
) -> Result<WorkflowReport, WorkflowError> {
    let mut state = TicketState::Unclaimed;

    let details = desk.fetch_details(task_id).map_err(|source| WorkflowError {
        stage: Stage::Details,
        state,
        source,
    })?;
    info!(
        task = %task_id,
        service_call = %details.service_call,
        title = %details.title,
        "resolved task"
    );

    if options.claim {
        desk.take_responsibility(&details.service_call)
            .map_err(|source| WorkflowError {
                stage: Stage::Claim,
                state,
                source,
            })?;
    }
    state = TicketState::Claimed;

    let attachments = desk
        .submit_closure(&details.service_call, files)
        .map_err(|source| WorkflowError {
            stage: Stage::Close,
            state,
            source,
        })?;
    state = TicketState::AwaitingAcceptance;

    info!(
        service_call = %details.service_call,
        attachments = attachments.len(),
        %state,
        "workflow complete"
    );

    Ok(WorkflowReport {
        details,
        attachments,
        state,
    })
}
