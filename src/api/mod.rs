//! Naumen service desk API
//!
//! This module provides:
//! - [`NaumenClient`], the blocking REST client for the four gateway calls
//! - [`ServiceDesk`], the seam the workflow runs against
//! - Identifier types and the error taxonomy shared by both

pub mod client;
pub mod closure;
pub mod error;
pub mod params;
pub mod types;

pub use client::{Endpoint, NaumenClient};
pub use closure::{Attachment, ClosureForm};
pub use error::{FileAction, NaumenError};
pub use params::ParamList;
pub use types::{ServiceCallId, TaskDetails, TaskId, TicketState};

use std::path::PathBuf;

/// Operations the service desk offers to this client
///
/// `take_responsibility` and `submit_closure` change remote state and are not
/// safe to retry blindly.
pub trait ServiceDesk {
    /// Map an external task identifier to its service call
    fn resolve_service_call(&self, task_id: &TaskId) -> Result<ServiceCallId, NaumenError>;

    /// Resolve the task and fetch its title (RP) and summary description
    fn fetch_details(&self, task_id: &TaskId) -> Result<TaskDetails, NaumenError>;

    /// Claim ownership of a service call
    fn take_responsibility(&self, service_call: &ServiceCallId) -> Result<(), NaumenError>;

    /// Upload attachments and set the service call to awaiting acceptance
    fn submit_closure(
        &self,
        service_call: &ServiceCallId,
        files: &[PathBuf],
    ) -> Result<Vec<Attachment>, NaumenError>;
}
