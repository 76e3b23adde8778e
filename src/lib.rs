//! hd-naumen - Naumen service desk workflow client
//!
//! Resolves external task identifiers to service calls, fetches their details,
//! takes responsibility for them and closes them out with attachments.

pub mod api;
pub mod config;
pub mod logging;
pub mod workflow;

pub use api::{NaumenClient, NaumenError, ServiceDesk};
pub use workflow::{close_task, WorkflowError, WorkflowOptions, WorkflowReport};
