//! Error taxonomy for the service desk workflow
//!
//! Every variant names the backend operation it came from and the identifier
//! or path involved, so a failure can be diagnosed from the message alone.

use reqwest::StatusCode;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// What was being done to a local attachment when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Open,
    Read,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileAction::Open => f.write_str("open"),
            FileAction::Read => f.write_str("read"),
        }
    }
}

/// Errors returned by the service desk operations
#[derive(Error, Debug)]
pub enum NaumenError {
    /// URL or request could not be assembled
    #[error("failed to form request of {operation}: {message}")]
    RequestConstruction {
        operation: &'static str,
        message: String,
    },

    /// Network, DNS, TLS or connection failure
    #[error("failed to make request of {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a status outside 200/202
    #[error("bad response status code of {}: {}{}", .operation, .status, body_suffix(.body))]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    /// Status accepted but the body could not be read
    #[error("failed to read response of {operation}: {source}")]
    ResponseRead {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Body read but not in the expected shape; keeps the raw payload
    #[error("failed to decode response of {operation}: {source}\n\t{body}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// Lookup succeeded but no service call matches the task
    #[error("failed to find any service call of getData for task {task_id}, empty result")]
    EmptyResult { task_id: String },

    /// Detail fetch could not resolve the service call first
    #[error("failed to get service call for task {task_id}: {source}")]
    Resolve {
        task_id: String,
        #[source]
        source: Box<NaumenError>,
    },

    /// Attachment could not be opened or read
    #[error("failed to {action} attachment {path:?}: {source}")]
    LocalResource {
        path: PathBuf,
        action: FileAction,
        #[source]
        source: io::Error,
    },

    /// Multipart part for an attachment could not be created
    #[error("failed to create form part for {path:?}: {source}")]
    FormPart {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    /// Caller supplied an empty service call identifier
    #[error("service call identifier must not be empty")]
    InvalidServiceCall,
}

fn body_suffix(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n\t{}", trimmed)
    }
}

impl NaumenError {
    pub fn request_construction(operation: &'static str, message: impl Into<String>) -> Self {
        NaumenError::RequestConstruction {
            operation,
            message: message.into(),
        }
    }

    pub fn local_resource(path: impl Into<PathBuf>, action: FileAction, source: io::Error) -> Self {
        NaumenError::LocalResource {
            path: path.into(),
            action,
            source,
        }
    }

    /// Backend operation the error belongs to, when there is one
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            NaumenError::RequestConstruction { operation, .. }
            | NaumenError::Transport { operation, .. }
            | NaumenError::UnexpectedStatus { operation, .. }
            | NaumenError::ResponseRead { operation, .. }
            | NaumenError::Decode { operation, .. } => Some(operation),
            NaumenError::EmptyResult { .. } => Some(super::client::OP_GET_DATA),
            NaumenError::Resolve { .. } => Some(super::client::OP_TASK_DETAILS),
            NaumenError::LocalResource { .. } | NaumenError::FormPart { .. } => {
                Some(super::client::OP_WAITING_FOR_ACCEPT)
            }
            NaumenError::InvalidServiceCall => None,
        }
    }

    /// Status code for rejected responses
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NaumenError::UnexpectedStatus { status, .. } => Some(*status),
            NaumenError::Resolve { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Whether a caller could reasonably retry without changing its input
    ///
    /// Transport failures and rejected statuses may be transient. Everything
    /// else needs a corrected input or backend state first.
    pub fn is_retriable(&self) -> bool {
        match self {
            NaumenError::Transport { .. }
            | NaumenError::UnexpectedStatus { .. }
            | NaumenError::ResponseRead { .. } => true,
            NaumenError::Resolve { source, .. } => source.is_retriable(),
            _ => false,
        }
    }

    /// Whether the backend reported that nothing matches the task
    pub fn is_not_found(&self) -> bool {
        match self {
            NaumenError::EmptyResult { .. } => true,
            NaumenError::Resolve { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error(body: &str) -> NaumenError {
        let source = serde_json::from_str::<serde_json::Value>(body).unwrap_err();
        NaumenError::Decode {
            operation: "getData",
            source,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_decode_error_keeps_raw_body() {
        let err = decode_error("Access denied for key");
        let message = err.to_string();
        assert!(message.starts_with("failed to decode response of getData"));
        assert!(message.contains("Access denied for key"));
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_unexpected_status_display() {
        let err = NaumenError::UnexpectedStatus {
            operation: "takeSCResponsibility",
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "bad response status code of takeSCResponsibility: 500 Internal Server Error"
        );
        assert!(err.is_retriable());
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_unexpected_status_includes_body() {
        let err = NaumenError::UnexpectedStatus {
            operation: "getData",
            status: StatusCode::FORBIDDEN,
            body: "  invalid accessKey \n".to_string(),
        };
        assert!(err.to_string().ends_with("403 Forbidden\n\tinvalid accessKey"));
    }

    #[test]
    fn test_empty_result_is_not_found() {
        let err = NaumenError::EmptyResult {
            task_id: "123456".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_retriable());
        assert_eq!(err.operation(), Some("getData"));
        assert_eq!(
            err.to_string(),
            "failed to find any service call of getData for task 123456, empty result"
        );
    }

    #[test]
    fn test_resolve_delegates_to_source() {
        let err = NaumenError::Resolve {
            task_id: "123456".to_string(),
            source: Box::new(NaumenError::EmptyResult {
                task_id: "123456".to_string(),
            }),
        };
        assert!(err.is_not_found());
        assert!(!err.is_retriable());
        assert_eq!(err.operation(), Some("get task details"));
        assert!(err.to_string().contains("empty result"));
    }

    #[test]
    fn test_local_resource_names_path() {
        let err = NaumenError::local_resource(
            "/tmp/missing.txt",
            FileAction::Open,
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        let message = err.to_string();
        assert!(message.contains("failed to open attachment"));
        assert!(message.contains("/tmp/missing.txt"));
        assert_eq!(err.operation(), Some("waitingForAccept"));
    }
}
