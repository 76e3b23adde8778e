//! Identifier and result types for the service desk workflow

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::NaumenError;

/// External task identifier from the upstream system of record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal service call identifier (e.g. `serviceCall$1234567`)
///
/// Always non-empty: an empty value from the backend means "no match" and is
/// reported as [`NaumenError::EmptyResult`] instead of being wrapped here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceCallId(String);

impl ServiceCallId {
    /// Wrap a service call identifier, rejecting empty values
    pub fn new(value: impl Into<String>) -> Result<Self, NaumenError> {
        let value = value.into();
        if value.is_empty() {
            return Err(NaumenError::InvalidServiceCall);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServiceCallId {
    type Error = NaumenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServiceCallId> for String {
    fn from(id: ServiceCallId) -> Self {
        id.0
    }
}

impl fmt::Display for ServiceCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive fields of a service call, as returned by the detail fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetails {
    /// Service call the task resolved to
    pub service_call: ServiceCallId,
    /// Human-readable reference (RP)
    pub title: String,
    /// Summary description
    pub summary: String,
}

/// Lifecycle of a ticket as observed from this client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    Unclaimed,
    Claimed,
    AwaitingAcceptance,
}

impl TicketState {
    pub fn display_name(&self) -> &'static str {
        match self {
            TicketState::Unclaimed => "unclaimed",
            TicketState::Claimed => "claimed",
            TicketState::AwaitingAcceptance => "awaiting acceptance",
        }
    }
}

impl fmt::Display for TicketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_call_rejects_empty() {
        assert!(matches!(
            ServiceCallId::new(""),
            Err(NaumenError::InvalidServiceCall)
        ));
    }

    #[test]
    fn test_service_call_keeps_value() {
        let id = ServiceCallId::new("serviceCall$1234567").unwrap();
        assert_eq!(id.as_str(), "serviceCall$1234567");
        assert_eq!(id.to_string(), "serviceCall$1234567");
    }

    #[test]
    fn test_service_call_deserialize_validates() {
        let ok: ServiceCallId = serde_json::from_str(r#""sc$9001""#).unwrap();
        assert_eq!(ok.as_str(), "sc$9001");

        let err = serde_json::from_str::<ServiceCallId>(r#""""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_ticket_state_serializes_snake_case() {
        let json = serde_json::to_string(&TicketState::AwaitingAcceptance).unwrap();
        assert_eq!(json, r#""awaiting_acceptance""#);
        assert_eq!(TicketState::Claimed.to_string(), "claimed");
    }
}
