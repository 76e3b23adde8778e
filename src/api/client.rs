//! Blocking HTTP client for the Naumen service desk REST gateway
//!
//! Every call authenticates with the shared access key passed as the
//! `accessKey` query parameter and accepts only 200 and 202 as success.

use reqwest::blocking::{Client, Request, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::closure::{Attachment, ClosureForm};
use super::error::NaumenError;
use super::params::ParamList;
use super::types::{ServiceCallId, TaskDetails, TaskId};
use super::ServiceDesk;

pub const OP_GET_DATA: &str = "getData";
pub const OP_TASK_DETAILS: &str = "get task details";
pub const OP_TAKE_RESPONSIBILITY: &str = "takeSCResponsibility";
pub const OP_WAITING_FOR_ACCEPT: &str = "waitingForAccept";

const GET_DATA_PATH: &str = "/gateway/services/rest/getData";
const TASK_DETAILS_PATH: &str = "/sd/services/rest/get";
const TAKE_RESPONSIBILITY_PATH: &str = "/gateway/services/rest/takeSCResponsibility";
const WAITING_FOR_ACCEPT_PATH: &str = "/gateway/services/rest/waitingForAccept";

/// Base URL and access key shared by all operations
#[derive(Clone)]
pub struct Endpoint {
    base_url: String,
    access_key: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, access_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            access_key: access_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Full URL for an endpoint path, without query
    fn url(&self, operation: &'static str, path: &str) -> Result<Url, NaumenError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw)
            .map_err(|e| NaumenError::request_construction(operation, format!("{}: {}", raw, e)))
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

// Response body of getData
#[derive(Debug, Deserialize)]
struct GetDataResponse {
    #[serde(default)]
    fields: GetDataFields,
}

#[derive(Debug, Default, Deserialize)]
struct GetDataFields {
    #[serde(rename = "uuidInMainSyst", default)]
    service_call: Option<String>,
}

// Response body of the service call detail endpoint
#[derive(Debug, Deserialize)]
struct TaskDetailsResponse {
    #[serde(rename = "sumDescription", default)]
    sum_description: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Service desk client over an injected, pre-configured HTTP client
///
/// Timeouts, TLS and proxies are the injected client's concern.
pub struct NaumenClient {
    http: Client,
    endpoint: Endpoint,
}

impl NaumenClient {
    pub fn new(http: Client, endpoint: Endpoint) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Resolve a task identifier to its service call
    ///
    /// `GET /gateway/services/rest/getData?accessKey=..&params={taskId},user`
    pub fn resolve_service_call(&self, task_id: &TaskId) -> Result<ServiceCallId, NaumenError> {
        let params = ParamList::new()
            .raw(task_id.as_str())
            .user()
            .encode(OP_GET_DATA)?;
        let url = self.endpoint.url(OP_GET_DATA, GET_DATA_PATH)?;
        debug!(operation = OP_GET_DATA, %url, %params, "GET");

        let request = self.authorized_get(OP_GET_DATA, url, Some(&params))?;
        let response = self.execute(OP_GET_DATA, request)?;
        let body: GetDataResponse = read_json(OP_GET_DATA, response)?;

        let service_call = body.fields.service_call.unwrap_or_default();
        ServiceCallId::new(service_call).map_err(|_| NaumenError::EmptyResult {
            task_id: task_id.to_string(),
        })
    }

    /// Resolve the task, then fetch the service call's title and summary
    ///
    /// `GET /sd/services/rest/get/{serviceCall}?accessKey=..`
    pub fn fetch_details(&self, task_id: &TaskId) -> Result<TaskDetails, NaumenError> {
        let service_call =
            self.resolve_service_call(task_id)
                .map_err(|e| NaumenError::Resolve {
                    task_id: task_id.to_string(),
                    source: Box::new(e),
                })?;

        let mut url = self.endpoint.url(OP_TASK_DETAILS, TASK_DETAILS_PATH)?;
        url.path_segments_mut()
            .map_err(|()| {
                NaumenError::request_construction(OP_TASK_DETAILS, "base URL cannot carry a path")
            })?
            .push(service_call.as_str());
        debug!(operation = OP_TASK_DETAILS, %url, "GET");

        let request = self.authorized_get(OP_TASK_DETAILS, url, None)?;
        let response = self.execute(OP_TASK_DETAILS, request)?;
        let body: TaskDetailsResponse = read_json(OP_TASK_DETAILS, response)?;

        Ok(TaskDetails {
            service_call,
            title: body.title.unwrap_or_default(),
            summary: body.sum_description.unwrap_or_default(),
        })
    }

    /// Take responsibility for a service call as the key's user
    ///
    /// `GET /gateway/services/rest/takeSCResponsibility?accessKey=..&params='{serviceCall}',user`
    pub fn take_responsibility(&self, service_call: &ServiceCallId) -> Result<(), NaumenError> {
        let params = ParamList::new()
            .quoted(service_call.as_str())
            .user()
            .encode(OP_TAKE_RESPONSIBILITY)?;
        let url = self
            .endpoint
            .url(OP_TAKE_RESPONSIBILITY, TAKE_RESPONSIBILITY_PATH)?;
        debug!(operation = OP_TAKE_RESPONSIBILITY, %url, %params, "GET");

        let request = self.authorized_get(OP_TAKE_RESPONSIBILITY, url, Some(&params))?;
        let response = self.execute(OP_TAKE_RESPONSIBILITY, request)?;
        discard(response);

        info!(%service_call, "took responsibility for service call");
        Ok(())
    }

    /// Attach files and move the service call to "awaiting acceptance"
    ///
    /// `POST /gateway/services/rest/waitingForAccept?accessKey=..&params='{serviceCall}',request,user`
    /// with a multipart body, see [`ClosureForm`].
    pub fn submit_closure<P: AsRef<std::path::Path>>(
        &self,
        service_call: &ServiceCallId,
        files: &[P],
    ) -> Result<Vec<Attachment>, NaumenError> {
        let params = ParamList::new()
            .quoted(service_call.as_str())
            .request()
            .user()
            .encode(OP_WAITING_FOR_ACCEPT)?;
        let url = self
            .endpoint
            .url(OP_WAITING_FOR_ACCEPT, WAITING_FOR_ACCEPT_PATH)?;

        let (form, attachments) = ClosureForm::build(files)?.into_parts();
        debug!(
            operation = OP_WAITING_FOR_ACCEPT,
            %url,
            %params,
            attachments = attachments.len(),
            "POST multipart"
        );

        let request = self
            .http
            .post(url)
            .query(&[
                ("accessKey", self.endpoint.access_key()),
                ("params", params.as_str()),
            ])
            .multipart(form)
            .build()
            .map_err(|e| NaumenError::request_construction(OP_WAITING_FOR_ACCEPT, e.to_string()))?;
        let response = self.execute(OP_WAITING_FOR_ACCEPT, request)?;
        discard(response);

        info!(
            %service_call,
            attachments = attachments.len(),
            "service call is awaiting acceptance"
        );
        Ok(attachments)
    }

    fn authorized_get(
        &self,
        operation: &'static str,
        url: Url,
        params: Option<&str>,
    ) -> Result<Request, NaumenError> {
        let mut builder = self
            .http
            .get(url)
            .query(&[("accessKey", self.endpoint.access_key())]);
        if let Some(params) = params {
            builder = builder.query(&[("params", params)]);
        }
        builder
            .build()
            .map_err(|e| NaumenError::request_construction(operation, e.to_string()))
    }

    /// Send a request and reject any status other than 200/202
    ///
    /// A rejected response is read to the end so its text lands in the error.
    fn execute(&self, operation: &'static str, request: Request) -> Result<Response, NaumenError> {
        let response = self
            .http
            .execute(request)
            .map_err(|e| NaumenError::Transport {
                operation,
                source: e,
            })?;

        let status = response.status();
        if !is_accepted(status) {
            let body = response.text().unwrap_or_else(|e| {
                debug!(operation, error = %e, "failed to read rejected response body");
                String::new()
            });
            warn!(operation, %status, "backend rejected request");
            return Err(NaumenError::UnexpectedStatus {
                operation,
                status,
                body,
            });
        }

        Ok(response)
    }
}

impl ServiceDesk for NaumenClient {
    fn resolve_service_call(&self, task_id: &TaskId) -> Result<ServiceCallId, NaumenError> {
        NaumenClient::resolve_service_call(self, task_id)
    }

    fn fetch_details(&self, task_id: &TaskId) -> Result<TaskDetails, NaumenError> {
        NaumenClient::fetch_details(self, task_id)
    }

    fn take_responsibility(&self, service_call: &ServiceCallId) -> Result<(), NaumenError> {
        NaumenClient::take_responsibility(self, service_call)
    }

    fn submit_closure(
        &self,
        service_call: &ServiceCallId,
        files: &[PathBuf],
    ) -> Result<Vec<Attachment>, NaumenError> {
        NaumenClient::submit_closure(self, service_call, files)
    }
}

fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::ACCEPTED
}

fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> Result<T, NaumenError> {
    let body = response
        .text()
        .map_err(|e| NaumenError::ResponseRead {
            operation,
            source: e,
        })?;

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(source) => Err(NaumenError::Decode {
            operation,
            source,
            body,
        }),
    }
}

/// Drain a body whose content is not used so the connection can be reused
fn discard(mut response: Response) {
    if let Err(e) = io::copy(&mut response, &mut io::sink()) {
        debug!(error = %e, "failed to drain response body");
    }
}
