// SPDX-License-Identifier: MIT
//! HTTP transport for the `/task` resource.
//!
//! Five operations, each one request against the task server. No retries, no
//! batching, no auth. Validation failure is signaled by the body shape (an
//! `errors` mapping in an otherwise-200 response), not the status code, so a
//! mutation resolves to a tagged [`MutationOutcome`] that callers must match
//! on. Everything else — network failure, non-2xx, undecodable body — is a
//! [`ClientError`].

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::model::{FieldErrors, TaskRecord};

/// Transport-level failure. Distinct from a validation rejection, which is a
/// normal [`MutationOutcome::Rejected`] result.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("could not decode server response: {0}")]
    Decode(String),
}

/// Result of a create or update: the server either saved the record or
/// rejected it with per-field validation messages.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Saved(TaskRecord),
    Rejected(FieldErrors),
}

#[derive(Deserialize)]
struct ListBody {
    tasks: Vec<TaskRecord>,
}

#[derive(Deserialize)]
struct ItemBody {
    task: TaskRecord,
}

#[derive(Deserialize)]
struct MutationBody {
    task: Option<TaskRecord>,
    errors: Option<FieldErrors>,
}

/// Client for the task server's `/task` resource.
///
/// Cheap to clone — the underlying `reqwest::Client` is an `Arc` around a
/// connection pool.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `/task` — fetch all records.
    pub async fn list(&self) -> Result<Vec<TaskRecord>, ClientError> {
        let resp = self.http.get(self.url("/task")).send().await?;
        let body: ListBody = decode(resp).await?;
        Ok(body.tasks)
    }

    /// GET `/task/{id}` — fetch one record.
    pub async fn get_one(&self, id: i64) -> Result<TaskRecord, ClientError> {
        let resp = self.http.get(self.url(&format!("/task/{id}"))).send().await?;
        let body: ItemBody = decode(resp).await?;
        Ok(body.task)
    }

    /// POST `/task` — submit a draft for creation.
    pub async fn create(&self, draft: &TaskRecord) -> Result<MutationOutcome, ClientError> {
        let resp = self.http.post(self.url("/task")).json(draft).send().await?;
        mutation_outcome(resp).await
    }

    /// PUT `/task/{id}` — submit the full record as an update.
    pub async fn update(&self, id: i64, task: &TaskRecord) -> Result<MutationOutcome, ClientError> {
        let resp = self
            .http
            .put(self.url(&format!("/task/{id}")))
            .json(task)
            .send()
            .await?;
        mutation_outcome(resp).await
    }

    /// DELETE `/task/{id}`. Any 2xx is success; the ack body is not inspected.
    pub async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/task/{id}")))
            .send()
            .await?;
        check_status(resp).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Reject non-2xx responses, keeping the body text for the error message.
async fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Split a mutation response on its body shape: `errors` wins over `task`.
async fn mutation_outcome(resp: Response) -> Result<MutationOutcome, ClientError> {
    let body: MutationBody = decode(resp).await?;
    match (body.task, body.errors) {
        (_, Some(errors)) => Ok(MutationOutcome::Rejected(errors)),
        (Some(task), None) => Ok(MutationOutcome::Saved(task)),
        (None, None) => Err(ClientError::Decode(
            "response body had neither `task` nor `errors`".to_owned(),
        )),
    }
}
