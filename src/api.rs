//! HTTP client for the grievance API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::Officer;
use crate::session::Session;
use crate::wire::{
    AssignRequest, AssignmentEnvelope, ErrorBody, GrievanceEnvelope, GrievanceList, OfficerList,
    ProgressRequest, RawAssignment, RawGrievance, RawOfficer, UnassignRequest,
};

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Which listing endpoint a session reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Grievances assigned to the signed-in officer
    Assigned,
    /// Unrestricted administrative listing
    All,
}

impl ListScope {
    pub fn for_session(session: &Session) -> Self {
        if session.is_officer() {
            ListScope::Assigned
        } else {
            ListScope::All
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ListScope::Assigned => "officer/assigned-grv",
            ListScope::All => "grievances/getallgrv",
        }
    }
}

/// Operations the desk needs from the backend.
#[async_trait]
pub trait GrievanceApi: Send + Sync {
    /// Raw grievance records; normalization happens on the caller's side so
    /// one bad record cannot fail the whole listing.
    async fn list_grievances(&self, scope: ListScope) -> ClientResult<Vec<Value>>;

    async fn list_officers(&self) -> ClientResult<Vec<Officer>>;

    /// Returns the updated grievance as confirmed by the server.
    async fn assign(&self, grievance_id: &str, officer_id: &str) -> ClientResult<RawGrievance>;

    async fn unassign(&self, grievance_id: &str) -> ClientResult<()>;

    /// Assignment details of one grievance, addressed by backend key.
    async fn assignment(&self, key: &str) -> ClientResult<RawAssignment>;

    async fn submit_progress(&self, key: &str, progress: &ProgressRequest) -> ClientResult<()>;
}

/// Race `fut` against `cancel`.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}

/// reqwest-backed implementation of [`GrievanceApi`]
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    config: Config,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(config: &Config, session: &Session) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            config: config.clone(),
            token: session.token().map(str::to_string),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.config.endpoint(path);
        tracing::debug!(%method, %url, "api request");
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// GET with retries on transient failures.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let mut attempt = 0u32;
        loop {
            match Self::send_json(self.request(Method::GET, path)).await {
                Err(e) if e.is_transient() && attempt < self.config.read_retries => {
                    attempt += 1;
                    tracing::debug!(path, attempt, error = %e, "retrying read");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
        let response = Self::send(request).await?;
        let bytes = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    async fn send(request: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or(text);

        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        })
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Http(e)
    }
}

#[async_trait]
impl GrievanceApi for HttpApi {
    async fn list_grievances(&self, scope: ListScope) -> ClientResult<Vec<Value>> {
        let list: GrievanceList = self.get(scope.path()).await?;
        list.grievances
            .ok_or_else(|| ClientError::InvalidResponse("missing grievances".to_string()))
    }

    async fn list_officers(&self) -> ClientResult<Vec<Officer>> {
        let list: OfficerList = self.get("officer/all-officers").await?;
        let records = list
            .officers
            .ok_or_else(|| ClientError::InvalidResponse("missing officers".to_string()))?;

        Ok(records
            .into_iter()
            .filter_map(|value| {
                let raw: RawOfficer = serde_json::from_value(value).ok()?;
                Some(Officer {
                    id: raw.id.filter(|id| !id.is_empty())?,
                    full_name: raw.full_name.unwrap_or_else(|| "Unnamed officer".to_string()),
                })
            })
            .collect())
    }

    async fn assign(&self, grievance_id: &str, officer_id: &str) -> ClientResult<RawGrievance> {
        let body = AssignRequest {
            grievance_id,
            officer_id,
        };
        let envelope: GrievanceEnvelope =
            Self::send_json(self.request(Method::POST, "officer/assign").json(&body)).await?;
        Ok(envelope.into_inner())
    }

    async fn unassign(&self, grievance_id: &str) -> ClientResult<()> {
        let body = UnassignRequest { grievance_id };
        Self::send(self.request(Method::PUT, "officer/unassign").json(&body)).await?;
        Ok(())
    }

    async fn assignment(&self, key: &str) -> ClientResult<RawAssignment> {
        let envelope: AssignmentEnvelope = self.get(&format!("officer/grievance/{}", key)).await?;
        envelope
            .grievance
            .ok_or_else(|| ClientError::InvalidResponse("missing grievance".to_string()))
    }

    async fn submit_progress(&self, key: &str, progress: &ProgressRequest) -> ClientResult<()> {
        let path = format!("officer/grievance/{}/progress", key);
        Self::send(self.request(Method::PUT, &path).json(progress)).await?;
        Ok(())
    }
}
