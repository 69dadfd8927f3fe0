use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use clinicase_api::{
    case_path, summarize_path, CaseRecord, CaseUpsertRequest, CASES_PATH,
};
use clinicase_core::{CaseId, NewCase, PatientCase};

use crate::error::ClientError;
use crate::repository::CaseRepository;

/// Typed HTTP client for the clinical case API.
///
/// One method per remote action. No retries and no caching: every call is a
/// single round trip and every failure comes back as a [`ClientError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given base URL (including `/api/v1`)
    /// and request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ── Cases ─────────────────────────────────────────────────────────────

    pub async fn create_case(&self, case: &NewCase) -> Result<PatientCase, ClientError> {
        let body = CaseUpsertRequest::from(case);
        let resp = self
            .send(self.client.post(self.url(CASES_PATH)).json(&body))
            .await?;
        parse_case(resp).await
    }

    pub async fn list_cases(&self) -> Result<Vec<PatientCase>, ClientError> {
        let resp = self.send(self.client.get(self.url(CASES_PATH))).await?;
        let records: Vec<CaseRecord> = parse_response(resp).await?;
        records
            .into_iter()
            .map(|record| record.into_case().map_err(ClientError::from))
            .collect()
    }

    pub async fn get_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        let resp = self.send(self.client.get(self.url(&case_path(id)))).await?;
        parse_case(resp).await
    }

    pub async fn update_case(
        &self,
        id: &CaseId,
        case: &NewCase,
    ) -> Result<PatientCase, ClientError> {
        let body = CaseUpsertRequest::from(case);
        let resp = self
            .send(self.client.put(self.url(&case_path(id))).json(&body))
            .await?;
        parse_case(resp).await
    }

    pub async fn summarize_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        let resp = self
            .send(self.client.post(self.url(&summarize_path(id))))
            .await?;
        parse_case(resp).await
    }

    pub async fn delete_case(&self, id: &CaseId) -> Result<(), ClientError> {
        let resp = self
            .send(self.client.delete(self.url(&case_path(id))))
            .await?;
        ensure_success(resp).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let resp = self.client.execute(request).await.map_err(|e| {
            debug!(%method, %path, error = %e, "request failed before a response");
            ClientError::from(e)
        })?;
        debug!(%method, %path, status = resp.status().as_u16(), "response received");
        Ok(resp)
    }
}

impl CaseRepository for ApiClient {
    async fn create_case(&self, case: &NewCase) -> Result<PatientCase, ClientError> {
        ApiClient::create_case(self, case).await
    }

    async fn list_cases(&self) -> Result<Vec<PatientCase>, ClientError> {
        ApiClient::list_cases(self).await
    }

    async fn get_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        ApiClient::get_case(self, id).await
    }

    async fn update_case(&self, id: &CaseId, case: &NewCase) -> Result<PatientCase, ClientError> {
        ApiClient::update_case(self, id, case).await
    }

    async fn summarize_case(&self, id: &CaseId) -> Result<PatientCase, ClientError> {
        ApiClient::summarize_case(self, id).await
    }

    async fn delete_case(&self, id: &CaseId) -> Result<(), ClientError> {
        ApiClient::delete_case(self, id).await
    }
}

async fn parse_case(resp: Response) -> Result<PatientCase, ClientError> {
    let record: CaseRecord = parse_response(resp).await?;
    Ok(record.into_case()?)
}

/// Return the deserialized body on 2xx, or a [`ClientError::Remote`]
/// carrying the status and the most useful message the body offers.
async fn parse_response<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let resp = ensure_success(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn ensure_success(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "request failed".to_string());
    Err(ClientError::remote(status.as_u16(), message))
}

/// Pull a human-readable message out of an error body. Spring-style JSON
/// errors carry `message` (or `error`); anything else is used verbatim.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        return ["message", "error", "detail"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string);
    }
    Some(body.to_string())
}
