/// Thin HTTP client wrapping the SparkQ API
///
/// Every method is a single request against the server; the CLI carries no
/// scheduling or retry logic of its own.
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server error ({status}): {detail}")]
    Api { status: reqwest::StatusCode, detail: String, code: Option<String> },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> ClientResult<JsonValue> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::into_json(response).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<JsonValue> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::into_json(response).await
    }

    /// Like `post` but treats HTTP 204 as "no task available" rather than
    /// an error, per the claim-by-queue contract.
    pub async fn post_optional<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Option<JsonValue>> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Self::into_json(response).await.map(Some)
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<JsonValue> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::into_json(response).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<JsonValue> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> ClientResult<JsonValue> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: JsonValue = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);

        if status.is_success() {
            return Ok(body);
        }

        let detail = body
            .get("detail")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed")
            .to_string();
        let code = body.get("code").and_then(|v| v.as_str()).map(String::from);
        Err(ClientError::Api { status, detail, code })
    }
}
