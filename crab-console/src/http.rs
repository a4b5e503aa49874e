//! Admin REST API client

use crate::{ClientConfig, ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;
use shared::models::{Branch, DiningTable, DiningTableCreate, DiningTableUpdate};

/// The `/admin` operations the console depends on
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>>;
    async fn list_tables(&self, branch_id: i64) -> ClientResult<Vec<DiningTable>>;
    async fn create_table(&self, payload: &DiningTableCreate) -> ClientResult<DiningTable>;
    async fn update_table(&self, id: i64, payload: &DiningTableUpdate)
    -> ClientResult<DiningTable>;
    async fn regenerate_token(&self, id: i64) -> ClientResult<DiningTable>;
    async fn delete_table(&self, id: i64) -> ClientResult<()>;
}

/// HTTP client for the admin API
#[derive(Debug, Clone)]
pub struct HttpAdminApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpAdminApi {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    /// Base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => request.bearer_auth(t),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "GET");
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "POST");
        let request = self.client.post(self.url(path)).json(body);
        let response = self.authorize(request).send().await?;
        Self::handle_response(response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        tracing::debug!(path, "POST");
        let response = self.authorize(self.client.post(self.url(path))).send().await?;
        Self::handle_response(response).await
    }

    async fn put<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        tracing::debug!(path, "PUT");
        let request = self.client.put(self.url(path)).json(body);
        let response = self.authorize(request).send().await?;
        Self::handle_response(response).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        tracing::debug!(path, "DELETE");
        let response = self
            .authorize(self.client.delete(self.url(path)))
            .send()
            .await?;
        Self::check_status(response).await.map(|_| ())
    }

    /// Map non-2xx responses to errors, preferring the backend's error body
    async fn check_status(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await?;
        // Structured error body first
        if let Ok(body) = serde_json::from_str::<ErrorBody>(&text) {
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            });
        }
        // Otherwise fall back to the status code
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden(text),
            StatusCode::NOT_FOUND => ClientError::NotFound(text),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation(text)
            }
            _ => ClientError::Internal(text),
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn list_branches(&self) -> ClientResult<Vec<Branch>> {
        self.get("branches").await
    }

    async fn list_tables(&self, branch_id: i64) -> ClientResult<Vec<DiningTable>> {
        self.get(&format!("tables?branch_id={}", branch_id)).await
    }

    async fn create_table(&self, payload: &DiningTableCreate) -> ClientResult<DiningTable> {
        self.post("tables", payload).await
    }

    async fn update_table(
        &self,
        id: i64,
        payload: &DiningTableUpdate,
    ) -> ClientResult<DiningTable> {
        self.put(&format!("tables/{}", id), payload).await
    }

    async fn regenerate_token(&self, id: i64) -> ClientResult<DiningTable> {
        self.post_empty(&format!("tables/{}/regenerate", id)).await
    }

    async fn delete_table(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("tables/{}", id)).await
    }
}
