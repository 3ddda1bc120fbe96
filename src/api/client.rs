//! HTTP client for the pet-care REST API

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::error::ApiError;
use super::models::{
    Appointment, AppointmentRequest, ErrorBody, MutationEnvelope, OrderRequest, PageBase,
    PageEnvelope,
};
use crate::config::Config;
use crate::pagination::PageResult;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the remote API. Cheap to clone; clones share the token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let api = Self::new(&config.api_url, config.http_timeout);
        api.set_token(config.api_token.clone());
        api
    }

    /// Replaces the bearer token sent with every request.
    pub fn set_token(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(e) => tracing::error!("Failed to acquire token lock: {}", e),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        let token = self.token.read().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends `builder` and returns the JSON body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        response.json::<Value>().await.map_err(|e| ApiError::Malformed(e.to_string()))
    }

    async fn status_error(status: StatusCode, response: Response) -> ApiError {
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Fetches internal page `page` (1-based) of a list endpoint.
    ///
    /// `base` says how the endpoint numbers its pages; the returned result is
    /// always 1-based. Items that do not match `T` are skipped.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        base: PageBase,
        page: u32,
        page_size: u32,
    ) -> Result<PageResult<T>, ApiError> {
        let builder = self
            .request(Method::GET, path)
            .query(params)
            .query(&[("pageNo", base.to_wire(page)), ("pageSize", page_size)]);

        let body = self.send(builder).await?;
        let envelope: PageEnvelope =
            serde_json::from_value(body).map_err(|e| ApiError::Malformed(e.to_string()))?;

        let received = envelope.items.len();
        let items: Vec<T> = envelope
            .items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value(raw) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(path, page, "Skipping invalid list item: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!(
            path,
            page,
            page_no = envelope.page_no,
            total_page = envelope.total_page,
            received,
            kept = items.len(),
            "Fetched page"
        );

        Ok(PageResult {
            items,
            current_page: base.from_wire(envelope.page_no),
            total_page: envelope.total_page,
            total_items: envelope.total_elements,
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<MutationEnvelope<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(self.request(Method::POST, path).json(body)).await?;
        Self::parse_envelope(value)
    }

    fn parse_envelope<T: DeserializeOwned>(value: Value) -> Result<MutationEnvelope<T>, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    /// `POST /orders`
    pub async fn place_order(
        &self,
        order: &OrderRequest,
    ) -> Result<MutationEnvelope<Value>, ApiError> {
        self.post("orders", order).await
    }

    /// `POST /appointments`
    pub async fn create_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> Result<MutationEnvelope<Appointment>, ApiError> {
        self.post("appointments", request).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
