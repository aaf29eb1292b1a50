//! Pet-store HTTP client
//!
//! One request per call, no retries. Transport failures become
//! [`ContractError::Network`] or [`ContractError::Timeout`]; any HTTP status,
//! including 4xx/5xx, is returned as an [`ApiResponse`].

mod response;

pub use response::{ApiResponse, ResponseBody};

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::common::{ContractError, HarnessResult};
use crate::config::HarnessConfig;
use crate::types::{Order, Pet};

/// HTTP client bound to one pet-store base URL
///
/// Cloning shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct PetstoreClient {
    http: Client,
    base_url: String,
}

impl PetstoreClient {
    /// Build a client from the harness configuration
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            ContractError::Config(format!("Invalid base URL `{}`: {e}", config.base_url))
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(ContractError::Config(format!(
                "Base URL must be an http(s) URL: `{}`",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ContractError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Send a request with an optional JSON body
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HarnessResult<ApiResponse> {
        let url = self.url(path);
        let mut builder = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, url = %url, error = %e, "Request failed");
            ContractError::from(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().await?;
        let elapsed_ms = started.elapsed().as_millis();

        debug!(
            method = %method,
            url = %url,
            status,
            elapsed_ms = elapsed_ms as u64,
            "Request completed"
        );

        Ok(ApiResponse::new(
            method,
            path,
            status,
            content_type,
            text,
            elapsed_ms,
        ))
    }

    /// GET
    pub async fn get(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.request::<()>(Method::GET, path, None).await
    }

    /// DELETE
    pub async fn delete(&self, path: &str) -> HarnessResult<ApiResponse> {
        self.request::<()>(Method::DELETE, path, None).await
    }

    /// POST with JSON body
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> HarnessResult<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// PUT with JSON body
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> HarnessResult<ApiResponse> {
        self.request(Method::PUT, path, Some(body)).await
    }

    /// POST /pet
    pub async fn create_pet(&self, pet: &Pet) -> HarnessResult<ApiResponse> {
        self.post("/pet", pet).await
    }

    /// PUT /pet
    ///
    /// Accepts any serializable payload so partial updates can be sent as-is.
    pub async fn update_pet<B: Serialize + ?Sized>(&self, pet: &B) -> HarnessResult<ApiResponse> {
        self.put("/pet", pet).await
    }

    /// GET /pet/{id}
    pub async fn get_pet(&self, id: i64) -> HarnessResult<ApiResponse> {
        self.get(&format!("/pet/{id}")).await
    }

    /// DELETE /pet/{id}
    pub async fn delete_pet(&self, id: i64) -> HarnessResult<ApiResponse> {
        self.delete(&format!("/pet/{id}")).await
    }

    /// POST /store/order
    pub async fn place_order(&self, order: &Order) -> HarnessResult<ApiResponse> {
        self.post("/store/order", order).await
    }

    /// GET /store/order/{id}
    pub async fn get_order(&self, id: i64) -> HarnessResult<ApiResponse> {
        self.get(&format!("/store/order/{id}")).await
    }

    /// DELETE /store/order/{id}
    pub async fn delete_order(&self, id: i64) -> HarnessResult<ApiResponse> {
        self.delete(&format!("/store/order/{id}")).await
    }

    /// GET /store/inventory
    pub async fn get_inventory(&self) -> HarnessResult<ApiResponse> {
        self.get("/store/inventory").await
    }
}
