//! Decision service client over HTTP

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::RetryPolicy;
use crate::api::types::{ApiErrorResponse, ImageResponse};
use crate::config::ClientConfig;
use crate::domain::{
    CategoryKey, Decision, DecisionClient, DecisionRequest, DomainError, ImageIdentity,
};

/// Talks to `GET /category/{id}` and `GET /image/{id}`
#[derive(Debug, Clone)]
pub struct HttpDecisionClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl HttpDecisionClient {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, DomainError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            DomainError::configuration(format!("Invalid server url '{}': {}", base_url, e))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(DomainError::configuration(format!(
                "Server url '{}' cannot be a base",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            retry,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, DomainError> {
        Self::new(
            &config.server_url,
            Duration::from_millis(config.timeout_ms),
            RetryPolicy::from_config(config),
        )
    }

    fn endpoint(&self, resource: &str, id: &ImageIdentity) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource).push(id.as_str());
        }
        url
    }

    async fn get_category_once(&self, id: &ImageIdentity) -> Result<CategoryKey, DomainError> {
        let response = self
            .client
            .get(self.endpoint("category", id))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::category_not_found(id.to_string()));
        }
        if !status.is_success() {
            return Err(status_error(status, response.text().await.unwrap_or_default()));
        }

        let body = response.text().await.map_err(transport_error)?;
        let body = body.trim();
        if body.is_empty() {
            return Err(DomainError::category_not_found(id.to_string()));
        }

        CategoryKey::parse(body)
            .map_err(|e| DomainError::protocol(format!("Bad category for {}: {}", id, e)))
    }

    async fn get_image_once(&self, request: &DecisionRequest) -> Result<Decision, DomainError> {
        let mut query: Vec<(&str, String)> = vec![
            ("category", request.category.to_string()),
            ("threshold", request.threshold.to_string()),
        ];
        query.extend(
            request
                .cached
                .iter()
                .map(|id| ("cached_images", id.to_string())),
        );

        let response = self
            .client
            .get(self.endpoint("image", &request.requested))
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(not_found_error(request, &body));
        }
        if !status.is_success() {
            return Err(status_error(status, response.text().await.unwrap_or_default()));
        }

        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| DomainError::protocol(format!("Invalid image response: {}", e)))?;

        body.into_domain()
    }
}

#[async_trait]
impl DecisionClient for HttpDecisionClient {
    async fn category_of(&self, id: &ImageIdentity) -> Result<CategoryKey, DomainError> {
        debug!(image_id = %id, "Requesting category");
        self.retry
            .run("category", || self.get_category_once(id))
            .await
    }

    async fn request_image(&self, request: &DecisionRequest) -> Result<Decision, DomainError> {
        debug!(
            image_id = %request.requested,
            category = %request.category,
            cached = request.cached.len(),
            "Requesting image"
        );
        self.retry
            .run("image", || self.get_image_once(request))
            .await
    }
}

fn transport_error(err: reqwest::Error) -> DomainError {
    let message = if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Connection failed".to_string()
    } else {
        format!("Request failed: {}", err)
    };
    DomainError::transport(message)
}

/// 5xx, 408 and 429 are transient; other statuses are not
fn status_error(status: StatusCode, body: String) -> DomainError {
    let message = format!("HTTP {}: {}", status, body);

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        DomainError::transport(message)
    } else if status == StatusCode::BAD_REQUEST {
        DomainError::validation(message)
    } else {
        DomainError::protocol(message)
    }
}

fn not_found_error(request: &DecisionRequest, body: &str) -> DomainError {
    let code = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|r| r.error.code);

    match code.as_deref() {
        Some("similarity_artifact_missing") => {
            DomainError::similarity_artifact_missing(request.category.to_string())
        }
        Some("category_not_found") => DomainError::category_not_found(request.requested.to_string()),
        _ => DomainError::image_not_found(
            request.requested.to_string(),
            request.category.to_string(),
        ),
    }
}
