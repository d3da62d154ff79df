//! Estimator backend client implementation.

use async_trait::async_trait;
use estimator_core::{
    ClientConfig, DashboardSummary, DraftOrder, EstimateRequest, EstimateResult, EstimatorError,
    HealthStatus, IntakeResult, OrderId, OrderRecord, OrderStatus, Result, StatsByStatus,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::api::{DashboardApi, EstimateApi, IntakeApi};

/// Client for the estimator backend.
#[derive(Clone)]
pub struct EstimatorClient {
    /// Resolved configuration (base URL, timeout, ...).
    config: ClientConfig,

    /// HTTP client.
    http_client: reqwest::Client,
}

impl EstimatorClient {
    /// Create a client for the configured backend.
    ///
    /// Fails with [`EstimatorError::Config`] if the base URL does not parse.
    pub fn new(config: ClientConfig) -> Result<Self> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            EstimatorError::Config(format!("invalid base URL {:?}: {}", config.base_url, e))
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EstimatorError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register a submission: multipart `text`, optional `file`, optional `email`.
    #[instrument(skip(self, draft), fields(has_file = draft.file.is_some()))]
    pub async fn submit_intake(&self, draft: &DraftOrder) -> Result<IntakeResult> {
        let url = self.config.endpoint("/intake/order");

        let mut form = Form::new().text("text", draft.text.clone());
        if let Some(file) = &draft.file {
            form = form.part("file", file_part(file));
        }
        if let Some(email) = draft.customer_email() {
            form = form.text("email", email.to_string());
        }

        debug!(url = %url, "POST intake");
        let response = self
            .send("intake", self.http_client.post(&url).multipart(form))
            .await?;
        let intake: IntakeResult = read_json("intake", response).await?;

        info!(order_id = %intake.order_id, issues = ?intake.issues, "Intake accepted");
        Ok(intake)
    }

    /// Estimate a registered order.
    #[instrument(skip(self, intake, customer_email), fields(order_id = %intake.order_id))]
    pub async fn submit_estimate(
        &self,
        intake: IntakeResult,
        customer_email: Option<String>,
    ) -> Result<EstimateResult> {
        let url = self.config.endpoint("/estimate");
        let request = EstimateRequest::new(intake, customer_email);

        debug!(url = %url, "POST estimate");
        let response = self
            .send("estimate", self.http_client.post(&url).json(&request))
            .await?;
        let estimate: EstimateResult = read_json("estimate", response).await?;

        info!(
            decision = %estimate.validation.decision,
            final_price = estimate.pricing.final_price,
            "Estimate received"
        );
        Ok(estimate)
    }

    /// `GET /dashboard/summary`.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        self.get_json("dashboard summary", "/dashboard/summary").await
    }

    /// `GET /dashboard/orders`, oldest first as the server returns them.
    pub async fn dashboard_orders(&self) -> Result<Vec<OrderRecord>> {
        self.get_json("dashboard orders", "/dashboard/orders").await
    }

    /// `GET /dashboard/stats`.
    pub async fn dashboard_stats(&self) -> Result<StatsByStatus> {
        self.get_json("dashboard stats", "/dashboard/stats").await
    }

    /// Probe the backend root endpoint.
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get_json("health", "/").await
    }

    /// Look up the current status of one order.
    pub async fn fetch_order(&self, id: &OrderId) -> Result<OrderStatus> {
        self.get_json("order", &format!("/orders/{}", id)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, path: &str) -> Result<T> {
        let url = self.config.endpoint(path);
        debug!(url = %url, "GET {}", endpoint);
        let response = self.send(endpoint, self.http_client.get(&url)).await?;
        read_json(endpoint, response).await
    }

    /// Send a request and turn transport failures and non-2xx answers into errors.
    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(endpoint, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = EstimatorError::from_response_body(status.as_u16(), &body);
        warn!(endpoint, status = status.as_u16(), error = %err, "Request rejected");
        Err(err)
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> EstimatorError {
        let mapped = if err.is_timeout() {
            let timeout = self.config.request_timeout;
            EstimatorError::Timeout {
                duration_ms: timeout.as_millis() as u64,
                message: format!("Request timed out after {}s", timeout.as_secs_f64()),
            }
        } else {
            EstimatorError::Transport {
                message: err.to_string(),
            }
        };
        warn!(endpoint, error = %mapped, "Request failed");
        mapped
    }
}

/// Decode a 2xx body, reporting anything that does not fit as malformed.
async fn read_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| EstimatorError::Transport {
            message: e.to_string(),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        warn!(endpoint, error = %e, "Malformed response body");
        EstimatorError::MalformedResponse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
    })
}

fn file_part(file: &estimator_core::Attachment) -> Part {
    let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    match part.mime_str(&file.content_type) {
        Ok(part) => part,
        Err(e) => {
            warn!(
                content_type = %file.content_type,
                error = %e,
                "Unusable content type, sending without one"
            );
            Part::bytes(file.bytes.clone()).file_name(file.file_name.clone())
        }
    }
}

#[async_trait]
impl IntakeApi for EstimatorClient {
    async fn submit_intake(&self, draft: &DraftOrder) -> Result<IntakeResult> {
        EstimatorClient::submit_intake(self, draft).await
    }
}

#[async_trait]
impl EstimateApi for EstimatorClient {
    async fn submit_estimate(
        &self,
        intake: IntakeResult,
        customer_email: Option<String>,
    ) -> Result<EstimateResult> {
        EstimatorClient::submit_estimate(self, intake, customer_email).await
    }
}

#[async_trait]
impl DashboardApi for EstimatorClient {
    async fn fetch_summary(&self) -> Result<DashboardSummary> {
        self.dashboard_summary().await
    }

    async fn fetch_orders(&self) -> Result<Vec<OrderRecord>> {
        self.dashboard_orders().await
    }

    async fn fetch_stats(&self) -> Result<StatsByStatus> {
        self.dashboard_stats().await
    }
}
