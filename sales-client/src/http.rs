//! Network implementation of [`OrderGateway`]

use crate::diagnostics::{AttemptEntry, AttemptOutcome, SubmissionLog};
use crate::request::{
    fill_plan_fields, ApiErrorBody, CreateOrderRequest, CreateOrderResponse, OrderListBody,
    PlanListBody,
};
use crate::{ClientConfig, ClientError, ClientResult, OrderGateway, SubmitError, SubmitReceipt};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::order::{OrderSubmission, PaymentPlan, RemoteOrder};
use shared::util::{now_millis, snippet};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest raw body kept in error messages
const BODY_SNIPPET_CHARS: usize = 200;

const ORDERS_PATH: &str = "orders";

/// HTTP client for the remote order backend
#[derive(Debug, Clone)]
pub struct NetworkOrderClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
    log: Arc<SubmissionLog>,
}

impl NetworkOrderClient {
    /// Create a new client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            timeout_secs: config.timeout,
            log: Arc::new(SubmissionLog::new(config.log_capacity)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Diagnostics log of recent calls
    pub fn submission_log(&self) -> Arc<SubmissionLog> {
        Arc::clone(&self.log)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn record(
        &self,
        method: &str,
        path: &str,
        outcome: AttemptOutcome,
        status: Option<u16>,
        started: Instant,
        detail: Option<String>,
    ) {
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.log.record(AttemptEntry {
            at: now_millis(),
            method: method.to_string(),
            endpoint: format!("/{}", path.trim_start_matches('/')),
            outcome,
            status,
            elapsed_ms,
            detail,
        });
    }

    /// Extract a human-readable message from an error body
    fn error_message(status: StatusCode, body: &str) -> String {
        if let Ok(api_err) = serde_json::from_str::<ApiErrorBody>(body)
            && !api_err.message.trim().is_empty()
        {
            return api_err.message;
        }
        let raw = snippet(body, BODY_SNIPPET_CHARS);
        if raw.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("empty response body")
                .to_string()
        } else {
            raw
        }
    }

    /// GET `path` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let started = Instant::now();
        let mut req = self.client.get(self.url(path));
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                let outcome = if e.is_timeout() {
                    AttemptOutcome::Timeout
                } else {
                    AttemptOutcome::NetworkError
                };
                self.record("GET", path, outcome, None, started, Some(e.to_string()));
                if e.is_timeout() {
                    return Err(ClientError::Timeout(self.timeout_secs));
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = Self::error_message(status, &text);
            self.record(
                "GET",
                path,
                AttemptOutcome::Rejected,
                Some(status.as_u16()),
                started,
                Some(message.clone()),
            );
            return match status {
                StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
                _ => Err(ClientError::Api {
                    status: status.as_u16(),
                    message,
                }),
            };
        }

        self.record(
            "GET",
            path,
            AttemptOutcome::Success,
            Some(status.as_u16()),
            started,
            None,
        );
        serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!(
                "{e}: {}",
                snippet(&text, BODY_SNIPPET_CHARS)
            ))
        })
    }

    /// Fill installment fields the draft is missing from the customer's plans
    async fn complete_terms(&self, order: &OrderSubmission) -> CreateOrderRequest {
        let needs_lookup = matches!(
            &order.terms,
            shared::order::PaymentTerms::Installments { description, count, .. }
                if description.is_empty() || *count == 0
        );
        if !needs_lookup {
            return CreateOrderRequest::from(order);
        }

        let mut completed = order.clone();
        match self.payment_plans(&order.customer.id).await {
            Ok(plans) => {
                if fill_plan_fields(&mut completed.terms, &plans) {
                    tracing::debug!(draft_id = %order.draft_id, "Filled payment plan fields from remote");
                }
            }
            Err(e) => {
                tracing::warn!(draft_id = %order.draft_id, error = %e, "Payment plan lookup failed, submitting plan as saved");
            }
        }
        CreateOrderRequest::from(&completed)
    }
}

#[async_trait]
impl OrderGateway for NetworkOrderClient {
    async fn submit_order(&self, order: &OrderSubmission) -> Result<SubmitReceipt, SubmitError> {
        let body = self.complete_terms(order).await;

        let started = Instant::now();
        let mut req = self.client.post(self.url(ORDERS_PATH)).json(&body);
        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                self.record("POST", ORDERS_PATH, AttemptOutcome::Timeout, None, started, None);
                tracing::warn!(draft_id = %order.draft_id, timeout_secs = self.timeout_secs, "Order submission timed out");
                return Err(SubmitError::Timeout(self.timeout_secs));
            }
            Err(e) => {
                let message = e.to_string();
                self.record(
                    "POST",
                    ORDERS_PATH,
                    AttemptOutcome::NetworkError,
                    None,
                    started,
                    Some(message.clone()),
                );
                tracing::warn!(draft_id = %order.draft_id, error = %message, "Order submission failed");
                return Err(SubmitError::Network(message));
            }
        };

        let status = response.status();
        // Reading the body can also time out or drop
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => {
                tracing::warn!(draft_id = %order.draft_id, error = %e, "Order accepted but body unreadable");
                String::new()
            }
            Err(e) => {
                let message = e.to_string();
                self.record(
                    "POST",
                    ORDERS_PATH,
                    AttemptOutcome::Rejected,
                    Some(status.as_u16()),
                    started,
                    Some(message.clone()),
                );
                return Err(SubmitError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }
        };

        if !status.is_success() {
            let message = Self::error_message(status, &text);
            self.record(
                "POST",
                ORDERS_PATH,
                AttemptOutcome::Rejected,
                Some(status.as_u16()),
                started,
                Some(message.clone()),
            );
            tracing::warn!(
                draft_id = %order.draft_id,
                status = status.as_u16(),
                message = %message,
                "Order rejected by server"
            );
            return Err(SubmitError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // A 2xx means the server committed the order. An unreadable body
        // only costs us the remote id; the reconciler recovers it later.
        let remote_id = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<CreateOrderResponse>(&text) {
                Ok(parsed) => parsed.remote_id(),
                Err(e) => {
                    tracing::warn!(draft_id = %order.draft_id, error = %e, "Order accepted with unparseable body");
                    None
                }
            }
        };

        self.record(
            "POST",
            ORDERS_PATH,
            AttemptOutcome::Success,
            Some(status.as_u16()),
            started,
            remote_id.clone(),
        );
        tracing::info!(
            draft_id = %order.draft_id,
            display_id = order.display_id,
            remote_id = ?remote_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Order submitted"
        );
        Ok(SubmitReceipt { remote_id })
    }

    async fn list_orders(&self) -> ClientResult<Vec<RemoteOrder>> {
        let body: OrderListBody = self.get_json(ORDERS_PATH).await?;
        Ok(body.into_orders())
    }

    async fn payment_plans(&self, customer_id: &str) -> ClientResult<Vec<PaymentPlan>> {
        let path = format!("customers/{}/payment-plans", customer_id);
        let body: PlanListBody = self.get_json(&path).await?;
        Ok(body.into_plans())
    }
}
