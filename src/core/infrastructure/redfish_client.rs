//! Internal HTTP client for the pod's redfish-style REST API.

use crate::core::domain::{
    error::{RsdError, RsdResult},
    model::{ClientConfig, PodConnection},
    value_object::base_value_object::ValueObject,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{
    Client, Method, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, USER_AGENT},
};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Internal HTTP client that performs authenticated requests against the pod
/// and translates provider responses into the crate's error taxonomy.
///
/// Authentication is HTTP Basic, rebuilt from the connection credentials on
/// every request; the pod does not hand out session tokens. Response headers
/// are returned alongside the decoded body because resource-creation
/// responses carry the new resource's location in a header rather than the
/// body.
pub struct RedfishClient {
    http_client: Client,
    connection: Arc<PodConnection>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl std::fmt::Debug for RedfishClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedfishClient")
            .field("connection", &self.connection)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

impl RedfishClient {
    /// Creates a new `RedfishClient`.
    ///
    /// # Errors
    /// Returns `RsdError::Connection` if the HTTP client cannot be built.
    pub fn new(connection: PodConnection, config: &ClientConfig) -> RsdResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .build()
            .map_err(|e| RsdError::Connection(e.to_string()))?;

        let rate_limiter = config.rate_limit.map(|rl| {
            let quota = Quota::per_second(
                NonZeroU32::new(rl.requests_per_second).unwrap_or(NonZeroU32::MIN),
            )
            .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
            Arc::new(RateLimiter::direct(quota))
        });

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            rate_limiter,
        })
    }

    /// Performs an authenticated GET request, returning the decoded body.
    pub async fn get(&self, path: &str) -> RsdResult<Value> {
        self.execute_request(Method::GET, path, None)
            .await
            .map(|(body, _)| body)
    }

    /// Performs an authenticated POST request.
    ///
    /// Returns the decoded body together with the response headers; the
    /// composition endpoint reports the new node's path in `Location`.
    pub async fn post(&self, path: &str, body: Option<&Value>) -> RsdResult<(Value, HeaderMap)> {
        self.execute_request(Method::POST, path, body).await
    }

    /// Performs an authenticated PATCH request with a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> RsdResult<Value> {
        self.execute_request(Method::PATCH, path, Some(body))
            .await
            .map(|(decoded, _)| decoded)
    }

    /// Performs an authenticated DELETE request.
    ///
    /// A 404 is treated as success so that deleting an already-missing
    /// resource stays idempotent.
    pub async fn delete(&self, path: &str) -> RsdResult<()> {
        match self.execute_request(Method::DELETE, path, None).await {
            Ok(_) => Ok(()),
            Err(RsdError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Core request execution: applies rate limiting, sends the request with
    /// Basic authentication, and translates the response.
    async fn execute_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> RsdResult<(Value, HeaderMap)> {
        if let Some(limiter) = &self.rate_limiter {
            // `until_ready()` completes when capacity is available.
            limiter.until_ready().await;
        }

        let base = self.connection.pod_url().as_inner().await;
        let url = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        let username = self.connection.pod_username().as_inner().await;
        let password = self.connection.pod_password().as_inner().await;

        let mut req_builder = self
            .http_client
            .request(method, &url)
            .basic_auth(username, Some(password))
            .header(USER_AGENT, "rsd-pod")
            .header(CONTENT_TYPE, "application/json; charset=utf-8");

        if let Some(body) = body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| RsdError::Connection(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| RsdError::Connection(format!("Failed to read response body: {}", e)))?;

        // The pod signals an allocation conflict with a 409 whose payload
        // embeds a structured error object.
        if status == StatusCode::CONFLICT {
            return Err(RsdError::ResourceExhausted(error_message_from_text(&text)));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(RsdError::NotFound(format!(
                "{} ({})",
                path,
                error_message_from_text(&text)
            )));
        }

        if !status.is_success() {
            return Err(RsdError::Connection(format!(
                "Pod API error ({}): {}",
                status,
                error_message_from_text(&text)
            )));
        }

        // Action endpoints reply with an empty body.
        if text.trim().is_empty() {
            return Ok((Value::Null, headers));
        }

        let decoded: Value = serde_json::from_str(&text)
            .map_err(|e| RsdError::Connection(format!("Failed to parse response: {}", e)))?;

        // Some firmware reports failures inside a 2xx body.
        if decoded.get("error").is_some() {
            return Err(RsdError::Action(extract_error_message(&decoded)));
        }

        Ok((decoded, headers))
    }
}

/// Joins the human messages of a redfish error object
/// (`error["@Message.ExtendedInfo"][].Message`, falling back to
/// `error.message`).
fn extract_error_message(body: &Value) -> String {
    let Some(error) = body.get("error") else {
        return "unknown error reported by pod".to_string();
    };

    let joined = error
        .get("@Message.ExtendedInfo")
        .and_then(Value::as_array)
        .map(|infos| {
            infos
                .iter()
                .filter_map(|info| info.get("Message").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    if !joined.is_empty() {
        return joined;
    }

    error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error reported by pod")
        .to_string()
}

fn error_message_from_text(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(body) if body.get("error").is_some() => extract_error_message(&body),
        _ if text.trim().is_empty() => "no error detail provided".to_string(),
        _ => text.trim().to_string(),
    }
}
