//! Network transport behind the middleware pipeline

use crate::client::middleware::{ApiRequest, ApiResponse, Body};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;

/// Default user agent sent by [`ReqwestTransport`]
pub const DEFAULT_USER_AGENT: &str = "gstpro-client/0.1.0";

/// A request that produced no HTTP response
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };
        Self {
            message,
            source: Some(Box::new(err)),
        }
    }
}

/// Sends a fully prepared request and returns whatever the server answered
///
/// Implementations report an `Err` only when no response was received; every
/// HTTP status, including errors, is an `Ok`.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport: Send + Sync {
    async fn send(&self, base_url: &str, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport on top of reqwest
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>, user_agent: Option<&str>) -> Result<Self, TransportError> {
        let mut builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;

        builder = builder.user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Transport for ReqwestTransport {
    async fn send(&self, base_url: &str, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{base_url}{}", request.path);
        let mut builder = self
            .client
            .request(request.method, url)
            .headers(request.headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
