//! Request/response middleware
//!
//! Every call runs through a [`Pipeline`]: request interceptors in order, the
//! transport, then response interceptors in order. Interceptors see plain
//! request and response values and never touch reqwest directly.

use crate::client::error::{CancelReason, ClientError};
use crate::client::transport::Transport;
use bytes::Bytes;
use http::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(JsonValue),
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(String, String)>),
}

/// Outgoing API call, relative to the API base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API prefix, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter when a value is present
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.body = Body::Json(serde_json::to_value(payload)?);
        Ok(self)
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Body::Form(
            fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self
    }

    /// Set `Authorization: Bearer <token>`
    pub fn with_bearer(mut self, token: &str) -> Result<Self, InvalidHeaderValue> {
        self.set_bearer(token)?;
        Ok(self)
    }

    pub fn set_bearer(&mut self, token: &str) -> Result<(), InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    pub fn has_authorization(&self) -> bool {
        self.headers.contains_key(AUTHORIZATION)
    }
}

/// Response as received from the transport
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON; an empty body decodes as `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.body.is_empty() {
            serde_json::from_value(JsonValue::Null)
        } else {
            serde_json::from_slice(&self.body)
        }
    }
}

/// Decision of a request interceptor
#[derive(Debug)]
pub enum RequestOutcome {
    Proceed(ApiRequest),
    Cancel(CancelReason),
}

/// Runs before a request reaches the transport
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: ApiRequest) -> RequestOutcome;
}

/// Runs after the transport, on the response or the failure
///
/// Cancelled requests pass through the response chain too, so interceptors
/// must leave [`ClientError::RequestCancelled`] alone.
pub trait ResponseInterceptor: Send + Sync {
    fn intercept(&self, result: Result<ApiResponse, ClientError>) -> Result<ApiResponse, ClientError>;
}

/// Ordered interceptor chain
#[derive(Clone, Default)]
pub struct Pipeline {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request interceptor
    pub fn before(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request.push(interceptor);
        self
    }

    /// Append a response interceptor
    pub fn after(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response.push(interceptor);
        self
    }

    /// Run `request` through the chain and the transport
    ///
    /// Non-2xx statuses come back as errors; the response body is left for the
    /// caller to decode.
    pub async fn run(
        &self,
        transport: &dyn Transport,
        base_url: &str,
        request: ApiRequest,
    ) -> Result<ApiResponse, ClientError> {
        let mut outcome = RequestOutcome::Proceed(request);
        for interceptor in &self.request {
            outcome = match outcome {
                RequestOutcome::Proceed(request) => interceptor.intercept(request),
                cancelled @ RequestOutcome::Cancel(_) => cancelled,
            };
        }

        let mut result = match outcome {
            RequestOutcome::Proceed(request) => {
                debug!(method = %request.method, path = %request.path, "Sending request");
                match transport.send(base_url, request).await {
                    Ok(response) if response.is_success() => Ok(response),
                    Ok(response) => Err(ClientError::from_response(response.status, &response.body)),
                    Err(e) => Err(ClientError::NetworkUnreachable(e)),
                }
            }
            RequestOutcome::Cancel(reason) => {
                debug!(%reason, "Request cancelled before sending");
                Err(ClientError::RequestCancelled(reason))
            }
        };

        for interceptor in &self.response {
            result = interceptor.intercept(result);
        }
        result
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .finish()
    }
}
