//! GSTPro API client
//!
//! Every call goes through the same [`Pipeline`]: [`BearerAuth`] gates it on
//! the stored session, the transport sends it, and [`StatusNotifier`] reports
//! failures to the UI. Resource methods live in the submodules.

pub mod auth;
pub mod business_profiles;
pub mod config;
pub mod customers;
pub mod error;
pub mod exports;
pub mod interceptors;
pub mod invoices;
pub mod middleware;
pub mod products;
pub mod reports;
pub mod session;
pub mod token;
pub mod transport;
pub mod ui;

use bytes::Bytes;
use config::{join_api_url, ClientConfig, DEFAULT_API_PREFIX};
use error::ClientError;
use interceptors::{BearerAuth, StatusNotifier};
use middleware::{ApiRequest, Pipeline, RequestInterceptor, ResponseInterceptor};
use serde::de::DeserializeOwned;
use session::{MemorySessionStore, SessionGuard, SessionStore};
use std::sync::Arc;
use std::time::Duration;
use token::Clock;
use tracing::{error, instrument};
use transport::{ReqwestTransport, Transport};
use ui::{HeadlessNavigator, Navigator, Notifier, TracingNotifier};

/// List window; the server defaults to the first 100 rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    fn apply(self, request: ApiRequest) -> ApiRequest {
        request.query("skip", self.skip).query("limit", self.limit)
    }
}

/// GSTPro API client
#[derive(Clone)]
pub struct InvoiceClient {
    api_url: String,
    transport: Arc<dyn Transport>,
    pipeline: Pipeline,
    session: Arc<SessionGuard>,
}

impl InvoiceClient {
    /// Client with default collaborators against `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> InvoiceClientBuilder {
        InvoiceClientBuilder::default()
    }

    /// Base URL including the API prefix
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn session(&self) -> &SessionGuard {
        &self.session
    }

    /// Run a request through the pipeline
    #[instrument(name = "api_request", skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<middleware::ApiResponse, ClientError> {
        self.pipeline
            .run(self.transport.as_ref(), &self.api_url, request)
            .await
    }

    /// Send and decode a JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        response.json().map_err(|e| {
            error!(%path, "Failed to decode response: {e}");
            ClientError::Serialization(e)
        })
    }

    /// Send and return the raw body
    pub async fn execute_bytes(&self, request: ApiRequest) -> Result<Bytes, ClientError> {
        Ok(self.send(request).await?.body)
    }
}

impl std::fmt::Debug for InvoiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoiceClient")
            .field("api_url", &self.api_url)
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}

/// Builder for InvoiceClient
#[derive(Default)]
pub struct InvoiceClientBuilder {
    base_url: Option<String>,
    api_prefix: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    transport: Option<Arc<dyn Transport>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl InvoiceClientBuilder {
    /// Take connection settings from a loaded config
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.api_prefix = Some(config.api_prefix.clone());
        self.timeout = config.timeout();
        self.user_agent = Some(config.user_agent.clone());
        self
    }

    /// Set the server origin
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the `/api/v1` prefix
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the reqwest transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Extra request interceptor, run after the bearer check
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Extra response interceptor, run after status notification
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<InvoiceClient, ClientError> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let api_url = join_api_url(
            &base_url,
            self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX),
        );

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::new(self.timeout, self.user_agent.as_deref())
                    .map_err(|e| ClientError::Configuration(e.to_string()))?,
            ),
        };

        let mut guard = SessionGuard::new(
            self.store
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            self.navigator.unwrap_or_else(|| Arc::new(HeadlessNavigator::default())),
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
        );
        if let Some(clock) = self.clock {
            guard = guard.with_clock(clock);
        }
        let session = Arc::new(guard);

        let mut pipeline = Pipeline::new()
            .before(Arc::new(BearerAuth::new(session.clone())))
            .after(Arc::new(StatusNotifier::new(session.clone())));
        for interceptor in self.request_interceptors {
            pipeline = pipeline.before(interceptor);
        }
        for interceptor in self.response_interceptors {
            pipeline = pipeline.after(interceptor);
        }

        Ok(InvoiceClient {
            api_url,
            transport,
            pipeline,
            session,
        })
    }
}

fn id_path(collection: &str, id: i64) -> String {
    format!("/{collection}/{id}")
}

/// Validate a month number before it is sent as a query parameter
fn check_month(month: u32) -> Result<(), ClientError> {
    let mut errors = gstpro_core::ValidationErrors::new();
    errors.check(gstpro_core::validation::validators::validate_month(month));
    errors.into_result().map_err(ClientError::from)
}
