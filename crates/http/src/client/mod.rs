//! CareerPath API client

pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
mod gateway;
pub mod notifications;
pub mod predictions;
pub mod request;
pub mod session;
pub mod storage;

use error::ClientError;
use gateway::SingleFlight;
use request::ApiRequest;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use session::SessionSignal;
use std::sync::Arc;
use std::time::Duration;
use storage::TokenStore;
use tracing::debug;

/// Default per-request timeout, refresh calls included
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// CareerPath API client
///
/// Cheap to clone; clones share the token store, the session signal and the
/// refresh coordination, so one instance should be created by the
/// application and handed to everything that talks to the API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    session: SessionSignal,
    refresh: SingleFlight,
}

impl ApiClient {
    /// Create a new client with in-memory token storage
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Token store backing this client
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// Session signal the application shell can subscribe to
    pub fn session(&self) -> &SessionSignal {
        &self.inner.session
    }

    /// Whether an access token is currently stored
    pub fn is_authenticated(&self) -> bool {
        self.inner.tokens.access().is_some()
    }

    /// Execute a protected request and decode its JSON body
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.send(&request).await?;
        Ok(response.json().await?)
    }

    /// Execute a protected request and discard its body
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.send(&request).await?;
        Ok(())
    }

    /// Execute a public request and decode its JSON body
    pub async fn execute_public<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.send_public(&request).await?;
        Ok(response.json().await?)
    }

    /// Execute a public request and discard its body
    pub async fn execute_public_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.send_public(&request).await?;
        Ok(())
    }

    /// Send a request without credentials and without 401 recovery
    pub async fn send_public(&self, request: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let response = self.dispatch(request, None).await?;
        ensure_success(response).await
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        debug!(
            method = %request.method(),
            path = request.path(),
            authenticated = access.is_some(),
            "Dispatching request"
        );
        let builder = request.build(&self.inner.client, &self.inner.base_url, access)?;
        Ok(builder.send().await?)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("tokens", &self.inner.tokens)
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into the matching error
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::from_response(response).await)
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    tokens: Option<TokenStore>,
    session: Option<SessionSignal>,
}

impl ApiClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
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

    /// Use an existing token store
    pub fn token_store(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Publish session events on an existing signal
    pub fn session_signal(mut self, session: SessionSignal) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("careerpath-client/{}", env!("CARGO_PKG_VERSION")));

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(user_agent)
            .build()?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                client,
                base_url,
                tokens: self.tokens.unwrap_or_default(),
                session: self.session.unwrap_or_default(),
                refresh: SingleFlight::default(),
            }),
        })
    }
}
