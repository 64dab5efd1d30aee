//! Authenticated request pipeline.
//!
//! Every request goes through [`ApiClient::send`], which
//!
//! 1. attaches the stored access token as a bearer credential,
//! 2. returns any non-401 response untouched,
//! 3. on a 401, repairs the session once through the
//!    [`RefreshCoordinator`] and replays the request with the new token.
//!
//! The refresh call itself is issued on the raw HTTP client and never passes
//! through `send`, so a rejected refresh cannot trigger another refresh.

mod http;
mod request;

pub use http::{build_http_client, install_rustls_provider};
pub use request::ApiRequest;

use std::fmt;
use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::credentials::{TokenPair, TokenStore};
use crate::error::{ApiError, RefreshError, Result};
use crate::models::{RefreshTokenRequest, TokenResponse};
use crate::navigation::{LoggingNavigator, Navigator};
use crate::refresh::{Entry, RefreshCoordinator, RefreshLease};

/// Path of the credential refresh endpoint, relative to the API base.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// HTTP client for the Backend API.
///
/// Cloning is cheap; clones share the credential store and the refresh
/// coordinator.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    refresh_url: Url,
    tokens: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
    navigator: Arc<dyn Navigator>,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    tokens: Option<TokenStore>,
    navigator: Option<Arc<dyn Navigator>>,
    coordinator: Option<Arc<RefreshCoordinator>>,
    http: Option<reqwest::Client>,
}

impl ApiClientBuilder {
    /// Credential store. Defaults to an in-memory store.
    pub fn tokens(mut self, tokens: TokenStore) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Login redirect target. Defaults to [`LoggingNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Refresh coordinator. Defaults to a fresh coordinator owned by this client.
    pub fn coordinator(mut self, coordinator: Arc<RefreshCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Use a preconfigured `reqwest::Client` instead of building one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let http = match self.http {
            Some(http) => http,
            None => build_http_client(&self.config)?,
        };
        let refresh_url = self.config.endpoint(REFRESH_PATH)?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                refresh_url,
                tokens: self.tokens.unwrap_or_else(TokenStore::in_memory),
                coordinator: self.coordinator.unwrap_or_default(),
                navigator: self
                    .navigator
                    .unwrap_or_else(|| Arc::new(LoggingNavigator)),
                config: self.config,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            tokens: None,
            navigator: None,
            coordinator: None,
            http: None,
        }
    }

    /// Client with an in-memory store and the default navigator.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    /// Send a request through the authenticated pipeline.
    ///
    /// Returns the response for every status except 401, including
    /// application errors. A 401 is repaired by at most one refresh per
    /// request; if the replayed request is rejected again the call fails with
    /// [`ApiError::Unauthorized`].
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, mut request: ApiRequest) -> Result<Response> {
        let mut bearer = self.inner.tokens.access_token()?;

        loop {
            let response = self.dispatch(&request, bearer.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            if request.retried {
                debug!("Request rejected again after refresh");
                return Err(unauthorized(response).await);
            }

            request.retried = true;
            bearer = Some(self.recover(response).await?);
        }
    }

    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Response> {
        let mut url = self.inner.config.endpoint(&request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut headers = request.headers.clone();
        if bearer.is_some() {
            headers.remove(AUTHORIZATION);
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .headers(headers);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        debug!(status = %response.status(), retried = request.retried, "Response received");
        Ok(response)
    }

    /// Obtain a fresh access token after `rejected` came back 401.
    async fn recover(&self, rejected: Response) -> Result<String> {
        match self.inner.coordinator.enter() {
            Entry::Waiter(waiter) => {
                debug!("Waiting for in-flight token refresh");
                Ok(waiter.wait().await?)
            }
            Entry::Leader(lease) => self.lead_refresh(lease, rejected).await,
        }
    }

    async fn lead_refresh(&self, lease: RefreshLease<'_>, rejected: Response) -> Result<String> {
        let refresh_token = match self.inner.tokens.refresh_token() {
            Ok(Some(token)) => token,
            Ok(None) => {
                info!("No refresh token stored, ending session");
                lease.reject(&RefreshError::MissingRefreshToken, || self.teardown());
                return Err(unauthorized(rejected).await);
            }
            Err(e) => {
                warn!(error = %e, "Failed to read refresh token, ending session");
                lease.reject(&RefreshError::Store(e.to_string()), || self.teardown());
                return Err(e.into());
            }
        };

        info!("Access token rejected, refreshing credentials");

        let pair = match self.request_refresh(&refresh_token).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                lease.reject(&e, || self.teardown());
                return Err(e.into());
            }
        };

        let tokens = &self.inner.tokens;
        let persisted = lease.resolve(
            &pair.access_token,
            || {
                tokens
                    .set_tokens(&pair)
                    .map_err(|e| RefreshError::Store(e.to_string()))
            },
            || self.teardown(),
        );

        match persisted {
            Ok(resumed) => {
                info!(resumed, "Token refresh succeeded");
                Ok(pair.access_token)
            }
            Err(RefreshError::SessionClosed) => {
                debug!("Session closed during refresh, dropping new credentials");
                self.discard_rotated(&pair);
                Err(RefreshError::SessionClosed.into())
            }
            Err(e) => {
                warn!(error = %e, "Failed to store refreshed credentials, session ended");
                Err(e.into())
            }
        }
    }

    /// Remove `pair` from the store if a logout raced its persistence.
    ///
    /// Credentials from a later login differ, so those are left alone.
    fn discard_rotated(&self, pair: &TokenPair) {
        let tokens = &self.inner.tokens;
        match tokens.refresh_token() {
            Ok(Some(stored)) if stored == pair.refresh_token => {
                if let Err(e) = tokens.clear() {
                    warn!(error = %e, "Failed to discard credentials of a closed session");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to inspect stored credentials"),
        }
    }

    /// `POST {base}/auth/refresh`, bypassing the pipeline.
    async fn request_refresh(&self, refresh_token: &str) -> std::result::Result<TokenPair, RefreshError> {
        let response = self
            .inner
            .http
            .post(self.inner.refresh_url.clone())
            .json(&RefreshTokenRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected { status, body });
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(RefreshError::InvalidResponse("empty token in response".into()));
        }

        Ok(tokens.into_pair())
    }

    /// Clear the credential store and send the user to the login page.
    fn teardown(&self) {
        if let Err(e) = self.inner.tokens.clear() {
            warn!(error = %e, "Failed to clear credentials during teardown");
        }
        self.inner.navigator.redirect(&self.inner.config.login_path);
    }

    // ========== Typed helpers ==========

    /// Send `request` and decode a JSON success body.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = ensure_success(self.send(request).await?).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send `request` and discard the success body.
    pub async fn execute_unit(&self, request: ApiRequest) -> Result<()> {
        ensure_success(self.send(request).await?).await?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).json(body)?).await
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn unauthorized(response: Response) -> ApiError {
    ApiError::Unauthorized {
        body: response.text().await.unwrap_or_default(),
    }
}

/// Turn a non-2xx response into [`ApiError::Status`].
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}
