//! HTTP gateway to the movie catalog API.
//!
//! Every public operation issues at most one request (except
//! [`ApiClient::favorite_movies`], which composes two) and hands back an
//! already-normalized value or an [`ApiError`].

mod auth;
mod movies;
mod users;

use reqwest::{header, Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use crate::config::{Config, FavoritesRoute};
use crate::error::{ApiError, ApiResult};
use crate::normalize::Normalizer;
use crate::session::SessionStore;

const USER_AGENT: &str = concat!("myflix-client/", env!("CARGO_PKG_VERSION"));

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    favorites_route: FavoritesRoute,
    normalizer: Normalizer,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &Config, session: SessionStore) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Unknown(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: config.api_url.clone(),
            favorites_route: config.favorites_route,
            normalizer: Normalizer::new(config.field_aliases.clone()),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Unknown(format!("API URL {} cannot take a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches the stored bearer token, if there is one.
    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.current_token() {
            Some(token) => request.header(header::AUTHORIZATION, token),
            None => request,
        }
    }

    /// Fails before touching the network when no token is stored.
    fn require_token(&self) -> ApiResult<()> {
        if self.session.current_token().is_none() {
            tracing::debug!("No token stored, refusing authenticated request");
            return Err(ApiError::Auth("You must be logged in".to_string()));
        }
        Ok(())
    }

    /// The stored username for user-scoped endpoints.
    fn require_username(&self) -> ApiResult<String> {
        let username = self.session.current_username().ok_or(ApiError::NoSession)?;
        self.require_token()?;
        Ok(username)
    }

    /// Sends the request and returns the body as JSON.
    ///
    /// Empty bodies come back as `Null` and non-JSON text as a JSON string.
    async fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request failed before a response: {e}");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!("{url} returned {status}");
            return Err(ApiError::from_status(status, &body));
        }

        tracing::debug!("{url} returned {status} ({} bytes)", body.len());
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str::<Value>(&body) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(body)),
        }
    }
}
