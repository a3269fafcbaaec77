//! MovieRama API clients.
//!
//! `ApiContext` owns the HTTP client, the endpoint builder and a handle on the
//! shared session. Requests under the authenticated base path get the session
//! token attached as a bearer credential; public requests never carry it.

pub mod auth;
pub mod endpoint;
pub mod error;
pub mod movies;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

pub use auth::{AuthClient, LoginResponse, RegisterRequest};
pub use endpoint::{Endpoints, ListingScope, resolve_listing_endpoint};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use movies::{Feed, MovieClient};

use crate::config::Config;
use crate::session::SessionState;

/// Standard User-Agent header for MovieRama API requests.
pub const USER_AGENT: &str = concat!("movierama/", env!("CARGO_PKG_VERSION"));

/// Everything a client needs to talk to the API.
#[derive(Debug, Clone)]
pub struct ApiContext {
    http: reqwest::Client,
    endpoints: Endpoints,
    session: SessionState,
}

impl ApiContext {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoints: Endpoints,
        session: SessionState,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build().context("build HTTP client")?;

        Ok(Self {
            http,
            endpoints,
            session,
        })
    }

    /// Builds a context from config, resolving the API URL with
    /// `override_url` taking precedence.
    ///
    /// # Errors
    /// Returns an error if the API URL is invalid or the HTTP client cannot be built.
    pub fn from_config(
        config: &Config,
        override_url: Option<&str>,
        session: SessionState,
    ) -> Result<Self> {
        let api_url = config.resolve_api_url(override_url)?;
        let endpoints = Endpoints::new(&api_url)?;
        Self::new(endpoints, session, config.connect_timeout())
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> ApiResult<T> {
        let body = self.send(Method::GET, url, None::<&()>).await?;
        decode(&body, what)
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<String> {
        self.send(Method::POST, url, body).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> ApiResult<String> {
        let authenticated = self.endpoints.is_authenticated(&url);
        tracing::debug!(%method, path = url.path(), query = ?url.query(), authenticated, "api request");

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        request = match body {
            Some(body) => request.json(body),
            None => request.header(CONTENT_TYPE, HeaderValue::from_static("application/json")),
        };
        if authenticated {
            request = self.authorize(request);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!(%method, path = url.path(), error = %err, "api request failed");
            ApiError::transport(&err)
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::transport(&err))?;

        if !status.is_success() {
            let err = ApiError::http_status(status.as_u16(), &text);
            tracing::warn!(%method, path = url.path(), status = status.as_u16(), reason = %err.message, "api error response");
            return Err(err);
        }

        tracing::debug!(%method, path = url.path(), status = status.as_u16(), "api response");
        Ok(text)
    }

    /// Attaches the session token, if any.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str, what: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|err| ApiError::parse(what, &err))
}
