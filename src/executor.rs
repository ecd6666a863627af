// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Request execution against the issue tracker REST API.
///
/// [`RequestExecutor`] is the seam every tracker call goes through. The
/// production implementation wraps [`Octocrab`] and keeps the raw status and
/// rate-limit headers visible so that [`crate::retry::Throttled`] can wrap it.
use std::future::Future;

use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;

/// HTTP methods used by the chores.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum Method
{
    Get,
    Post,
    Patch,
}

impl Method
{
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

/// Single REST call relative to the configured base URL.
#[derive(Debug, Clone, PartialEq,)]
pub struct ApiRequest
{
    pub method: Method,
    /// Absolute path such as `/repos/owner/repo/issues`.
    pub path:   String,
    /// Unencoded query pairs.
    pub query:  Vec<(String, String,),>,
    pub body:   Option<serde_json::Value,>,
}

impl ApiRequest
{
    pub fn get(path: impl Into<String,>,) -> Self
    {
        Self {
            method: Method::Get, path: path.into(), query: Vec::new(), body: None,
        }
    }

    pub fn post(path: impl Into<String,>, body: serde_json::Value,) -> Self
    {
        Self {
            method: Method::Post, path: path.into(), query: Vec::new(), body: Some(body,),
        }
    }

    pub fn patch(path: impl Into<String,>, body: serde_json::Value,) -> Self
    {
        Self {
            method: Method::Patch, path: path.into(), query: Vec::new(), body: Some(body,),
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String,),>,) -> Self
    {
        self.query = query;
        self
    }

    /// Path plus percent-encoded query string.
    pub fn uri(&self,) -> String
    {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = self
            .query
            .iter()
            .map(|(key, value,)| {
                format!("{}={}", urlencoding::encode(key,), urlencoding::encode(value,))
            },)
            .collect::<Vec<_,>>()
            .join("&",);
        format!("{}?{}", self.path, query)
    }

    /// `METHOD /path`, used in throttling diagnostics.
    pub fn describe(&self,) -> String
    {
        format!("{} {}", self.method.as_str(), self.path)
    }
}

/// Status, rate-limit headers and body of a tracker response.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct ApiResponse
{
    pub status:               u16,
    /// `retry-after` header in seconds.
    pub retry_after:          Option<u64,>,
    /// `x-ratelimit-remaining` header.
    pub rate_limit_remaining: Option<u64,>,
    /// `x-ratelimit-reset` header, epoch seconds.
    pub rate_limit_reset:     Option<u64,>,
    pub body:                 String,
}

impl ApiResponse
{
    pub fn is_success(&self,) -> bool
    {
        (200..300).contains(&self.status,)
    }

    /// Extracts the tracker's `message` field, falling back to the raw body.
    pub fn message(&self,) -> String
    {
        serde_json::from_str::<serde_json::Value,>(&self.body,)
            .ok()
            .and_then(|value| value.get("message",).and_then(|m| m.as_str(),).map(str::to_owned,),)
            .unwrap_or_else(|| self.body.trim().to_owned(),)
    }

    /// Converts a non-success status into [`Error::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for any status outside `200..300`.
    pub fn error_for_status(self,) -> Result<Self, Error,>
    {
        if self.is_success() {
            Ok(self,)
        } else {
            Err(Error::Api {
                status: self.status, message: self.message(),
            },)
        }
    }

    /// Decodes a successful response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for non-success statuses and [`Error::Json`]
    /// when the body does not match `T`.
    pub fn json<T: DeserializeOwned,>(self,) -> Result<T, Error,>
    {
        let response = self.error_for_status()?;
        Ok(serde_json::from_str(&response.body,)?,)
    }
}

/// Capability to perform one tracker request.
///
/// Implementations must not retry on their own; retry policy belongs to
/// [`crate::retry::Throttled`].
pub trait RequestExecutor
{
    fn execute(&self, request: &ApiRequest,) -> impl Future<Output = Result<ApiResponse, Error,>,>;
}

impl<E: RequestExecutor,> RequestExecutor for &E
{
    async fn execute(&self, request: &ApiRequest,) -> Result<ApiResponse, Error,>
    {
        (**self).execute(request,).await
    }
}

/// [`RequestExecutor`] backed by an authenticated [`Octocrab`] client.
#[derive(Debug, Clone,)]
pub struct OctocrabExecutor
{
    client: Octocrab,
}

impl OctocrabExecutor
{
    /// Builds a client for `base_url` authenticated with `token`.
    ///
    /// The client's own retry layer is disabled: every [`ApiRequest`] is
    /// sent exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Service`] when the base URL is invalid or the client
    /// cannot be constructed.
    pub fn new(base_url: &str, token: &str,) -> Result<Self, Error,>
    {
        let client = Octocrab::builder()
            .add_retry_config(RetryConfig::None,)
            .base_uri(base_url,)
            .map_err(|e| Error::service(format!("invalid tracker base URL {base_url}: {e}"),),)?
            .personal_token(token.to_owned(),)
            .build()
            .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            client,
        },)
    }
}

impl RequestExecutor for OctocrabExecutor
{
    async fn execute(&self, request: &ApiRequest,) -> Result<ApiResponse, Error,>
    {
        let uri = request.uri();
        debug!("{} {}", request.method.as_str(), uri);

        let response = match request.method {
            Method::Get => self.client._get(uri,).await?,
            Method::Post => self.client._post(uri, request.body.as_ref(),).await?,
            Method::Patch => self.client._patch(uri, request.body.as_ref(),).await?,
        };

        let status = response.status().as_u16();
        let header = |name: &str| {
            response
                .headers()
                .get(name,)
                .and_then(|value| value.to_str().ok(),)
                .and_then(|value| value.trim().parse::<u64,>().ok(),)
        };
        let retry_after = header("retry-after",);
        let rate_limit_remaining = header("x-ratelimit-remaining",);
        let rate_limit_reset = header("x-ratelimit-reset",);

        let body = self.client.body_to_string(response,).await?;

        Ok(ApiResponse {
            status,
            retry_after,
            rate_limit_remaining,
            rate_limit_reset,
            body,
        },)
    }
}
