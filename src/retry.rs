// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Rate-limit aware retry policy for tracker calls.
///
/// [`Throttled`] decorates any [`RequestExecutor`]. Primary rate limits
/// (request quota exhausted) are retried after the delay announced by the
/// server, up to [`RetryConfig::max_retries`] times per logical call.
/// Secondary rate limits (abuse detection) are never retried.
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    config::ThrottleConfig,
    error::Error,
    executor::{ApiRequest, ApiResponse, RequestExecutor},
};

/// Configuration for rate-limit retries.
#[derive(Debug, Clone,)]
pub struct RetryConfig
{
    /// Maximum number of retries after a primary rate limit (default: 5).
    pub max_retries:        u32,
    /// Fail with [`Error::SecondaryRateLimit`] instead of returning the
    /// throttled response unchanged (default: true).
    pub abort_on_secondary: bool,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_retries: 5, abort_on_secondary: true,
        }
    }
}

impl From<&ThrottleConfig,> for RetryConfig
{
    fn from(config: &ThrottleConfig,) -> Self
    {
        Self {
            max_retries:        config.max_retries,
            abort_on_secondary: config.abort_on_secondary,
        }
    }
}

/// Throttling signal carried by a tracker response.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub enum RateLimitSignal
{
    /// Request quota exhausted; retry after the given delay.
    Primary
    {
        retry_after: Duration,
    },
    /// Abuse detection triggered; must not be retried.
    Secondary
    {
        retry_after: Option<Duration,>,
    },
}

/// Classifies a response as a rate-limit signal.
///
/// Only 403 and 429 responses can carry a signal. A body mentioning a
/// secondary rate limit or abuse detection is secondary; otherwise an
/// exhausted `x-ratelimit-remaining` header, or any 429, is primary.
/// `now` is the current time in epoch seconds, used to turn
/// `x-ratelimit-reset` into a delay.
pub fn classify(response: &ApiResponse, now: u64,) -> Option<RateLimitSignal,>
{
    if response.status != 403 && response.status != 429 {
        return None;
    }

    let body = response.body.to_ascii_lowercase();
    if body.contains("secondary rate limit",) || body.contains("abuse",) {
        return Some(RateLimitSignal::Secondary {
            retry_after: response.retry_after.map(Duration::from_secs,),
        },);
    }

    if response.rate_limit_remaining == Some(0,) || response.status == 429 {
        let seconds = response
            .retry_after
            .or_else(|| response.rate_limit_reset.map(|reset| reset.saturating_sub(now,),),)
            .unwrap_or(0,);
        return Some(RateLimitSignal::Primary {
            retry_after: Duration::from_secs(seconds,),
        },);
    }

    None
}

/// [`RequestExecutor`] decorator applying the rate-limit policy.
#[derive(Debug,)]
pub struct Throttled<E,>
{
    inner:   E,
    config:  RetryConfig,
    retries: AtomicU64,
}

impl<E: RequestExecutor,> Throttled<E,>
{
    pub fn new(inner: E, config: RetryConfig,) -> Self
    {
        Self {
            inner, config, retries: AtomicU64::new(0,),
        }
    }

    /// Total primary rate-limit retries issued by this client so far.
    pub fn total_retries(&self,) -> u64
    {
        self.retries.load(Ordering::Relaxed,)
    }
}

impl<E: RequestExecutor,> RequestExecutor for Throttled<E,>
{
    async fn execute(&self, request: &ApiRequest,) -> Result<ApiResponse, Error,>
    {
        let mut retry_count = 0u32;

        loop {
            let response = self.inner.execute(request,).await?;

            match classify(&response, epoch_seconds(),) {
                None => return Ok(response,),
                Some(RateLimitSignal::Secondary {
                    ..
                },) => {
                    warn!("SecondaryRateLimit detected for request {}", request.describe());
                    if self.config.abort_on_secondary {
                        return Err(Error::SecondaryRateLimit {
                            method: request.method.as_str().to_owned(),
                            path:   request.path.clone(),
                        },);
                    }
                    return Ok(response,);
                }
                Some(RateLimitSignal::Primary {
                    retry_after,
                },) => {
                    warn!("Request quota exhausted for request {}", request.describe());

                    if retry_count >= self.config.max_retries {
                        return Err(Error::RateLimited {
                            method:  request.method.as_str().to_owned(),
                            path:    request.path.clone(),
                            retries: retry_count,
                        },);
                    }

                    info!("Retrying after {} seconds!", retry_after.as_secs());
                    sleep(retry_after,).await;
                    retry_count += 1;
                    self.retries.fetch_add(1, Ordering::Relaxed,);
                }
            }
        }
    }
}

fn epoch_seconds() -> u64
{
    SystemTime::now().duration_since(UNIX_EPOCH,).map(|elapsed| elapsed.as_secs(),).unwrap_or(0,)
}
