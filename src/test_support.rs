// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Scripted tracker used by unit tests.
use std::{collections::VecDeque, sync::Mutex};

use crate::{
    error::Error,
    executor::{ApiRequest, ApiResponse, RequestExecutor},
};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default,)]
pub struct ScriptedExecutor
{
    responses: Mutex<VecDeque<ApiResponse,>,>,
    fallback:  Option<ApiResponse,>,
    requests:  Mutex<Vec<ApiRequest,>,>,
}

impl ScriptedExecutor
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn push(self, response: ApiResponse,) -> Self
    {
        self.responses.lock().expect("responses lock",).push_back(response,);
        self
    }

    pub fn respond(self, status: u16, body: &str,) -> Self
    {
        self.push(ApiResponse {
            status, body: body.to_owned(), ..ApiResponse::default()
        },)
    }

    pub fn respond_json(self, status: u16, body: serde_json::Value,) -> Self
    {
        self.respond(status, &body.to_string(),)
    }

    /// Response returned once the queue is drained.
    pub fn fallback(mut self, response: ApiResponse,) -> Self
    {
        self.fallback = Some(response,);
        self
    }

    pub fn calls(&self,) -> usize
    {
        self.requests.lock().expect("requests lock",).len()
    }

    pub fn requests(&self,) -> Vec<ApiRequest,>
    {
        self.requests.lock().expect("requests lock",).clone()
    }
}

impl RequestExecutor for ScriptedExecutor
{
    async fn execute(&self, request: &ApiRequest,) -> Result<ApiResponse, Error,>
    {
        self.requests.lock().expect("requests lock",).push(request.clone(),);
        let next = self.responses.lock().expect("responses lock",).pop_front();
        next.or_else(|| self.fallback.clone(),)
            .ok_or_else(|| Error::service(format!("no scripted response for {}", request.describe()),),)
    }
}

/// Primary rate limit response with an immediate retry.
pub fn primary_limited() -> ApiResponse
{
    ApiResponse {
        status:               403,
        retry_after:          Some(0,),
        rate_limit_remaining: Some(0,),
        rate_limit_reset:     None,
        body:                 r#"{"message":"API rate limit exceeded"}"#.to_owned(),
    }
}

/// Secondary rate limit response.
pub fn secondary_limited() -> ApiResponse
{
    ApiResponse {
        status:               403,
        retry_after:          Some(60,),
        rate_limit_remaining: Some(4_000,),
        rate_limit_reset:     None,
        body:                 r#"{"message":"You have exceeded a secondary rate limit. Please wait a few minutes before you try again."}"#
            .to_owned(),
    }
}

/// Minimal issue payload as returned by the tracker.
pub fn issue_json(number: u64, state: &str, labels: &[&str], body: Option<&str,>,) -> serde_json::Value
{
    serde_json::json!({
        "number": number,
        "title": format!("issue {number}"),
        "body": body,
        "state": state,
        "labels": labels.iter().map(|name| serde_json::json!({"name": name})).collect::<Vec<_,>>(),
    })
}
