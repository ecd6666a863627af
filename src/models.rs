// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Wire types exchanged with the issue tracker.
///
/// Only the fields the chores read are modelled; unknown fields in tracker
/// payloads are ignored during deserialization.
use serde::{Deserialize, Serialize};

/// Issue label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Label
{
    /// Label text.
    pub name: String,
}

/// Open/closed state shared by issues and milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(rename_all = "lowercase")]
pub enum IssueState
{
    /// Still open.
    Open,
    /// Closed.
    Closed,
}

/// Issue (or pull request, which shares the numbering space).
#[derive(Debug, Clone, Serialize, Deserialize,)]
pub struct Issue
{
    pub number:       u64,
    pub title:        String,
    #[serde(default)]
    pub body:         Option<String,>,
    pub state:        IssueState,
    #[serde(default)]
    pub labels:       Vec<Label,>,
    #[serde(default)]
    pub html_url:     Option<String,>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value,>,
}

impl Issue
{
    /// Pull requests are listed alongside issues but carry this marker.
    pub fn is_pull_request(&self,) -> bool
    {
        self.pull_request.is_some()
    }

    /// Reports whether the issue already carries `name`.
    pub fn has_label(&self, name: &str,) -> bool
    {
        self.labels.iter().any(|label| label.name == name,)
    }
}

/// Dated grouping of issues.
#[derive(Debug, Clone, Serialize, Deserialize,)]
pub struct Milestone
{
    pub number:      u64,
    pub title:       String,
    #[serde(default)]
    pub description: Option<String,>,
    #[serde(default)]
    pub due_on:      Option<String,>,
    pub state:       IssueState,
}

/// Payload for issue creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct NewIssue
{
    pub title:  String,
    pub body:   String,
    pub labels: Vec<String,>,
}

/// Payload for issue updates; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize,)]
pub struct IssueUpdate
{
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body:   Option<String,>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String,>,>,
}

/// Filters for issue listings.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct IssueQuery
{
    /// Comma separated label names.
    pub labels:    Option<String,>,
    /// Login of the issue author.
    pub creator:   Option<String,>,
    /// `open`, `closed` or `all`; the tracker defaults to `open`.
    pub state:     Option<String,>,
    /// Milestone number.
    pub milestone: Option<u64,>,
    /// Page size, at most 100.
    pub per_page:  u8,
}

impl IssueQuery
{
    /// Query with the maximal page size and no filters.
    pub fn new() -> Self
    {
        Self {
            per_page: 100, ..Self::default()
        }
    }

    pub fn labels(mut self, labels: impl Into<String,>,) -> Self
    {
        self.labels = Some(labels.into(),);
        self
    }

    pub fn creator(mut self, creator: impl Into<String,>,) -> Self
    {
        self.creator = Some(creator.into(),);
        self
    }

    pub fn state(mut self, state: impl Into<String,>,) -> Self
    {
        self.state = Some(state.into(),);
        self
    }

    pub fn milestone(mut self, milestone: u64,) -> Self
    {
        self.milestone = Some(milestone,);
        self
    }

    /// Encodes the filters plus `page` as query pairs.
    pub fn to_pairs(&self, page: u32,) -> Vec<(String, String,),>
    {
        let mut pairs = Vec::with_capacity(6,);
        if let Some(labels,) = &self.labels {
            pairs.push(("labels".to_owned(), labels.clone(),),);
        }
        if let Some(creator,) = &self.creator {
            pairs.push(("creator".to_owned(), creator.clone(),),);
        }
        if let Some(state,) = &self.state {
            pairs.push(("state".to_owned(), state.clone(),),);
        }
        if let Some(milestone,) = self.milestone {
            pairs.push(("milestone".to_owned(), milestone.to_string(),),);
        }
        pairs.push(("per_page".to_owned(), self.per_page.to_string(),),);
        pairs.push(("page".to_owned(), page.to_string(),),);
        pairs
    }
}

/// Filters for milestone listings, always sorted by due date descending.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct MilestoneQuery
{
    pub state:    String,
    pub per_page: u8,
}

impl MilestoneQuery
{
    pub fn to_pairs(&self, page: u32,) -> Vec<(String, String,),>
    {
        vec![
            ("state".to_owned(), self.state.clone(),),
            ("sort".to_owned(), "due_on".to_owned(),),
            ("direction".to_owned(), "desc".to_owned(),),
            ("per_page".to_owned(), self.per_page.to_string(),),
            ("page".to_owned(), page.to_string(),),
        ]
    }
}
