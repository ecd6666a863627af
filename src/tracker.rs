// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Typed issue, milestone and label operations for one repository.
///
/// [`IssueTracker`] translates each operation into an [`ApiRequest`] and
/// decodes the response. Rate limiting is not handled here; wrap the
/// executor in [`crate::retry::Throttled`] for that.
use serde_json::json;
use tracing::debug;

use crate::{
    error::Error,
    executor::{ApiRequest, RequestExecutor},
    models::{Issue, IssueQuery, IssueUpdate, Label, Milestone, MilestoneQuery, NewIssue},
};

/// Client bound to a single `owner/repository`.
#[derive(Debug,)]
pub struct IssueTracker<E,>
{
    executor:   E,
    owner:      String,
    repository: String,
}

impl<E: RequestExecutor,> IssueTracker<E,>
{
    pub fn new(executor: E, owner: impl Into<String,>, repository: impl Into<String,>,) -> Self
    {
        Self {
            executor, owner: owner.into(), repository: repository.into(),
        }
    }

    /// `owner/repository`.
    pub fn full_name(&self,) -> String
    {
        format!("{}/{}", self.owner, self.repository)
    }

    fn repo_path(&self, suffix: &str,) -> String
    {
        format!(
            "/repos/{}/{}/{}",
            urlencoding::encode(&self.owner,),
            urlencoding::encode(&self.repository,),
            suffix
        )
    }

    /// Creates an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for rejected payloads and propagates executor
    /// failures.
    pub async fn create_issue(&self, issue: &NewIssue,) -> Result<Issue, Error,>
    {
        let request = ApiRequest::post(self.repo_path("issues",), serde_json::to_value(issue,)?,);
        let created: Issue = self.executor.execute(&request,).await?.json()?;
        debug!("Created issue #{} in {}", created.number, self.full_name());
        Ok(created,)
    }

    /// Updates the body and/or labels of an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for unknown issues or rejected payloads.
    pub async fn update_issue(&self, number: u64, update: &IssueUpdate,) -> Result<Issue, Error,>
    {
        let request = ApiRequest::patch(
            self.repo_path(&format!("issues/{number}"),),
            serde_json::to_value(update,)?,
        );
        let updated: Issue = self.executor.execute(&request,).await?.json()?;
        debug!("Updated issue #{} in {}", updated.number, self.full_name());
        Ok(updated,)
    }

    /// Fetches one page of issues (1-based `page`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] or [`Error::Json`] when the listing fails.
    pub async fn list_issues(&self, query: &IssueQuery, page: u32,) -> Result<Vec<Issue,>, Error,>
    {
        let request = ApiRequest::get(self.repo_path("issues",),).with_query(query.to_pairs(page,),);
        self.executor.execute(&request,).await?.json()
    }

    /// Fetches every page of issues, stopping at the first short page.
    ///
    /// # Errors
    ///
    /// Propagates the first failing page.
    pub async fn list_all_issues(&self, query: &IssueQuery,) -> Result<Vec<Issue,>, Error,>
    {
        let per_page = usize::from(query.per_page.max(1,),);
        let mut issues = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.list_issues(query, page,).await?;
            let count = batch.len();
            issues.extend(batch,);

            if count < per_page {
                break;
            }
            page += 1;
        }

        debug!("Listed {} issues across {} page(s)", issues.len(), page);
        Ok(issues,)
    }

    /// Fetches one page of milestones sorted by due date, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] or [`Error::Json`] when the listing fails.
    pub async fn list_milestones(
        &self,
        query: &MilestoneQuery,
        page: u32,
    ) -> Result<Vec<Milestone,>, Error,>
    {
        let request =
            ApiRequest::get(self.repo_path("milestones",),).with_query(query.to_pairs(page,),);
        self.executor.execute(&request,).await?.json()
    }

    /// Looks up a label by name; `None` when the repository lacks it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] for failures other than 404.
    pub async fn get_label(&self, name: &str,) -> Result<Option<Label,>, Error,>
    {
        let request =
            ApiRequest::get(self.repo_path(&format!("labels/{}", urlencoding::encode(name,)),),);
        let response = self.executor.execute(&request,).await?;

        if response.status == 404 {
            debug!("Label '{}' not found in {}", name, self.full_name());
            return Ok(None,);
        }

        Ok(Some(response.json()?,),)
    }

    /// Adds labels to an issue, keeping the existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the tracker rejects the request.
    pub async fn add_labels(&self, number: u64, labels: &[String],) -> Result<Vec<Label,>, Error,>
    {
        let request = ApiRequest::post(
            self.repo_path(&format!("issues/{number}/labels"),),
            json!({ "labels": labels }),
        );
        self.executor.execute(&request,).await?.json()
    }
}

#[cfg(test)]
mod tests
{
    use serde_json::json;

    use super::*;
    use crate::{
        executor::Method,
        test_support::{ScriptedExecutor, issue_json},
    };

    fn page_of(start: u64, count: u64,) -> serde_json::Value
    {
        serde_json::Value::Array(
            (start..start + count).map(|number| issue_json(number, "open", &[], None,),).collect(),
        )
    }

    #[tokio::test]
    async fn create_issue_posts_payload()
    {
        let executor = ScriptedExecutor::new().respond_json(201, issue_json(12, "open", &["figma"], Some("b"),),);
        let tracker = IssueTracker::new(&executor, "Esri", "calcite-design-system",);

        let issue = tracker
            .create_issue(&NewIssue {
                title:  "[button] Figma v2 design".to_owned(),
                body:   "b".to_owned(),
                labels: vec!["figma".to_owned()],
            },)
            .await
            .expect("issue should be created",);

        assert_eq!(issue.number, 12);
        let requests = executor.requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, "/repos/Esri/calcite-design-system/issues");
        let body = requests[0].body.as_ref().expect("payload",);
        assert_eq!(body["labels"], json!(["figma"]));
    }

    #[tokio::test]
    async fn update_issue_patches_by_number()
    {
        let executor = ScriptedExecutor::new().respond_json(200, issue_json(7, "open", &[], Some("new"),),);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        let update = IssueUpdate {
            body: Some("new".to_owned(),), labels: None,
        };
        tracker.update_issue(7, &update,).await.expect("update should succeed",);

        let request = &executor.requests()[0];
        assert_eq!(request.method, Method::Patch);
        assert_eq!(request.path, "/repos/o/r/issues/7");
        assert_eq!(request.body, Some(json!({"body": "new"})));
    }

    #[tokio::test]
    async fn list_all_issues_stops_on_short_page()
    {
        let executor = ScriptedExecutor::new()
            .respond_json(200, page_of(1, 2,),)
            .respond_json(200, page_of(3, 2,),)
            .respond_json(200, page_of(5, 1,),);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        let query = IssueQuery {
            per_page: 2, ..IssueQuery::new()
        };
        let issues = tracker.list_all_issues(&query,).await.expect("listing should succeed",);

        assert_eq!(issues.len(), 5);
        assert_eq!(executor.calls(), 3);
        let last = &executor.requests()[2];
        assert!(last.query.contains(&("page".to_owned(), "3".to_owned())));
    }

    #[tokio::test]
    async fn list_all_issues_handles_empty_repository()
    {
        let executor = ScriptedExecutor::new().respond_json(200, json!([]),);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        let issues = tracker.list_all_issues(&IssueQuery::new(),).await.expect("listing",);
        assert!(issues.is_empty());
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn get_label_maps_404_to_none()
    {
        let executor = ScriptedExecutor::new()
            .respond(404, r#"{"message":"Not Found"}"#,)
            .respond_json(200, json!({"name": "Team Alpha"}),);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        assert!(tracker.get_label("missing",).await.expect("lookup",).is_none());
        let label = tracker.get_label("Team Alpha",).await.expect("lookup",).expect("present",);
        assert_eq!(label.name, "Team Alpha");
        assert_eq!(executor.requests()[1].path, "/repos/o/r/labels/Team%20Alpha");
    }

    #[tokio::test]
    async fn api_failures_propagate_status()
    {
        let executor = ScriptedExecutor::new().respond(422, r#"{"message":"Validation Failed"}"#,);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        let error = tracker
            .add_labels(1, &["x".to_owned()],)
            .await
            .expect_err("should fail",);
        match error {
            Error::Api {
                status,
                message,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Validation Failed");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_labels_posts_label_list()
    {
        let executor = ScriptedExecutor::new().respond_json(200, json!([{"name": "bug"}, {"name": "x"}]),);
        let tracker = IssueTracker::new(&executor, "o", "r",);

        let labels = tracker.add_labels(3, &["x".to_owned()],).await.expect("labels",);
        assert_eq!(labels.len(), 2);
        let request = &executor.requests()[0];
        assert_eq!(request.path, "/repos/o/r/issues/3/labels");
        assert_eq!(request.body, Some(json!({"labels": ["x"]})));
    }
}
