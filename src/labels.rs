// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Product team labels for issues opened by stakeholders.
///
/// A CSV roster maps each stakeholder's tracker login to a product team.
/// Every open issue created by a listed login receives the team label
/// unless it already carries it. Teams without a matching repository label
/// are reported instead of labeled.
use std::{collections::BTreeMap, fmt::Write as _};

use tracing::{debug, info, warn};

use crate::{
    batch::ProgressCounter,
    error::Error,
    executor::RequestExecutor,
    models::IssueQuery,
    tracker::IssueTracker,
};

/// One roster row.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct TeamMember
{
    pub name:     String,
    pub team:     String,
    pub username: String,
}

/// Parses `name,team,username` rows.
///
/// Blank lines and the header row (starting with `Name`) are skipped; extra
/// columns are ignored.
///
/// # Errors
///
/// Returns [`Error::Validation`] for rows with fewer than three columns or
/// an empty team or username.
///
/// # Example
///
/// ```
/// use calcite_chores::parse_team_roster;
///
/// let roster = parse_team_roster("Name,Team,GitHub\nAda Lovelace,Analytics,ada\n",)?;
/// assert_eq!(roster[0].team, "Analytics");
/// # Ok::<(), calcite_chores::Error>(())
/// ```
pub fn parse_team_roster(csv: &str,) -> Result<Vec<TeamMember,>, Error,>
{
    let mut members = Vec::new();

    for (index, row,) in csv.lines().enumerate() {
        let row = row.trim_end_matches('\r',);
        if row.trim().is_empty() || row.starts_with("Name",) {
            continue;
        }

        let columns: Vec<&str,> = row.split(',',).map(str::trim,).collect();
        let [name, team, username, ..] = columns.as_slice() else {
            return Err(Error::validation(format!(
                "roster line {} must have name, team and username columns",
                index + 1
            ),),);
        };
        if team.is_empty() || username.is_empty() {
            return Err(Error::validation(format!(
                "roster line {} has an empty team or username",
                index + 1
            ),),);
        }

        members.push(TeamMember {
            name:     (*name).to_owned(),
            team:     (*team).to_owned(),
            username: (*username).to_owned(),
        },);
    }

    Ok(members,)
}

/// Issue that received a team label.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct LabeledIssue
{
    pub number:   u64,
    pub team:     String,
    pub html_url: Option<String,>,
}

/// Outcome of [`apply_team_labels`].
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct TeamLabelReport
{
    pub labeled:        Vec<LabeledIssue,>,
    /// Teams without a repository label, in roster order.
    pub missing_labels: Vec<String,>,
}

impl TeamLabelReport
{
    /// Human readable summary listing labeled issues and missing labels.
    pub fn render(&self, repository: &str,) -> String
    {
        let mut text = String::new();
        let _ = writeln!(text, "Added labels to the following {} issues:", self.labeled.len());
        for issue in &self.labeled {
            let url = issue.html_url.clone().unwrap_or_else(|| {
                format!("https://github.com/{repository}/issues/{}", issue.number)
            },);
            let _ = writeln!(text, "{url}");
        }

        if !self.missing_labels.is_empty() {
            let _ = writeln!(
                text,
                "\nThe {} product team names below do not have a matching label. Add the label (or fix the roster spelling) and rerun:",
                self.missing_labels.len()
            );
            for team in &self.missing_labels {
                let _ = writeln!(text, "{team}");
            }
        }
        text
    }
}

/// Adds each member's team label to their open issues.
///
/// Each team label is looked up once. Rows whose team has no label are
/// skipped and the team is reported. `counter` is incremented per label
/// added.
///
/// # Errors
///
/// Propagates the first tracker failure other than a missing label.
pub async fn apply_team_labels<E: RequestExecutor,>(
    tracker: &IssueTracker<E,>,
    roster: &[TeamMember],
    counter: &ProgressCounter,
) -> Result<TeamLabelReport, Error,>
{
    let mut report = TeamLabelReport::default();
    let mut label_exists: BTreeMap<&str, bool,> = BTreeMap::new();

    for member in roster {
        let exists = match label_exists.get(member.team.as_str(),) {
            Some(exists,) => *exists,
            None => {
                let exists = tracker.get_label(&member.team,).await?.is_some();
                if !exists {
                    warn!("No label named '{}' in {}", member.team, tracker.full_name());
                    report.missing_labels.push(member.team.clone(),);
                }
                label_exists.insert(&member.team, exists,);
                exists
            }
        };
        if !exists {
            debug!("Skipping {} ({}): team label missing", member.name, member.username);
            continue;
        }

        let query = IssueQuery::new().state("open",).creator(&member.username,);
        let issues = tracker.list_all_issues(&query,).await?;
        debug!("{} has {} open issue(s)", member.username, issues.len());

        for issue in issues.iter().filter(|issue| !issue.has_label(&member.team,),) {
            tracker.add_labels(issue.number, std::slice::from_ref(&member.team,),).await?;
            counter.increment();
            report.labeled.push(LabeledIssue {
                number:   issue.number,
                team:     member.team.clone(),
                html_url: issue.html_url.clone(),
            },);
        }
    }

    info!(
        "Labeled {} issue(s); {} team label(s) missing",
        report.labeled.len(),
        report.missing_labels.len()
    );
    Ok(report,)
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

    const ROSTER: &str = "Name,Product Team,GitHub Username
Ada Lovelace,Analytics,ada

Grace Hopper,Compilers,grace
Alan Turing,Analytics,alan
";

    #[test]
    fn roster_skips_header_and_blank_lines()
    {
        let roster = parse_team_roster(ROSTER,).expect("valid roster",);
        assert_eq!(roster.len(), 3);
        assert_eq!(roster[1], TeamMember {
            name:     "Grace Hopper".to_owned(),
            team:     "Compilers".to_owned(),
            username: "grace".to_owned(),
        });
    }

    #[test]
    fn short_rows_are_rejected()
    {
        let error = parse_team_roster("Ada,Analytics\n",).expect_err("short row",);
        assert!(matches!(error, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn labels_unlabeled_issues_and_reports_missing_teams()
    {
        let roster = parse_team_roster(ROSTER,).expect("valid roster",);
        let executor = ScriptedExecutor::new()
            // ada: Analytics exists, two open issues, one already labeled
            .respond_json(200, json!({"name": "Analytics"}),)
            .respond_json(
                200,
                json!([
                    issue_json(10, "open", &["bug"], None),
                    issue_json(11, "open", &["Analytics"], None)
                ]),
            )
            .respond_json(200, json!([{"name": "bug"}, {"name": "Analytics"}]),)
            // grace: Compilers missing
            .respond(404, r#"{"message":"Not Found"}"#,)
            // alan: Analytics already checked
            .respond_json(200, json!([issue_json(12, "open", &[], None)]),)
            .respond_json(200, json!([{"name": "Analytics"}]),);
        let tracker = IssueTracker::new(&executor, "Esri", "calcite-design-system",);
        let counter = ProgressCounter::new();

        let report = apply_team_labels(&tracker, &roster, &counter,).await.expect("labeling",);

        let numbers: Vec<u64,> = report.labeled.iter().map(|issue| issue.number,).collect();
        assert_eq!(numbers, vec![10, 12]);
        assert_eq!(report.missing_labels, vec!["Compilers".to_owned()]);
        assert_eq!(counter.get(), 2);

        let requests = executor.requests();
        assert_eq!(requests.len(), 6);
        assert_eq!(requests[2].method, Method::Post);
        assert_eq!(requests[2].path, "/repos/Esri/calcite-design-system/issues/10/labels");
        assert!(requests[4].query.contains(&("creator".to_owned(), "alan".to_owned())));

        let text = report.render("Esri/calcite-design-system",);
        assert!(text.contains("https://github.com/Esri/calcite-design-system/issues/12"));
        assert!(text.contains("Compilers"));
    }
}
