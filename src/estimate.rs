// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Milestone effort totals derived from `estimate - N` issue labels.
///
/// Milestones are listed newest due date first, every issue of each
/// milestone is paged through and the first estimate label of an issue is
/// added to the remaining (open) or completed (closed) bucket. The result is
/// an ordered map so that serializing unchanged data twice yields identical
/// bytes.
use std::{collections::BTreeMap, fmt::Write as _, fs, path::Path, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    batch::ProgressCounter,
    config::{EstimatesConfig, MilestoneStateFilter},
    error::{Error, io_error},
    executor::RequestExecutor,
    models::{IssueQuery, IssueState, Milestone, MilestoneQuery},
    tracker::IssueTracker,
};

/// Label pattern honored by default: `estimate - 3`, `Estimate-13`, ...
pub const DEFAULT_ESTIMATE_PATTERN: &str = r"(?i)^\s*estimate\s*-\s*(\d+)\s*$";

/// CSV header written by [`render_csv`].
pub const CSV_HEADER: &str = "milestone,title,due_on,open_issues,closed_issues,issues_with_estimate,remaining_estimate,completed_estimate";

/// Compiled estimate label pattern.
#[derive(Debug, Clone,)]
pub struct EstimateParser
{
    pattern: Regex,
}

impl EstimateParser
{
    /// Compiles `pattern`; its first capture group must hold the number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for invalid expressions or expressions
    /// without a capture group.
    pub fn new(pattern: &str,) -> Result<Self, Error,>
    {
        let pattern = Regex::new(pattern,)
            .map_err(|e| Error::validation(format!("invalid estimate label pattern: {e}"),),)?;

        if pattern.captures_len() < 2 {
            return Err(Error::validation(
                "estimate label pattern must contain a capture group for the number",
            ),);
        }

        Ok(Self {
            pattern,
        },)
    }

    /// Extracts the estimate from a single label.
    pub fn parse(&self, label: &str,) -> Option<u32,>
    {
        self.pattern.captures(label,)?.get(1,)?.as_str().parse().ok()
    }

    /// Estimate of the first matching label; later matches are ignored.
    pub fn first_estimate<'a,>(&self, labels: impl IntoIterator<Item = &'a str,>,) -> Option<u32,>
    {
        labels.into_iter().find_map(|label| self.parse(label,),)
    }
}

fn default_parser() -> Option<&'static EstimateParser,>
{
    static PARSER: OnceLock<Option<EstimateParser,>,> = OnceLock::new();
    PARSER.get_or_init(|| EstimateParser::new(DEFAULT_ESTIMATE_PATTERN,).ok(),).as_ref()
}

/// Parses a label with [`DEFAULT_ESTIMATE_PATTERN`].
///
/// # Example
///
/// ```
/// use calcite_chores::parse_estimate_label;
///
/// assert_eq!(parse_estimate_label("estimate - 8"), Some(8));
/// assert_eq!(parse_estimate_label("needs estimate"), None);
/// ```
pub fn parse_estimate_label(label: &str,) -> Option<u32,>
{
    default_parser().and_then(|parser| parser.parse(label,),)
}

/// Aggregated counts for one milestone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,)]
pub struct MilestoneEstimate
{
    pub title:                String,
    pub description:          Option<String,>,
    pub due_on:               Option<String,>,
    pub open_issues:          u32,
    pub closed_issues:        u32,
    pub issues_with_estimate: u32,
    pub remaining_estimate:   u64,
    pub completed_estimate:   u64,
}

impl MilestoneEstimate
{
    fn from_milestone(milestone: &Milestone,) -> Self
    {
        Self {
            title: milestone.title.clone(),
            description: milestone.description.clone(),
            due_on: milestone.due_on.clone(),
            ..Self::default()
        }
    }

    /// Counts one issue and its optional estimate.
    pub fn record(&mut self, state: IssueState, estimate: Option<u32,>,)
    {
        match state {
            IssueState::Open => self.open_issues += 1,
            IssueState::Closed => self.closed_issues += 1,
        }

        if let Some(points,) = estimate {
            self.issues_with_estimate += 1;
            match state {
                IssueState::Open => self.remaining_estimate += u64::from(points,),
                IssueState::Closed => self.completed_estimate += u64::from(points,),
            }
        }
    }
}

/// Milestone number to totals, ascending.
pub type MilestoneEstimates = BTreeMap<u64, MilestoneEstimate,>;

/// Milestone selection for [`aggregate_estimates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct MilestoneSelection
{
    pub state:     MilestoneStateFilter,
    pub per_page:  u8,
    pub max_pages: u32,
}

impl From<&EstimatesConfig,> for MilestoneSelection
{
    fn from(config: &EstimatesConfig,) -> Self
    {
        Self {
            state: config.state, per_page: config.per_page, max_pages: config.max_pages,
        }
    }
}

/// Lists the most recent milestones, at most `max_pages` pages.
///
/// # Errors
///
/// Returns [`Error::NoMilestones`] when nothing matches the state filter.
pub async fn list_recent_milestones<E: RequestExecutor,>(
    tracker: &IssueTracker<E,>,
    selection: MilestoneSelection,
) -> Result<Vec<Milestone,>, Error,>
{
    let query = MilestoneQuery {
        state: selection.state.as_str().to_owned(), per_page: selection.per_page,
    };

    let mut milestones = Vec::new();
    for page in 1..=selection.max_pages.max(1,) {
        let batch = tracker.list_milestones(&query, page,).await?;
        let count = batch.len();
        milestones.extend(batch,);

        if count < usize::from(selection.per_page,) {
            break;
        }
    }

    if milestones.is_empty() {
        return Err(Error::NoMilestones {
            state: query.state,
        },);
    }

    debug!("Found {} {} milestone(s)", milestones.len(), query.state);
    Ok(milestones,)
}

/// Computes per-milestone estimate totals.
///
/// `counter` is incremented once per fully aggregated milestone.
///
/// # Errors
///
/// Returns [`Error::NoMilestones`] when no milestone matches and propagates
/// tracker failures.
///
/// # Example
///
/// ```no_run
/// use calcite_chores::{
///     EstimateParser, IssueTracker, MilestoneSelection, MilestoneStateFilter, OctocrabExecutor,
///     ProgressCounter, aggregate_estimates,
/// };
///
/// # async fn example() -> Result<(), calcite_chores::Error> {
/// let executor = OctocrabExecutor::new("https://api.github.com", "token",)?;
/// let tracker = IssueTracker::new(executor, "Esri", "calcite-design-system",);
/// let parser = EstimateParser::new(calcite_chores::DEFAULT_ESTIMATE_PATTERN,)?;
/// let selection = MilestoneSelection {
///     state: MilestoneStateFilter::Closed, per_page: 16, max_pages: 1,
/// };
/// let totals = aggregate_estimates(&tracker, selection, &parser, &ProgressCounter::new(),).await?;
/// println!("{} milestones", totals.len());
/// # Ok(())
/// # }
/// ```
pub async fn aggregate_estimates<E: RequestExecutor,>(
    tracker: &IssueTracker<E,>,
    selection: MilestoneSelection,
    parser: &EstimateParser,
    counter: &ProgressCounter,
) -> Result<MilestoneEstimates, Error,>
{
    let milestones = list_recent_milestones(tracker, selection,).await?;
    info!("Aggregating estimates for {} milestone(s)", milestones.len());

    let mut totals = MilestoneEstimates::new();
    for milestone in &milestones {
        let query = IssueQuery::new().state("all",).milestone(milestone.number,);
        let issues = tracker.list_all_issues(&query,).await?;

        let entry = totals
            .entry(milestone.number,)
            .or_insert_with(|| MilestoneEstimate::from_milestone(milestone,),);
        for issue in issues.iter().filter(|issue| !issue.is_pull_request(),) {
            let estimate = parser.first_estimate(issue.labels.iter().map(|label| label.name.as_str(),),);
            entry.record(issue.state, estimate,);
        }

        debug!(
            "Milestone {} ({}): {} open, {} closed",
            milestone.number, milestone.title, entry.open_issues, entry.closed_issues
        );
        counter.increment();
    }

    Ok(totals,)
}

/// Pretty JSON object keyed by milestone number.
///
/// # Errors
///
/// Returns [`Error::Json`] when serialization fails.
pub fn render_json(totals: &MilestoneEstimates,) -> Result<String, Error,>
{
    let mut json = serde_json::to_string_pretty(totals,)?;
    json.push('\n',);
    Ok(json,)
}

fn csv_field(value: &str,) -> String
{
    if value.contains([',', '"', '\n', '\r',],) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// Flattened table, one row per milestone under [`CSV_HEADER`].
pub fn render_csv(totals: &MilestoneEstimates,) -> String
{
    let mut csv = String::from(CSV_HEADER,);
    csv.push('\n',);

    for (number, estimate,) in totals {
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{},{}",
            number,
            csv_field(&estimate.title,),
            csv_field(estimate.due_on.as_deref().unwrap_or_default(),),
            estimate.open_issues,
            estimate.closed_issues,
            estimate.issues_with_estimate,
            estimate.remaining_estimate,
            estimate.completed_estimate
        );
    }

    csv
}

/// Writes [`render_json`] output to `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written.
pub fn write_json(path: &Path, totals: &MilestoneEstimates,) -> Result<(), Error,>
{
    let json = render_json(totals,)?;
    fs::write(path, json,).map_err(|source| io_error(path, source,),)?;
    info!("Wrote {}", path.display());
    Ok((),)
}

/// Writes [`render_csv`] output to `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written.
pub fn write_csv(path: &Path, totals: &MilestoneEstimates,) -> Result<(), Error,>
{
    fs::write(path, render_csv(totals,),).map_err(|source| io_error(path, source,),)?;
    info!("Wrote {}", path.display());
    Ok((),)
}
