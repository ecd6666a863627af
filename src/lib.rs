//! Maintenance chores for a web component library and its issue tracker.
//!
//! The library bundles the jobs maintainers run by hand: rendering demo
//! pages and review checklists from the component source tree, auditing
//! CSS custom property documentation, bulk creating and updating tracker
//! issues under the tracker's rate limits, aggregating milestone estimates
//! from issue labels and labeling stakeholder issues with product teams.
//! Every tracker call flows through [`RequestExecutor`], so the rate-limit
//! policy in [`Throttled`] applies uniformly and tests can script responses.

mod batch;
mod checklist;
mod components;
mod config;
mod css_audit;
mod error;
mod estimate;
mod executor;
mod labels;
mod models;
mod progress;
mod retry;
mod templates;
#[cfg(test)]
mod test_support;
mod tracker;

pub use batch::{
    AppendChecklist, BatchContext, CreateComponentIssue, IssueMutation, ProgressCounter, WorkItem,
    compose_body, run_batch,
};
pub use checklist::{assign_reviewers, render_checklist, write_checklist};
pub use components::{filter_skipped, list_components};
pub use config::{
    AuditConfig, BodyMode, ChecklistConfig, ComponentsConfig, DEFAULT_SKIP, EstimatesConfig,
    HtmlConfig, IssueTemplateConfig, MilestoneStateFilter, PUBLIC_API_URL, TOKEN_ENV,
    TeamLabelsConfig, ThrottleConfig, TrackerConfig, UpdateConfig, WorkflowConfig, load_config,
    parse_config,
};
pub use css_audit::{
    ComponentAudit, audit_components, audit_stylesheet, render_audit_table, write_audit,
};
pub use error::{Error, io_error};
pub use estimate::{
    CSV_HEADER, DEFAULT_ESTIMATE_PATTERN, EstimateParser, MilestoneEstimate, MilestoneEstimates,
    MilestoneSelection, aggregate_estimates, list_recent_milestones, parse_estimate_label,
    render_csv, render_json, write_csv, write_json,
};
pub use executor::{ApiRequest, ApiResponse, Method, OctocrabExecutor, RequestExecutor};
pub use labels::{LabeledIssue, TeamLabelReport, TeamMember, apply_team_labels, parse_team_roster};
pub use models::{
    Issue, IssueQuery, IssueState, IssueUpdate, Label, Milestone, MilestoneQuery, NewIssue,
};
pub use progress::{ProgressReporter, SIGNAL_EXIT_CODE, install_termination_hook};
pub use retry::{RateLimitSignal, RetryConfig, Throttled, classify};
pub use templates::{render_component_page, write_component_pages};
pub use tracker::IssueTracker;
