//! Configuration document describing every chore.
//!
//! The types in this module mirror the YAML document accepted through
//! `--config`. Each section defaults to the constants the maintainers use for
//! the component library, so an empty document (or no document at all) yields
//! a working configuration. Overrides supplied on the command line are applied
//! by the CLI after loading.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Error, io_error};

/// Public tracker endpoint.
pub const PUBLIC_API_URL: &str = "https://api.github.com";

/// Environment variable consulted for the access token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Components that are never processed by any chore.
pub const DEFAULT_SKIP: &[&str] = &[
    "functional",
    "color-picker-hex-input",
    "color-picker-swatch",
    "date-picker-day",
    "date-picker-month",
    "date-picker-month-header",
    "graph",
    "handle",
    "sortable-list",
];

const DEFAULT_ISSUE_BODY: &str = "## Description
Create a Figma v2 design for {component}.

## Requirements
> Designer should fill in what needs to be done (variants, themes, RTL, etc).

## Checklist
> Designer should fill in the general checklist that will be created.";

const REVIEW_CHECKLIST: &str = "- [ ] Structure matches web component
- [ ] Props match web component
    - [ ] Props are in alphabetical order
    - [ ] Default prop value is first
    - [ ] Boolean props are always default false
- [ ] Slots are represented
- [ ] Meets naming conventions
- [ ] Styles are matched
- [ ] Behavior is correct
- [ ] Page format
    - [ ] Primary variant is top left
    - [ ] Variant labels
    - [ ] Documentation notes
";

/// Root configuration document.
///
/// # Examples
///
/// ```
/// use calcite_chores::WorkflowConfig;
///
/// let yaml = r#"
/// tracker:
///   owner: octocat
///   repository: hello-world
/// issues:
///   delay_ms: 500
/// "#;
/// let config: WorkflowConfig = serde_yaml::from_str(yaml,).expect("valid configuration",);
/// assert_eq!(config.tracker.owner, "octocat");
/// assert_eq!(config.issues.delay_ms, 500);
/// assert_eq!(config.throttle.max_retries, 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize,)]
#[serde(default)]
pub struct WorkflowConfig
{
    /// Target tracker and repository.
    pub tracker:     TrackerConfig,
    /// Rate-limit policy.
    pub throttle:    ThrottleConfig,
    /// Component directory scanning.
    pub components:  ComponentsConfig,
    /// Issue creation chore.
    pub issues:      IssueTemplateConfig,
    /// Issue update chore.
    pub update:      UpdateConfig,
    /// Milestone estimate chore.
    pub estimates:   EstimatesConfig,
    /// Review checklist chore.
    pub checklist:   ChecklistConfig,
    /// Demo page chore.
    pub html:        HtmlConfig,
    /// Style variable audit chore.
    pub audit:       AuditConfig,
    /// Product team labeling chore.
    pub team_labels: TeamLabelsConfig,
}

/// Tracker endpoint and repository coordinates.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct TrackerConfig
{
    /// REST base URL; an enterprise deployment ends with `/api/v3`.
    pub base_url:   String,
    /// User or organization owning the repository.
    pub owner:      String,
    /// Repository name.
    pub repository: String,
}

impl Default for TrackerConfig
{
    fn default() -> Self
    {
        Self {
            base_url:   PUBLIC_API_URL.to_owned(),
            owner:      "Esri".to_owned(),
            repository: "calcite-design-system".to_owned(),
        }
    }
}

/// Rate-limit handling applied to every tracker call.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct ThrottleConfig
{
    /// Retries allowed per request when the primary quota is exhausted.
    pub max_retries:        u32,
    /// Abort the whole run as soon as a secondary rate limit is detected.
    pub abort_on_secondary: bool,
}

impl Default for ThrottleConfig
{
    fn default() -> Self
    {
        Self {
            max_retries: 5, abort_on_secondary: true,
        }
    }
}

/// Location and naming of the component sources.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct ComponentsConfig
{
    /// Directory whose immediate children are the components.
    pub path:   String,
    /// Custom element prefix, e.g. `calcite` for `<calcite-button>`.
    pub prefix: String,
    /// Component directories excluded from every chore.
    pub skip:   Vec<String,>,
}

impl Default for ComponentsConfig
{
    fn default() -> Self
    {
        Self {
            path:   "calcite-design-system/packages/calcite-components/src/components".to_owned(),
            prefix: "calcite".to_owned(),
            skip:   DEFAULT_SKIP.iter().map(|name| (*name).to_owned(),).collect(),
        }
    }
}

/// Templates used when creating one issue per component.
///
/// `{component}` is replaced with the component name in both templates.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct IssueTemplateConfig
{
    /// Issue title template.
    pub title:    String,
    /// Issue body template.
    pub body:     String,
    /// Labels applied to every created issue.
    pub labels:   Vec<String,>,
    /// Pause between two creations, in milliseconds.
    pub delay_ms: u64,
}

impl Default for IssueTemplateConfig
{
    fn default() -> Self
    {
        Self {
            title:    "[{component}] Figma v2 design".to_owned(),
            body:     DEFAULT_ISSUE_BODY.to_owned(),
            labels:   vec!["figma".to_owned()],
            delay_ms: 2000,
        }
    }
}

impl IssueTemplateConfig
{
    /// Renders the title for a component.
    pub fn render_title(&self, component: &str,) -> String
    {
        self.title.replace("{component}", component,)
    }

    /// Renders the body for a component.
    pub fn render_body(&self, component: &str,) -> String
    {
        self.body.replace("{component}", component,)
    }
}

/// How an update combines the existing body with the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum BodyMode
{
    /// Keep the existing body and append the new text after a blank line.
    Append,
    /// Discard the existing body.
    Replace,
}

/// Settings for bulk issue updates.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct UpdateConfig
{
    /// Labels set on every updated issue; the first one selects the issues.
    pub labels:   Vec<String,>,
    /// Text appended to (or replacing) the issue body.
    pub body:     String,
    /// Body combination mode.
    pub mode:     BodyMode,
    /// Pause between two updates, in milliseconds.
    pub delay_ms: u64,
}

impl Default for UpdateConfig
{
    fn default() -> Self
    {
        Self {
            labels:   vec!["figma".to_owned()],
            body:     format!("\n### Review 1\n\n{REVIEW_CHECKLIST}\n### Review 2\n\n{REVIEW_CHECKLIST}\n"),
            mode:     BodyMode::Append,
            delay_ms: 0,
        }
    }
}

/// Milestone state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum,)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStateFilter
{
    /// Open milestones only.
    Open,
    /// Closed milestones only.
    Closed,
    /// Every milestone.
    All,
}

impl MilestoneStateFilter
{
    /// Query value understood by the tracker.
    pub fn as_str(self,) -> &'static str
    {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Settings for milestone estimate aggregation.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct EstimatesConfig
{
    /// Milestone state filter.
    pub state:         MilestoneStateFilter,
    /// Milestones requested per page, at most 100.
    pub per_page:      u8,
    /// Most recent milestone pages consulted.
    pub max_pages:     u32,
    /// Regular expression whose first capture group is the estimate.
    pub label_pattern: String,
    /// JSON output path.
    pub output:        String,
    /// Optional CSV output path.
    pub csv_output:    Option<String,>,
}

impl Default for EstimatesConfig
{
    fn default() -> Self
    {
        Self {
            state:         MilestoneStateFilter::Closed,
            per_page:      100,
            max_pages:     1,
            label_pattern: crate::estimate::DEFAULT_ESTIMATE_PATTERN.to_owned(),
            output:        "milestone-estimates.json".to_owned(),
            csv_output:    None,
        }
    }
}

/// Settings for the review checklist.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct ChecklistConfig
{
    /// Reviewers distributed across components; empty disables annotations.
    pub assignees: Vec<String,>,
    /// Markdown output path.
    pub output:    String,
}

impl Default for ChecklistConfig
{
    fn default() -> Self
    {
        Self {
            assignees: Vec::new(), output: "component-checklist.md".to_owned(),
        }
    }
}

/// Settings for demo page generation.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct HtmlConfig
{
    /// Directory receiving one page per component.
    pub output_dir:  String,
    /// Published components package version loaded by the pages.
    pub cdn_version: String,
}

impl Default for HtmlConfig
{
    fn default() -> Self
    {
        Self {
            output_dir: "html-templates".to_owned(), cdn_version: "1.0.0-beta.81".to_owned(),
        }
    }
}

/// Settings for the style variable audit.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct AuditConfig
{
    /// Markdown output path.
    pub output: String,
}

impl Default for AuditConfig
{
    fn default() -> Self
    {
        Self {
            output: "css-var-audit.md".to_owned(),
        }
    }
}

/// Settings for product team labeling.
#[derive(Debug, Clone, Deserialize, Serialize,)]
#[serde(default)]
pub struct TeamLabelsConfig
{
    /// CSV roster of `name,team,username` rows.
    pub roster: String,
}

impl Default for TeamLabelsConfig
{
    fn default() -> Self
    {
        Self {
            roster: "data.csv".to_owned(),
        }
    }
}

impl WorkflowConfig
{
    /// Checks invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when repository coordinates are blank,
    /// the milestone page size is outside `1..=100`, or the estimate pattern
    /// lacks a capture group.
    pub fn validate(&self,) -> Result<(), Error,>
    {
        if self.tracker.owner.trim().is_empty() || self.tracker.repository.trim().is_empty() {
            return Err(Error::validation("tracker owner and repository cannot be empty",),);
        }

        if self.tracker.base_url.trim().is_empty() {
            return Err(Error::validation("tracker base_url cannot be empty",),);
        }

        if !(1..=100).contains(&self.estimates.per_page,) {
            return Err(Error::validation("estimates per_page must be between 1 and 100",),);
        }

        crate::estimate::EstimateParser::new(&self.estimates.label_pattern,)?;

        Ok((),)
    }
}

/// Parses and validates a configuration document.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed YAML and [`Error::Validation`] when
/// [`WorkflowConfig::validate`] rejects the document.
pub fn parse_config(yaml: &str,) -> Result<WorkflowConfig, Error,>
{
    let config: WorkflowConfig = if yaml.trim().is_empty() {
        WorkflowConfig::default()
    } else {
        serde_yaml::from_str(yaml,)?
    };
    config.validate()?;
    Ok(config,)
}

/// Loads the configuration from `path`, or defaults when `path` is `None`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] or [`Error::Io`] when the file cannot be read
/// and propagates [`parse_config`] failures.
pub fn load_config(path: Option<&Path,>,) -> Result<WorkflowConfig, Error,>
{
    match path {
        Some(path,) => {
            let contents = fs::read_to_string(path,).map_err(|source| io_error(path, source,),)?;
            parse_config(&contents,)
        }
        None => {
            let config = WorkflowConfig::default();
            config.validate()?;
            Ok(config,)
        }
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn empty_document_yields_defaults()
    {
        let config = parse_config("",).expect("defaults should validate",);
        assert_eq!(config.tracker.base_url, PUBLIC_API_URL);
        assert_eq!(config.issues.delay_ms, 2000);
        assert_eq!(config.issues.labels, vec!["figma".to_owned()]);
        assert_eq!(config.throttle.max_retries, 5);
        assert!(config.throttle.abort_on_secondary);
        assert_eq!(config.estimates.state, MilestoneStateFilter::Closed);
        assert!(config.components.skip.contains(&"functional".to_owned()));
        assert!(!config.components.skip.contains(&"button".to_owned()));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults()
    {
        let yaml = r"
tracker:
  base_url: https://github.example.com/api/v3
components:
  skip: [functional]
update:
  mode: replace
";
        let config = parse_config(yaml,).expect("valid configuration",);
        assert_eq!(config.tracker.base_url, "https://github.example.com/api/v3");
        assert_eq!(config.tracker.owner, "Esri");
        assert_eq!(config.components.skip, vec!["functional".to_owned()]);
        assert_eq!(config.components.prefix, "calcite");
        assert_eq!(config.update.mode, BodyMode::Replace);
    }

    #[test]
    fn rejects_blank_repository()
    {
        let yaml = "tracker:\n  repository: \"  \"\n";
        let error = parse_config(yaml,).expect_err("expected validation error",);
        match error {
            Error::Validation {
                message,
            } => assert_eq!(message, "tracker owner and repository cannot be empty"),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_oversized_milestone_pages()
    {
        let yaml = "estimates:\n  per_page: 101\n";
        assert!(matches!(parse_config(yaml), Err(Error::Validation { .. })));
    }

    #[test]
    fn rejects_pattern_without_capture_group()
    {
        let yaml = "estimates:\n  label_pattern: \"estimate\"\n";
        assert!(matches!(parse_config(yaml), Err(Error::Validation { .. })));
    }

    #[test]
    fn renders_issue_templates()
    {
        let issues = IssueTemplateConfig::default();
        assert_eq!(issues.render_title("button",), "[button] Figma v2 design");
        assert!(issues.render_body("button",).contains("Create a Figma v2 design for button."));
    }

    #[test]
    fn default_update_body_contains_both_reviews()
    {
        let update = UpdateConfig::default();
        assert!(update.body.contains("### Review 1"));
        assert!(update.body.contains("### Review 2"));
    }

    #[test]
    fn load_config_reports_missing_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let missing = temp.path().join("missing.yaml",);
        let error = load_config(Some(&missing,),).expect_err("expected not found",);
        assert!(matches!(error, Error::NotFound { .. }));
    }

    #[test]
    fn load_config_reads_file()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let path = temp.path().join("chores.yaml",);
        fs::write(&path, "checklist:\n  assignees: [Ada, Grace]\n",).expect("write config",);

        let config = load_config(Some(&path,),).expect("valid configuration",);
        assert_eq!(config.checklist.assignees, vec!["Ada".to_owned(), "Grace".to_owned()]);
    }
}
