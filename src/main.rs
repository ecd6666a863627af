//! Command-line interface for the calcite-chores binary.
//!
//! Each subcommand runs one maintenance chore. Offline chores (`html`,
//! `checklist`, `audit-css`) only touch the filesystem; tracker chores
//! require an access token and report their progress on exit.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
    time::Duration,
};

use calcite_chores::{
    AppendChecklist, BatchContext, BodyMode, CreateComponentIssue, Error, EstimateParser,
    IssueQuery, IssueTracker, MilestoneSelection, MilestoneStateFilter, OctocrabExecutor,
    ProgressCounter, ProgressReporter, RetryConfig, TOKEN_ENV, Throttled, WorkItem,
    WorkflowConfig, aggregate_estimates, apply_team_labels, audit_components, install_termination_hook,
    io_error, list_components, load_config, parse_team_roster, run_batch, write_audit,
    write_checklist, write_component_pages, write_csv, write_json,
};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Tracker = IssueTracker<Throttled<OctocrabExecutor,>,>;

/// Command line interface for the component maintenance chores.
#[derive(Debug, Parser,)]
#[command(name = "calcite-chores", version, about = "Component library maintenance chores")]
struct Cli
{
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Default,)]
struct GlobalArgs
{
    /// Path to the YAML configuration document.
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf,>,

    /// Tracker REST base URL, e.g. an enterprise `/api/v3` endpoint.
    #[arg(long = "base-url", value_name = "URL", global = true)]
    base_url: Option<String,>,

    /// Repository owner (user or organization).
    #[arg(long = "owner", value_name = "OWNER", global = true)]
    owner: Option<String,>,

    /// Repository name.
    #[arg(long = "repo", value_name = "NAME", global = true)]
    repo: Option<String,>,

    /// Repository-scoped access token.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String,>,

    /// Directory containing one subdirectory per component.
    #[arg(long = "components", value_name = "DIR", global = true)]
    components: Option<PathBuf,>,
}

#[derive(Debug, Subcommand,)]
/// Supported chores.
enum Command
{
    /// Write one HTML demo page per component.
    Html(HtmlArgs,),
    /// Write the Markdown review checklist.
    Checklist(ChecklistArgs,),
    /// Audit declared versus documented CSS custom properties.
    #[command(name = "audit-css")]
    AuditCss(OutputArgs,),
    /// Create one tracker issue per component.
    #[command(name = "create-issues")]
    CreateIssues(CreateIssuesArgs,),
    /// Append the review checklist to every labeled issue.
    #[command(name = "update-issues")]
    UpdateIssues(UpdateIssuesArgs,),
    /// Aggregate milestone estimates from issue labels.
    Estimates(EstimatesArgs,),
    /// Label stakeholder issues with their product team.
    #[command(name = "team-labels")]
    TeamLabels(TeamLabelsArgs,),
}

#[derive(Debug, Args,)]
struct HtmlArgs
{
    /// Directory receiving the pages.
    #[arg(long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf,>,

    /// Components package version loaded from the CDN.
    #[arg(long = "cdn-version", value_name = "VERSION")]
    cdn_version: Option<String,>,
}

#[derive(Debug, Args,)]
struct ChecklistArgs
{
    /// Markdown output path.
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf,>,

    /// Reviewer name; repeat to distribute components across reviewers.
    #[arg(long = "assignee", value_name = "NAME")]
    assignees: Vec<String,>,
}

#[derive(Debug, Args,)]
struct OutputArgs
{
    /// Output path.
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
struct CreateIssuesArgs
{
    /// Index of the first component to process.
    #[arg(long = "resume-offset", value_name = "N", default_value_t = 0)]
    resume_offset: usize,

    /// Pause between two creations, in milliseconds.
    #[arg(long = "delay-ms", value_name = "MS")]
    delay_ms: Option<u64,>,
}

#[derive(Debug, Args,)]
struct UpdateIssuesArgs
{
    /// Index of the first issue to process.
    #[arg(long = "resume-offset", value_name = "N", default_value_t = 0)]
    resume_offset: usize,

    /// How the checklist is combined with the existing body.
    #[arg(long = "mode", value_enum)]
    mode: Option<BodyMode,>,

    /// Pause between two updates, in milliseconds.
    #[arg(long = "delay-ms", value_name = "MS")]
    delay_ms: Option<u64,>,
}

#[derive(Debug, Args,)]
struct EstimatesArgs
{
    /// Milestone state filter.
    #[arg(long = "state", value_enum)]
    state: Option<MilestoneStateFilter,>,

    /// Most recent milestone pages to consult.
    #[arg(long = "max-pages", value_name = "N")]
    max_pages: Option<u32,>,

    /// JSON output path.
    #[arg(long = "output", value_name = "PATH")]
    output: Option<PathBuf,>,

    /// Optional CSV output path.
    #[arg(long = "csv", value_name = "PATH")]
    csv: Option<PathBuf,>,
}

#[derive(Debug, Args,)]
struct TeamLabelsArgs
{
    /// CSV roster of `name,team,username` rows.
    #[arg(long = "roster", value_name = "PATH")]
    roster: Option<PathBuf,>,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Installs the `tracing` subscriber; `RUST_LOG` overrides the `info` default.
fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let _ = tracing_subscriber::fmt().with_env_filter(filter,).with_writer(std::io::stderr,).try_init();
}

/// Executes the selected chore.
///
/// # Errors
///
/// Propagates configuration, filesystem and tracker errors.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let config = load_workflow(&cli.global,)?;

    match cli.command {
        Command::Html(args,) => run_html(&config, args,),
        Command::Checklist(args,) => run_checklist(&config, args,),
        Command::AuditCss(args,) => run_audit(&config, args,),
        Command::CreateIssues(args,) => {
            let tracker = connect(&config, cli.global.token.as_deref(),)?;
            run_create_issues(&config, &tracker, args,).await
        }
        Command::UpdateIssues(args,) => {
            let tracker = connect(&config, cli.global.token.as_deref(),)?;
            run_update_issues(&config, &tracker, args,).await
        }
        Command::Estimates(args,) => {
            let tracker = connect(&config, cli.global.token.as_deref(),)?;
            run_estimates(&config, &tracker, args,).await
        }
        Command::TeamLabels(args,) => {
            let tracker = connect(&config, cli.global.token.as_deref(),)?;
            run_team_labels(&config, &tracker, args,).await
        }
    }
}

/// Loads the configuration document and applies command line overrides.
fn load_workflow(global: &GlobalArgs,) -> Result<WorkflowConfig, Error,>
{
    let mut config = load_config(global.config.as_deref(),)?;

    if let Some(base_url,) = &global.base_url {
        config.tracker.base_url = base_url.trim_end_matches('/',).to_owned();
    }
    if let Some(owner,) = &global.owner {
        config.tracker.owner = owner.clone();
    }
    if let Some(repo,) = &global.repo {
        config.tracker.repository = repo.clone();
    }
    if let Some(components,) = &global.components {
        config.components.path = components.to_string_lossy().into_owned();
    }

    config.validate()?;
    Ok(config,)
}

/// Returns the trimmed token or [`Error::MissingCredential`].
fn resolve_token(token: Option<&str,>,) -> Result<String, Error,>
{
    token
        .map(str::trim,)
        .filter(|token| !token.is_empty(),)
        .map(str::to_owned,)
        .ok_or_else(|| Error::MissingCredential {
            variable: TOKEN_ENV.to_owned(),
        },)
}

/// Builds the rate-limited tracker client; fails before any network call
/// when no token is available.
fn connect(config: &WorkflowConfig, token: Option<&str,>,) -> Result<Tracker, Error,>
{
    let token = resolve_token(token,)?;
    let executor = OctocrabExecutor::new(&config.tracker.base_url, &token,)?;
    let throttled = Throttled::new(executor, RetryConfig::from(&config.throttle,),);
    Ok(IssueTracker::new(throttled, &config.tracker.owner, &config.tracker.repository,),)
}

fn components(config: &WorkflowConfig,) -> Result<Vec<String,>, Error,>
{
    list_components(Path::new(&config.components.path,), &config.components.skip,)
}

fn run_html(config: &WorkflowConfig, args: HtmlArgs,) -> Result<(), Error,>
{
    let output_dir = args.output_dir.unwrap_or_else(|| PathBuf::from(&config.html.output_dir,),);
    let cdn_version = args.cdn_version.as_deref().unwrap_or(&config.html.cdn_version,);

    let components = components(config,)?;
    write_component_pages(&output_dir, &config.components.prefix, cdn_version, &components,)?;
    Ok((),)
}

fn run_checklist(config: &WorkflowConfig, args: ChecklistArgs,) -> Result<(), Error,>
{
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.checklist.output,),);
    let assignees =
        if args.assignees.is_empty() { config.checklist.assignees.clone() } else { args.assignees };

    let components = components(config,)?;
    write_checklist(&output, &components, &assignees,)
}

fn run_audit(config: &WorkflowConfig, args: OutputArgs,) -> Result<(), Error,>
{
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.audit.output,),);

    let components = components(config,)?;
    let audits =
        audit_components(Path::new(&config.components.path,), &config.components.prefix, &components,)?;
    write_audit(&output, &audits,)
}

/// Runs `work` under a spinner and prints the summary however it ends.
async fn with_progress<T, F,>(
    message: &str,
    summary: &str,
    counter: &ProgressCounter,
    resume_offset: usize,
    work: F,
) -> Result<T, Error,>
where
    F: Future<Output = Result<T, Error,>,>,
{
    let reporter = ProgressReporter::start(message, counter.clone(), summary,);
    reporter.set_resume_offset(resume_offset,);
    install_termination_hook(&reporter,);

    let result = work.await;
    if result.is_ok() {
        reporter.finish();
    } else {
        reporter.fail();
    }
    result
}

async fn run_create_issues(
    config: &WorkflowConfig,
    tracker: &Tracker,
    args: CreateIssuesArgs,
) -> Result<(), Error,>
{
    let items: Vec<WorkItem,> = components(config,)?.into_iter().map(WorkItem::Component,).collect();
    let ctx = BatchContext {
        resume_offset: args.resume_offset,
        delay:         Duration::from_millis(args.delay_ms.unwrap_or(config.issues.delay_ms,),),
        counter:       ProgressCounter::new(),
    };
    let mut mutation = CreateComponentIssue::new(tracker, &config.issues,);

    let message = format!("Creating {} issues in {}...", items.len(), tracker.full_name());
    with_progress(&message, "issues created", &ctx.counter, ctx.resume_offset, async {
        run_batch(&items, &ctx, &mut mutation,).await
    },)
    .await?;
    Ok((),)
}

async fn run_update_issues(
    config: &WorkflowConfig,
    tracker: &Tracker,
    args: UpdateIssuesArgs,
) -> Result<(), Error,>
{
    let selector = config
        .update
        .labels
        .first()
        .ok_or_else(|| Error::validation("update requires at least one label",),)?;
    let ctx = BatchContext {
        resume_offset: args.resume_offset,
        delay:         Duration::from_millis(args.delay_ms.unwrap_or(config.update.delay_ms,),),
        counter:       ProgressCounter::new(),
    };
    let mode = args.mode.unwrap_or(config.update.mode,);
    let mut mutation = AppendChecklist::new(tracker, &config.update.body, mode, &config.update.labels,);

    let message = format!("Updating issues labeled '{selector}' in {}...", tracker.full_name());
    with_progress(&message, "issues updated", &ctx.counter, ctx.resume_offset, async {
        let issues = tracker.list_all_issues(&IssueQuery::new().labels(selector.as_str(),),).await?;
        let items: Vec<WorkItem,> =
            issues.iter().filter(|issue| !issue.is_pull_request(),).map(WorkItem::from,).collect();
        info!("Found {} issue(s) labeled '{}'", items.len(), selector);
        run_batch(&items, &ctx, &mut mutation,).await
    },)
    .await?;
    Ok((),)
}

async fn run_estimates(
    config: &WorkflowConfig,
    tracker: &Tracker,
    args: EstimatesArgs,
) -> Result<(), Error,>
{
    let parser = EstimateParser::new(&config.estimates.label_pattern,)?;
    let mut selection = MilestoneSelection::from(&config.estimates,);
    if let Some(state,) = args.state {
        selection.state = state;
    }
    if let Some(max_pages,) = args.max_pages {
        selection.max_pages = max_pages;
    }
    let output = args.output.unwrap_or_else(|| PathBuf::from(&config.estimates.output,),);
    let csv = args.csv.or_else(|| config.estimates.csv_output.as_ref().map(PathBuf::from,),);

    let counter = ProgressCounter::new();
    let message = format!("Generating milestone estimates for {}...", tracker.full_name());
    let totals = with_progress(&message, "milestones aggregated", &counter, 0, async {
        aggregate_estimates(tracker, selection, &parser, &counter,).await
    },)
    .await?;

    write_json(&output, &totals,)?;
    if let Some(csv,) = csv {
        write_csv(&csv, &totals,)?;
    }
    Ok((),)
}

async fn run_team_labels(
    config: &WorkflowConfig,
    tracker: &Tracker,
    args: TeamLabelsArgs,
) -> Result<(), Error,>
{
    let path = args.roster.unwrap_or_else(|| PathBuf::from(&config.team_labels.roster,),);
    let contents = fs::read_to_string(&path,).map_err(|source| io_error(&path, source,),)?;
    let roster = parse_team_roster(&contents,)?;

    let counter = ProgressCounter::new();
    let report = with_progress(
        "Adding product team labels to existing stakeholder issues...",
        "issues labeled",
        &counter,
        0,
        async { apply_team_labels(tracker, &roster, &counter,).await },
    )
    .await?;

    print!("{}", report.render(&tracker.full_name(),));
    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use calcite_chores::Error;
    use clap::Parser;
    use tempfile::tempdir;

    use super::{Cli, Command, GlobalArgs, load_workflow, resolve_token, run};

    #[test]
    fn cli_parses_create_issues_with_resume_offset()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "create-issues",
            "--resume-offset",
            "40",
            "--owner",
            "octocat",
        ],)
        .expect("failed to parse CLI",);

        match cli.command {
            Command::CreateIssues(args,) => {
                assert_eq!(args.resume_offset, 40);
                assert!(args.delay_ms.is_none());
            }
            other => panic!("unexpected command variant: {other:?}"),
        }
        assert_eq!(cli.global.owner.as_deref(), Some("octocat"));
    }

    #[test]
    fn cli_parses_estimate_state()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "estimates", "--state", "all",],)
            .expect("failed to parse CLI",);
        match cli.command {
            Command::Estimates(args,) => {
                assert_eq!(args.state, Some(calcite_chores::MilestoneStateFilter::All));
            }
            other => panic!("unexpected command variant: {other:?}"),
        }
    }

    #[test]
    fn blank_token_is_missing_credential()
    {
        for token in [None, Some(""), Some("   "),] {
            match resolve_token(token,) {
                Err(Error::MissingCredential {
                    variable,
                },) => assert_eq!(variable, "GITHUB_TOKEN"),
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(resolve_token(Some(" ghp_x ")).expect("token",), "ghp_x");
    }

    #[test]
    fn overrides_replace_configured_coordinates()
    {
        let global = GlobalArgs {
            base_url: Some("https://github.example.com/api/v3/".to_owned(),),
            repo: Some("components".to_owned(),),
            ..GlobalArgs::default()
        };
        let config = load_workflow(&global,).expect("valid configuration",);
        assert_eq!(config.tracker.base_url, "https://github.example.com/api/v3");
        assert_eq!(config.tracker.repository, "components");
        assert_eq!(config.tracker.owner, "Esri");
    }

    #[tokio::test]
    async fn tracker_chores_require_a_token_before_any_network_call()
    {
        let cli = Cli::try_parse_from([env!("CARGO_PKG_NAME"), "estimates", "--token", "",],)
            .expect("failed to parse CLI",);
        let error = run(cli,).await.expect_err("missing token",);
        assert!(matches!(error, Error::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn html_chore_writes_pages()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let root = temp.path().join("components",);
        for name in ["alert", "button", "functional",] {
            fs::create_dir_all(root.join(name,),).expect("mkdir",);
        }
        let output = temp.path().join("pages",);

        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "html",
            "--components",
            root.to_str().expect("utf8",),
            "--output-dir",
            output.to_str().expect("utf8",),
        ],)
        .expect("failed to parse CLI",);
        run(cli,).await.expect("html chore",);

        assert!(output.join("alert.html").exists());
        assert!(output.join("button.html").exists());
        assert!(!output.join("functional.html").exists());
    }

    #[tokio::test]
    async fn checklist_chore_uses_cli_assignees()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let root = temp.path().join("components",);
        fs::create_dir_all(root.join("alert",),).expect("mkdir",);
        let output = temp.path().join("checklist.md",);

        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "checklist",
            "--components",
            root.to_str().expect("utf8",),
            "--output",
            output.to_str().expect("utf8",),
            "--assignee",
            "Ada",
        ],)
        .expect("failed to parse CLI",);
        run(cli,).await.expect("checklist chore",);

        assert_eq!(fs::read_to_string(&output,).expect("read",), "- [ ] `alert` (Ada)\n");
    }

    #[tokio::test]
    async fn missing_components_root_fails()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "audit-css",
            "--components",
            temp.path().join("missing",).to_str().expect("utf8",),
        ],)
        .expect("failed to parse CLI",);
        let error = run(cli,).await.expect_err("missing root",);
        assert!(matches!(error, Error::NotFound { .. }));
    }
}
