// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Sequential, resumable batch of issue mutations.
///
/// A batch walks an ordered list of [`WorkItem`]s, skips everything before
/// the resume offset, applies one [`IssueMutation`] per remaining item and
/// waits a fixed delay between calls. The first failure aborts the batch;
/// the shared [`ProgressCounter`] then tells the operator where to resume.
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::time::sleep;
use tracing::{debug, info};

use crate::{
    config::{BodyMode, IssueTemplateConfig},
    error::Error,
    executor::RequestExecutor,
    models::{Issue, IssueUpdate, NewIssue},
    tracker::IssueTracker,
};

/// Unit of work fed to a batch.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub enum WorkItem
{
    /// Component directory name.
    Component(String,),
    /// Existing issue and its current body.
    Issue
    {
        number: u64,
        body:   Option<String,>,
    },
}

impl WorkItem
{
    /// Short label used in logs.
    pub fn describe(&self,) -> String
    {
        match self {
            Self::Component(name,) => name.clone(),
            Self::Issue {
                number, ..
            } => format!("#{number}"),
        }
    }
}

impl From<&Issue,> for WorkItem
{
    fn from(issue: &Issue,) -> Self
    {
        Self::Issue {
            number: issue.number, body: issue.body.clone(),
        }
    }
}

/// Count of successful mutations, shared with the progress reporter.
#[derive(Debug, Clone, Default,)]
pub struct ProgressCounter(Arc<AtomicUsize,>,);

impl ProgressCounter
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn increment(&self,)
    {
        self.0.fetch_add(1, Ordering::SeqCst,);
    }

    pub fn get(&self,) -> usize
    {
        self.0.load(Ordering::SeqCst,)
    }
}

/// Per-run batch settings.
#[derive(Debug, Clone, Default,)]
pub struct BatchContext
{
    /// Items with a lower index are skipped.
    pub resume_offset: usize,
    /// Pause between two consecutive mutations.
    pub delay:         Duration,
    pub counter:       ProgressCounter,
}

/// One tracker mutation applied to a work item.
pub trait IssueMutation
{
    fn apply(&mut self, item: &WorkItem,) -> impl Future<Output = Result<(), Error,>,>;
}

/// Runs `mutation` over `items[resume_offset..]` in order.
///
/// Returns the number of mutations performed. The counter in `ctx` is
/// incremented once per success, before the inter-item delay.
///
/// # Errors
///
/// Propagates the first mutation failure; later items are not attempted.
///
/// # Example
///
/// ```no_run
/// use calcite_chores::{BatchContext, Error, IssueMutation, WorkItem, run_batch};
///
/// struct Print;
///
/// impl IssueMutation for Print
/// {
///     async fn apply(&mut self, item: &WorkItem,) -> Result<(), Error,>
///     {
///         println!("{}", item.describe());
///         Ok((),)
///     }
/// }
///
/// # async fn example() -> Result<(), Error> {
/// let items = vec![WorkItem::Component("alert".to_owned(),)];
/// let done = run_batch(&items, &BatchContext::default(), &mut Print,).await?;
/// assert_eq!(done, 1);
/// # Ok(())
/// # }
/// ```
pub async fn run_batch<M: IssueMutation,>(
    items: &[WorkItem],
    ctx: &BatchContext,
    mutation: &mut M,
) -> Result<usize, Error,>
{
    let pending = items.get(ctx.resume_offset..,).unwrap_or(&[],);
    if ctx.resume_offset > 0 {
        info!("Resuming at offset {} ({} item(s) left)", ctx.resume_offset, pending.len());
    }

    let mut performed = 0;
    for (position, item,) in pending.iter().enumerate() {
        debug!("Processing {} ({}/{})", item.describe(), ctx.resume_offset + position + 1, items.len());
        mutation.apply(item,).await?;
        ctx.counter.increment();
        performed += 1;

        if position + 1 < pending.len() && !ctx.delay.is_zero() {
            sleep(ctx.delay,).await;
        }
    }

    info!("Batch finished with {} mutation(s)", performed);
    Ok(performed,)
}

/// Creates one templated issue per component.
#[derive(Debug,)]
pub struct CreateComponentIssue<'a, E,>
{
    tracker:  &'a IssueTracker<E,>,
    template: &'a IssueTemplateConfig,
}

impl<'a, E: RequestExecutor,> CreateComponentIssue<'a, E,>
{
    pub fn new(tracker: &'a IssueTracker<E,>, template: &'a IssueTemplateConfig,) -> Self
    {
        Self {
            tracker, template,
        }
    }
}

impl<E: RequestExecutor,> IssueMutation for CreateComponentIssue<'_, E,>
{
    async fn apply(&mut self, item: &WorkItem,) -> Result<(), Error,>
    {
        let WorkItem::Component(component,) = item else {
            return Err(Error::validation(format!(
                "issue creation expects components, got {}",
                item.describe()
            ),),);
        };

        let issue = NewIssue {
            title:  self.template.render_title(component,),
            body:   self.template.render_body(component,),
            labels: self.template.labels.clone(),
        };
        let created = self.tracker.create_issue(&issue,).await?;
        info!("Created issue #{} for {}", created.number, component);
        Ok((),)
    }
}

/// Appends (or replaces) a checklist on existing issues and sets labels.
#[derive(Debug,)]
pub struct AppendChecklist<'a, E,>
{
    tracker: &'a IssueTracker<E,>,
    text:    &'a str,
    mode:    BodyMode,
    labels:  &'a [String],
}

impl<'a, E: RequestExecutor,> AppendChecklist<'a, E,>
{
    pub fn new(
        tracker: &'a IssueTracker<E,>,
        text: &'a str,
        mode: BodyMode,
        labels: &'a [String],
    ) -> Self
    {
        Self {
            tracker, text, mode, labels,
        }
    }
}

/// Combines an existing body with new text; a missing body counts as empty.
pub fn compose_body(existing: Option<&str,>, text: &str, mode: BodyMode,) -> String
{
    match mode {
        BodyMode::Replace => text.to_owned(),
        BodyMode::Append => format!("{}\n\n{}", existing.unwrap_or_default(), text),
    }
}

impl<E: RequestExecutor,> IssueMutation for AppendChecklist<'_, E,>
{
    async fn apply(&mut self, item: &WorkItem,) -> Result<(), Error,>
    {
        let WorkItem::Issue {
            number,
            body,
        } = item
        else {
            return Err(Error::validation(format!(
                "issue update expects issues, got {}",
                item.describe()
            ),),);
        };

        let update = IssueUpdate {
            body:   Some(compose_body(body.as_deref(), self.text, self.mode,),),
            labels: (!self.labels.is_empty()).then(|| self.labels.to_vec(),),
        };
        self.tracker.update_issue(*number, &update,).await?;
        info!("Updated issue #{}", number);
        Ok((),)
    }
}
