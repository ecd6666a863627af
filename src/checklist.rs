// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Markdown review checklist with reviewers spread over the components.
use std::{fmt::Write as _, fs, path::Path};

use tracing::info;

use crate::error::{Error, io_error};

/// Pairs each component with its reviewer.
///
/// Component `i` of `n` goes to assignee `i * a / n`, which yields contiguous
/// blocks whose sizes differ by at most one. Without assignees every
/// component is left unassigned.
pub fn assign_reviewers<'a,>(
    components: &'a [String],
    assignees: &'a [String],
) -> Vec<(&'a str, Option<&'a str,>,),>
{
    let total = components.len();
    components
        .iter()
        .enumerate()
        .map(|(index, component,)| {
            let assignee = (!assignees.is_empty())
                .then(|| assignees[index * assignees.len() / total].as_str(),);
            (component.as_str(), assignee,)
        },)
        .collect()
}

/// Renders one ``- [ ] `component` (assignee)`` line per component.
///
/// # Example
///
/// ```
/// use calcite_chores::render_checklist;
///
/// let components = vec!["alert".to_owned(), "button".to_owned()];
/// let markdown = render_checklist(&components, &["Ada".to_owned()],);
/// assert_eq!(markdown, "- [ ] `alert` (Ada)\n- [ ] `button` (Ada)\n");
/// ```
pub fn render_checklist(components: &[String], assignees: &[String],) -> String
{
    let mut markdown = String::new();
    for (component, assignee,) in assign_reviewers(components, assignees,) {
        let _ = match assignee {
            Some(name,) => writeln!(markdown, "- [ ] `{component}` ({name})"),
            None => writeln!(markdown, "- [ ] `{component}`"),
        };
    }
    markdown
}

/// Writes [`render_checklist`] output to `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written.
pub fn write_checklist(path: &Path, components: &[String], assignees: &[String],) -> Result<(), Error,>
{
    fs::write(path, render_checklist(components, assignees,),)
        .map_err(|source| io_error(path, source,),)?;
    info!("Wrote checklist for {} component(s) to {}", components.len(), path.display());
    Ok((),)
}
