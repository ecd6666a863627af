// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Audit of declared versus documented CSS custom properties.
///
/// A property is declared when `--prefix-...` appears anywhere in the
/// component stylesheet and documented when it appears after `* @prop ` in
/// a doc comment.
use std::{collections::BTreeSet, fmt::Write as _, fs, path::Path};

use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, io_error};

const PROPERTY_TAIL: &str = r"[^\]\)\};:,\s]*";

/// Custom properties found in one stylesheet, sorted and unique.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct ComponentAudit
{
    pub component:  String,
    pub declared:   Vec<String,>,
    pub documented: Vec<String,>,
}

impl ComponentAudit
{
    /// Declared properties lacking documentation.
    pub fn undocumented(&self,) -> Vec<&str,>
    {
        self.declared
            .iter()
            .filter(|name| !self.documented.contains(name,),)
            .map(String::as_str,)
            .collect()
    }
}

/// Extracts declared and documented `--prefix-*` properties.
///
/// # Errors
///
/// Returns [`Error::Validation`] when `prefix` produces an invalid pattern.
///
/// # Example
///
/// ```
/// use calcite_chores::audit_stylesheet;
///
/// let scss = "/**\n * @prop --calcite-button-color: text color\n */\n:host { color: var(--calcite-button-color); }";
/// let (declared, documented) = audit_stylesheet("calcite", scss,)?;
/// assert_eq!(declared, vec!["--calcite-button-color"]);
/// assert_eq!(documented, declared);
/// # Ok::<(), calcite_chores::Error>(())
/// ```
pub fn audit_stylesheet(
    prefix: &str,
    stylesheet: &str,
) -> Result<(Vec<String,>, Vec<String,>,), Error,>
{
    let prefix = regex::escape(prefix,);
    let declared_pattern = Regex::new(&format!("--{prefix}-{PROPERTY_TAIL}"),)
        .map_err(|e| Error::validation(format!("invalid property pattern: {e}"),),)?;
    let documented_pattern = Regex::new(&format!(r"\* @prop (--{prefix}-{PROPERTY_TAIL})"),)
        .map_err(|e| Error::validation(format!("invalid property pattern: {e}"),),)?;

    let declared: BTreeSet<&str,> =
        declared_pattern.find_iter(stylesheet,).map(|found| found.as_str(),).collect();
    let documented: BTreeSet<&str,> = documented_pattern
        .captures_iter(stylesheet,)
        .filter_map(|captures| captures.get(1,),)
        .map(|found| found.as_str(),)
        .collect();

    Ok((
        declared.into_iter().map(str::to_owned,).collect(),
        documented.into_iter().map(str::to_owned,).collect(),
    ),)
}

/// Reads `<root>/<component>/<component>.scss` for every component.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when a stylesheet is missing.
pub fn audit_components(
    root: &Path,
    prefix: &str,
    components: &[String],
) -> Result<Vec<ComponentAudit,>, Error,>
{
    let mut audits = Vec::with_capacity(components.len(),);
    for component in components {
        let path = root.join(component,).join(format!("{component}.scss"),);
        let stylesheet = fs::read_to_string(&path,).map_err(|source| io_error(&path, source,),)?;
        let (declared, documented,) = audit_stylesheet(prefix, &stylesheet,)?;
        debug!("{}: {} declared, {} documented", component, declared.len(), documented.len());

        audits.push(ComponentAudit {
            component: component.clone(),
            declared,
            documented,
        },);
    }
    Ok(audits,)
}

/// Markdown table with one row per component.
pub fn render_audit_table(audits: &[ComponentAudit],) -> String
{
    let mut table = String::from(
        "| Component | CSS Variables | Documented CSS Variables |\n| ----- | ----- | ----- |\n",
    );
    for audit in audits {
        let _ = writeln!(
            table,
            "| {} | {} | {} |",
            audit.component,
            audit.declared.join("<br />",),
            audit.documented.join("<br />",)
        );
    }
    table
}

/// Writes [`render_audit_table`] output to `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written.
pub fn write_audit(path: &Path, audits: &[ComponentAudit],) -> Result<(), Error,>
{
    fs::write(path, render_audit_table(audits,),).map_err(|source| io_error(path, source,),)?;
    info!("Wrote audit of {} component(s) to {}", audits.len(), path.display());
    Ok((),)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    const SCSS: &str = "/**
 * CSS Custom Properties
 *
 * These properties can be overridden using the component's tag as selector.
 *
 * @prop --calcite-chip-corner-radius: Specifies the corner radius.
 * @prop --calcite-chip-unused: Documented but never used.
 */

:host {
  border-radius: var(--calcite-chip-corner-radius, 0);
  color: var(--calcite-chip-text-color);
  background: var(--calcite-chip-text-color);
  --calcite-internal-chip-size: 2rem;
}
";

    #[test]
    fn declared_properties_are_sorted_and_unique()
    {
        let (declared, documented,) = audit_stylesheet("calcite", SCSS,).expect("audit",);
        assert_eq!(declared, vec![
            "--calcite-chip-corner-radius",
            "--calcite-chip-text-color",
            "--calcite-chip-unused",
            "--calcite-internal-chip-size",
        ]);
        assert_eq!(documented, vec!["--calcite-chip-corner-radius", "--calcite-chip-unused"]);
    }

    #[test]
    fn undocumented_lists_the_gap()
    {
        let (declared, documented,) = audit_stylesheet("calcite", SCSS,).expect("audit",);
        let audit = ComponentAudit {
            component: "chip".to_owned(), declared, documented,
        };
        assert_eq!(audit.undocumented(), vec![
            "--calcite-chip-text-color",
            "--calcite-internal-chip-size"
        ]);
    }

    #[test]
    fn other_prefixes_are_ignored()
    {
        let (declared, _,) = audit_stylesheet("calcite", "color: var(--arcgis-text);",).expect("audit",);
        assert!(declared.is_empty());
    }

    #[test]
    fn table_joins_properties_with_line_breaks()
    {
        let audits = vec![ComponentAudit {
            component:  "chip".to_owned(),
            declared:   vec!["--calcite-a".to_owned(), "--calcite-b".to_owned()],
            documented: vec!["--calcite-a".to_owned()],
        }];
        let table = render_audit_table(&audits,);
        assert!(table.starts_with("| Component | CSS Variables | Documented CSS Variables |\n"));
        assert!(table.ends_with("| chip | --calcite-a<br />--calcite-b | --calcite-a |\n"));
    }

    #[test]
    fn reads_stylesheets_from_component_directories()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let chip = temp.path().join("chip",);
        fs::create_dir(&chip,).expect("mkdir",);
        fs::write(chip.join("chip.scss",), SCSS,).expect("write",);
        fs::create_dir(temp.path().join("alert",),).expect("mkdir",);

        let audits = audit_components(temp.path(), "calcite", &["chip".to_owned()],).expect("audit",);
        assert_eq!(audits[0].documented.len(), 2);

        let missing = audit_components(temp.path(), "calcite", &["alert".to_owned()],);
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }
}
