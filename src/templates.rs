// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Standalone HTML demo pages, one per component.
use std::{fs, path::Path};

use tracing::{debug, info};

use crate::error::{Error, io_error};

/// Renders the demo page of `component` for the given element `prefix`.
///
/// The page loads the published components package `cdn_version` from the
/// CDN and contains a theme switch plus one bare `<prefix-component>`.
///
/// # Example
///
/// ```
/// use calcite_chores::render_component_page;
///
/// let html = render_component_page("calcite", "1.0.0-beta.81", "button",);
/// assert!(html.contains("<calcite-button></calcite-button>"));
/// ```
pub fn render_component_page(prefix: &str, cdn_version: &str, component: &str,) -> String
{
    let cdn = format!("https://unpkg.com/@esri/{prefix}-components@{cdn_version}/dist/{prefix}");
    let element = format!("{prefix}-{component}");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{component}</title>
    <script type="module" src="{cdn}/{prefix}.esm.js"></script>
    <link rel="stylesheet" type="text/css" href="{cdn}/{prefix}.css" />
    <style>
      h1,
      {element} {{
        margin-bottom: 5rem;
      }}
      h2 {{
        margin-bottom: 3rem;
      }}
      body {{
        font-family: var(--{prefix}-sans-family);
        font-size: var(--{prefix}-font-size-0);
        color: var(--{prefix}-ui-text-1);
        max-width: 1024px;
        min-width: 280px;
        width: 70vw;
        padding: 0 var(--{prefix}-spacing-double);
        margin: 0 auto;
        background-color: var(--{prefix}-ui-background);
      }}
      #theme-label {{
        position: fixed;
        top: 20px;
        right: 20px;
        z-index: 2;
        background-color: var(--{prefix}-ui-background);
        border: 1px solid;
        border-color: var(--{prefix}-ui-border-1);
        border-radius: var(--{prefix}-border-radius);
        margin: 0;
        padding: 10px;
      }}
      #theme-label label {{
        margin: 0;
      }}
    </style>
  </head>
  <body>
    <main>
      <div id="theme-label">
        <{prefix}-label layout="inline">
          Toggle theme
          <{prefix}-switch id="theme-switch"></{prefix}-switch>
        </{prefix}-label>
      </div>

      <h1><code>{component}</code></h1>

      <{element}></{element}>
    </main>
  </body>

  <script>
    window.onload = () => {{
      const themeSwitch = document.getElementById("theme-switch");
      themeSwitch.addEventListener("{prefix}SwitchChange", () => {{
        document.body.classList.toggle("{prefix}-theme-dark");
      }});
    }};
  </script>
</html>
"#
    )
}

/// Writes `<component>.html` for every component into `output_dir`.
///
/// The directory is created when missing; existing pages are overwritten.
/// Returns the number of pages written.
///
/// # Errors
///
/// Returns [`Error::Io`] when the directory or a page cannot be written.
pub fn write_component_pages(
    output_dir: &Path,
    prefix: &str,
    cdn_version: &str,
    components: &[String],
) -> Result<usize, Error,>
{
    fs::create_dir_all(output_dir,).map_err(|source| io_error(output_dir, source,),)?;

    for component in components {
        let path = output_dir.join(format!("{component}.html"),);
        fs::write(&path, render_component_page(prefix, cdn_version, component,),)
            .map_err(|source| io_error(&path, source,),)?;
        debug!("Wrote {}", path.display());
    }

    info!("Wrote {} page(s) to {}", components.len(), output_dir.display());
    Ok(components.len(),)
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::components::list_components;

    #[test]
    fn page_references_requested_version_and_element()
    {
        let html = render_component_page("calcite", "2.0.0", "chip",);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>chip</title>"));
        assert!(html.contains("@esri/calcite-components@2.0.0/dist/calcite/calcite.esm.js"));
        assert!(html.contains("<h1><code>chip</code></h1>"));
        assert!(html.contains("<calcite-chip></calcite-chip>"));
    }

    #[test]
    fn generates_pages_for_listed_components()
    {
        let temp = tempdir().expect("failed to create tempdir",);
        let root = temp.path().join("components",);
        for name in ["alert", "button", "functional",] {
            fs::create_dir_all(root.join(name,),).expect("mkdir",);
        }
        let output = temp.path().join("html-templates",);

        let components = list_components(&root, &["functional".to_owned()],).expect("listing",);
        let written = write_component_pages(&output, "calcite", "1.0.0-beta.81", &components,)
            .expect("pages written",);

        assert_eq!(written, 2);
        assert_eq!(fs::read_dir(&output,).expect("read output",).count(), 2);
        let alert = fs::read_to_string(output.join("alert.html",),).expect("alert page",);
        assert!(alert.contains("<calcite-alert>"));
        assert!(!output.join("functional.html",).exists());
    }
}
