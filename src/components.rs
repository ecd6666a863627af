// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Component discovery from the component source tree.
///
/// Every immediate subdirectory of the components root is a component. The
/// listing keeps the order reported by the operating system so that batch
/// runs can be resumed by index.
use std::{fs, path::Path};

use tracing::debug;

use crate::error::{Error, io_error};

/// Lists component directory names under `root`, excluding `skip`.
///
/// Regular files are ignored. The relative order of the remaining entries is
/// the directory order reported by [`fs::read_dir`].
///
/// # Errors
///
/// Returns [`Error::NotFound`] when `root` does not exist and [`Error::Io`]
/// for any other filesystem failure.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use calcite_chores::list_components;
///
/// # fn example() -> Result<(), calcite_chores::Error> {
/// let components = list_components(Path::new("src/components",), &["functional".to_owned()],)?;
/// println!("{} components", components.len());
/// # Ok(())
/// # }
/// ```
pub fn list_components(root: &Path, skip: &[String],) -> Result<Vec<String,>, Error,>
{
    let entries = fs::read_dir(root,).map_err(|source| io_error(root, source,),)?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| io_error(root, source,),)?;
        let is_dir = entry.file_type().map_err(|source| io_error(&entry.path(), source,),)?.is_dir();
        if !is_dir {
            continue;
        }

        names.push(entry.file_name().to_string_lossy().into_owned(),);
    }

    let components = filter_skipped(&names, skip,);

    debug!("Found {} components under {}", components.len(), root.display());
    Ok(components,)
}

/// Removes skipped names from an ordered list, keeping relative order.
pub fn filter_skipped(names: &[String], skip: &[String],) -> Vec<String,>
{
    names
        .iter()
        .filter(|name| {
            let skipped = skip.contains(*name,);
            if skipped {
                debug!("Skipping component {}", name);
            }
            !skipped
        },)
        .cloned()
        .collect()
}
