//! CLI command implementations for exemplar.
//!
//! Each module corresponds to a subcommand (`exemplar <command>`).

pub mod check;
pub mod create_category;
pub mod create_example;
pub mod generate_all;
pub mod generate_docs;
pub mod list;
pub mod update_deps;

use std::path::Path;

use anyhow::Result;

use exemplar_core::registry::Registry;
use exemplar_core::runner::{CommandRunner, ProjectRunner};
use exemplar_core::scaffold::Overwrite;

use crate::output;

/// Load the registry and show where it was found.
pub fn load_registry(path: &Path) -> Result<Registry> {
    let registry = Registry::load(path)?;
    tracing::debug!("registry root: {}", registry.root().display());
    output::print_key_value("Registry", &path.display().to_string());
    Ok(registry)
}

/// Decide what to do about an existing output directory.
///
/// `--force` replaces without asking. Otherwise an interactive terminal is
/// asked; anything else refuses.
pub fn overwrite_policy(out: &Path, force: bool) -> Result<Overwrite> {
    if force {
        return Ok(Overwrite::Replace);
    }
    if !out.exists() || !output::is_interactive() {
        return Ok(Overwrite::Refuse);
    }
    let replace = output::confirm(&format!("{} already exists. Replace it?", out.display()))?;
    Ok(if replace {
        Overwrite::Replace
    } else {
        Overwrite::Refuse
    })
}

/// Build the configured test runner and make sure its tools are installed.
pub fn test_runner(registry: &Registry) -> Result<CommandRunner> {
    let runner = CommandRunner::new(registry.settings.test_commands.clone());
    if let Err(missing) = runner.check_prerequisites() {
        for m in &missing {
            output::print_error(&format!(
                "Missing tool: {}, install: {}",
                m.tool_name, m.install_instructions
            ));
        }
        anyhow::bail!("missing prerequisites");
    }
    Ok(runner)
}
