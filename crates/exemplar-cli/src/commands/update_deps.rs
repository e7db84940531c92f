use std::path::Path;

use anyhow::Result;

use exemplar_core::updater::{self, Scope};

use crate::output;

/// Scopes selected by the command-line flags.
///
/// Without any scope flag only generated example projects are updated;
/// `--all` selects every scope.
pub fn scopes(all: bool, categories: bool, base_template: bool, main: bool) -> Vec<Scope> {
    let mut scopes = Vec::new();
    if all || !(categories || base_template || main) {
        scopes.push(Scope::Outputs);
    }
    if all || categories {
        scopes.push(Scope::Categories);
    }
    if all || base_template {
        scopes.push(Scope::BaseTemplate);
    }
    if all || main {
        scopes.push(Scope::Main);
    }
    scopes
}

pub async fn run(registry_path: &Path, package: &str, version: &str, scopes: &[Scope]) -> Result<()> {
    output::print_header(&format!("exemplar update-dependencies: {package}@{version}"));

    let registry = super::load_registry(registry_path)?;
    let names: Vec<String> = scopes.iter().map(|s| format!("{s:?}")).collect();
    output::print_key_value("Scopes", &names.join(", "));

    let report = updater::update_package_version(&registry, package, version, scopes)?;

    for path in &report.updated {
        output::print_success(&path.display().to_string());
    }
    output::print_key_value("Updated", &report.updated.len().to_string());
    output::print_key_value("Skipped", &report.skipped.len().to_string());

    if !report.failed.is_empty() {
        for (path, reason) in &report.failed {
            output::print_error(&format!("{}: {reason}", path.display()));
        }
        anyhow::bail!("{} descriptor(s) could not be read", report.failed.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_from_flags() {
        assert_eq!(scopes(false, false, false, false), vec![Scope::Outputs]);
        assert_eq!(scopes(false, false, true, false), vec![Scope::BaseTemplate]);
        assert_eq!(scopes(false, false, false, true), vec![Scope::Main]);
        assert_eq!(
            scopes(false, true, true, false),
            vec![Scope::Categories, Scope::BaseTemplate]
        );
        assert_eq!(
            scopes(true, false, false, false),
            vec![Scope::Outputs, Scope::Categories, Scope::BaseTemplate, Scope::Main]
        );
    }
}
