use std::path::Path;

use anyhow::Result;

use crate::output;

/// Validate every file the registry references and report all problems.
pub async fn run(registry_path: &Path) -> Result<()> {
    output::print_header("exemplar check");

    let registry = super::load_registry(registry_path)?;
    output::print_key_value("Examples", &registry.examples().len().to_string());
    output::print_key_value("Categories", &registry.categories().len().to_string());
    output::print_key_value("Docs", &registry.docs().len().to_string());

    let template = registry.resolve(&registry.settings.base_template);
    if !template.is_dir() {
        output::print_error(&format!("base template not found: {}", template.display()));
    }

    let problems = registry.check();
    for problem in &problems {
        output::print_error(&problem.to_string());
    }

    let total = problems.len() + usize::from(!template.is_dir());
    if total > 0 {
        anyhow::bail!("{total} problem(s) found");
    }
    output::print_success("Registry is consistent");
    Ok(())
}
