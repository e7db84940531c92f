use std::path::Path;

use anyhow::Result;

use exemplar_core::docs;

use crate::output;

/// Generate one document, or every document with `--all`.
///
/// With `--all` a failed document does not stop the others; the command
/// still exits non-zero at the end.
pub async fn run(registry_path: &Path, id: Option<&str>, all: bool) -> Result<()> {
    output::print_header("exemplar generate-docs");
    let registry = super::load_registry(registry_path)?;

    if !all {
        let Some(id) = id else {
            anyhow::bail!("specify a documentation id or --all");
        };
        let outcome = docs::generate(&registry, id)?;
        output::print_success(&format!("{} -> {}", outcome.title, outcome.path.display()));
        if outcome.indexed {
            output::print_key_value("Index", "entry added");
        }
        return Ok(());
    }

    let results = docs::generate_all(&registry);
    let mut failed = Vec::new();
    for (id, result) in &results {
        match result {
            Ok(outcome) => output::print_success(&format!("{id} -> {}", outcome.path.display())),
            Err(e) => {
                output::print_error(&e.to_string());
                failed.push(id.as_str());
            }
        }
    }

    output::print_key_value("Generated", &(results.len() - failed.len()).to_string());
    if !failed.is_empty() {
        anyhow::bail!("documentation failed for: {}", failed.join(", "));
    }
    Ok(())
}
