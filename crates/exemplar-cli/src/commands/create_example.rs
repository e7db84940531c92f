use std::path::Path;

use anyhow::Result;

use exemplar_core::runner::ProjectRunner;
use exemplar_core::scaffold::{ExampleOptions, Scaffolder};

use crate::output;

/// Generate one example project, optionally with docs and a test run.
///
/// An existing output directory is only replaced with `--force` or after
/// confirmation. A failing test run fails the whole command.
pub async fn run(
    registry_path: &Path,
    id: &str,
    out_dir: Option<&Path>,
    with_docs: bool,
    force: bool,
    run_tests: bool,
) -> Result<()> {
    output::print_header(&format!("exemplar create-example: {id}"));

    let registry = super::load_registry(registry_path)?;
    let scaffolder = Scaffolder::new(&registry);
    let out = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| scaffolder.example_output_dir(id));
    let overwrite = super::overwrite_policy(&out, force)?;

    let total = if run_tests { 2 } else { 1 };
    output::print_step(1, total, &format!("Generating project in {}", out.display()));
    let project = scaffolder.create_example_project(id, &out, ExampleOptions { with_docs, overwrite })?;

    for warning in &project.warnings {
        output::print_warning(warning);
    }
    output::print_key_value("Contract", &project.unit_names.join(", "));
    output::print_key_value("Files placed", &project.files.len().to_string());
    if let Some(doc) = &project.docs {
        output::print_key_value("Docs", &doc.display().to_string());
    }

    if run_tests {
        let runner = super::test_runner(&registry)?;
        output::print_step(2, total, &format!("Building and testing with {}", runner.name()));
        runner.build_and_test(&out).await?;
        output::print_success("Tests passed");
    }

    output::print_success(&format!("Example '{id}' created"));
    println!();
    println!("  Next steps:");
    println!("    cd {}", out.display());
    println!("    npm install");
    println!("    npm run test");
    println!();

    Ok(())
}
