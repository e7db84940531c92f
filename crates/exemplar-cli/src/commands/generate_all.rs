use std::path::Path;

use anyhow::Result;
use console::style;

use exemplar_core::batch::{self, BatchEvent, BatchOptions, ItemStatus};
use exemplar_core::runner::{CommandRunner, ProjectRunner};
use exemplar_core::version;

use crate::output;

/// Regenerate every selected example from scratch and optionally test it.
///
/// Exits non-zero when at least one example failed, after the summary.
pub async fn run(registry_path: &Path, skip_test: bool, category: Option<&str>) -> Result<()> {
    output::print_header("exemplar generate-all-and-test");

    let registry = super::load_registry(registry_path)?;
    let ids = batch::select_ids(&registry, category)?;

    let runner = if skip_test {
        CommandRunner::new(registry.settings.test_commands.clone())
    } else {
        let runner = super::test_runner(&registry)?;
        if let Some(tool) = runner.tools().first() {
            let found = version::detect_version(tool)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".into());
            output::print_key_value(tool, &found);
        }
        runner
    };

    output::print_key_value("Examples", &ids.len().to_string());
    output::print_key_value("Tests", if skip_test { "skipped" } else { runner.name() });

    let bar = output::progress_bar(ids.len() as u64);
    let report = batch::run_batch(
        &registry,
        &ids,
        BatchOptions {
            run_tests: !skip_test,
        },
        &runner,
        &mut |event| match event {
            BatchEvent::Started { id, .. } => bar.set_message(format!("generating {id}")),
            BatchEvent::Generated { id } if !skip_test => bar.set_message(format!("testing {id}")),
            BatchEvent::Generated { .. } => {}
            BatchEvent::Finished(outcome) => {
                bar.inc(1);
                for warning in &outcome.warnings {
                    bar.println(format!("{} {}: {warning}", style("[WARN]").yellow().bold(), outcome.id));
                }
            }
        },
    )
    .await?;
    bar.finish_and_clear();

    for outcome in &report.outcomes {
        let secs = format!("{:.1}s", outcome.elapsed.as_secs_f64());
        match &outcome.status {
            ItemStatus::Passed => output::print_success(&format!("{} ({secs})", outcome.id)),
            ItemStatus::Generated => output::print_success(&format!("{} generated ({secs})", outcome.id)),
            ItemStatus::GenerationFailed(reason) => {
                output::print_error(&format!("{}: generation failed: {reason}", outcome.id))
            }
            ItemStatus::TestFailed(reason) => {
                output::print_error(&format!("{}: tests failed: {reason}", outcome.id))
            }
        }
    }

    println!();
    output::print_key_value("Succeeded", &report.succeeded().to_string());
    output::print_key_value("Failed", &report.failed().to_string());
    output::print_key_value("Elapsed", &format!("{:.1}s", report.elapsed.as_secs_f64()));

    if report.failed() > 0 {
        anyhow::bail!("failed examples: {}", report.failed_ids().join(", "));
    }
    output::print_success("All examples succeeded");
    Ok(())
}
