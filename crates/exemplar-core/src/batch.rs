//! Batch generation and testing of many examples.
//!
//! Each identifier is processed in order: its output directory is cleared
//! without asking, the project is generated with documentation, and the
//! optional build+test step runs. A failing item is recorded and the run
//! moves on.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{ExemplarError, Result};
use crate::registry::Registry;
use crate::runner::ProjectRunner;
use crate::scaffold::{ExampleOptions, Overwrite, Scaffolder};

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub run_tests: bool,
}

/// Final state of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    /// Generated and tested successfully.
    Passed,
    /// Generated; tests were not requested.
    Generated,
    GenerationFailed(String),
    TestFailed(String),
}

impl ItemStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed | Self::Generated)
    }
}

#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub id: String,
    pub status: ItemStatus,
    pub elapsed: Duration,
    pub output: PathBuf,
    /// Warnings raised while generating the project.
    pub warnings: Vec<String>,
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Failed identifiers in run order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_success())
            .map(|o| o.id.as_str())
            .collect()
    }
}

/// Progress notifications for the caller's UI.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started { index: usize, total: usize, id: &'a str },
    Generated { id: &'a str },
    Finished(&'a ItemOutcome),
}

/// Examples to process: every example, or those tagged with `category`.
///
/// An unknown category and an empty selection are errors.
pub fn select_ids(registry: &Registry, category: Option<&str>) -> Result<Vec<String>> {
    let ids = registry.example_ids(category)?;
    if ids.is_empty() {
        return Err(ExemplarError::EmptySelection);
    }
    Ok(ids)
}

/// Generate (and optionally test) every example in `ids`, in order.
///
/// Only an empty list is an error; per-item failures end up in the report.
pub async fn run_batch(
    registry: &Registry,
    ids: &[String],
    options: BatchOptions,
    runner: &dyn ProjectRunner,
    on_event: &mut (dyn FnMut(BatchEvent<'_>) + Send),
) -> Result<BatchReport> {
    if ids.is_empty() {
        return Err(ExemplarError::EmptySelection);
    }

    let scaffolder = Scaffolder::new(registry);
    let started = Instant::now();
    let mut report = BatchReport::default();

    for (index, id) in ids.iter().enumerate() {
        on_event(BatchEvent::Started {
            index,
            total: ids.len(),
            id,
        });
        let item_started = Instant::now();
        let output = scaffolder.example_output_dir(id);
        let mut warnings = Vec::new();

        let status = match generate(&scaffolder, id, &output) {
            Err(e) => {
                tracing::warn!("{id}: generation failed: {e}");
                ItemStatus::GenerationFailed(e.to_string())
            }
            Ok(project_warnings) => {
                warnings = project_warnings;
                on_event(BatchEvent::Generated { id });
                if options.run_tests {
                    match runner.build_and_test(&output).await {
                        Ok(()) => ItemStatus::Passed,
                        Err(e) => {
                            tracing::warn!("{id}: tests failed: {e}");
                            ItemStatus::TestFailed(e.to_string())
                        }
                    }
                } else {
                    ItemStatus::Generated
                }
            }
        };

        report.outcomes.push(ItemOutcome {
            id: id.clone(),
            status,
            elapsed: item_started.elapsed(),
            output,
            warnings,
        });
        if let Some(outcome) = report.outcomes.last() {
            on_event(BatchEvent::Finished(outcome));
        }
    }

    report.elapsed = started.elapsed();
    tracing::info!(
        "batch finished: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

/// `Overwrite::Replace` clears any previous output first.
fn generate(scaffolder: &Scaffolder<'_>, id: &str, output: &Path) -> Result<Vec<String>> {
    let project = scaffolder.create_example_project(
        id,
        output,
        ExampleOptions {
            with_docs: true,
            overwrite: Overwrite::Replace,
        },
    )?;
    Ok(project.warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::runner::PrerequisiteError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the directories it was asked to test and fails those whose
    /// name is listed.
    #[derive(Default)]
    struct FakeRunner {
        fail: Vec<&'static str>,
        seen: Mutex<Vec<PathBuf>>,
    }

    #[async_trait]
    impl ProjectRunner for FakeRunner {
        fn name(&self) -> &str {
            "fake"
        }

        fn check_prerequisites(&self) -> std::result::Result<(), Vec<PrerequisiteError>> {
            Ok(())
        }

        async fn build_and_test(&self, project_dir: &Path) -> Result<()> {
            assert!(project_dir.join("package.json").is_file());
            self.seen.lock().unwrap().push(project_dir.to_path_buf());
            let name = project_dir.file_name().unwrap().to_string_lossy();
            if self.fail.iter().any(|f| *f == name) {
                return Err(ExemplarError::CommandFailed {
                    command: "npm run test".into(),
                    dir: project_dir.to_path_buf(),
                    status: "exit status: 1".into(),
                });
            }
            Ok(())
        }
    }

    fn all_ids(registry: &Registry) -> Vec<String> {
        select_ids(registry, None).unwrap()
    }

    #[tokio::test]
    async fn test_bad_entry_does_not_stop_the_batch() {
        let fx = fixtures::Fixture::new();
        let mut file = fixtures::registry_file();
        file.examples[1].contract = "contracts/basic/encrypt/Gone.sol".into();
        let registry = Registry::new(fx.root().to_path_buf(), file).unwrap();
        let runner = FakeRunner::default();

        let mut events = 0;
        let report = run_batch(
            &registry,
            &all_ids(&registry),
            BatchOptions { run_tests: true },
            &runner,
            &mut |_| events += 1,
        )
        .await
        .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[0].status, ItemStatus::Passed);
        assert!(matches!(report.outcomes[1].status, ItemStatus::GenerationFailed(_)));
        assert_eq!(report.outcomes[2].status, ItemStatus::Passed);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed_ids(), vec!["encrypt-single-value"]);
        // Started + Finished for all, Generated for the two good ones.
        assert_eq!(events, 8);

        // The runner never saw the failed item.
        assert_eq!(runner.seen.lock().unwrap().len(), 2);
        assert!(fx.root().join("output/fhe-counter/docs/fhe-counter.md").is_file());
        assert!(fx.root().join("output/private-vault/docs/SUMMARY.md").is_file());
    }

    #[tokio::test]
    async fn test_test_failures_are_recorded() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        let runner = FakeRunner {
            fail: vec!["private-vault"],
            ..Default::default()
        };

        let report = run_batch(
            &registry,
            &all_ids(&registry),
            BatchOptions { run_tests: true },
            &runner,
            &mut |_| {},
        )
        .await
        .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(matches!(report.outcomes[2].status, ItemStatus::TestFailed(_)));
        assert!(report.outcomes[2].output.join("package.json").is_file());
    }

    #[tokio::test]
    async fn test_existing_outputs_are_cleared() {
        let fx = fixtures::Fixture::new();
        fx.write("output/fhe-counter/stale.txt", "old\n");
        let registry = fx.registry();

        let report = run_batch(
            &registry,
            &["fhe-counter".to_string()],
            BatchOptions::default(),
            &FakeRunner::default(),
            &mut |_| {},
        )
        .await
        .unwrap();

        assert_eq!(report.outcomes[0].status, ItemStatus::Generated);
        assert!(!fx.root().join("output/fhe-counter/stale.txt").exists());
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_item_failure() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();

        let report = run_batch(
            &registry,
            &["nope".to_string(), "fhe-counter".to_string()],
            BatchOptions::default(),
            &FakeRunner::default(),
            &mut |_| {},
        )
        .await
        .unwrap();

        assert_eq!(report.failed_ids(), vec!["nope"]);
        assert_eq!(report.succeeded(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_is_an_error() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        let err = run_batch(&registry, &[], BatchOptions::default(), &FakeRunner::default(), &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ExemplarError::EmptySelection));
    }

    #[test]
    fn test_select_ids() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        assert_eq!(
            select_ids(&registry, Some("basic")).unwrap(),
            vec!["fhe-counter", "encrypt-single-value"]
        );
        assert!(matches!(
            select_ids(&registry, Some("nope")),
            Err(ExemplarError::UnknownCategory(_))
        ));
    }
}
