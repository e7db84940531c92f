//! Build-and-test execution for generated projects.
//!
//! The [`ProjectRunner`] trait is the seam between the batch orchestrator and
//! the external build tool. [`CommandRunner`] runs the configured argv list;
//! tests substitute their own implementation.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{ExemplarError, Result};

/// Information about a missing prerequisite tool.
#[derive(Debug, Clone)]
pub struct PrerequisiteError {
    pub tool_name: String,
    pub install_instructions: String,
}

impl From<PrerequisiteError> for ExemplarError {
    fn from(e: PrerequisiteError) -> Self {
        ExemplarError::MissingTool {
            name: e.tool_name,
            install: e.install_instructions,
        }
    }
}

/// Builds and tests a generated project.
#[async_trait]
pub trait ProjectRunner: Send + Sync {
    /// Short name for user-facing output, e.g. "npm".
    fn name(&self) -> &str;

    /// Check that every tool the runner invokes is installed.
    fn check_prerequisites(&self) -> std::result::Result<(), Vec<PrerequisiteError>>;

    /// Install, compile and test the project in `project_dir`.
    async fn build_and_test(&self, project_dir: &Path) -> Result<()>;
}

/// Runs a fixed list of commands, in order, inside the project directory.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    commands: Vec<Vec<String>>,
}

impl CommandRunner {
    pub fn new(commands: Vec<Vec<String>>) -> Self {
        Self {
            commands: commands.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }

    /// Distinct programs invoked, in first-use order.
    pub fn tools(&self) -> Vec<&str> {
        let mut tools: Vec<&str> = Vec::new();
        for program in self.commands.iter().map(|c| c[0].as_str()) {
            if !tools.contains(&program) {
                tools.push(program);
            }
        }
        tools
    }
}

#[async_trait]
impl ProjectRunner for CommandRunner {
    fn name(&self) -> &str {
        self.tools().first().copied().unwrap_or("none")
    }

    fn check_prerequisites(&self) -> std::result::Result<(), Vec<PrerequisiteError>> {
        let missing: Vec<PrerequisiteError> = self
            .tools()
            .into_iter()
            .filter(|tool| which::which(tool).is_err())
            .map(|tool| PrerequisiteError {
                tool_name: tool.to_string(),
                install_instructions: install_hint(tool).to_string(),
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    async fn build_and_test(&self, project_dir: &Path) -> Result<()> {
        for argv in &self.commands {
            let command = argv.join(" ");
            tracing::debug!("running `{command}` in {}", project_dir.display());

            let status = Command::new(&argv[0])
                .args(&argv[1..])
                .current_dir(project_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => ExemplarError::MissingTool {
                        name: argv[0].clone(),
                        install: install_hint(&argv[0]).to_string(),
                    },
                    _ => ExemplarError::Io(e),
                })?;

            if !status.success() {
                return Err(ExemplarError::CommandFailed {
                    command,
                    dir: project_dir.to_path_buf(),
                    status: status.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn install_hint(tool: &str) -> &'static str {
    match tool {
        "npm" | "npx" | "node" => "https://nodejs.org/en/download",
        "pnpm" => "npm install -g pnpm",
        "yarn" => "npm install -g yarn",
        _ => "see the tool's documentation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tools_are_distinct_and_ordered() {
        let runner = CommandRunner::new(vec![
            argv(&["npm", "install"]),
            vec![],
            argv(&["npx", "hardhat", "compile"]),
            argv(&["npm", "test"]),
        ]);
        assert_eq!(runner.tools(), vec!["npm", "npx"]);
        assert_eq!(runner.name(), "npm");
    }

    #[test]
    fn test_missing_prerequisite_reported() {
        let runner = CommandRunner::new(vec![argv(&["this_tool_does_not_exist_xyz", "build"])]);
        let missing = runner.check_prerequisites().unwrap_err();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].tool_name, "this_tool_does_not_exist_xyz");
    }

    #[tokio::test]
    async fn test_missing_program_is_missing_tool() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new(vec![argv(&["this_tool_does_not_exist_xyz"])]);
        let err = runner.build_and_test(dir.path()).await.unwrap_err();
        assert!(matches!(err, ExemplarError::MissingTool { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new(vec![
            argv(&["sh", "-c", "touch first"]),
            argv(&["sh", "-c", "exit 3"]),
            argv(&["sh", "-c", "touch third"]),
        ]);

        let err = runner.build_and_test(dir.path()).await.unwrap_err();
        match err {
            ExemplarError::CommandFailed { command, .. } => assert_eq!(command, "sh -c exit 3"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join("first").exists());
        assert!(!dir.path().join("third").exists());
    }
}
