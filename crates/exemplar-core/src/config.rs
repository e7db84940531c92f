//! Tool settings carried in the `settings` block of the registry file.
//!
//! Every field has a default matching the layout of an fhEVM Hardhat
//! examples repository, so a registry file only needs to list what differs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Paths, names, and commands shared by every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Base project template copied into every generated project.
    pub base_template: PathBuf,
    /// Parent directory of single-example outputs.
    pub output_dir: PathBuf,
    /// Parent directory of category outputs.
    pub category_output_dir: PathBuf,
    /// Root of the source-unit area, both in the registry and in generated projects.
    pub contracts_dir: PathBuf,
    /// Root of the test-unit area.
    pub tests_dir: PathBuf,
    /// File extension of source units (without the dot).
    pub source_extension: String,
    /// Unit name embedded in the template's deployment script.
    pub template_unit_name: String,
    /// Template files removed after copying (placeholder contract, test, task).
    pub placeholder_files: Vec<PathBuf>,
    /// Deployment script, relative to a project root.
    pub deploy_script: PathBuf,
    /// Directory names never copied or searched.
    pub excluded_dirs: Vec<String>,
    /// File names never copied out of the template.
    pub excluded_files: Vec<String>,
    /// Lock files removed after the package descriptor is patched.
    pub lock_files: Vec<String>,
    /// Prefix of generated package names (`<prefix><id>`).
    pub package_prefix: String,
    /// Homepage written into generated package descriptors.
    pub homepage: String,
    /// Dependency pins applied to every generated package descriptor.
    pub dependency_pins: BTreeMap<String, String>,
    /// Documentation directory, relative to a project root.
    pub docs_dir: PathBuf,
    /// Cumulative index file name inside `docs_dir`.
    pub index_file: String,
    /// Build and test commands run inside a generated project, in order.
    pub test_commands: Vec<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_template: PathBuf::from("fhevm-hardhat-template"),
            output_dir: PathBuf::from("output"),
            category_output_dir: PathBuf::from("output/categories"),
            contracts_dir: PathBuf::from("contracts"),
            tests_dir: PathBuf::from("test"),
            source_extension: "sol".into(),
            template_unit_name: "FHECounter".into(),
            placeholder_files: vec![
                PathBuf::from("contracts/FHECounter.sol"),
                PathBuf::from("test/FHECounter.ts"),
                PathBuf::from("tasks/FHECounter.ts"),
            ],
            deploy_script: PathBuf::from("deploy/deploy.ts"),
            excluded_dirs: [
                "node_modules",
                "artifacts",
                "cache",
                "coverage",
                "types",
                "dist",
                "fhevmTemp",
                "output",
                ".git",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            excluded_files: [".gitignore", "package-lock.json", "yarn.lock", "pnpm-lock.yaml"]
                .into_iter()
                .map(String::from)
                .collect(),
            lock_files: ["package-lock.json", "yarn.lock", "pnpm-lock.yaml"]
                .into_iter()
                .map(String::from)
                .collect(),
            package_prefix: "fhevm-example-".into(),
            homepage: "https://docs.zama.ai/protocol".into(),
            dependency_pins: BTreeMap::from([
                ("@fhevm/solidity".to_string(), "^0.8.0".to_string()),
                ("@fhevm/hardhat-plugin".to_string(), "^0.1.0".to_string()),
            ]),
            docs_dir: PathBuf::from("docs"),
            index_file: "SUMMARY.md".into(),
            test_commands: vec![
                vec!["npm".into(), "install".into()],
                vec!["npm".into(), "run".into(), "compile".into()],
                vec!["npm".into(), "run".into(), "test".into()],
            ],
        }
    }
}

impl Settings {
    /// Whether a directory with this name is skipped by copies and searches.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == name)
    }

    /// Whether a file with this name is left behind when copying the template.
    pub fn is_excluded_file(&self, name: &str) -> bool {
        self.excluded_files.iter().any(|f| f == name)
    }

    /// Path of the cumulative documentation index under `project_root`.
    pub fn index_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.docs_dir).join(&self.index_file)
    }

    /// Whether `path` has the source-unit extension.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext == self.source_extension.as_str())
    }
}
