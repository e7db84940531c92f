//! Manifest registry: the example, category, and documentation tables.
//!
//! The registry is loaded once from a JSON file, validated structurally, and
//! then handed by reference to every component. It is never mutated after
//! [`Registry::load`] returns.
//!
//! ## File format
//!
//! ```json
//! {
//!   "settings": { "baseTemplate": "fhevm-hardhat-template" },
//!   "examples": [
//!     { "id": "fhe-counter", "contract": "contracts/basic/FHECounter.sol",
//!       "test": "test/basic/FHECounter.ts", "description": "...", "category": "basic" }
//!   ],
//!   "categories": [
//!     { "id": "basic", "name": "Basic Examples", "description": "...",
//!       "contracts": [ { "contract": "contracts/basic/FHECounter.sol",
//!                        "test": "test/basic/FHECounter.ts" } ] }
//!   ],
//!   "docs": [
//!     { "id": "fhe-counter", "title": "FHE Counter", "description": "...",
//!       "contract": "...", "test": "...", "output": "docs/fhe-counter.md",
//!       "category": "Basic" }
//!   ]
//! }
//! ```
//!
//! All paths are relative to the directory holding the registry file.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assembler::unit;
use crate::config::Settings;
use crate::error::{ExemplarError, Result};

/// One standalone example: a source unit, its test unit, and extra files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleEntry {
    pub id: String,
    pub contract: PathBuf,
    pub test: PathBuf,
    pub description: String,
    pub category: String,
    /// Extra files the source unit depends on (other contracts, libraries).
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
    /// Optional test fixture placed next to the test unit.
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

/// One source/test pair inside a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUnit {
    pub contract: PathBuf,
    pub test: PathBuf,
    #[serde(default)]
    pub dependencies: Vec<PathBuf>,
    /// Copy only the contract; the test unit is left out of the project.
    #[serde(default)]
    pub skip_test: bool,
}

/// A named group of examples generated into one multi-unit project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub contracts: Vec<CategoryUnit>,
    /// Dependency pins applied only to this category's project.
    #[serde(default)]
    pub additional_deps: BTreeMap<String, String>,
}

/// Documentation metadata for one example.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub contract: PathBuf,
    pub test: PathBuf,
    /// Output document path, relative to the project root.
    pub output: PathBuf,
    /// Display label of the index heading this document is listed under.
    pub category: String,
    /// Optional organizational tag (book chapter).
    #[serde(default)]
    pub chapter: Option<String>,
}

/// On-disk shape of the registry file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryFile {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub examples: Vec<ExampleEntry>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub docs: Vec<DocEntry>,
}

/// A category unit together with the unit name derived from its contract.
#[derive(Debug, Clone)]
pub struct ResolvedUnit<'a> {
    pub unit: &'a CategoryUnit,
    pub name: String,
}

/// The validated, immutable registry.
#[derive(Debug, Clone)]
pub struct Registry {
    root: PathBuf,
    pub settings: Settings,
    examples: Vec<ExampleEntry>,
    categories: Vec<CategoryEntry>,
    docs: Vec<DocEntry>,
}

impl Registry {
    /// Load and structurally validate a registry file.
    ///
    /// The directory holding the file becomes the root that manifest paths
    /// are resolved against.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ExemplarError::RegistryNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file: RegistryFile =
            serde_json::from_str(&contents).map_err(|e| ExemplarError::RegistryParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::new(root, file)
    }

    /// Build a registry from already-parsed tables.
    pub fn new(root: PathBuf, file: RegistryFile) -> Result<Self> {
        let registry = Self {
            root,
            settings: file.settings,
            examples: file.examples,
            categories: file.categories,
            docs: file.docs,
        };
        registry.validate_structure()?;
        Ok(registry)
    }

    /// Directory manifest paths are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a manifest path against the root.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn examples(&self) -> &[ExampleEntry] {
        &self.examples
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn docs(&self) -> &[DocEntry] {
        &self.docs
    }

    /// Look up an example; unknown identifiers are a hard error.
    pub fn example(&self, id: &str) -> Result<&ExampleEntry> {
        self.examples
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| ExemplarError::UnknownExample(id.to_string()))
    }

    /// Look up a category; unknown identifiers are a hard error.
    pub fn category(&self, id: &str) -> Result<&CategoryEntry> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ExemplarError::UnknownCategory(id.to_string()))
    }

    /// Look up a documentation entry; unknown identifiers are a hard error.
    pub fn doc(&self, id: &str) -> Result<&DocEntry> {
        self.docs
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ExemplarError::UnknownDoc(id.to_string()))
    }

    /// Documentation entry for an example, if one was authored.
    pub fn doc_for(&self, id: &str) -> Option<&DocEntry> {
        self.docs.iter().find(|d| d.id == id)
    }

    /// Example identifiers in declaration order, optionally filtered by category tag.
    ///
    /// A filter naming a tag that no example and no category carries is an error.
    pub fn example_ids(&self, category: Option<&str>) -> Result<Vec<String>> {
        let ids: Vec<String> = self
            .examples
            .iter()
            .filter(|e| category.is_none_or(|c| e.category == c))
            .map(|e| e.id.clone())
            .collect();

        if let Some(tag) = category {
            let declared = self.categories.iter().any(|c| c.id == tag);
            if ids.is_empty() && !declared {
                return Err(ExemplarError::UnknownCategory(tag.to_string()));
            }
        }
        Ok(ids)
    }

    /// Check that the files an example references exist.
    pub fn check_example_files(&self, entry: &ExampleEntry) -> Result<()> {
        self.require_file("contract", &entry.contract)?;
        self.require_file("test", &entry.test)?;
        Ok(())
    }

    /// Derive every unit name of a category, rejecting missing files and
    /// duplicate names before anything is written.
    pub fn resolve_category_units<'a>(
        &self,
        category: &'a CategoryEntry,
    ) -> Result<Vec<ResolvedUnit<'a>>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(category.contracts.len());

        for unit in &category.contracts {
            let contract = self.require_file("contract", &unit.contract)?;
            if !unit.skip_test {
                self.require_file("test", &unit.test)?;
            }
            let content = std::fs::read_to_string(&contract)?;
            let name = unit::derive_unit_name(&content)
                .ok_or_else(|| ExemplarError::UnitNameNotFound(unit.contract.clone()))?;

            if !seen.insert(name.clone()) {
                return Err(ExemplarError::DuplicateUnit {
                    category: category.id.clone(),
                    unit: name,
                });
            }
            resolved.push(ResolvedUnit { unit, name });
        }

        Ok(resolved)
    }

    /// Run every file-level check across the registry and collect all problems.
    pub fn check(&self) -> Vec<ExemplarError> {
        let mut problems = Vec::new();

        for entry in &self.examples {
            if let Err(e) = self.check_example_files(entry) {
                problems.push(e);
                continue;
            }
            match std::fs::read_to_string(self.resolve(&entry.contract)) {
                Ok(content) if unit::derive_unit_name(&content).is_none() => {
                    problems.push(ExemplarError::UnitNameNotFound(entry.contract.clone()));
                }
                Ok(_) => {}
                Err(e) => problems.push(e.into()),
            }
        }

        for category in &self.categories {
            if let Err(e) = self.resolve_category_units(category) {
                problems.push(e);
            }
        }

        for doc in &self.docs {
            for (what, path) in [("contract", &doc.contract), ("test", &doc.test)] {
                if let Err(e) = self.require_file(what, path) {
                    problems.push(e);
                }
            }
        }

        problems
    }

    fn require_file(&self, what: &'static str, relative: &Path) -> Result<PathBuf> {
        let path = self.resolve(relative);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ExemplarError::MissingFile {
                what,
                path: relative.to_path_buf(),
            })
        }
    }

    fn validate_structure(&self) -> Result<()> {
        check_unique("example", self.examples.iter().map(|e| e.id.as_str()))?;
        check_unique("category", self.categories.iter().map(|c| c.id.as_str()))?;
        check_unique("doc", self.docs.iter().map(|d| d.id.as_str()))?;

        for category in &self.categories {
            if category.contracts.is_empty() {
                return Err(ExemplarError::InvalidRegistry(format!(
                    "category '{}' lists no contracts",
                    category.id
                )));
            }
            let mut paths = HashSet::new();
            for unit in &category.contracts {
                if !paths.insert(&unit.contract) {
                    return Err(ExemplarError::InvalidRegistry(format!(
                        "category '{}' lists {} twice",
                        category.id,
                        unit.contract.display()
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_unique<'a>(table: &str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(ExemplarError::InvalidRegistry(format!(
                "{table} entry with an empty id"
            )));
        }
        if !seen.insert(id) {
            return Err(ExemplarError::InvalidRegistry(format!(
                "duplicate {table} id '{id}'"
            )));
        }
    }
    Ok(())
}
