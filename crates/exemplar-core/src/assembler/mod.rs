//! File assembly for generated projects.
//!
//! The [`Assembler`] places source and test units into a project, resolves
//! their extra dependency files, and keeps relative imports pointing at the
//! right place after files move.
//!
//! ## Placement
//!
//! Registry files live under `contracts/<category>/...` and
//! `test/<category>/...`. In a generated project the category segment is
//! dropped, so `contracts/basic/encrypt/A.sol` lands at
//! `contracts/encrypt/A.sol`. Files stored outside the area they belong to
//! (a library kept under `lib/`, say) are placed flat at the area root.

pub mod copy;
pub mod descriptor;
pub mod imports;
pub mod paths;
pub mod unit;

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::registry::Registry;

/// Which area of a project a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Contracts and the libraries they use.
    Source,
    /// Tests, fixtures, and test helpers.
    Test,
}

/// A file copied into a project.
#[derive(Debug, Clone)]
pub struct PlacedFile {
    /// Path relative to the registry root.
    pub original: PathBuf,
    /// Path relative to the project root.
    pub placed: PathBuf,
    pub role: Role,
}

/// Outcome of [`Assembler::resolve_dependencies`].
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    pub placed: Vec<PlacedFile>,
    /// Import specifiers rewritten across all placed files.
    pub rewrites: usize,
    /// Dependencies that could not be found and were skipped.
    pub warnings: Vec<String>,
}

/// Performs the file operations of one generation run.
pub struct Assembler<'a> {
    registry: &'a Registry,
}

impl<'a> Assembler<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn settings(&self) -> &Settings {
        &self.registry.settings
    }

    fn area(&self, role: Role) -> &Path {
        match role {
            Role::Source => &self.settings().contracts_dir,
            Role::Test => &self.settings().tests_dir,
        }
    }

    /// Copy one registry file into the `role` area of `dest_root`.
    pub fn place(&self, original: &Path, role: Role, dest_root: &Path) -> Result<PlacedFile> {
        let area = self.area(role);
        let placed = area.join(paths::placement_subpath(original, area));
        copy::place_unit(&self.registry.resolve(original), dest_root, &placed)?;
        Ok(PlacedFile {
            original: original.to_path_buf(),
            placed,
            role,
        })
    }

    /// Copy extra files next to the units that need them and fix up imports.
    ///
    /// Each dependency goes to the area of the unit that imports it; when no
    /// unit imports it, the extension and location decide. Missing files are
    /// skipped with a warning.
    pub fn resolve_dependencies(
        &self,
        dependencies: &[PathBuf],
        units: &[PlacedFile],
        dest_root: &Path,
    ) -> Result<DependencyReport> {
        let mut report = DependencyReport::default();
        if dependencies.is_empty() {
            return Ok(report);
        }

        let mut source_imports = Vec::new();
        let mut test_imports = Vec::new();
        for unit in units {
            let text = std::fs::read_to_string(dest_root.join(&unit.placed))?;
            let specs = imports::import_specifiers(&text);
            match unit.role {
                Role::Source => source_imports.extend(specs),
                Role::Test => test_imports.extend(specs),
            }
        }

        for dependency in dependencies {
            if !self.registry.resolve(dependency).is_file() {
                let message = format!("dependency not found, skipping: {}", dependency.display());
                tracing::warn!("{message}");
                report.warnings.push(message);
                continue;
            }
            let role = self.dependency_role(dependency, &source_imports, &test_imports);
            report.placed.push(self.place(dependency, role, dest_root)?);
        }

        let mut all = units.to_vec();
        all.extend(report.placed.iter().cloned());
        report.rewrites = rewrite_relocated_imports(&all, dest_root)?;

        Ok(report)
    }

    fn dependency_role(&self, dependency: &Path, source_imports: &[String], test_imports: &[String]) -> Role {
        if imports_file(source_imports, dependency) {
            Role::Source
        } else if imports_file(test_imports, dependency) {
            Role::Test
        } else if self.settings().is_source_file(dependency) {
            Role::Source
        } else if paths::normalize(dependency).starts_with(&self.settings().tests_dir) {
            Role::Test
        } else {
            Role::Source
        }
    }
}

/// Whether any specifier names `file`, with or without its extension.
fn imports_file(specifiers: &[String], file: &Path) -> bool {
    let (Some(name), Some(stem)) = (file.file_name(), file.file_stem()) else {
        return false;
    };
    specifiers.iter().any(|spec| {
        Path::new(spec)
            .file_name()
            .is_some_and(|n| n == name || n == stem)
    })
}

/// Rewrite every relative import between placed files whose specifier changed
/// because one side moved. Returns the number of specifiers rewritten.
fn rewrite_relocated_imports(files: &[PlacedFile], dest_root: &Path) -> Result<usize> {
    let mut total = 0;

    for importer in files {
        let path = dest_root.join(&importer.placed);
        let Ok(mut text) = std::fs::read_to_string(&path) else {
            continue;
        };
        let mut changed = 0;

        for target in files {
            if std::ptr::eq(importer, target) {
                continue;
            }
            let old = paths::relative_import(&importer.original, &target.original);
            let new = paths::relative_import(&importer.placed, &target.placed);
            let (old, new) = (paths::strip_extension(&old), paths::strip_extension(&new));
            if old == new {
                continue;
            }
            let (rewritten, n) = imports::rewrite_known_import_patterns(&text, old, new);
            if n > 0 {
                tracing::debug!("{}: import {old} -> {new}", importer.placed.display());
                text = rewritten;
                changed += n;
            }
        }

        if changed > 0 {
            std::fs::write(&path, text)?;
            total += changed;
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_place_strips_category() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        let out = tempfile::tempdir().unwrap();
        let placed = Assembler::new(&registry)
            .place(
                Path::new("contracts/basic/encrypt/EncryptSingleValue.sol"),
                Role::Source,
                out.path(),
            )
            .unwrap();
        assert_eq!(placed.placed, PathBuf::from("contracts/encrypt/EncryptSingleValue.sol"));
        assert!(out.path().join(&placed.placed).is_file());
    }

    #[test]
    fn test_resolve_dependencies_relocates_and_rewrites() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        let assembler = Assembler::new(&registry);
        let out = tempfile::tempdir().unwrap();

        let units = vec![
            assembler
                .place(Path::new("contracts/vault/PrivateVault.sol"), Role::Source, out.path())
                .unwrap(),
            assembler
                .place(Path::new("test/vault/PrivateVault.ts"), Role::Test, out.path())
                .unwrap(),
        ];
        let report = assembler
            .resolve_dependencies(
                &[
                    PathBuf::from("contracts/lib/VaultMath.sol"),
                    PathBuf::from("test/fixtures/vaultFixture.ts"),
                ],
                &units,
                out.path(),
            )
            .unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(report.rewrites, 2);
        assert!(out.path().join("contracts/VaultMath.sol").is_file());
        assert!(out.path().join("test/vaultFixture.ts").is_file());

        let contract = std::fs::read_to_string(out.path().join("contracts/PrivateVault.sol")).unwrap();
        assert!(contract.contains("import {VaultMath} from \"./VaultMath.sol\";"));
        assert!(!contract.contains("../lib/VaultMath.sol"));

        let test = std::fs::read_to_string(out.path().join("test/PrivateVault.ts")).unwrap();
        assert!(test.contains("from \"./vaultFixture\""));
    }

    #[test]
    fn test_library_outside_contracts_goes_with_contracts() {
        let fx = fixtures::Fixture::new();
        fx.write("test/helpers/Limits.sol", "pragma solidity ^0.8.24;\nlibrary Limits {}\n");
        let registry = fx.registry();
        let assembler = Assembler::new(&registry);
        let out = tempfile::tempdir().unwrap();

        let units = vec![assembler
            .place(Path::new("contracts/basic/FHECounter.sol"), Role::Source, out.path())
            .unwrap()];
        let report = assembler
            .resolve_dependencies(&[PathBuf::from("test/helpers/Limits.sol")], &units, out.path())
            .unwrap();

        assert_eq!(report.placed[0].role, Role::Source);
        assert!(out.path().join("contracts/Limits.sol").is_file());
    }

    #[test]
    fn test_missing_dependency_is_a_warning() {
        let fx = fixtures::Fixture::new();
        let registry = fx.registry();
        let assembler = Assembler::new(&registry);
        let out = tempfile::tempdir().unwrap();

        let units = vec![assembler
            .place(Path::new("contracts/basic/FHECounter.sol"), Role::Source, out.path())
            .unwrap()];
        let report = assembler
            .resolve_dependencies(&[PathBuf::from("contracts/lib/Gone.sol")], &units, out.path())
            .unwrap();

        assert!(report.placed.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }
}
