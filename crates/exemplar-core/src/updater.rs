//! Bulk dependency version updates across package descriptors.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::assembler::descriptor::{self, DESCRIPTOR_FILE};
use crate::assembler::paths;
use crate::error::Result;
use crate::registry::Registry;
use crate::version::VersionReq;

/// Directories never searched for descriptors.
const SKIPPED_DIRS: [&str; 2] = ["node_modules", ".git"];

/// Where to look for descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    /// Generated example projects under the output directory.
    Outputs,
    /// Generated category projects.
    Categories,
    /// The base template.
    BaseTemplate,
    /// The descriptor at the registry root (not recursive).
    Main,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    /// Descriptors rewritten with the new version.
    pub updated: Vec<PathBuf>,
    /// Descriptors already at the version or not declaring the package.
    pub skipped: Vec<PathBuf>,
    /// Descriptors that could not be read or parsed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Set `package` to `version` in every descriptor of the requested scopes that
/// declares it.
///
/// Every descriptor is loaded before any is written, so an unreadable file is
/// reported in `failed` and never leaves the run half-applied. A file is
/// written only when its value actually changes. Scopes may overlap; each
/// file is visited once.
pub fn update_package_version(
    registry: &Registry,
    package: &str,
    version: &str,
    scopes: &[Scope],
) -> Result<UpdateReport> {
    let version = VersionReq::parse(version)?.to_string();

    let mut files = BTreeSet::new();
    for scope in scopes.iter().collect::<BTreeSet<_>>() {
        files.extend(descriptors_in_scope(registry, *scope)?);
    }
    tracing::debug!("{} descriptor(s) in scope", files.len());

    let mut report = UpdateReport::default();
    let mut loaded = Vec::with_capacity(files.len());
    for path in files {
        match descriptor::load(&path) {
            Ok(value) => loaded.push((path, value)),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", path.display());
                report.failed.push((path, e.to_string()));
            }
        }
    }

    for (path, mut value) in loaded {
        if descriptor::set_existing_dependency(&mut value, package, &version) {
            descriptor::save(&path, &value)?;
            tracing::info!("updated {package} to {version} in {}", path.display());
            report.updated.push(path);
        } else {
            report.skipped.push(path);
        }
    }
    Ok(report)
}

fn descriptors_in_scope(registry: &Registry, scope: Scope) -> Result<Vec<PathBuf>> {
    let settings = &registry.settings;
    let outputs = registry.resolve(&settings.output_dir);
    let categories = registry.resolve(&settings.category_output_dir);
    let base_template = registry.resolve(&settings.base_template);

    match scope {
        Scope::Main => {
            let path = registry.resolve(Path::new(DESCRIPTOR_FILE));
            Ok(if path.is_file() { vec![path] } else { vec![] })
        }
        // Category projects and the template live in their own scopes even
        // when nested under the output directory.
        Scope::Outputs => find_descriptors(&outputs, &[categories, base_template]),
        Scope::Categories => find_descriptors(&categories, &[]),
        Scope::BaseTemplate => find_descriptors(&base_template, &[]),
    }
}

/// Every descriptor below `root`, skipping dependency caches and the
/// `excluded` subtrees.
fn find_descriptors(root: &Path, excluded: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(vec![]);
    }

    let excluded: Vec<PathBuf> = excluded.iter().map(|p| paths::normalize(p)).collect();
    let mut found = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
        if e.depth() == 0 || !e.file_type().is_dir() {
            return true;
        }
        !SKIPPED_DIRS.iter().any(|d| e.file_name() == *d)
            && !excluded.contains(&paths::normalize(e.path()))
    });
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && entry.file_name() == DESCRIPTOR_FILE {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}
