//! Project generation from registry entries.
//!
//! A generated project is the base template minus its placeholder units, plus
//! the entry's source and test units, their dependency files, a patched
//! package descriptor, a deployment script, a README and optionally a
//! documentation directory.
//!
//! Everything that can be validated is validated before the output directory
//! is touched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::{NoExpand, Regex};
use serde_json::json;

use crate::assembler::descriptor::{self, DescriptorPatch};
use crate::assembler::{copy, unit, Assembler, PlacedFile, Role};
use crate::docs::{self, DocRequest};
use crate::error::{ExemplarError, Result};
use crate::registry::{CategoryEntry, ExampleEntry, Registry};
use crate::templates::embedded;
use crate::templates::renderer::TemplateRenderer;

/// What to do when the output directory already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Fail with [`ExemplarError::OutputExists`].
    #[default]
    Refuse,
    /// Remove the existing tree first.
    Replace,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExampleOptions {
    pub with_docs: bool,
    pub overwrite: Overwrite,
}

/// A project written to disk.
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub root: PathBuf,
    /// Unit names in placement order.
    pub unit_names: Vec<String>,
    /// Every file placed from the registry, relative to `root`.
    pub files: Vec<PlacedFile>,
    /// The generated document, when docs were requested and succeeded.
    pub docs: Option<PathBuf>,
    /// Skipped dependencies and failed documentation.
    pub warnings: Vec<String>,
}

/// Generates example and category projects.
pub struct Scaffolder<'a> {
    registry: &'a Registry,
    renderer: TemplateRenderer,
}

impl<'a> Scaffolder<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Default output directory of an example project.
    pub fn example_output_dir(&self, id: &str) -> PathBuf {
        self.registry
            .resolve(&self.registry.settings.output_dir)
            .join(id)
    }

    /// Default output directory of a category project.
    pub fn category_output_dir(&self, id: &str) -> PathBuf {
        self.registry
            .resolve(&self.registry.settings.category_output_dir)
            .join(id)
    }

    /// Generate a standalone project for one example.
    pub fn create_example_project(
        &self,
        id: &str,
        out: &Path,
        options: ExampleOptions,
    ) -> Result<GeneratedProject> {
        let settings = &self.registry.settings;
        let entry = self.registry.example(id)?;
        self.registry.check_example_files(entry)?;
        let unit_name = self.unit_name(&entry.contract)?;
        let template = self.template_dir()?;

        self.prepare_output(out, options.overwrite)?;
        tracing::info!("creating example '{id}' in {}", out.display());
        self.copy_template(&template, out)?;

        let assembler = Assembler::new(self.registry);
        let mut files = vec![
            assembler.place(&entry.contract, Role::Source, out)?,
            assembler.place(&entry.test, Role::Test, out)?,
        ];
        let dependencies: Vec<PathBuf> = entry
            .dependencies
            .iter()
            .chain(entry.fixture.iter())
            .cloned()
            .collect();
        let report = assembler.resolve_dependencies(&dependencies, &files, out)?;
        let mut warnings = report.warnings;
        files.extend(report.placed);

        descriptor::patch_descriptor(
            out,
            &DescriptorPatch {
                name: format!("{}{id}", settings.package_prefix),
                description: entry.description.clone(),
                homepage: settings.homepage.clone(),
                pins: settings.dependency_pins.clone(),
            },
            &settings.lock_files,
        )?;
        self.write_example_deploy_script(out, id, &unit_name)?;

        let docs = if options.with_docs {
            match self.generate_project_docs(entry, &files, out) {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("{e}");
                    warnings.push(e.to_string());
                    None
                }
            }
        } else {
            None
        };

        let title = self
            .registry
            .doc_for(id)
            .map(|d| d.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| docs::title_case(id));
        let readme = self.renderer.render(
            embedded::EXAMPLE_README,
            &json!({
                "title": title,
                "description": entry.description,
                "unit_name": unit_name,
                "contract_path": slash_path(&files[0].placed),
                "test_path": slash_path(&files[1].placed),
                "package_name": format!("{}{id}", settings.package_prefix),
                "homepage": settings.homepage,
                "has_docs": docs.is_some(),
            }),
        )?;
        std::fs::write(out.join("README.md"), readme)?;

        Ok(GeneratedProject {
            root: out.to_path_buf(),
            unit_names: vec![unit_name],
            files,
            docs,
            warnings,
        })
    }

    /// Generate one project holding every unit of a category.
    pub fn create_category_project(
        &self,
        category_id: &str,
        out: &Path,
        overwrite: Overwrite,
    ) -> Result<GeneratedProject> {
        let settings = &self.registry.settings;
        let category = self.registry.category(category_id)?;
        let units = self.registry.resolve_category_units(category)?;
        let template = self.template_dir()?;

        self.prepare_output(out, overwrite)?;
        tracing::info!(
            "creating category '{category_id}' ({} contracts) in {}",
            units.len(),
            out.display()
        );
        self.copy_template(&template, out)?;

        let assembler = Assembler::new(self.registry);
        let mut files = Vec::new();
        let mut warnings = Vec::new();
        let mut readme_units = Vec::new();

        for resolved in &units {
            let mut placed = vec![assembler.place(&resolved.unit.contract, Role::Source, out)?];
            if !resolved.unit.skip_test {
                placed.push(assembler.place(&resolved.unit.test, Role::Test, out)?);
            }
            let report = assembler.resolve_dependencies(&resolved.unit.dependencies, &placed, out)?;

            readme_units.push(json!({
                "name": resolved.name,
                "contract": slash_path(&placed[0].placed),
                "test": placed.get(1).map(|p| slash_path(&p.placed)),
            }));
            warnings.extend(report.warnings);
            files.extend(placed);
            files.extend(report.placed);
        }

        let package_name = format!("{}category-{category_id}", settings.package_prefix);
        descriptor::patch_descriptor(
            out,
            &DescriptorPatch {
                name: package_name.clone(),
                description: category.description.clone(),
                homepage: settings.homepage.clone(),
                pins: category_pins(&settings.dependency_pins, category),
            },
            &settings.lock_files,
        )?;

        let unit_names: Vec<String> = units.iter().map(|u| u.name.clone()).collect();
        let deploy = self.renderer.render(
            embedded::DEPLOY_SCRIPT,
            &json!({ "units": unit_names, "deploy_id": deploy_id(category_id) }),
        )?;
        write_file(&out.join(&settings.deploy_script), &deploy)?;

        let readme = self.renderer.render(
            embedded::CATEGORY_README,
            &json!({
                "name": category.name,
                "description": category.description,
                "units": readme_units,
                "package_name": package_name,
                "homepage": settings.homepage,
            }),
        )?;
        std::fs::write(out.join("README.md"), readme)?;

        Ok(GeneratedProject {
            root: out.to_path_buf(),
            unit_names,
            files,
            docs: None,
            warnings,
        })
    }

    fn unit_name(&self, contract: &Path) -> Result<String> {
        let content = std::fs::read_to_string(self.registry.resolve(contract))?;
        unit::derive_unit_name(&content)
            .ok_or_else(|| ExemplarError::UnitNameNotFound(contract.to_path_buf()))
    }

    fn template_dir(&self) -> Result<PathBuf> {
        let dir = self.registry.resolve(&self.registry.settings.base_template);
        if !dir.is_dir() {
            return Err(ExemplarError::MissingFile {
                what: "base template",
                path: dir,
            });
        }
        Ok(dir)
    }

    /// Enforce the overwrite rule on an existing output directory.
    ///
    /// An output that holds the registry root or the base template is never
    /// replaced, and neither is a regular file.
    fn prepare_output(&self, out: &Path, overwrite: Overwrite) -> Result<()> {
        if !out.exists() {
            return Ok(());
        }

        let target = out.canonicalize()?;
        let protected = [
            self.registry.root().to_path_buf(),
            self.registry.resolve(&self.registry.settings.base_template),
        ];
        for path in protected.iter().filter(|p| p.exists()) {
            if path.canonicalize()?.starts_with(&target) {
                return Err(ExemplarError::UnsafeOutput {
                    path: out.to_path_buf(),
                    reason: format!("it contains {}", path.display()),
                });
            }
        }

        match overwrite {
            Overwrite::Refuse => Err(ExemplarError::OutputExists(out.to_path_buf())),
            Overwrite::Replace if !target.is_dir() => Err(ExemplarError::UnsafeOutput {
                path: out.to_path_buf(),
                reason: "it is not a directory".into(),
            }),
            Overwrite::Replace => {
                tracing::info!("removing existing {}", out.display());
                std::fs::remove_dir_all(out)?;
                Ok(())
            }
        }
    }

    /// Copy the base template and drop its placeholder units.
    fn copy_template(&self, template: &Path, out: &Path) -> Result<()> {
        let settings = &self.registry.settings;
        let copied = copy::copy_tree(template, out, &settings.excluded_dirs, &settings.excluded_files)?;
        tracing::debug!("copied {copied} template files");

        for placeholder in &settings.placeholder_files {
            let path = out.join(placeholder);
            if path.is_file() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Substitute the unit name into the template's deployment script, or
    /// render one when the template has none.
    fn write_example_deploy_script(&self, out: &Path, id: &str, unit_name: &str) -> Result<()> {
        let settings = &self.registry.settings;
        let path = out.join(&settings.deploy_script);

        let script = if path.is_file() {
            // Identifiers that merely start with the placeholder, like a
            // `FHECounterFactory` helper, keep their name.
            let placeholder = Regex::new(&format!(r"{}\b", regex::escape(&settings.template_unit_name)))
                .map_err(|e| ExemplarError::Other(e.into()))?;
            placeholder
                .replace_all(&std::fs::read_to_string(&path)?, NoExpand(unit_name))
                .into_owned()
        } else {
            self.renderer.render(
                embedded::DEPLOY_SCRIPT,
                &json!({ "units": [unit_name], "deploy_id": deploy_id(id) }),
            )?
        };
        write_file(&path, &script)
    }

    /// Document the copies inside the project, so the embedded code matches
    /// what the project ships.
    fn generate_project_docs(
        &self,
        entry: &ExampleEntry,
        files: &[PlacedFile],
        out: &Path,
    ) -> Result<PathBuf> {
        let settings = &self.registry.settings;
        let doc = self.registry.doc_for(&entry.id);

        let request = DocRequest {
            id: entry.id.clone(),
            title: doc.map(|d| d.title.clone()).filter(|t| !t.is_empty()),
            description: doc
                .map(|d| d.description.clone())
                .or_else(|| Some(entry.description.clone()))
                .filter(|d| !d.is_empty()),
            category: doc
                .map(|d| d.category.clone())
                .unwrap_or_else(|| docs::title_case(&entry.category)),
            chapter: doc.and_then(|d| d.chapter.clone()),
            source: out.join(&files[0].placed),
            test: out.join(&files[1].placed),
            output: out.join(&settings.docs_dir).join(format!("{}.md", entry.id)),
            index: settings.index_path(out),
        };
        Ok(docs::synthesize(&request)?.path)
    }
}

fn category_pins(base: &BTreeMap<String, String>, category: &CategoryEntry) -> BTreeMap<String, String> {
    let mut pins = base.clone();
    pins.extend(category.additional_deps.clone());
    pins
}

fn deploy_id(id: &str) -> String {
    format!("deploy_{}", id.replace('-', "_"))
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
