use std::path::Path;

use anyhow::Result;

use exemplar_core::scaffold::Scaffolder;

use crate::output;

/// Generate one project holding every contract of a category.
pub async fn run(registry_path: &Path, id: &str, out_dir: Option<&Path>, force: bool) -> Result<()> {
    output::print_header(&format!("exemplar create-category: {id}"));

    let registry = super::load_registry(registry_path)?;
    let scaffolder = Scaffolder::new(&registry);
    let out = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| scaffolder.category_output_dir(id));
    let overwrite = super::overwrite_policy(&out, force)?;

    let project = scaffolder.create_category_project(id, &out, overwrite)?;

    for warning in &project.warnings {
        output::print_warning(warning);
    }
    output::print_key_value("Output", &out.display().to_string());
    output::print_key_value("Contracts", &project.unit_names.join(", "));
    output::print_success(&format!(
        "Category '{id}' created with {} contract(s)",
        project.unit_names.len()
    ));

    Ok(())
}
