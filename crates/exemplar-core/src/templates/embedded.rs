//! Compile-time embedded templates.
//!
//! Each constant loads a template file from `templates/` via [`include_str!`]. The paths
//! are relative to this source file (`crates/exemplar-core/src/templates/embedded.rs`).
//!
//! Do NOT rename or move template files without updating the `include_str!` path here.

// -------------------------------------------------------
// Project READMEs
// -------------------------------------------------------

pub const EXAMPLE_README: &str = include_str!("../../../../templates/readme/example.md.hbs");
pub const CATEGORY_README: &str = include_str!("../../../../templates/readme/category.md.hbs");

// -------------------------------------------------------
// Deployment
// -------------------------------------------------------

/// Multi-unit deployment script, also used when the base template has none.
pub const DEPLOY_SCRIPT: &str = include_str!("../../../../templates/deploy/deploy.ts.hbs");

// -------------------------------------------------------
// Documentation
// -------------------------------------------------------

/// Initial content of a new documentation index. Not a Handlebars template.
pub const DOCS_INDEX_HEADER: &str = include_str!("../../../../templates/docs/SUMMARY.md");
