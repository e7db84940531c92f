//! Templates for generated project files.
//!
//! Templates are embedded into the binary at compile-time via [`include_str!`] in the
//! [`embedded`] module, then rendered at runtime with [Handlebars](https://handlebarsjs.com/)
//! via the [`renderer::TemplateRenderer`].
//!
//! ## Template variables
//!
//! - README (example): `title`, `description`, `unit_name`, `contract_path`,
//!   `test_path`, `package_name`, `homepage`, `has_docs`
//! - README (category): `name`, `description`, `units` (`name`, `contract`,
//!   `test`), `package_name`, `homepage`
//! - Deploy script: `units` (unit names), `deploy_id`
//!
//! **Warning**: Template files in `templates/` and constants in [`embedded`] must stay in sync.
//! The `include_str!` paths are relative to this file and checked at compile-time.

pub mod embedded;
pub mod renderer;
