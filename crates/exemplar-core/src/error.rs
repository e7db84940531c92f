//! Unified error types for the exemplar toolkit.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur during exemplar operations.
#[derive(Error, Debug)]
pub enum ExemplarError {
    // --- Configuration ---

    /// The registry file was not found.
    #[error("registry file not found at {path}")]
    RegistryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry file exists but contains invalid JSON.
    #[error("failed to parse registry at {path}")]
    RegistryParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registry parsed but its tables are inconsistent.
    #[error("invalid registry: {0}")]
    InvalidRegistry(String),

    /// No example with this identifier is declared in the registry.
    #[error("unknown example: {0} (run `exemplar list` to see available examples)")]
    UnknownExample(String),

    /// No category with this identifier is declared in the registry.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// No documentation entry with this identifier is declared in the registry.
    #[error("unknown documentation entry: {0}")]
    UnknownDoc(String),

    /// A file referenced by a manifest entry does not exist.
    #[error("{what} not found: {path}")]
    MissingFile { what: &'static str, path: PathBuf },

    /// The source unit does not declare a unit name we can recognise.
    #[error("no contract declaration found in {0}")]
    UnitNameNotFound(PathBuf),

    /// Two entries of one category derive the same unit name.
    #[error("category '{category}' declares contract '{unit}' more than once")]
    DuplicateUnit { category: String, unit: String },

    /// A batch run was asked to process an empty selection.
    #[error("no examples selected for this run")]
    EmptySelection,

    /// A version string passed on the command line is not `X.Y.Z`-shaped.
    #[error("invalid version: {0} (expected e.g. 1.2.3, ^1.2.3, ~1.2.3)")]
    InvalidVersion(String),

    // --- Conflicts ---

    /// The output directory already exists and replacement was not confirmed.
    #[error("output directory already exists: {0} (use --force to replace it)")]
    OutputExists(PathBuf),

    /// The output directory may not be replaced at all.
    #[error("refusing to replace {path}: {reason}")]
    UnsafeOutput { path: PathBuf, reason: String },

    // --- Documentation ---

    /// Documentation synthesis failed for one document.
    #[error("documentation generation failed for {id}: {reason}")]
    Documentation { id: String, reason: String },

    // --- External commands ---

    /// A build or test command exited with a non-zero status.
    #[error("command `{command}` failed in {dir} ({status})")]
    CommandFailed {
        command: String,
        dir: PathBuf,
        status: String,
    },

    /// A required external tool (e.g. `npm`) is not installed.
    #[error("required tool '{name}' not found, install: {install}")]
    MissingTool { name: String, install: String },

    // --- Generated files ---

    /// Handlebars template rendering failed (invalid template or missing variables).
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    /// A package descriptor could not be read or written back.
    #[error("package descriptor error at {path}: {reason}")]
    Descriptor { path: PathBuf, reason: String },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A directory walk error.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExemplarError {
    /// Whether this error belongs to the configuration family: a caller or
    /// registry mistake rather than a runtime failure.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::RegistryNotFound { .. }
                | Self::RegistryParse { .. }
                | Self::InvalidRegistry(_)
                | Self::UnknownExample(_)
                | Self::UnknownCategory(_)
                | Self::UnknownDoc(_)
                | Self::MissingFile { .. }
                | Self::UnitNameNotFound(_)
                | Self::DuplicateUnit { .. }
                | Self::InvalidVersion(_)
                | Self::EmptySelection
        )
    }
}

/// Alias for `Result<T, ExemplarError>`.
pub type Result<T> = std::result::Result<T, ExemplarError>;
