//! Documentation synthesis.
//!
//! A document is built in four stages:
//!
//! 1. **Extract** ([`extract`]): mine structured comments, function
//!    signatures and failure-scenario test cases from the unit texts.
//! 2. **Classify** ([`classify`]): pick the dominant operation and detect
//!    capabilities.
//! 3. **Compose** ([`compose`]): emit the fixed section order.
//! 4. **Persist**: write the document and record it in the index
//!    ([`index`]).
//!
//! Stages never call back into earlier ones. Any failure is reported as
//! [`ExemplarError::Documentation`] naming the document.

pub mod classify;
pub mod compose;
pub mod extract;
pub mod index;

use std::path::{Path, PathBuf};

use crate::assembler::paths;
use crate::error::{ExemplarError, Result};
use crate::registry::{DocEntry, Registry};

/// Everything needed to synthesize one document. Paths are absolute or
/// relative to the current directory.
#[derive(Debug, Clone)]
pub struct DocRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Category label used for the index heading.
    pub category: String,
    pub chapter: Option<String>,
    pub source: PathBuf,
    pub test: PathBuf,
    pub output: PathBuf,
    pub index: PathBuf,
}

impl DocRequest {
    /// Request for a documentation entry written into the examples repository.
    pub fn from_entry(registry: &Registry, entry: &DocEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: non_empty(&entry.title),
            description: non_empty(&entry.description),
            category: entry.category.clone(),
            chapter: entry.chapter.clone(),
            source: registry.resolve(&entry.contract),
            test: registry.resolve(&entry.test),
            output: registry.resolve(&entry.output),
            index: registry.settings.index_path(registry.root()),
        }
    }
}

/// A written document.
#[derive(Debug, Clone)]
pub struct DocOutcome {
    pub path: PathBuf,
    pub title: String,
    /// Whether a new index entry was added.
    pub indexed: bool,
}

/// Run the whole pipeline for one document.
pub fn synthesize(request: &DocRequest) -> Result<DocOutcome> {
    run(request).map_err(|e| match e {
        ExemplarError::Documentation { .. } => e,
        other => ExemplarError::Documentation {
            id: request.id.clone(),
            reason: other.to_string(),
        },
    })
}

/// Synthesize the registry document `id`.
pub fn generate(registry: &Registry, id: &str) -> Result<DocOutcome> {
    let entry = registry.doc(id)?;
    synthesize(&DocRequest::from_entry(registry, entry))
}

/// Synthesize every registry document, continuing past failures.
pub fn generate_all(registry: &Registry) -> Vec<(String, Result<DocOutcome>)> {
    registry
        .docs()
        .iter()
        .map(|entry| {
            let result = synthesize(&DocRequest::from_entry(registry, entry));
            if let Err(e) = &result {
                tracing::warn!("{e}");
            }
            (entry.id.clone(), result)
        })
        .collect()
}

fn run(request: &DocRequest) -> Result<DocOutcome> {
    // Extract
    let source = read_unit("source unit", &request.source)?;
    let test = read_unit("test unit", &request.test)?;
    let facts = extract::extract_source(&source);
    let failures = extract::extract_failure_cases(&test);

    // Classify
    let classification = classify::classify(&source, &test);
    tracing::debug!(
        "{}: dominant operation {:?}, capabilities {:?}",
        request.id,
        classification.dominant.map(|op| op.id),
        classification.capabilities
    );

    // Compose
    let title = request
        .title
        .clone()
        .or_else(|| facts.title.clone())
        .unwrap_or_else(|| title_case(&request.id));
    let chapter = request.chapter.clone().or_else(|| facts.chapter.clone());
    let source_name = file_name(&request.source);
    let test_name = file_name(&request.test);
    let context = compose::DocContext {
        title: &title,
        curated_description: request.description.as_deref(),
        category: &request.category,
        chapter: chapter.as_deref(),
        source_name: &source_name,
        source_text: &source,
        test_name: &test_name,
        test_text: &test,
    };
    let document = compose::compose(&context, &facts, &failures, &classification);

    // Persist
    if let Some(parent) = request.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&request.output, document)?;

    let index_dir = request.index.parent().unwrap_or(Path::new(""));
    let link = paths::relative_link(index_dir, &request.output);
    let indexed = index::add_entry(&request.index, &request.category, &title, &link)?;

    tracing::info!("wrote {}", request.output.display());
    Ok(DocOutcome {
        path: request.output.clone(),
        title,
        indexed,
    })
}

fn read_unit(what: &'static str, path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|_| ExemplarError::MissingFile {
        what,
        path: path.to_path_buf(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `fhe-counter` -> `Fhe Counter`
pub fn title_case(id: &str) -> String {
    id.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
