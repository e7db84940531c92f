use std::path::Path;

use anyhow::Result;
use console::style;
use serde::Serialize;

use exemplar_core::registry::Registry;

use crate::output;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Listing<'a> {
    examples: Vec<ExampleRow<'a>>,
    categories: Vec<CategoryRow<'a>>,
    docs: Vec<&'a str>,
}

#[derive(Serialize)]
struct ExampleRow<'a> {
    id: &'a str,
    category: &'a str,
    description: &'a str,
    documented: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRow<'a> {
    id: &'a str,
    name: &'a str,
    contract_count: usize,
}

fn listing(registry: &Registry) -> Listing<'_> {
    Listing {
        examples: registry
            .examples()
            .iter()
            .map(|e| ExampleRow {
                id: &e.id,
                category: &e.category,
                description: &e.description,
                documented: registry.doc_for(&e.id).is_some(),
            })
            .collect(),
        categories: registry
            .categories()
            .iter()
            .map(|c| CategoryRow {
                id: &c.id,
                name: &c.name,
                contract_count: c.contracts.len(),
            })
            .collect(),
        docs: registry.docs().iter().map(|d| d.id.as_str()).collect(),
    }
}

/// Print the registry contents, grouped by category tag.
pub async fn run(registry_path: &Path, json: bool) -> Result<()> {
    let registry = Registry::load(registry_path)?;
    let listing = listing(&registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    output::print_header("exemplar examples");
    let mut tags: Vec<&str> = Vec::new();
    for row in &listing.examples {
        if !tags.contains(&row.category) {
            tags.push(row.category);
        }
    }
    for tag in tags {
        println!("\n  {}", style(tag).bold());
        for row in listing.examples.iter().filter(|r| r.category == tag) {
            let marker = if row.documented { " [docs]" } else { "" };
            println!("    {:<32} {}{}", row.id, style(row.description).dim(), marker);
        }
    }

    output::print_header("categories");
    for row in &listing.categories {
        println!("  {:<20} {} ({} contracts)", row.id, row.name, row.contract_count);
    }

    println!();
    output::print_key_value("Documentation entries", &listing.docs.len().to_string());
    Ok(())
}
