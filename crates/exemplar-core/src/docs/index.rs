//! Maintenance of the documentation index (`SUMMARY.md`).

use std::path::Path;

use crate::error::Result;
use crate::templates::embedded;

/// Add `[title](link)` under the `## category` heading of the index.
///
/// The file is created from the index template when missing. Nothing is
/// written when an entry already points at a file with the same name as
/// `link`. Returns whether an entry was added.
pub fn add_entry(index_path: &Path, category: &str, title: &str, link: &str) -> Result<bool> {
    let existing = match std::fs::read_to_string(index_path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => embedded::DOCS_INDEX_HEADER.to_string(),
        Err(e) => return Err(e.into()),
    };

    if links_to(&existing, link) {
        tracing::debug!("{} already lists {link}", index_path.display());
        return Ok(false);
    }

    let updated = insert_entry(&existing, category, title, link);
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(index_path, updated)?;
    Ok(true)
}

/// Whether any markdown link in `index` targets a file named like `link`.
fn links_to(index: &str, link: &str) -> bool {
    let wanted = file_name(link);
    index
        .split("](")
        .skip(1)
        .filter_map(|rest| rest.split_once(')').map(|(target, _)| target))
        .any(|target| file_name(target) == wanted)
}

fn file_name(link: &str) -> &str {
    let link = link.split('#').next().unwrap_or(link);
    link.rsplit('/').next().unwrap_or(link)
}

fn insert_entry(index: &str, category: &str, title: &str, link: &str) -> String {
    let entry = format!("- [{title}]({link})");
    let heading = format!("## {category}");
    let mut lines: Vec<&str> = index.lines().collect();

    let Some(start) = lines.iter().position(|l| l.trim_end() == heading) else {
        let mut out = index.trim_end().to_string();
        out.push_str(&format!("\n\n{heading}\n\n{entry}\n"));
        return out;
    };

    let end = lines[start + 1..]
        .iter()
        .position(|l| l.starts_with("## ") || l.starts_with("# "))
        .map_or(lines.len(), |offset| start + 1 + offset);
    let last_filled = (start..end)
        .rev()
        .find(|&i| !lines[i].trim().is_empty())
        .unwrap_or(start);

    // Keep a blank line between the heading and its first entry.
    if last_filled == start {
        lines.insert(start + 1, "");
        lines.insert(start + 2, &entry);
    } else {
        lines.insert(last_filled + 1, &entry);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
