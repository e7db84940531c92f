//! Compose stage: assemble the fixed-order markdown document.

use std::fmt::Write as _;

use super::classify::{self, Classification};
use super::extract::{FailureCase, SourceFacts};

/// At most this many pitfalls are rendered.
pub const MAX_PITFALLS: usize = 3;

const BEST_PRACTICES: [&str; 5] = [
    "Call `FHE.allowThis` after every update of a stored encrypted value so the contract can keep using it",
    "Grant decryption rights with `FHE.allow` only to the accounts that need them",
    "Validate every external encrypted input with `FHE.fromExternal` and its input proof",
    "Never branch on an encrypted condition; compute both outcomes and use `FHE.select`",
    "Pick the smallest encrypted type that fits your values to keep gas costs down",
];

const CATEGORY_USE_CASES: &[(&str, &[&str])] = &[
    (
        "auction",
        &[
            "**Sealed-bid auctions**: bids stay private until the auction closes",
            "**Procurement tenders**: suppliers compete without seeing each other's offers",
        ],
    ),
    (
        "vot",
        &[
            "**Private governance**: tally votes without revealing individual ballots",
            "**Anonymous polls**: publish only the final result",
        ],
    ),
    (
        "token",
        &[
            "**Confidential tokens**: balances and transfer amounts stay encrypted",
            "**Private payroll**: pay salaries on-chain without exposing them",
        ],
    ),
    (
        "decrypt",
        &[
            "**Selective disclosure**: reveal a value only to the parties entitled to it",
            "**Delayed reveal**: publish results once a condition is met",
        ],
    ),
    (
        "vault",
        &[
            "**Private treasuries**: hold funds without revealing balances",
            "**Confidential escrow**: release funds on encrypted conditions",
        ],
    ),
];

const GENERIC_USE_CASES: [&str; 2] = [
    "**Privacy-preserving dApps**: compute on user data without ever exposing it on-chain",
    "**Confidential business logic**: run sensitive rules on-chain while keeping inputs private",
];

/// What the document is about, beyond the mined facts.
#[derive(Debug, Clone)]
pub struct DocContext<'a> {
    pub title: &'a str,
    /// Description authored in the registry, if any.
    pub curated_description: Option<&'a str>,
    /// Category label, also used to pick use cases.
    pub category: &'a str,
    pub chapter: Option<&'a str>,
    pub source_name: &'a str,
    pub source_text: &'a str,
    pub test_name: &'a str,
    pub test_text: &'a str,
}

/// Build the full document.
pub fn compose(
    ctx: &DocContext<'_>,
    facts: &SourceFacts,
    failures: &[FailureCase],
    class: &Classification,
) -> String {
    let mut doc = String::new();

    let _ = writeln!(doc, "# {}\n", ctx.title);
    if let Some(chapter) = ctx.chapter {
        let _ = writeln!(doc, "_Chapter: {chapter}_\n");
    }

    overview(&mut doc, ctx, facts);
    lessons(&mut doc, ctx, class);
    key_concepts(&mut doc, facts, class);
    walkthrough(&mut doc, facts, class);
    pitfalls(&mut doc, failures);

    doc.push_str("## Best Practices\n\n");
    for practice in BEST_PRACTICES {
        let _ = writeln!(doc, "- {practice}");
    }
    doc.push('\n');

    doc.push_str("## Real-World Use Cases\n\n");
    for case in use_cases(ctx.category, class) {
        let _ = writeln!(doc, "- {case}");
    }
    doc.push('\n');

    doc.push_str("## Source Code\n\n");
    let _ = writeln!(doc, "### Contract: `{}`\n", ctx.source_name);
    doc.push_str(&fenced(ctx.source_text, fence_language(ctx.source_name)));
    doc.push('\n');
    let _ = writeln!(doc, "### Test: `{}`\n", ctx.test_name);
    doc.push_str(&fenced(ctx.test_text, fence_language(ctx.test_name)));

    doc
}

/// Pick the overview text.
///
/// A curated description that names an operation always wins. Otherwise a
/// multi-sentence or multi-clause extracted description beats a short
/// curated one.
pub fn choose_overview(curated: Option<&str>, extracted: Option<&str>) -> Option<String> {
    let curated = curated.map(str::trim).filter(|s| !s.is_empty());
    let extracted = extracted.map(str::trim).filter(|s| !s.is_empty());

    match (curated, extracted) {
        (Some(c), _) if classify::names_operation(c) => Some(c.to_string()),
        (Some(c), Some(e)) if is_rich(e) && (!is_rich(c) || e.len() >= c.len()) => {
            Some(e.to_string())
        }
        (Some(c), _) => Some(c.to_string()),
        (None, e) => e.map(str::to_string),
    }
}

fn is_rich(text: &str) -> bool {
    let body = text.trim_end_matches('.');
    body.contains(". ") || body.contains("; ") || body.contains(", ") || body.contains(" and ")
}

fn overview(doc: &mut String, ctx: &DocContext<'_>, facts: &SourceFacts) {
    let extracted = match (&facts.notice, &facts.detail) {
        (Some(n), Some(d)) => Some(format!("{n} {d}")),
        (Some(n), None) => Some(n.clone()),
        (None, Some(d)) => Some(d.clone()),
        (None, None) => None,
    };
    let text = choose_overview(ctx.curated_description, extracted.as_deref())
        .unwrap_or_else(|| format!("This example shows how `{}` works.", ctx.source_name));

    let _ = writeln!(doc, "## Overview\n\n{text}\n");

    if !facts.demonstrates.is_empty() {
        doc.push_str("This example demonstrates:\n\n");
        for item in &facts.demonstrates {
            let _ = writeln!(doc, "- {item}");
        }
        doc.push('\n');
    }
    for note in &facts.educational_notes {
        let _ = writeln!(doc, "> **Note:** {note}\n");
    }
}

fn lessons(doc: &mut String, ctx: &DocContext<'_>, class: &Classification) {
    doc.push_str("## What You'll Learn\n\n");
    if let Some(op) = class.dominant {
        let _ = writeln!(doc, "- {} with `{}`", op.label, op.call);
    }
    for cap in &class.capabilities {
        let _ = writeln!(doc, "- {}", cap.lesson());
    }
    if class.dominant.is_none() && class.capabilities.is_empty() {
        let _ = writeln!(doc, "- How `{}` is structured and tested", ctx.source_name);
    }
    doc.push('\n');
}

fn key_concepts(doc: &mut String, facts: &SourceFacts, class: &Classification) {
    doc.push_str("## Key Concepts\n\n");

    if !facts.key_concepts.is_empty() {
        for (name, description) in &facts.key_concepts {
            let _ = writeln!(doc, "### {name}\n\n{description}\n");
        }
        return;
    }

    if let Some(op) = class.dominant {
        let _ = writeln!(doc, "### {}\n\n{}\n", op.label, op.concept);
    }
    for cap in &class.capabilities {
        let (name, body) = cap.concept();
        let _ = writeln!(doc, "### {name}\n\n{body}\n");
    }
    if class.dominant.is_none() && class.capabilities.is_empty() {
        doc.push_str(
            "### Encrypted types\n\nValues such as `euint32` or `ebool` are handles to ciphertexts. \
             The contract computes on them without ever seeing the plaintext.\n\n",
        );
    }
}

fn walkthrough(doc: &mut String, facts: &SourceFacts, class: &Classification) {
    doc.push_str("## Step-by-Step Walkthrough\n\n");

    let template = class.dominant.map(|op| op.walkthrough).unwrap_or(&[]);
    if !template.is_empty() {
        for (i, step) in template.iter().enumerate() {
            let _ = writeln!(doc, "{}. {step}", i + 1);
        }
    } else if !facts.functions.is_empty() {
        for (i, function) in facts.functions.iter().enumerate() {
            let kind = if function.view {
                "reads state without modifying it"
            } else {
                "sends a transaction that updates state"
            };
            let _ = writeln!(doc, "{}. **`{}({})`** {kind}.", i + 1, function.name, function.params);
        }
    } else {
        doc.push_str("1. Deploy the contract with `npx hardhat deploy`.\n");
        doc.push_str("2. Run the tests with `npx hardhat test` and follow each case.\n");
    }
    doc.push('\n');
}

fn pitfalls(doc: &mut String, failures: &[FailureCase]) {
    if failures.is_empty() {
        return;
    }
    doc.push_str("## Common Pitfalls\n\n");
    for (i, case) in failures.iter().take(MAX_PITFALLS).enumerate() {
        let _ = writeln!(doc, "### Pitfall {}: {}\n", i + 1, capitalize(&case.title));
        let _ = writeln!(doc, "**Problem:** {}\n", sentence(&case.title));
        let _ = writeln!(doc, "**Why it fails:** {}\n", sentence(&case.cause));
        let _ = writeln!(doc, "**Fix:** {}\n", fix_for(case));
    }
}

fn fix_for(case: &FailureCase) -> &'static str {
    let text = format!("{} {}", case.title, case.cause).to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if mentions(&["permission", "allow", "access", "acl"][..]) {
        "Grant access explicitly: `FHE.allowThis` for the contract and `FHE.allow` for every account that must read the value."
    } else if mentions(&["proof", "signer", "input"][..]) {
        "Encrypt inputs for the exact contract address and signer that will submit them, and pass the matching input proof."
    } else if mentions(&["decrypt"][..]) {
        "Only decrypt handles you have been granted access to, after the granting transaction is mined."
    } else if mentions(&["overflow", "underflow", "below zero", "wrap"][..]) {
        "Guard arithmetic with an encrypted comparison and `FHE.select` instead of relying on reverts."
    } else {
        "Check the preconditions the contract expects before calling it, as the test does."
    }
}

fn use_cases(category: &str, class: &Classification) -> Vec<&'static str> {
    if let Some(op) = class.dominant.filter(|op| !op.use_cases.is_empty()) {
        return op.use_cases.to_vec();
    }
    let category = category.to_lowercase();
    CATEGORY_USE_CASES
        .iter()
        .find(|(key, _)| category.contains(key))
        .map(|(_, cases)| cases.to_vec())
        .unwrap_or_else(|| GENERIC_USE_CASES.to_vec())
}

/// Markdown fence language for a file name.
pub fn fence_language(file_name: &str) -> &'static str {
    match file_name.rsplit_once('.').map(|(_, ext)| ext) {
        Some("sol") => "solidity",
        Some("ts") => "typescript",
        Some("js") => "javascript",
        Some("vy") => "python",
        Some("rs") => "rust",
        _ => "",
    }
}

/// Wrap `content` verbatim in a fence longer than any backtick run inside it.
pub fn fenced(content: &str, language: &str) -> String {
    let longest = content
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest.max(2) + 1);

    let mut out = format!("{fence}{language}\n{content}");
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&fence);
    out.push('\n');
    out
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn sentence(text: &str) -> String {
    let text = capitalize(text.trim());
    if text.ends_with(['.', '!', '?']) {
        text
    } else {
        format!("{text}.")
    }
}
