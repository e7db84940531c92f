//! Extract stage: pattern matchers over source-unit and test-unit text.
//!
//! Every matcher is independent and returns an optional result; a pattern
//! that does not match means the feature is absent, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Structured comment fields mined from a source unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFacts {
    /// `@title`
    pub title: Option<String>,
    /// `@notice`, the one-line summary.
    pub notice: Option<String>,
    /// `@dev`, the detail text.
    pub detail: Option<String>,
    /// Bullets under "This example demonstrates:".
    pub demonstrates: Vec<String>,
    /// `Name: description` bullets under "Key concepts:".
    pub key_concepts: Vec<(String, String)>,
    /// Bullets under "Educational notes:".
    pub educational_notes: Vec<String>,
    /// `@custom:chapter`
    pub chapter: Option<String>,
    /// Externally callable functions in declaration order.
    pub functions: Vec<FunctionSig>,
}

/// An `external` or `public` function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub name: String,
    pub params: String,
    pub view: bool,
}

/// A test case whose title signals a failure scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureCase {
    pub title: String,
    /// First comment inside the test body, or the title when there is none.
    pub cause: String,
}

/// Keywords in a test title that mark it as a failure scenario.
const FAILURE_KEYWORDS: [&str; 5] = ["fail", "wrong", "error", "should not", "pitfall"];

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(title|notice|dev|custom:chapter)\b\s*(.*)$").unwrap());

static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:@\w+\s+)?(?:this\s+(?:example|contract|unit)\s+)?(demonstrates|key\s+concepts|educational\s+notes)\s*:?\s*$",
    )
    .unwrap()
});

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-•*]|\d+[.)])\s+(.+)$").unwrap());

static FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"function\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)([^{;]*)").unwrap()
});

static TEST_CASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bit(?:\.only)?\s*\(\s*(?:"([^"]*)"|'([^']*)'|`([^`]*)`)"#).unwrap()
});

/// Start of a block-bodied callback: `=> {` or `function (...) {`.
static BODY_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:=>|\bfunction\s*\w*\s*\([^)]*\))\s*\{").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    Demonstrates,
    KeyConcepts,
    Notes,
}

/// One line of source text after comment markers are stripped.
enum Line {
    Comment(String),
    Code(String),
}

/// Split source text into comment and code lines, stripping `///`, `//`,
/// `/**`, `*`, and `*/` markers from comment lines.
fn classify_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut in_block = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();

        if in_block {
            let (body, closes) = match trimmed.find("*/") {
                Some(end) => (&trimmed[..end], true),
                None => (trimmed, false),
            };
            let body = body.strip_prefix('*').unwrap_or(body);
            lines.push(Line::Comment(body.trim().to_string()));
            in_block = !closes;
        } else if let Some(rest) = trimmed.strip_prefix("///") {
            lines.push(Line::Comment(rest.trim().to_string()));
        } else if let Some(rest) = trimmed.strip_prefix("//") {
            lines.push(Line::Comment(rest.trim().to_string()));
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            let rest = rest.strip_prefix('*').unwrap_or(rest);
            let (body, closes) = match rest.find("*/") {
                Some(end) => (&rest[..end], true),
                None => (rest, false),
            };
            lines.push(Line::Comment(body.trim().to_string()));
            in_block = !closes;
        } else {
            lines.push(Line::Code(raw.to_string()));
        }
    }

    lines
}

fn is_block_boundary(text: &str) -> bool {
    text.is_empty() || text.starts_with('@') || BULLET.is_match(text) || BLOCK_HEADER.is_match(text)
}

/// Run every source-unit matcher.
pub fn extract_source(text: &str) -> SourceFacts {
    let lines = classify_lines(text);
    let mut facts = SourceFacts::default();

    let mut i = 0;
    while i < lines.len() {
        let Line::Comment(comment) = &lines[i] else {
            i += 1;
            continue;
        };

        if let Some(block) = block_kind(comment) {
            i = collect_block(&lines, i + 1, block, &mut facts);
            continue;
        }

        if let Some(caps) = TAG.captures(comment) {
            let tag = caps[1].to_string();
            let mut value = caps[2].trim().to_string();
            let mut j = i + 1;
            if tag != "custom:chapter" {
                while let Some(Line::Comment(next)) = lines.get(j) {
                    if is_block_boundary(next) {
                        break;
                    }
                    value.push(' ');
                    value.push_str(next);
                    j += 1;
                }
            }

            if !value.is_empty() && !BLOCK_HEADER.is_match(&value) {
                let slot = match tag.as_str() {
                    "title" => &mut facts.title,
                    "notice" => &mut facts.notice,
                    "dev" => &mut facts.detail,
                    _ => &mut facts.chapter,
                };
                if slot.is_none() {
                    *slot = Some(value);
                }
            }

            // A tag line can itself open a block (`@dev This example demonstrates:`).
            if let Some(block) = block_kind(comment) {
                j = collect_block(&lines, j, block, &mut facts);
            }
            i = j;
            continue;
        }

        i += 1;
    }

    facts.functions = extract_functions(&lines);
    facts
}

fn block_kind(text: &str) -> Option<Block> {
    let caps = BLOCK_HEADER.captures(text)?;
    let kind = caps[1].to_ascii_lowercase();
    Some(if kind.starts_with("demonstrates") {
        Block::Demonstrates
    } else if kind.starts_with("key") {
        Block::KeyConcepts
    } else {
        Block::Notes
    })
}

/// Collect bullets starting at `start`; returns the index after the block.
fn collect_block(lines: &[Line], start: usize, block: Block, facts: &mut SourceFacts) -> usize {
    let mut i = start;
    let mut seen_bullet = false;

    while let Some(Line::Comment(text)) = lines.get(i) {
        if text.is_empty() && !seen_bullet {
            i += 1;
            continue;
        }
        let Some(caps) = BULLET.captures(text) else {
            break;
        };
        seen_bullet = true;
        let item = caps[1].trim().to_string();
        match block {
            Block::Demonstrates => facts.demonstrates.push(item),
            Block::Notes => facts.educational_notes.push(item),
            Block::KeyConcepts => {
                if let Some((name, description)) = item.split_once(':') {
                    let name = name.trim().trim_matches(|c| c == '*' || c == '`').trim();
                    let description = description.trim();
                    if !name.is_empty() && !description.is_empty() {
                        facts
                            .key_concepts
                            .push((name.to_string(), description.to_string()));
                    }
                }
            }
        }
        i += 1;
    }

    i
}

fn extract_functions(lines: &[Line]) -> Vec<FunctionSig> {
    let code: String = lines
        .iter()
        .map(|line| match line {
            Line::Code(code) => code.as_str(),
            Line::Comment(_) => "",
        })
        .collect::<Vec<_>>()
        .join("\n");

    FUNCTION
        .captures_iter(&code)
        .filter_map(|caps| {
            let modifiers = &caps[3];
            let callable = modifiers
                .split_whitespace()
                .any(|w| w == "external" || w == "public");
            callable.then(|| FunctionSig {
                name: caps[1].to_string(),
                params: caps[2].split_whitespace().collect::<Vec<_>>().join(" "),
                view: modifiers
                    .split_whitespace()
                    .any(|w| w == "view" || w == "pure"),
            })
        })
        .collect()
}

/// Find failure-scenario test cases and the comment explaining each.
pub fn extract_failure_cases(test: &str) -> Vec<FailureCase> {
    TEST_CASE
        .captures_iter(test)
        .filter_map(|caps| {
            let title = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))?
                .as_str()
                .trim()
                .to_string();
            let lower = title.to_lowercase();
            if !FAILURE_KEYWORDS.iter().any(|k| lower.contains(k)) {
                return None;
            }

            let call = caps.get(0)?;
            let paren = call.start() + call.as_str().find('(')?;
            let cause = callback_body(call_arguments(test, paren))
                .and_then(first_comment)
                .unwrap_or_else(|| title.clone());
            Some(FailureCase { title, cause })
        })
        .collect()
}

/// Arguments of the call whose `(` sits at `open`, up to the matching `)`.
///
/// String literals are skipped so parentheses inside them do not count.
fn call_arguments(text: &str, open: usize) -> &str {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (offset, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &text[open + 1..open + offset];
                }
            }
            _ => {}
        }
    }
    &text[open + 1..]
}

/// Text inside the callback's braces, if the callback has a block body.
fn callback_body(args: &str) -> Option<&str> {
    let open = BODY_START.find(args)?.end() - 1;
    let mut depth = 0usize;
    for (offset, c) in args[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&args[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    Some(&args[open + 1..])
}

fn first_comment(body: &str) -> Option<String> {
    body.lines().find_map(|line| {
        let comment = line.trim().strip_prefix("//")?.trim();
        (!comment.is_empty()).then(|| comment.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{FHE_COUNTER_SOL, FHE_COUNTER_TS, PRIVATE_VAULT_SOL};

    #[test]
    fn test_natspec_tags() {
        let facts = extract_source(FHE_COUNTER_SOL);
        assert_eq!(facts.title.as_deref(), Some("A simple FHE counter contract"));
        assert_eq!(
            facts.notice.as_deref(),
            Some("Keeps an encrypted counter that anyone can increment or decrement.")
        );
        // `@dev` only opens the demonstrates block here.
        assert_eq!(facts.detail, None);
        assert_eq!(facts.chapter.as_deref(), Some("basics"));
    }

    #[test]
    fn test_blocks() {
        let facts = extract_source(FHE_COUNTER_SOL);
        assert_eq!(
            facts.demonstrates,
            vec![
                "Accepting encrypted inputs with input proofs",
                "Homomorphic addition and subtraction on euint32",
            ]
        );
        assert_eq!(facts.key_concepts.len(), 2);
        assert_eq!(facts.key_concepts[0].0, "Encrypted handle");
        assert_eq!(facts.key_concepts[1].0, "ACL");
        assert_eq!(
            facts.educational_notes,
            vec!["Encrypted arithmetic wraps on overflow instead of reverting"]
        );
    }

    #[test]
    fn test_block_comment_style() {
        let src = r#"
/**
 * @title Blind auction
 * @notice Sealed bids,
 *   settled on-chain.
 * @dev Bids stay encrypted until the auction ends.
 *
 * Key concepts:
 * - Sealed bid: a bid nobody can read
 */
contract BlindAuction {
}
"#;
        let facts = extract_source(src);
        assert_eq!(facts.title.as_deref(), Some("Blind auction"));
        assert_eq!(facts.notice.as_deref(), Some("Sealed bids, settled on-chain."));
        assert_eq!(
            facts.detail.as_deref(),
            Some("Bids stay encrypted until the auction ends.")
        );
        assert_eq!(
            facts.key_concepts,
            vec![("Sealed bid".to_string(), "a bid nobody can read".to_string())]
        );
    }

    #[test]
    fn test_functions_in_declaration_order() {
        let facts = extract_source(FHE_COUNTER_SOL);
        let names: Vec<&str> = facts.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["getCount", "increment", "decrement"]);
        assert!(facts.functions[0].view);
        assert_eq!(
            facts.functions[1].params,
            "externalEuint32 inputEuint32, bytes calldata inputProof"
        );

        let vault = extract_source(PRIVATE_VAULT_SOL);
        assert_eq!(vault.functions.len(), 1);
        assert_eq!(vault.functions[0].name, "withdraw");
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let facts = extract_source("contract Bare {\n}\n");
        assert_eq!(facts, SourceFacts::default());
    }

    #[test]
    fn test_failure_cases() {
        let cases = extract_failure_cases(FHE_COUNTER_TS);
        let titles: Vec<&str> = cases.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "should fail to decrypt without permission",
                "should not accept an input encrypted for another contract",
                "wrong signer pitfall",
                "error when decrementing below zero",
            ]
        );
        assert_eq!(
            cases[0].cause,
            "Bob was never granted access to the handle with FHE.allow"
        );
        // No comment in the body: the title stands in.
        assert_eq!(cases[1].cause, cases[1].title);
        assert_eq!(
            cases[2].cause,
            "Input proofs are bound to the account that created them"
        );
    }

    #[test]
    fn test_braceless_failure_case_keeps_its_own_cause() {
        let test = "describe('x', () => {\n  it('should fail on zero', async () => expect(c.run(0)).to.be.reverted);\n  it('works', async () => {\n    // unrelated happy-path note\n    await c.run(1);\n  });\n  it('error on (bad) input', async function () {\n    // input must be encrypted\n  });\n});\n";
        let cases = extract_failure_cases(test);
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].cause, "should fail on zero");
        assert_eq!(cases[1].cause, "input must be encrypted");
    }

    #[test]
    fn test_no_failure_cases() {
        let test = "describe('x', () => {\n  it('works', async () => {\n    // fine\n  });\n});\n";
        assert!(extract_failure_cases(test).is_empty());
    }
}
