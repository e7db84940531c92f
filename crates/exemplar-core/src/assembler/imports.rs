//! Literal rewriting of relative import specifiers.
//!
//! Only specifiers inside recognised import statements are touched:
//!
//! - `import "./A.sol";` and `import "./A.sol" as A;`
//! - `import {A, B} from "./A.sol";` and `import * as A from "./A.sol";`
//! - `import { fixture } from "../fixtures/vault";` (TypeScript)
//!
//! Anything else (string literals, comments mentioning a path) is left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+(?:[^;'"]*?\s+from\s+)?["']([^"']+)["']"#).unwrap()
});

/// Specifiers of every import statement in `text`, in order.
pub fn import_specifiers(text: &str) -> Vec<String> {
    IMPORT
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Replace `old_prefix` with `new_prefix` in import specifiers.
///
/// A specifier matches when it equals `old_prefix` or continues it with an
/// extension (`.sol`, `.ts`, ...), so `../lib/Math` rewrites both
/// `../lib/Math` and `../lib/Math.sol` but not `../lib/MathExtra.sol`.
/// Returns the rewritten text and the number of specifiers changed.
pub fn rewrite_known_import_patterns(text: &str, old_prefix: &str, new_prefix: &str) -> (String, usize) {
    let mut count = 0;
    let rewritten = IMPORT.replace_all(text, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let Some(spec) = caps.get(1) else {
            return whole.to_string();
        };
        let Some(rest) = spec.as_str().strip_prefix(old_prefix) else {
            return whole.to_string();
        };
        if !(rest.is_empty() || rest.starts_with('.')) {
            return whole.to_string();
        }

        count += 1;
        let start = spec.start() - caps.get(0).map_or(0, |m| m.start());
        let end = start + spec.len();
        format!("{}{new_prefix}{rest}{}", &whole[..start], &whole[end..])
    });
    (rewritten.into_owned(), count)
}
