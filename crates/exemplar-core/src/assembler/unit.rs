//! Unit name derivation from source-unit text.

use once_cell::sync::Lazy;
use regex::Regex;

/// `contract Name`, optionally `abstract` and optionally followed by an
/// `is A, B` inheritance clause, at the start of a line.
static CONTRACT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:abstract[ \t]+)?contract[ \t]+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s+is\s+[^{;]+)?\s*\{")
        .unwrap()
});

/// Extract the declared contract name from a source unit.
///
/// Returns `None` when no declaration is found; callers treat that as fatal
/// because nothing can be scaffolded without a name.
pub fn derive_unit_name(source: &str) -> Option<String> {
    CONTRACT_DECL
        .captures(source)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_contract() {
        let src = "pragma solidity ^0.8.24;\n\ncontract FHECounter {\n}\n";
        assert_eq!(derive_unit_name(src).as_deref(), Some("FHECounter"));
    }

    #[test]
    fn test_inheritance_clause() {
        let src = "contract ConfidentialToken is SepoliaConfig, Ownable2Step {\n}\n";
        assert_eq!(derive_unit_name(src).as_deref(), Some("ConfidentialToken"));
    }

    #[test]
    fn test_multiline_inheritance() {
        let src = "abstract contract Base\n    is SepoliaConfig\n{\n}\n";
        assert_eq!(derive_unit_name(src).as_deref(), Some("Base"));
    }

    #[test]
    fn test_ignores_comments_and_libraries() {
        let src = "/// contract Fake {\nlibrary VaultMath {\n}\n";
        assert_eq!(derive_unit_name(src), None);
    }

    #[test]
    fn test_first_declaration_wins() {
        let src = "contract A {\n}\ncontract B {\n}\n";
        assert_eq!(derive_unit_name(src).as_deref(), Some("A"));
    }
}
