//! Package descriptor (`package.json`) patching.
//!
//! Only targeted fields are touched: the top-level `name`, `description`, and
//! `homepage`, plus explicit dependency pins. Field order is preserved
//! (serde_json is built with `preserve_order`) so diffs stay minimal.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ExemplarError, Result};

/// File name of the package descriptor.
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Sections dependency versions can live in.
const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// Fields written into a generated project's descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorPatch {
    pub name: String,
    pub description: String,
    pub homepage: String,
    /// Dependency name -> version pin.
    pub pins: BTreeMap<String, String>,
}

/// Load a descriptor as a JSON object.
pub fn load(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| ExemplarError::Descriptor {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(ExemplarError::Descriptor {
            path: path.to_path_buf(),
            reason: "top level is not an object".into(),
        });
    }
    Ok(value)
}

/// Write a descriptor back with two-space indentation and a trailing newline.
pub fn save(path: &Path, value: &Value) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| ExemplarError::Descriptor {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Patch `<dest_root>/package.json` and delete stale lock files.
pub fn patch_descriptor(dest_root: &Path, patch: &DescriptorPatch, lock_files: &[String]) -> Result<()> {
    let path = dest_root.join(DESCRIPTOR_FILE);
    let mut value = load(&path)?;

    if let Some(obj) = value.as_object_mut() {
        obj.insert("name".into(), Value::String(patch.name.clone()));
        obj.insert("description".into(), Value::String(patch.description.clone()));
        obj.insert("homepage".into(), Value::String(patch.homepage.clone()));
    }
    for (name, version) in &patch.pins {
        pin_dependency(&mut value, name, version);
    }

    save(&path, &value)?;
    let removed = remove_lock_files(dest_root, lock_files)?;
    tracing::debug!("patched {} ({removed} lock file(s) removed)", path.display());
    Ok(())
}

/// Delete any lock file present in `dest_root`. Returns how many were removed.
pub fn remove_lock_files(dest_root: &Path, lock_files: &[String]) -> Result<usize> {
    let mut removed = 0;
    for name in lock_files {
        let path = dest_root.join(name);
        if path.is_file() {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Current version of `name`, searching the dependency sections in order.
pub fn dependency_version<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    DEPENDENCY_SECTIONS
        .iter()
        .find_map(|section| value.get(section)?.get(name)?.as_str())
}

/// Set `name` to `version` in every section that already declares it.
///
/// Returns `true` if at least one value actually changed.
pub fn set_existing_dependency(value: &mut Value, name: &str, version: &str) -> bool {
    let mut changed = false;
    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = value.get_mut(section).and_then(Value::as_object_mut) else {
            continue;
        };
        if let Some(current) = deps.get_mut(name) {
            if current.as_str() != Some(version) {
                *current = Value::String(version.to_string());
                changed = true;
            }
        }
    }
    changed
}

/// Pin `name` to `version`: overwrite it where declared, otherwise add it to
/// `dependencies`.
pub fn pin_dependency(value: &mut Value, name: &str, version: &str) {
    let declared = DEPENDENCY_SECTIONS
        .iter()
        .any(|s| value.get(s).and_then(|d| d.get(name)).is_some());

    if declared {
        set_existing_dependency(value, name, version);
        return;
    }

    let Some(obj) = value.as_object_mut() else {
        return;
    };
    let deps = obj
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(deps) = deps.as_object_mut() {
        deps.insert(name.to_string(), Value::String(version.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEMPLATE: &str = r#"{
  "name": "fhevm-hardhat-template",
  "description": "Hardhat template",
  "version": "0.1.0",
  "homepage": "https://example.invalid",
  "scripts": { "test": "hardhat test" },
  "dependencies": { "@fhevm/solidity": "^0.7.0" },
  "devDependencies": { "@fhevm/hardhat-plugin": "0.0.1", "hardhat": "^2.22.0" }
}
"#;

    #[test]
    fn test_patch_overwrites_targeted_fields_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), TEMPLATE).unwrap();
        std::fs::write(dir.path().join("package-lock.json"), "{}").unwrap();

        let patch = DescriptorPatch {
            name: "fhevm-example-fhe-counter".into(),
            description: "Encrypted counter".into(),
            homepage: "https://docs.example.org".into(),
            pins: BTreeMap::from([
                ("@fhevm/solidity".to_string(), "^0.8.0".to_string()),
                ("@openzeppelin/contracts".to_string(), "^5.1.0".to_string()),
            ]),
        };
        patch_descriptor(dir.path(), &patch, &["package-lock.json".into()]).unwrap();

        let value = load(&dir.path().join("package.json")).unwrap();
        assert_eq!(value["name"], "fhevm-example-fhe-counter");
        assert_eq!(value["description"], "Encrypted counter");
        assert_eq!(value["homepage"], "https://docs.example.org");
        assert_eq!(value["version"], "0.1.0");
        assert_eq!(value["scripts"]["test"], "hardhat test");
        assert_eq!(value["dependencies"]["@fhevm/solidity"], "^0.8.0");
        assert_eq!(value["dependencies"]["@openzeppelin/contracts"], "^5.1.0");
        assert_eq!(value["devDependencies"]["hardhat"], "^2.22.0");
        assert!(!dir.path().join("package-lock.json").exists());

        // Key order survives the rewrite.
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys[0], "name");
        assert_eq!(keys[2], "version");
    }

    #[test]
    fn test_dependency_version_lookup() {
        let value: Value = serde_json::from_str(TEMPLATE).unwrap();
        assert_eq!(dependency_version(&value, "hardhat"), Some("^2.22.0"));
        assert_eq!(dependency_version(&value, "@fhevm/solidity"), Some("^0.7.0"));
        assert_eq!(dependency_version(&value, "missing"), None);
    }

    #[test]
    fn test_set_existing_dependency_reports_change() {
        let mut value = json!({ "devDependencies": { "lib-x": "1.0.0" } });
        assert!(set_existing_dependency(&mut value, "lib-x", "2.0.0"));
        assert!(!set_existing_dependency(&mut value, "lib-x", "2.0.0"));
        assert!(!set_existing_dependency(&mut value, "lib-y", "2.0.0"));
        assert!(value["dependencies"].is_null());
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load(&path), Err(ExemplarError::Descriptor { .. })));
    }
}
