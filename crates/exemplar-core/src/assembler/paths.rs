//! Path arithmetic for placing units and rewriting relative imports.

use std::path::{Component, Path, PathBuf};

/// Sub-path a registry file is placed at inside its area.
///
/// Files under `area_root` keep their nesting minus the first (category)
/// segment: `contracts/basic/encrypt/A.sol` becomes `encrypt/A.sol`, and
/// `contracts/basic/A.sol` becomes `A.sol`. Files outside `area_root` are
/// placed flat by file name.
pub fn placement_subpath(path: &Path, area_root: &Path) -> PathBuf {
    let path = normalize(path);
    match path.strip_prefix(normalize(area_root)) {
        Ok(relative) => {
            let mut components = relative.components();
            if relative.components().count() > 1 {
                components.next();
            }
            components.as_path().to_path_buf()
        }
        Err(_) => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_default(),
    }
}

/// Lexically normalize a relative path, folding `.` and `..` segments.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Relative path from `from_dir` to `to`, `/`-separated, without a leading `./`.
pub fn relative_link(from_dir: &Path, to: &Path) -> String {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from: Vec<_> = from.components().collect();
    let to: Vec<_> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".into());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

/// Relative import specifier from the file `importer` to the file `target`,
/// in the `./x` / `../x` form source files use.
pub fn relative_import(importer: &Path, target: &Path) -> String {
    let from_dir = importer.parent().unwrap_or(Path::new(""));
    let link = relative_link(from_dir, target);
    if link.starts_with("..") {
        link
    } else {
        format!("./{link}")
    }
}

/// Drop the file extension from an import specifier (`./A.sol` -> `./A`).
pub fn strip_extension(specifier: &str) -> &str {
    let file_start = specifier.rfind('/').map_or(0, |i| i + 1);
    match specifier[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &specifier[..file_start + dot],
        _ => specifier,
    }
}
