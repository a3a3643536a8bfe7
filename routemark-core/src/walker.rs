/// Routes tree enumeration
///
/// Depth-first walk producing absolute paths of every handler and schema
/// module under the root. Entries are visited in file-name order at each
/// level so diagnostics are reproducible across runs and platforms.
///
/// A missing root is not an error: it simply yields no modules.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::convention::ModuleConvention;
use crate::error::{RouteError, RouteResult};

/// Lists candidate module files under `root`
///
/// # Errors
///
/// Returns `RouteError::Unreadable` if an existing directory cannot be read.
pub fn walk(root: &Path, convention: &ModuleConvention) -> RouteResult<Vec<PathBuf>> {
    let root = resolve_root(root)?;

    if !root.is_dir() {
        debug!(root = %root.display(), "Routes directory not found, no modules to load");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    walk_dir(&root, convention, &mut out)?;
    Ok(out)
}

fn walk_dir(dir: &Path, convention: &ModuleConvention, out: &mut Vec<PathBuf>) -> RouteResult<()> {
    let unreadable = |source| RouteError::Unreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(unreadable)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(unreadable)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if convention.is_ignored_dir(&name) {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| RouteError::Unreadable {
            path: path.clone(),
            source,
        })?;

        if file_type.is_dir() {
            walk_dir(&path, convention, out)?;
        } else if convention.kind(&path).is_some() {
            out.push(path);
        }
    }

    Ok(())
}

/// Absolute form of a routes root, resolved against the working directory
pub fn resolve_root(path: &Path) -> RouteResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| RouteError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files = walk(&dir.path().join("nope"), &ModuleConvention::default()).unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_walk_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        touch(root, "zeta.rs");
        touch(root, "alpha.rs");
        touch(root, "alpha.schema.json");
        touch(root, "notes.md");
        touch(root, "users/get.rs");
        touch(root, "users/list.rs");
        touch(root, ".hidden/secret.rs");
        touch(root, ".dotfile.rs");
        touch(root, "target/debug/build.rs");
        touch(root, "node_modules/pkg/index.rs");

        let files = walk(root, &ModuleConvention::default()).unwrap();
        let relative: Vec<String> = files
            .iter()
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(
            relative,
            vec![
                "alpha.rs",
                "alpha.schema.json",
                "users/get.rs",
                "users/list.rs",
                "zeta.rs",
            ]
        );
        assert!(files.iter().all(|path| path.is_absolute()));
    }
}
