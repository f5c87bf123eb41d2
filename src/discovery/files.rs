//! Workspace scanning
//!
//! Finds test definition files and locates the result artifact. Hidden
//! directories (`.git`, `.vscode`, ...) are never entered.

use std::path::{Path, PathBuf};

/// Collect files under `root` whose name satisfies `matches`, sorted
pub fn find_files<F>(root: &Path, matches: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> bool,
{
    let mut found = Vec::new();
    walk(root, &matches, &mut found);
    found.sort();
    found
}

fn walk<F>(dir: &Path, matches: &F, found: &mut Vec<PathBuf>)
where
    F: Fn(&str) -> bool,
{
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
            return;
        }
    };

    // Skip entries that can't be read
    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !name.starts_with('.') {
                walk(&path, matches, found);
            }
        } else if matches(&name) {
            found.push(path);
        }
    }
}

/// Find test definition files ending with `suffix`
pub fn find_test_files(root: &Path, suffix: &str) -> Vec<PathBuf> {
    find_files(root, |name| name.ends_with(suffix))
}

/// Path of the result artifact
///
/// The runner writes it to the workspace root; copies with the same name
/// in subdirectories (fixtures, archived runs) are not the live artifact.
pub fn artifact_path(root: &Path, file_name: &str) -> PathBuf {
    root.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_test_files_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/nested")).unwrap();
        fs::write(dir.path().join("b.Tests.ps1"), "").unwrap();
        fs::write(dir.path().join("src/nested/a.Tests.ps1"), "").unwrap();
        fs::write(dir.path().join("src/helper.ps1"), "").unwrap();

        let files = find_test_files(dir.path(), ".Tests.ps1");
        assert_eq!(
            files,
            vec![
                dir.path().join("b.Tests.ps1"),
                dir.path().join("src/nested/a.Tests.ps1"),
            ]
        );
    }

    #[test]
    fn test_hidden_directories_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git/x.Tests.ps1"), "").unwrap();
        assert!(find_test_files(dir.path(), ".Tests.ps1").is_empty());
    }

    #[test]
    fn test_artifact_lives_in_workspace_root() {
        let dir = tempdir().unwrap();
        let path = artifact_path(dir.path(), "TestExplorerResults.xml");
        assert_eq!(path, dir.path().join("TestExplorerResults.xml"));
    }

    #[test]
    fn test_nested_artifact_copies_are_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("fixtures")).unwrap();
        fs::write(dir.path().join("fixtures/TestExplorerResults.xml"), "").unwrap();
        let path = artifact_path(dir.path(), "TestExplorerResults.xml");
        assert_eq!(path, dir.path().join("TestExplorerResults.xml"));
        assert!(!path.exists());
    }
}
