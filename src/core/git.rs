//! Git repository operations.
//!
//! The presubmit run reads the working tree and repository metadata the
//! host has already materialized: the committed diff against an upstream
//! branch, the HEAD commit message, and the current working-tree diff.

use crate::core::change::{AffectedFile, ChangeAction};
use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Represents a Git repository.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Root directory of the repository (where .git is).
    root: PathBuf,
}

impl GitRepo {
    /// Discovers the Git repository from the current directory.
    pub fn discover() -> Result<Self> {
        Self::discover_from(&std::env::current_dir().map_err(|e| Error::io("get current dir", e))?)
    }

    /// Discovers the Git repository from a specific path.
    pub fn discover_from(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(path)
            .output()
            .map_err(|e| Error::io("run git rev-parse", e))?;

        if !output.status.success() {
            return Err(Error::NotGitRepo);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let root = stdout
            .lines()
            .next()
            .map(PathBuf::from)
            .ok_or(Error::NotGitRepo)?;

        Ok(Self { root })
    }

    /// Returns the root directory of the repository.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the main branch name (main or master).
    pub fn main_branch(&self) -> Result<String> {
        // Try 'main' first
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "origin/main"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("verify main branch", e))?;

        if output.status.success() {
            return Ok("main".to_string());
        }

        // Fall back to 'master'
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "origin/master"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("verify master branch", e))?;

        if output.status.success() {
            return Ok("master".to_string());
        }

        // Default to 'main' if neither exists
        Ok("main".to_string())
    }

    /// Returns the files changed between the merge base with `base` and HEAD.
    ///
    /// Paths are absolute; rename and copy entries report the new location.
    pub fn changed_files(&self, base: &str) -> Result<Vec<AffectedFile>> {
        let range = format!("{base}...HEAD");
        let output = Command::new("git")
            .args(["diff", "--name-status", &range])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("get changed files", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git("diff --name-status", stderr.trim().to_string()));
        }

        let files = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let status = fields.next()?;
                // Rename/copy lines are "R100\told\tnew"; keep the new path.
                let path = fields.next_back()?;
                if path.is_empty() {
                    return None;
                }
                Some(AffectedFile {
                    path: self.root.join(path),
                    action: ChangeAction::from_git_status(status),
                })
            })
            .collect();

        Ok(files)
    }

    /// Returns the HEAD commit message.
    pub fn head_description(&self) -> Result<String> {
        let output = Command::new("git")
            .args(["log", "-1", "--format=%B"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("get commit message", e))?;

        if !output.status.success() {
            return Err(Error::git("log -1", "Failed to read HEAD commit message"));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// Returns the working-tree diff, or None when the tree is clean.
    pub fn working_diff(&self) -> Result<Option<String>> {
        let output = Command::new("git")
            .args(["diff"])
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::io("get working diff", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git("diff", stderr.trim().to_string()));
        }

        let diff = String::from_utf8_lossy(&output.stdout).to_string();
        if diff.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(diff))
        }
    }

    /// Checks if a file exists in the repository.
    #[must_use]
    pub fn file_exists(&self, relative_path: &str) -> bool {
        self.root.join(relative_path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .expect("run git");
    }

    fn create_test_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path();

        git(path, &["init"]);
        git(path, &["config", "user.email", "test@test.com"]);
        git(path, &["config", "user.name", "Test"]);

        let repo = GitRepo::discover_from(path).expect("discover repo");
        (temp, repo)
    }

    fn commit_all(dir: &Path, message: &str) {
        git(dir, &["add", "."]);
        git(dir, &["commit", "-m", message]);
    }

    // =========================================================================
    // Discovery tests
    // =========================================================================

    #[test]
    fn test_discover_repo() {
        let (_temp, repo) = create_test_repo();
        assert!(repo.root().exists());
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let (temp, _) = create_test_repo();

        let subdir = temp.path().join("front_end/core");
        std::fs::create_dir_all(&subdir).expect("create subdir");

        let repo = GitRepo::discover_from(&subdir).expect("discover from subdir");
        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_not_git_repo() {
        let temp = TempDir::new().expect("create temp dir");
        let result = GitRepo::discover_from(temp.path());
        assert!(matches!(result, Err(Error::NotGitRepo)));
    }

    // =========================================================================
    // Changed files tests
    // =========================================================================

    #[test]
    fn test_changed_files_against_earlier_commit() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("base.txt"), "base").expect("write file");
        commit_all(temp.path(), "initial");

        std::fs::write(temp.path().join("added.txt"), "new").expect("write file");
        std::fs::write(temp.path().join("base.txt"), "changed").expect("modify file");
        commit_all(temp.path(), "second");

        let mut files = repo.changed_files("HEAD~1").expect("diff");
        files.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(files.len(), 2);
        assert!(files[0].path.ends_with("added.txt"));
        assert_eq!(files[0].action, ChangeAction::Added);
        assert!(files[1].path.ends_with("base.txt"));
        assert_eq!(files[1].action, ChangeAction::Modified);
    }

    #[test]
    fn test_changed_files_detects_deletion() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("doomed.txt"), "bye").expect("write file");
        commit_all(temp.path(), "initial");

        std::fs::remove_file(temp.path().join("doomed.txt")).expect("delete file");
        commit_all(temp.path(), "remove");

        let files = repo.changed_files("HEAD~1").expect("diff");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].action, ChangeAction::Deleted);
    }

    #[test]
    fn test_changed_files_bad_base_is_error() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("a.txt"), "a").expect("write file");
        commit_all(temp.path(), "initial");

        let result = repo.changed_files("no-such-ref");
        assert!(matches!(result, Err(Error::GitOperation { .. })));
    }

    // =========================================================================
    // Description tests
    // =========================================================================

    #[test]
    fn test_head_description() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("a.txt"), "a").expect("write file");
        commit_all(temp.path(), "Subject line");

        let description = repo.head_description().expect("description");
        assert_eq!(description, "Subject line");
    }

    // =========================================================================
    // Working diff tests
    // =========================================================================

    #[test]
    fn test_working_diff_clean_tree() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("a.txt"), "a\n").expect("write file");
        commit_all(temp.path(), "initial");

        let diff = repo.working_diff().expect("diff");
        assert!(diff.is_none());
    }

    #[test]
    fn test_working_diff_dirty_tree() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("a.txt"), "a\n").expect("write file");
        commit_all(temp.path(), "initial");

        std::fs::write(temp.path().join("a.txt"), "b\n").expect("modify file");

        let diff = repo.working_diff().expect("diff").expect("dirty tree");
        assert!(diff.contains("a.txt"));
    }

    // =========================================================================
    // File existence tests
    // =========================================================================

    #[test]
    fn test_file_exists() {
        let (temp, repo) = create_test_repo();

        std::fs::write(temp.path().join("test.txt"), "content").expect("write file");

        assert!(repo.file_exists("test.txt"));
        assert!(!repo.file_exists("nonexistent.txt"));
    }

    // =========================================================================
    // Main branch tests
    // =========================================================================

    #[test]
    fn test_main_branch_defaults_without_remote() {
        let (_temp, repo) = create_test_repo();
        let branch = repo.main_branch().expect("main branch");
        assert_eq!(branch, "main");
    }

    #[test]
    fn test_git_repo_clone_and_debug() {
        let (_temp, repo) = create_test_repo();
        let cloned = repo.clone();
        assert_eq!(repo.root(), cloned.root());
        assert!(format!("{:?}", repo).contains("GitRepo"));
    }
}
