//! Changeset model: the read-only snapshot every check inspects.
//!
//! A [`Changeset`] is either supplied by the host as a JSON document or
//! derived from the local git repository. It is immutable for the duration
//! of a run; checks share it by reference only.

use crate::core::error::{Error, Result};
use crate::core::git::GitRepo;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// How a file was changed in the changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeAction {
    /// File was added.
    #[serde(rename = "A")]
    Added,
    /// File content was modified.
    #[serde(rename = "M")]
    Modified,
    /// File was deleted.
    #[serde(rename = "D")]
    Deleted,
    /// File was renamed (path refers to the new location).
    #[serde(rename = "R")]
    Renamed,
    /// File was copied (path refers to the new location).
    #[serde(rename = "C")]
    Copied,
}

impl ChangeAction {
    /// Maps a `git diff --name-status` status field to an action.
    ///
    /// Rename/copy statuses carry a similarity score (`R100`); only the
    /// leading letter matters. Unknown statuses degrade to `Modified`.
    #[must_use]
    pub fn from_git_status(status: &str) -> Self {
        match status.chars().next() {
            Some('A') => Self::Added,
            Some('D') => Self::Deleted,
            Some('R') => Self::Renamed,
            Some('C') => Self::Copied,
            _ => Self::Modified,
        }
    }
}

/// One affected file in a changeset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// How the file was changed.
    pub action: ChangeAction,
}

/// JSON shape of a host-supplied changeset file.
#[derive(Debug, Deserialize)]
struct ChangesetDoc {
    #[serde(default)]
    files: Vec<AffectedFile>,
    #[serde(default)]
    description: String,
}

/// A read-only snapshot of one change under review.
#[derive(Debug, Clone)]
pub struct Changeset {
    /// Repository root the checks run against.
    pub root: PathBuf,
    /// Affected files, absolute paths.
    pub files: Vec<AffectedFile>,
    /// Free-text change description (commit message).
    pub description: String,
}

static FOOTER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(bug|fixed)\s*:\s*(.+)$").expect("hard-coded pattern"));

impl Changeset {
    /// Creates a changeset from parts (mainly for tests and embedding).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, files: Vec<AffectedFile>, description: String) -> Self {
        Self {
            root: root.into(),
            files,
            description,
        }
    }

    /// Loads a host-supplied changeset from a JSON file.
    ///
    /// Relative file paths are resolved against `root`.
    pub fn from_json_file(path: &Path, root: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io("read changeset", e))?;

        let doc: ChangesetDoc =
            serde_json::from_str(&content).map_err(|e| Error::changeset(path, e.to_string()))?;

        let files = doc
            .files
            .into_iter()
            .map(|f| AffectedFile {
                path: if f.path.is_absolute() {
                    f.path
                } else {
                    root.join(f.path)
                },
                action: f.action,
            })
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            files,
            description: doc.description,
        })
    }

    /// Derives a changeset from the local git repository.
    ///
    /// The affected files are the committed diff between the merge base with
    /// `base` and `HEAD`; the description is the `HEAD` commit message.
    pub fn from_git(repo: &GitRepo, base: Option<&str>) -> Result<Self> {
        let base = match base {
            Some(b) => b.to_string(),
            None => format!("origin/{}", repo.main_branch()?),
        };

        let files = repo.changed_files(&base)?;
        let description = repo.head_description()?;

        Ok(Self {
            root: repo.root().to_path_buf(),
            files,
            description,
        })
    }

    /// Returns absolute paths of affected files (not due to an excluded
    /// action) under one of the parent paths, with an accepted suffix.
    ///
    /// Parent matching is substring containment on the path text, not
    /// path-segment aware. An empty `suffixes` slice skips suffix filtering
    /// entirely.
    #[must_use]
    pub fn affected_files(
        &self,
        parents: &[PathBuf],
        excluded_actions: &[ChangeAction],
        suffixes: &[&str],
    ) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| !excluded_actions.contains(&f.action))
            .map(|f| &f.path)
            .filter(|path| {
                let text = path.to_string_lossy();
                parents
                    .iter()
                    .any(|parent| text.contains(parent.to_string_lossy().as_ref()))
            })
            .filter(|path| {
                if suffixes.is_empty() {
                    return true;
                }
                let text = path.to_string_lossy();
                suffixes.iter().any(|suffix| text.ends_with(suffix))
            })
            .cloned()
            .collect()
    }

    /// Extracts bug references from the description footer.
    ///
    /// The footer is the last block of consecutive non-empty lines. Lines
    /// tagged `Bug:` or `Fixed:` contribute their comma-separated values;
    /// `Bug:` lines followed by an empty line are not part of the footer and
    /// are ignored.
    #[must_use]
    pub fn bugs(&self) -> Vec<String> {
        let mut bugs = Vec::new();

        for line in footer_lines(&self.description) {
            let Some(captures) = FOOTER_TAG.captures(line) else {
                continue;
            };
            for value in captures[2].split(',') {
                let value = value.trim();
                if !value.is_empty() {
                    bugs.push(value.to_string());
                }
            }
        }

        bugs
    }
}

/// Returns the last block of consecutive non-empty lines.
fn footer_lines(description: &str) -> Vec<&str> {
    let lines: Vec<&str> = description.trim_end().lines().collect();
    let mut start = lines.len();

    for (index, line) in lines.iter().enumerate().rev() {
        if line.trim().is_empty() {
            break;
        }
        start = index;
    }

    lines[start..].to_vec()
}
