//! File discovery with an exclusion policy that is decided before any file
//! content is read.

use crate::config::{BINARY_EXTENSIONS, DEFAULT_EXCLUDED_DIRS, ScanSection};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered path together with the exclusion verdict made for it.
#[derive(Debug)]
pub enum Discovered {
    Included(PathBuf),
    Excluded { path: PathBuf, reason: String },
    /// Walk error (unreadable directory, broken link).
    WalkError { path: PathBuf, message: String },
}

/// Exclusion policy: default directory excludes, binary extensions, config
/// extends, optional gitignore patterns.
pub struct ExcludePolicy {
    dirs: Vec<String>,
    extensions: Vec<String>,
    gitignore: Option<Gitignore>,
}

impl ExcludePolicy {
    pub fn new(root: &Path, scan: &ScanSection, extra: &[String]) -> Self {
        let mut dirs: Vec<String> = DEFAULT_EXCLUDED_DIRS
            .iter()
            .map(|s| s.to_string())
            .collect();
        dirs.extend(scan.exclude.iter().cloned());
        dirs.extend(extra.iter().cloned());

        Self {
            dirs,
            extensions: scan.extensions.clone(),
            gitignore: Self::load_gitignore(root),
        }
    }

    fn load_gitignore(root: &Path) -> Option<Gitignore> {
        let gitignore_file = root.join(".gitignore");
        if !root.join(".git").exists() || !gitignore_file.exists() {
            return None;
        }
        let mut builder = GitignoreBuilder::new(root);
        if builder.add(&gitignore_file).is_some() {
            return None;
        }
        builder.build().ok()
    }

    /// Exclusion reason for a directory, if it should be pruned.
    pub fn dir_exclusion(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_string_lossy();
        if self.dirs.iter().any(|d| d.as_str() == name) {
            return Some(format!("directory '{name}' matches exclusion policy"));
        }
        if let Some(ref gitignore) = self.gitignore {
            if gitignore.matched(path, true).is_ignore() {
                return Some("directory matches .gitignore".to_string());
            }
        }
        None
    }

    /// Exclusion reason for a file, if it should not be scanned.
    pub fn file_exclusion(&self, path: &Path) -> Option<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        if let Some(ref ext) = ext {
            if BINARY_EXTENSIONS.contains(&ext.as_str()) {
                return Some(format!("binary extension '.{ext}'"));
            }
        }

        if !self.extensions.is_empty() {
            match ext {
                Some(ref ext) if self.extensions.iter().any(|e| e == ext) => {}
                _ => return Some("extension not in configured include list".to_string()),
            }
        }

        if let Some(ref gitignore) = self.gitignore {
            if gitignore.matched(path, false).is_ignore() {
                return Some("file matches .gitignore".to_string());
            }
        }
        None
    }
}

/// Directory walker producing one [`Discovered`] entry per visited path,
/// pruning excluded directories without descending into them.
pub struct Walker {
    policy: ExcludePolicy,
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

impl Walker {
    pub fn new(policy: ExcludePolicy, scan: &ScanSection) -> Self {
        Self {
            policy,
            max_depth: scan.max_depth,
            follow_symlinks: scan.follow_symlinks,
        }
    }

    pub fn discover(&self, root: &Path) -> Vec<Discovered> {
        let mut walker = WalkDir::new(root).follow_links(self.follow_symlinks);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut out = Vec::new();
        let mut it = walker.into_iter();
        while let Some(entry) = it.next() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    out.push(Discovered::WalkError {
                        path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_dir() {
                if path != root {
                    if let Some(reason) = self.policy.dir_exclusion(path) {
                        out.push(Discovered::Excluded {
                            path: path.to_path_buf(),
                            reason,
                        });
                        it.skip_current_dir();
                    }
                }
                continue;
            }
            if !entry.file_type().is_file() {
                out.push(Discovered::Excluded {
                    path: path.to_path_buf(),
                    reason: "not a regular file".to_string(),
                });
                continue;
            }

            match self.policy.file_exclusion(path) {
                Some(reason) => out.push(Discovered::Excluded {
                    path: path.to_path_buf(),
                    reason,
                }),
                None => out.push(Discovered::Included(path.to_path_buf())),
            }
        }
        out
    }
}
