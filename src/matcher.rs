/*!
 * Path inclusion and exclusion rules
 *
 * Every decision works on root-relative, forward-slash paths. List entries
 * match by exact relative path or by base name; entries containing glob
 * metacharacters are matched with `glob-match` against both.
 */

use glob_match::glob_match;

use crate::config::ScanConfig;
use crate::utils::TOOL_DIR;

/// Decision for a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirDecision {
    /// Walk into the directory
    Descend,
    /// Prune the whole subtree
    Skip,
}

/// Decision for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDecision {
    /// Hand the file to the classifier
    Include,
    /// Count the file as excluded
    Exclude,
}

/// A list of path entries split into literal and glob entries
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    exact: Vec<String>,
    globs: Vec<String>,
}

impl PatternList {
    pub fn new(entries: &[String]) -> Self {
        let (globs, exact): (Vec<String>, Vec<String>) =
            entries.iter().cloned().partition(|e| is_glob(e));
        Self { exact, globs }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.globs.is_empty()
    }

    /// Match by relative path or base name
    pub fn matches(&self, rel_path: &str, name: &str) -> bool {
        self.exact.iter().any(|e| e == rel_path || e == name)
            || self
                .globs
                .iter()
                .any(|g| glob_match(g, rel_path) || glob_match(g, name))
    }
}

fn is_glob(entry: &str) -> bool {
    entry.contains(['*', '?', '[', '{'])
}

/// Base name of a forward-slash relative path
fn base_name(rel_path: &str) -> &str {
    rel_path.rsplit('/').next().unwrap_or(rel_path)
}

/// `rel_path` followed by each of its ancestors, nearest first
fn self_and_ancestors(rel_path: &str) -> impl Iterator<Item = &str> {
    let mut current = Some(rel_path).filter(|p| !p.is_empty());
    std::iter::from_fn(move || {
        let path = current?;
        current = path.rfind('/').map(|idx| &path[..idx]);
        Some(path)
    })
}

/// Evaluates the configured folder and file lists
#[derive(Debug, Clone)]
pub struct PathMatcher {
    skip_dirs: Vec<String>,
    included_folders: PatternList,
    included_files: PatternList,
    excluded_folders: PatternList,
    excluded_files: PatternList,
}

impl PathMatcher {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            skip_dirs: config.skip_dirs.clone(),
            included_folders: PatternList::new(&config.included_folders),
            included_files: PatternList::new(&config.included_files),
            excluded_folders: PatternList::new(&config.excluded_folders),
            excluded_files: PatternList::new(&config.excluded_files),
        }
    }

    /// Decide whether to walk into a directory below a source root
    pub fn decide_dir(&self, rel_path: &str) -> DirDecision {
        let name = base_name(rel_path);

        if name == TOOL_DIR || self.excluded_folders.matches(rel_path, name) {
            return DirDecision::Skip;
        }

        if self.skip_dirs.iter().any(|d| d == name) && !self.names_path_through(rel_path) {
            return DirDecision::Skip;
        }

        if !self.included_folders.is_empty() && !self.may_contain_included(rel_path) {
            return DirDecision::Skip;
        }

        DirDecision::Descend
    }

    /// Decide whether a file below a source root is accepted
    pub fn decide_file(&self, rel_path: &str) -> FileDecision {
        let name = base_name(rel_path);

        if self.excluded_files.matches(rel_path, name) {
            return FileDecision::Exclude;
        }

        if !self.included_folders.is_empty() {
            let parent = rel_path.rfind('/').map_or("", |idx| &rel_path[..idx]);
            if !self.inside_included(parent) {
                return FileDecision::Exclude;
            }
        }

        if !self.included_files.is_empty() && !self.included_files.matches(rel_path, name) {
            return FileDecision::Exclude;
        }

        FileDecision::Include
    }

    /// An included folder entry is this directory or lies beneath it
    fn names_path_through(&self, rel_path: &str) -> bool {
        let prefix = format!("{}/", rel_path);
        self.included_folders
            .exact
            .iter()
            .any(|e| e == rel_path || e.starts_with(&prefix))
            || self.included_folders.globs.iter().any(|g| glob_match(g, rel_path))
    }

    /// The directory is an included folder or sits inside one
    fn inside_included(&self, rel_path: &str) -> bool {
        self_and_ancestors(rel_path).any(|path| {
            self.included_folders.exact.iter().any(|e| e == path)
                || self.included_folders.globs.iter().any(|g| glob_match(g, path))
        })
    }

    /// Descending can still reach an included folder
    fn may_contain_included(&self, rel_path: &str) -> bool {
        // a glob may match anywhere below, so only literal entries prune
        !self.included_folders.globs.is_empty()
            || self.names_path_through(rel_path)
            || self.inside_included(rel_path)
    }
}
