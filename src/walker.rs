/*!
 * Lazy traversal of the configured source roots
 */

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::ScanConfig;
use crate::error::Result;
use crate::matcher::{DirDecision, FileDecision, PathMatcher};
use crate::utils::to_slash;

/// A file found under a source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path on disk, under the canonical source root
    pub absolute: PathBuf,
    /// Root-relative, forward-slash path
    pub relative: String,
    /// Verdict of the file rules
    pub decision: FileDecision,
}

type Entries = Box<dyn Iterator<Item = walkdir::Result<DirEntry>>>;

/// Depth-first walk over every source root, yielding files only.
///
/// Directories are pruned before they are opened. A file is yielded once per
/// canonical path, however many roots or links reach it. Symlink cycles are
/// reported and skipped. Entries come out sorted by name within each directory.
pub struct TreeWalker {
    matcher: PathMatcher,
    pending: VecDeque<PathBuf>,
    root: PathBuf,
    entries: Option<Entries>,
    seen: HashSet<PathBuf>,
    ignored: HashSet<PathBuf>,
}

impl TreeWalker {
    /// Prepare a walk; roots are canonicalized up front
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let mut pending = VecDeque::with_capacity(config.source_roots.len());
        for root in &config.source_roots {
            let canonical = fs::canonicalize(root).map_err(|e| {
                crate::error!(Config, "Cannot resolve source folder {}: {}", root.display(), e)
            })?;
            pending.push_back(canonical);
        }

        Ok(Self {
            matcher: PathMatcher::new(config),
            pending,
            root: PathBuf::new(),
            entries: None,
            seen: HashSet::new(),
            ignored: config
                .ignored_files
                .iter()
                .filter_map(|path| canonical_target(path))
                .collect(),
        })
    }

    fn start_next_root(&mut self) -> bool {
        let Some(root) = self.pending.pop_front() else {
            return false;
        };
        log::info!("Scanning: {}", root.display());

        let matcher = self.matcher.clone();
        let prune_root = root.clone();
        let entries = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| keep_entry(&matcher, &prune_root, entry));

        self.root = root;
        self.entries = Some(Box::new(entries));
        true
    }

    fn accept(&mut self, path: &Path) -> Option<WalkEntry> {
        let relative = path.strip_prefix(&self.root).ok().map(to_slash)?;

        // broken links have no target, key them on the link itself
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.ignored.contains(&key) {
            log::debug!("Ignoring own file: {}", path.display());
            return None;
        }
        if !self.seen.insert(key) {
            log::debug!("Already visited: {}", path.display());
            return None;
        }

        Some(WalkEntry {
            absolute: path.to_path_buf(),
            decision: self.matcher.decide_file(&relative),
            relative,
        })
    }
}

/// Directory pruning, consulted before walkdir opens a directory
fn keep_entry(matcher: &PathMatcher, root: &Path, entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }

    let Some(relative) = entry.path().strip_prefix(root).ok().map(to_slash) else {
        return true;
    };

    match matcher.decide_dir(&relative) {
        DirDecision::Descend => true,
        DirDecision::Skip => {
            log::debug!("Skipping directory: {}", relative);
            false
        }
    }
}

/// Canonical form of a path that may not exist yet
fn canonical_target(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Some(canonical);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|p| p.join(name))
}

fn is_broken_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
        && fs::metadata(path).is_err()
}

impl Iterator for TreeWalker {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<WalkEntry> {
        loop {
            if self.entries.is_none() && !self.start_next_root() {
                return None;
            }

            let next = self.entries.as_mut().and_then(|entries| entries.next());
            match next {
                None => self.entries = None,
                Some(Ok(entry)) => {
                    if entry.file_type().is_dir() {
                        continue;
                    }
                    if !entry.file_type().is_file() {
                        log::debug!("Not a regular file: {}", entry.path().display());
                        continue;
                    }
                    if let Some(found) = self.accept(entry.path()) {
                        return Some(found);
                    }
                }
                Some(Err(err)) => {
                    if let Some(ancestor) = err.loop_ancestor() {
                        log::warn!(
                            "Symlink cycle at {} (points to {}), not followed",
                            err.path().map_or_else(String::new, |p| p.display().to_string()),
                            ancestor.display()
                        );
                        continue;
                    }

                    match err.path() {
                        // counted later as unreadable
                        Some(path) if is_broken_symlink(path) => {
                            let path = path.to_path_buf();
                            if let Some(found) = self.accept(&path) {
                                return Some(found);
                            }
                        }
                        _ => log::warn!("Error walking entry: {}", err),
                    }
                }
            }
        }
    }
}
