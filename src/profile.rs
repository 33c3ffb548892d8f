/*!
 * Named profiles
 *
 * A profile is a JSON file holding a saved set of scan flags. Profiles live
 * in one directory, by default `<config dir>/codemapper/profiles`.
 */

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Args;
use crate::error::Result;
use crate::utils::TOOL_DIR;
use crate::{bail, ensure};

/// Profile used when no flags are given
pub const DEFAULT_PROFILE: &str = "default";

/// Saved scan flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub src: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except_folders: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub except_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_size_mb: Option<u64>,
}

impl Profile {
    /// Capture the scan flags of a command line
    pub fn from_args(args: &Args) -> Self {
        Self::default().overlay(args)
    }

    /// Replace every field the command line sets explicitly
    pub fn overlay(mut self, args: &Args) -> Self {
        fn replace(target: &mut Vec<String>, given: &[String]) {
            if !given.is_empty() {
                *target = given.to_vec();
            }
        }

        replace(&mut self.src, &args.src);
        replace(&mut self.folders, &args.folders);
        replace(&mut self.files, &args.files);
        replace(&mut self.except_folders, &args.except_folders);
        replace(&mut self.except_files, &args.except_files);

        if let Some(output) = &args.output {
            self.output = Some(output.clone());
        }
        if !args.extensions.is_empty() {
            self.text_extensions = Some(args.extensions.clone());
        }
        if let Some(mb) = args.max_file_size_mb {
            self.max_file_size_mb = Some(mb);
        }

        self
    }
}

/// Directory of named profiles
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Use an explicit profile directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Use the platform configuration directory
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        Self::new(base.join(TOOL_DIR).join("profiles"))
    }

    /// File backing a profile name; a trailing `.json` is accepted
    pub fn path_for(&self, name: &str) -> PathBuf {
        let stem = name.strip_suffix(".json").unwrap_or(name);
        self.dir.join(format!("{}.json", stem))
    }

    /// Load a profile, `None` when it does not exist
    pub fn load(&self, name: &str) -> Result<Option<Profile>> {
        check_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let profile = serde_json::from_str(&content).map_err(|e| {
            crate::error!(Profile, "Failed to parse {}: {}", path.display(), e)
        })?;
        Ok(Some(profile))
    }

    /// Store a profile, returning the file it was written to
    pub fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf> {
        check_name(name)?;
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(name);
        let json = serde_json::to_string_pretty(profile)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Names of all stored profiles, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

fn check_name(name: &str) -> Result<()> {
    ensure!(!name.trim().is_empty(), Profile, "Profile name is empty");
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        bail!(Profile, "Invalid profile name: {}", name);
    }
    Ok(())
}
