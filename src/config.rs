/*!
 * Configuration handling for codemapper
 *
 * `ScanConfig` is the immutable input of the scanning core. `Args` and
 * `Config` are the command-line layer that resolves defaults, an optional
 * named profile and explicit flags into one `ScanConfig`.
 */

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use clap_complete::Shell;

use crate::error::Result;
use crate::profile::{Profile, ProfileStore, DEFAULT_PROFILE};
use crate::utils::{
    normalize_extension, DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_SKIP_DIRS,
    DEFAULT_TEXT_EXTENSIONS, TOOL_DIR,
};
use crate::writer::MapWriter;
use crate::{bail, ensure};

/// What to open once the map has been written
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpenTarget {
    /// Open the map file itself
    File,
    /// Open the folder containing the map
    Folder,
}

/// Command-line arguments for codemapper
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "codemapper",
    version = env!("CARGO_PKG_VERSION"),
    about = "Generate a text map of your codebase for AI context",
    long_about = "Walks one or more source folders and writes a single text file holding the content of every text file and the name of every binary file, ready to paste into an LLM context window."
)]
pub struct Args {
    /// Source folder to scan (repeatable, default: .)
    #[clap(long = "src", value_name = "DIR")]
    pub src: Vec<String>,

    /// Comma-separated list of folders to include
    #[clap(long, value_delimiter = ',')]
    pub folders: Vec<String>,

    /// Comma-separated list of specific files to include
    #[clap(long, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Comma-separated list of folders to exclude
    #[clap(long, value_delimiter = ',')]
    pub except_folders: Vec<String>,

    /// Comma-separated list of files to exclude
    #[clap(long, value_delimiter = ',')]
    pub except_files: Vec<String>,

    /// Comma-separated list of text file extensions
    #[clap(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Output file path (default: codemapper/output/code_map.txt)
    #[clap(short, long)]
    pub output: Option<String>,

    /// Files larger than this are skipped
    #[clap(long, value_name = "MB")]
    pub max_file_size_mb: Option<u64>,

    /// Load a named profile
    #[clap(long)]
    pub profile: Option<String>,

    /// Save the given flags as a named profile and exit
    #[clap(long, value_name = "NAME", num_args = 0..=1, default_missing_value = DEFAULT_PROFILE)]
    pub save_profile: Option<String>,

    /// Directory holding the profiles
    #[clap(long, value_name = "DIR")]
    pub profile_dir: Option<String>,

    /// Add a timestamp to the default output file name
    #[clap(long)]
    pub timestamp: bool,

    /// Open the written map or its folder
    #[clap(long, value_enum)]
    pub open: Option<OpenTarget>,

    /// Sniff the content of files without an extension
    #[clap(long)]
    pub sniff: bool,

    /// Number of threads used to classify files
    #[clap(long, default_value = "1")]
    pub threads: usize,

    /// Print only the one-line summary instead of the table
    #[clap(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            src: Vec::new(),
            folders: Vec::new(),
            files: Vec::new(),
            except_folders: Vec::new(),
            except_files: Vec::new(),
            extensions: Vec::new(),
            output: None,
            max_file_size_mb: None,
            profile: None,
            save_profile: None,
            profile_dir: None,
            timestamp: false,
            open: None,
            sniff: false,
            threads: 1,
            quiet: false,
            verbose: 0,
            generate: None,
        }
    }
}

impl Args {
    /// Whether any flag that shapes the scan was given
    pub fn has_scan_flags(&self) -> bool {
        !self.src.is_empty()
            || !self.folders.is_empty()
            || !self.files.is_empty()
            || !self.except_folders.is_empty()
            || !self.except_files.is_empty()
            || !self.extensions.is_empty()
            || self.output.is_some()
            || self.max_file_size_mb.is_some()
    }
}

/// Immutable configuration of one scan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Directories to scan, in order
    pub source_roots: Vec<PathBuf>,
    /// If non-empty, only these subtrees are scanned
    pub included_folders: Vec<String>,
    /// If non-empty, only these files are accepted
    pub included_files: Vec<String>,
    /// Folders pruned anywhere in the tree
    pub excluded_folders: Vec<String>,
    /// Files rejected anywhere in the tree
    pub excluded_files: Vec<String>,
    /// Lower-case extensions including the dot
    pub text_extensions: BTreeSet<String>,
    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,
    /// Directory base names skipped unless explicitly included
    pub skip_dirs: Vec<String>,
    /// Sniff content of files without an extension
    pub sniff_extensionless: bool,
    /// Worker threads for classification (1 means sequential)
    pub num_threads: usize,
    /// Files never mapped, compared by canonical path
    pub ignored_files: Vec<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfigBuilder::new(".").build()
    }
}

impl ScanConfig {
    /// Check the configuration before any traversal happens
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.source_roots.is_empty(),
            Config,
            "No source folder configured"
        );

        for root in &self.source_roots {
            ensure!(
                root.exists(),
                Config,
                "Source folder not found: {}",
                root.display()
            );
            ensure!(
                root.is_dir(),
                Config,
                "Not a directory: {}",
                root.display()
            );
        }

        ensure!(
            self.max_file_size > 0,
            Config,
            "Maximum file size must be greater than zero"
        );
        ensure!(
            self.num_threads > 0,
            Config,
            "Thread count must be greater than zero"
        );

        Ok(())
    }

    /// Whether a lower-case extension key is configured as text
    pub fn is_text_extension(&self, key: &str) -> bool {
        self.text_extensions.contains(key)
    }
}

/// Builder for [`ScanConfig`]
#[derive(Debug, Clone)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    /// Start from the defaults with a single source root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: ScanConfig {
                source_roots: vec![root.into()],
                included_folders: Vec::new(),
                included_files: Vec::new(),
                excluded_folders: Vec::new(),
                excluded_files: Vec::new(),
                text_extensions: DEFAULT_TEXT_EXTENSIONS
                    .iter()
                    .map(|e| e.to_string())
                    .collect(),
                max_file_size: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
                skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
                sniff_extensionless: false,
                num_threads: 1,
                ignored_files: Vec::new(),
            },
        }
    }

    pub fn source_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.source_roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.source_roots.push(root.into());
        self
    }

    pub fn included_folders<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.included_folders = normalize_entries(v);
        self
    }

    pub fn included_files<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.included_files = normalize_entries(v);
        self
    }

    pub fn excluded_folders<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.excluded_folders = normalize_entries(v);
        self
    }

    pub fn excluded_files<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.excluded_files = normalize_entries(v);
        self
    }

    /// Never map this exact file, wherever the roots reach it from
    pub fn ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ignored_files.push(path.into());
        self
    }

    /// Replace the text extension set; entries are normalised to `.ext`
    pub fn text_extensions<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.text_extensions = v
            .into_iter()
            .filter(|e| !e.as_ref().trim().is_empty())
            .map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn max_file_size_mb(self, mb: u64) -> Self {
        self.max_file_size(mb.saturating_mul(1024 * 1024))
    }

    pub fn skip_dirs<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.config.skip_dirs = v.into_iter().map(|s| s.as_ref().to_string()).collect();
        // the tool's own directory stays skipped
        if !self.config.skip_dirs.iter().any(|d| d == TOOL_DIR) {
            self.config.skip_dirs.push(TOOL_DIR.to_string());
        }
        self
    }

    pub fn sniff_extensionless(mut self, yes: bool) -> Self {
        self.config.sniff_extensionless = yes;
        self
    }

    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    pub fn build(self) -> ScanConfig {
        self.config
    }
}

/// Normalise list entries to trimmed, forward-slash, root-relative strings
fn normalize_entries<I: IntoIterator<Item = S>, S: AsRef<str>>(entries: I) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| {
            let e = e.as_ref().trim().replace('\\', "/");
            let e = e.strip_prefix("./").unwrap_or(&e);
            e.trim_end_matches('/').to_string()
        })
        .filter(|e| !e.is_empty() && e != ".")
        .collect()
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Resolved scan configuration
    pub scan: ScanConfig,
    /// Output map path
    pub output_file: PathBuf,
    /// What to open after writing
    pub open: Option<OpenTarget>,
}

impl Config {
    /// Resolve defaults, an optional profile and explicit flags
    pub fn resolve(args: &Args, store: &ProfileStore) -> Result<Self> {
        let profile = match &args.profile {
            Some(name) => match store.load(name)? {
                Some(profile) => {
                    log::info!("Loading profile: {}", store.path_for(name).display());
                    profile
                }
                None => {
                    let available = store.list()?;
                    if available.is_empty() {
                        bail!(Profile, "Profile not found: {}", name);
                    }
                    bail!(
                        Profile,
                        "Profile not found: {} (available: {})",
                        name,
                        available.join(", ")
                    );
                }
            },
            None if !args.has_scan_flags() => match store.load(DEFAULT_PROFILE)? {
                Some(profile) => {
                    log::info!(
                        "Using default profile ({}); pass any flag to ignore it",
                        store.path_for(DEFAULT_PROFILE).display()
                    );
                    profile
                }
                None => Profile::default(),
            },
            None => Profile::default(),
        };

        Self::from_profile(profile.overlay(args), args)
    }

    /// Build the configuration from a profile already merged with flags
    pub fn from_profile(profile: Profile, args: &Args) -> Result<Self> {
        let roots: Vec<PathBuf> = if profile.src.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            profile.src.iter().map(PathBuf::from).collect()
        };

        let output_file = match &profile.output {
            Some(output) => PathBuf::from(output),
            None => MapWriter::default_output_path(args.timestamp.then(chrono::Local::now)),
        };

        let mut builder = ScanConfigBuilder::new(".")
            .source_roots(roots.clone())
            .included_folders(&profile.folders)
            .included_files(&profile.files)
            .excluded_folders(&profile.except_folders)
            .excluded_files(&profile.except_files)
            .sniff_extensionless(args.sniff)
            .num_threads(args.threads);

        if let Some(extensions) = &profile.text_extensions {
            builder = builder.text_extensions(extensions);
        }
        if let Some(mb) = profile.max_file_size_mb {
            builder = builder.max_file_size_mb(mb);
        }

        // Don't map our own output or binary
        builder = builder.ignore_file(output_file.clone());
        if let Ok(exe) = env::current_exe() {
            builder = builder.ignore_file(exe);
        }

        Ok(Self {
            scan: builder.build(),
            output_file,
            open: args.open,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;

        ensure!(
            !self.output_file.as_os_str().is_empty(),
            InvalidArgument,
            "Output file path is empty"
        );
        if self.output_file.is_dir() {
            bail!(
                InvalidArgument,
                "Output path is a directory: {}",
                self.output_file.display()
            );
        }

        Ok(())
    }
}
