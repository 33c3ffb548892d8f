/*!
 * Utility functions and default tables for codemapper
 */

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use once_cell::sync::Lazy;

/// Name of the tool's own working directory (profiles, output maps).
/// Never scanned, whatever the include lists say.
pub const TOOL_DIR: &str = "codemapper";

/// Directory names skipped during traversal unless explicitly included
pub static DEFAULT_SKIP_DIRS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        // Version Control
        ".git",
        ".svn",
        ".hg",
        // Dependencies
        "node_modules",
        "vendor",
        "venv",
        "env",
        // IDEs & Editors
        ".idea",
        ".vscode",
        // Build & Dist
        "dist",
        "build",
        ".next",
        // Caches
        "__pycache__",
        ".cache",
        "coverage",
        ".pytest_cache",
        ".mypy_cache",
        // Own output
        TOOL_DIR,
    ]
});

/// File extensions whose content is embedded in the map
pub static DEFAULT_TEXT_EXTENSIONS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        ".php", ".py", ".js", ".jsx", ".ts", ".tsx", ".html", ".css", ".scss", ".json", ".xml",
        ".yml", ".yaml", ".md", ".txt", ".sql", ".sh", ".bash", ".java", ".c", ".cpp", ".h",
        ".hpp", ".cs", ".go", ".rs", ".rb", ".vue", ".svelte", ".astro", ".env", ".gitignore",
        ".htaccess", ".conf", ".ini", ".sass", ".less", ".lock", ".toml", ".dockerfile",
        ".editorconfig",
    ]
});

/// Default maximum size of a file whose content is embedded, in megabytes
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Normalise an extension entry to the `.ext` lower-case form used for lookups
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Convert a path to a forward-slash string
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Open a file or folder with the platform's default handler
pub fn open_in_file_browser(path: &Path) -> io::Result<()> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    let status = Command::new(opener)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| io::Error::new(e.kind(), format!("Command not found: {}", opener)))?;

    // explorer.exe reports failure even when the window opens
    if !status.success() && !cfg!(target_os = "windows") {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("Command failed: {} exited with {}", opener, status),
        ));
    }

    Ok(())
}
