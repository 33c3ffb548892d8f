/*!
 * codemapper - Generate a single text map of a codebase for LLM context
 *
 * Walks one or more source folders, embeds the content of text files and
 * registers binary files by name, and returns the map together with a
 * summary of what was included and skipped.
 */

pub mod classifier;
pub mod config;
pub mod error;
pub mod matcher;
pub mod profile;
pub mod report;
pub mod scanner;
pub mod serializer;
pub mod types;
pub mod utils;
pub mod walker;
pub mod writer;

#[cfg(test)]
mod tests;

// Re-export main components for easier access
pub use classifier::classify;
pub use config::{Args, Config, ScanConfig, ScanConfigBuilder};
pub use error::{CodeMapError, Result};
pub use matcher::{DirDecision, FileDecision, PathMatcher};
pub use profile::{Profile, ProfileStore};
pub use report::{ReportFormat, Reporter, ScanReport};
pub use scanner::{generate_map, Scanner};
pub use serializer::MapSerializer;
pub use types::{Classification, FileRecord, ScanOutput, ScanSummary};
pub use walker::{TreeWalker, WalkEntry};
pub use writer::MapWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
