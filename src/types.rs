/*!
 * Core types and data structures for codemapper
 */

use chrono::{DateTime, Local};

/// Outcome of classifying one accepted file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Content is embedded in the map
    Text,
    /// Registered by name only
    Binary,
    /// Larger than the configured maximum
    SkippedTooLarge,
    /// Could not be inspected or read
    SkippedUnreadable,
}

impl Classification {
    /// Whether this outcome is tallied under "Skipped"
    pub fn is_skipped(self) -> bool {
        matches!(
            self,
            Classification::SkippedTooLarge | Classification::SkippedUnreadable
        )
    }
}

/// One classified file, produced transiently for the serializer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Root-relative, forward-slash path
    pub relative_path: String,
    /// Classification outcome
    pub classification: Classification,
    /// Decoded content, present only for `Text`
    pub content: Option<String>,
    /// Size in bytes as reported by metadata (0 when unreadable)
    pub size: u64,
}

impl FileRecord {
    /// A text file with its decoded content
    pub fn text(relative_path: impl Into<String>, content: String, size: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            classification: Classification::Text,
            content: Some(content),
            size,
        }
    }

    /// A file registered by name only
    pub fn binary(relative_path: impl Into<String>, size: u64) -> Self {
        Self {
            relative_path: relative_path.into(),
            classification: Classification::Binary,
            content: None,
            size,
        }
    }

    /// A file that is counted but not emitted
    pub fn skipped(
        relative_path: impl Into<String>,
        classification: Classification,
        size: u64,
    ) -> Self {
        debug_assert!(classification.is_skipped());
        Self {
            relative_path: relative_path.into(),
            classification,
            content: None,
            size,
        }
    }
}

/// Counters accumulated over one scan run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// Number of files embedded with content
    pub text: usize,
    /// Number of files registered by name only
    pub binary: usize,
    /// Aggregate of every skip reason
    pub skipped: usize,
    /// Skipped because of the size limit
    pub too_large: usize,
    /// Skipped because the file could not be read
    pub unreadable: usize,
    /// Skipped by the exclude/include lists
    pub excluded: usize,
    /// Bytes of all text and binary files
    pub total_bytes: u64,
    /// Time the map generation started
    pub generated_at: DateTime<Local>,
}

impl ScanSummary {
    /// Create an empty summary stamped with the generation time
    pub fn new(generated_at: DateTime<Local>) -> Self {
        Self {
            text: 0,
            binary: 0,
            skipped: 0,
            too_large: 0,
            unreadable: 0,
            excluded: 0,
            total_bytes: 0,
            generated_at,
        }
    }

    /// Tally one classified record
    pub fn record(&mut self, record: &FileRecord) {
        match record.classification {
            Classification::Text => {
                self.text += 1;
                self.total_bytes += record.size;
            }
            Classification::Binary => {
                self.binary += 1;
                self.total_bytes += record.size;
            }
            Classification::SkippedTooLarge => {
                self.skipped += 1;
                self.too_large += 1;
            }
            Classification::SkippedUnreadable => {
                self.skipped += 1;
                self.unreadable += 1;
            }
        }
    }

    /// Tally one file rejected by the path rules
    pub fn record_excluded(&mut self) {
        self.skipped += 1;
        self.excluded += 1;
    }

    /// Number of files the walk visited
    pub fn total(&self) -> usize {
        self.text + self.binary + self.skipped
    }
}

/// The composed map together with its summary
#[derive(Debug, Clone)]
pub struct ScanOutput {
    /// Full map text, ready to be written as one unit
    pub text: String,
    /// Final counters
    pub summary: ScanSummary,
}
