/*!
 * Scan orchestration: walk, classify, serialize
 */

use std::sync::Arc;

use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::classifier::classify;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::matcher::FileDecision;
use crate::serializer::MapSerializer;
use crate::types::{Classification, FileRecord, ScanOutput};
use crate::walker::{TreeWalker, WalkEntry};

/// Files classified together when running on several threads
const BATCH_SIZE: usize = 256;

/// Scanner producing one map per run
pub struct Scanner {
    /// Scanner configuration
    config: ScanConfig,
    /// Progress bar
    pub progress: Arc<ProgressBar>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: ScanConfig, progress: Arc<ProgressBar>) -> Self {
        Self { config, progress }
    }

    /// Scan the source roots and compose the map
    pub fn scan(&self) -> Result<ScanOutput> {
        self.scan_at(Local::now())
    }

    /// Scan with an explicit generation time
    pub fn scan_at(&self, generated_at: DateTime<Local>) -> Result<ScanOutput> {
        self.config.validate()?;

        let mut walker = TreeWalker::new(&self.config)?;
        let mut serializer = MapSerializer::new(generated_at);

        if self.config.num_threads <= 1 {
            for entry in walker {
                let record = self.record_for(&entry);
                self.emit(&entry, record, &mut serializer);
            }
        } else {
            // bounded batches keep memory flat; collect() keeps walk order
            loop {
                let batch: Vec<WalkEntry> = walker.by_ref().take(BATCH_SIZE).collect();
                if batch.is_empty() {
                    break;
                }

                let records: Vec<Option<FileRecord>> =
                    batch.par_iter().map(|entry| self.record_for(entry)).collect();

                for (entry, record) in batch.iter().zip(records) {
                    self.emit(entry, record, &mut serializer);
                }
            }
        }

        let output = serializer.finish();
        log::info!(
            "Text: {} Binary: {} Skipped: {}",
            output.summary.text,
            output.summary.binary,
            output.summary.skipped
        );
        Ok(output)
    }

    /// Classify an accepted entry; `None` for excluded ones
    fn record_for(&self, entry: &WalkEntry) -> Option<FileRecord> {
        if entry.decision == FileDecision::Exclude {
            log::debug!("Excluded: {}", entry.relative);
            return None;
        }

        let classified = classify(&entry.absolute, &self.config);
        log::debug!("{:?}: {}", classified.classification, entry.relative);

        let relative = entry.relative.clone();
        Some(match classified.classification {
            Classification::Text => {
                FileRecord::text(relative, classified.content.unwrap_or_default(), classified.size)
            }
            Classification::Binary => FileRecord::binary(relative, classified.size),
            skipped => FileRecord::skipped(relative, skipped, classified.size),
        })
    }

    fn emit(&self, entry: &WalkEntry, record: Option<FileRecord>, serializer: &mut MapSerializer) {
        self.progress.inc(1);

        // Truncate if too long to avoid display issues
        let chars: Vec<char> = entry.relative.chars().collect();
        let display_name = if chars.len() > 40 {
            format!("...{}", chars[chars.len() - 37..].iter().collect::<String>())
        } else {
            entry.relative.clone()
        };
        self.progress.set_message(format!("Current file: {}", display_name));

        match record {
            Some(record) => serializer.push(&record),
            None => serializer.push_excluded(),
        }
    }
}

/// Scan without progress reporting
pub fn generate_map(config: ScanConfig) -> Result<ScanOutput> {
    Scanner::new(config, Arc::new(ProgressBar::hidden())).scan()
}
