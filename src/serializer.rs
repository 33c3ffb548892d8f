/*!
 * Map text format
 *
 * ```text
 * MAP: Generated 2024-05-01 12:00:00
 * --src/main.rs
 *
 * fn main() {}
 * ----
 * --assets/logo.png
 * --SUMMARY
 * Text:1 Binary:1 Skipped:0
 * ```
 */

use chrono::{DateTime, Local};

use crate::types::{Classification, FileRecord, ScanOutput, ScanSummary};

/// Prefix of the generation line
pub const PREAMBLE_PREFIX: &str = "MAP: Generated ";
/// Prefix of every file header line
pub const HEADER_MARKER: &str = "--";
/// Line closing a text file body
pub const SEPARATOR: &str = "----";
/// Header of the trailing summary block
pub const SUMMARY_HEADER: &str = "--SUMMARY";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accumulates the map text and its counters
#[derive(Debug)]
pub struct MapSerializer {
    out: String,
    summary: ScanSummary,
}

impl MapSerializer {
    /// Start a map stamped with `generated_at`
    pub fn new(generated_at: DateTime<Local>) -> Self {
        let mut out = String::with_capacity(64 * 1024);
        out.push_str(PREAMBLE_PREFIX);
        out.push_str(&generated_at.format(TIMESTAMP_FORMAT).to_string());
        out.push('\n');

        Self {
            out,
            summary: ScanSummary::new(generated_at),
        }
    }

    /// Append one classified file
    pub fn push(&mut self, record: &FileRecord) {
        self.summary.record(record);

        match record.classification {
            Classification::Text => {
                self.push_header(&record.relative_path);
                self.out.push('\n');
                let content = record.content.as_deref().unwrap_or_default();
                self.out.push_str(content);
                if !content.is_empty() && !content.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str(SEPARATOR);
                self.out.push('\n');
            }
            Classification::Binary => self.push_header(&record.relative_path),
            // counted only
            Classification::SkippedTooLarge | Classification::SkippedUnreadable => {}
        }
    }

    /// Count a file rejected by the path rules
    pub fn push_excluded(&mut self) {
        self.summary.record_excluded();
    }

    /// Counters so far
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Append the summary block and hand back the complete map
    pub fn finish(mut self) -> ScanOutput {
        self.out.push_str(SUMMARY_HEADER);
        self.out.push('\n');
        self.out.push_str(&format!(
            "Text:{} Binary:{} Skipped:{}\n",
            self.summary.text, self.summary.binary, self.summary.skipped
        ));

        ScanOutput {
            text: self.out,
            summary: self.summary,
        }
    }

    fn push_header(&mut self, relative_path: &str) {
        self.out.push_str(HEADER_MARKER);
        self.out.push_str(relative_path);
        self.out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_empty_map() {
        let output = MapSerializer::new(fixed_time()).finish();
        assert_eq!(
            output.text,
            "MAP: Generated 2024-05-01 12:30:00\n--SUMMARY\nText:0 Binary:0 Skipped:0\n"
        );
        assert_eq!(output.summary.total(), 0);
    }

    #[test]
    fn test_text_binary_and_skipped() {
        let mut serializer = MapSerializer::new(fixed_time());
        serializer.push(&FileRecord::text("src/a.php", "<?php\necho 1;".to_string(), 13));
        serializer.push(&FileRecord::binary("img/logo.png", 400));
        serializer.push(&FileRecord::skipped(
            "dump.sql",
            Classification::SkippedTooLarge,
            1 << 30,
        ));
        serializer.push_excluded();

        let output = serializer.finish();
        assert_eq!(
            output.text,
            "MAP: Generated 2024-05-01 12:30:00\n\
             --src/a.php\n\
             \n\
             <?php\necho 1;\n\
             ----\n\
             --img/logo.png\n\
             --SUMMARY\n\
             Text:1 Binary:1 Skipped:2\n"
        );
        assert!(!output.text.contains("dump.sql"));
        assert_eq!(output.summary.too_large, 1);
        assert_eq!(output.summary.excluded, 1);
        assert_eq!(output.summary.total_bytes, 413);
        assert_eq!(output.summary.generated_at, fixed_time());
    }

    #[test]
    fn test_content_kept_verbatim() {
        let mut serializer = MapSerializer::new(fixed_time());
        serializer.push(&FileRecord::text("a.md", "line\n\n".to_string(), 6));
        serializer.push(&FileRecord::text("empty.txt", String::new(), 0));

        let text = serializer.finish().text;
        assert!(text.contains("--a.md\n\nline\n\n----\n"));
        assert!(text.contains("--empty.txt\n\n----\n"));
    }
}
