/*!
 * Reporting functionality for codemapper
 *
 * Renders the end-of-run console summary with the tabled library.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::ScanSummary;
use crate::utils::format_file_size;

/// Statistics for one finished run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to scan and write
    pub duration: Duration,
    /// Characters in the written map
    pub map_chars: usize,
    /// Final counters
    pub summary: ScanSummary,
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// The single `Text:n Binary:n Skipped:n` line of the map itself
    Plain,
}

/// Report generator for scan results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.create_summary_table(report),
            ReportFormat::Plain => format!(
                "Text:{} Binary:{} Skipped:{}",
                report.summary.text, report.summary.binary, report.summary.skipped
            ),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let summary = &report.summary;
        let mut rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📝 Text Files".to_string(),
                value: self.format_number(summary.text),
            },
            SummaryRow {
                key: "◆ Binary Files".to_string(),
                value: self.format_number(summary.binary),
            },
        ];

        let mut reasons = Vec::new();
        if summary.excluded > 0 {
            reasons.push(format!("{} excluded", summary.excluded));
        }
        if summary.too_large > 0 {
            reasons.push(format!("{} too large", summary.too_large));
        }
        if summary.unreadable > 0 {
            reasons.push(format!("{} unreadable", summary.unreadable));
        }
        let skipped = if reasons.is_empty() {
            self.format_number(summary.skipped)
        } else {
            format!("{} ({})", self.format_number(summary.skipped), reasons.join(", "))
        };
        rows.push(SummaryRow {
            key: "⏭️ Skipped".to_string(),
            value: skipped,
        });

        rows.push(SummaryRow {
            key: "💾 Size".to_string(),
            value: format_file_size(summary.total_bytes),
        });

        rows.push(SummaryRow {
            key: "📦 LLM Tokens".to_string(),
            value: format!(
                "{} tokens (estimated)",
                self.format_number(report.map_chars / 4)
            ),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        format!("✅  MAP GENERATED\n{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn report() -> ScanReport {
        let mut summary = ScanSummary::new(Local::now());
        summary.text = 12;
        summary.binary = 3;
        summary.skipped = 2;
        summary.excluded = 1;
        summary.too_large = 1;
        summary.total_bytes = 2048;

        ScanReport {
            output_file: "codemapper/output/code_map.txt".to_string(),
            duration: Duration::from_millis(42),
            map_chars: 4_000,
            summary,
        }
    }

    #[test]
    fn test_console_table() {
        let text = Reporter::new(ReportFormat::ConsoleTable).generate_report(&report());
        assert!(text.contains("codemapper/output/code_map.txt"));
        assert!(text.contains("2 (1 excluded, 1 too large)"));
        assert!(text.contains("2.00 KB"));
        assert!(text.contains("1.0K tokens (estimated)"));
    }

    #[test]
    fn test_plain() {
        let text = Reporter::new(ReportFormat::Plain).generate_report(&report());
        assert_eq!(text, "Text:12 Binary:3 Skipped:2");
    }
}
