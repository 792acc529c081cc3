//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use scanpack_core::BuildReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn write_skipped(&self, report: &BuildReport) {
        let reasons = [
            ("excluded", report.skipped_excluded),
            ("suffix not included", report.skipped_filtered),
            ("symlink", report.skipped_symlinks),
            ("duplicate name", report.skipped_duplicates),
        ];
        for (reason, count) in reasons.into_iter().filter(|(_, count)| *count > 0) {
            let _ = self
                .term
                .write_line(&format!("    {reason:<20} {}", Self::format_number(count)));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_pack_result(&self, report: &BuildReport, checksum: &str) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Archive created: {}",
                style("✓").green().bold(),
                report.target.display()
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("Archive created: {}", report.target.display()));
        }

        let _ = self.term.write_line("");
        let _ = self
            .term
            .write_line(&format!("  Format:           {}", report.format));
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added())
        ));
        if report.files_skipped() > 0 {
            let _ = self.term.write_line(&format!(
                "  Files skipped:    {}",
                Self::format_number(report.files_skipped())
            ));
            if self.verbose {
                self.write_skipped(report);
            }
        }
        let _ = self.term.write_line(&format!(
            "  Bytes read:       {}",
            Self::format_size(report.bytes_read)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_size)
        ));
        let _ = self.term.write_line(&format!("  SHA-256:          {checksum}"));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
            let _ = self.term.write_line("");
            let _ = self.term.write_line("Entries:");
            for entry in &report.entries {
                let _ = self.term.write_line(&format!("  {entry}"));
            }
        }

        if report.has_warnings() {
            let _ = self.term.write_line("");
            if self.use_colors {
                let _ = self
                    .term
                    .write_line(&format!("{}", style("Warnings:").yellow().bold()));
            } else {
                let _ = self.term.write_line("Warnings:");
            }
            for warning in &report.warnings {
                let _ = self.term.write_line(&format!("  - {warning}"));
            }
        }

        Ok(())
    }

    fn format_nothing_to_upload(&self) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let message = "Nothing to upload: no folders or files are configured";
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
        Ok(())
    }

    // Entry names and checksums are the command's payload, so they are
    // printed even in quiet mode.
    fn format_entries(&self, archive: &Path, entries: &[String]) -> Result<()> {
        for entry in entries {
            self.term.write_line(entry)?;
        }

        if self.verbose {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "Total: {} entries in {}",
                Self::format_number(entries.len()),
                archive.display()
            ));
        }

        Ok(())
    }

    fn format_checksum(&self, archive: &Path, checksum: &str) -> Result<()> {
        self.term
            .write_line(&format!("{checksum}  {}", archive.display()))?;
        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(
            HumanFormatter::format_size(2 * 1024 * 1024 * 1024),
            "2.0 GB"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(7), "7");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}
