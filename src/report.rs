use std::fmt;
use std::path::Path;

use crate::stats::{FrequencyTable, Statistics};

/// Rendering settings for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// how many rows the ranked tables show
    pub top: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions { top: 10 }
    }
}

fn escape_pipes(label: &str) -> String {
    label.replace('|', "\\|")
}

/// A Markdown rendering of `Statistics`, built lazily by its `Display` impl.
struct MarkdownReport<'r> {
    stats: &'r Statistics,
    files: &'r [&'r str],
    top: usize,
}

impl<'r> MarkdownReport<'r> {
    fn ranked_table(
        &self,
        f: &mut fmt::Formatter<'_>,
        heading: &str,
        column: &str,
        table: &FrequencyTable,
    ) -> fmt::Result {
        if table.is_empty() {
            return Ok(());
        }
        writeln!(f, "### {}", heading)?;
        writeln!(f, "| Rank | {} | Count |", column)?;
        writeln!(f, "|------|{}|-------|", "-".repeat(column.len() + 2))?;
        for (rank, (label, count)) in table.top(self.top).into_iter().enumerate() {
            writeln!(f, "| {} | {} | {} |", rank + 1, escape_pipes(label), count)?;
        }
        writeln!(f)
    }
}

impl<'r> fmt::Display for MarkdownReport<'r> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        let top = self.top;

        writeln!(f, "# BibTeX Statistics Report")?;
        writeln!(f)?;

        writeln!(f, "## Files Analyzed")?;
        for &file in self.files {
            let name = Path::new(file)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(file);
            writeln!(f, "- `{}`", name)?;
        }
        writeln!(f)?;

        writeln!(f, "## Summary Statistics")?;
        writeln!(f, "- **Total publications:** {}", stats.total_entries)?;
        writeln!(f)?;

        if !stats.entry_types.is_empty() {
            writeln!(f, "### Publication Types")?;
            for (kind, count) in stats.entry_types.ranked() {
                writeln!(f, "- `{}`: {}", kind, count)?;
            }
            writeln!(f)?;
        }

        self.ranked_table(f, &format!("Top {} Authors", top), "Author", &stats.authors)?;
        self.ranked_table(f, &format!("Top {} Journals", top), "Journal", &stats.journals)?;
        self.ranked_table(
            f,
            &format!("Top {} Conferences", top),
            "Conference",
            &stats.conferences,
        )?;
        self.ranked_table(
            f,
            &format!("Publication Years (Top {})", top),
            "Year",
            &stats.years,
        )
    }
}

/// Render `stats` as a Markdown report. `files` are the names of the analyzed
/// documents; only their last path component is shown.
pub fn render_markdown(stats: &Statistics, files: &[&str], options: &ReportOptions) -> String {
    let report = MarkdownReport {
        stats,
        files,
        top: options.top,
    };
    // no trailing newline after the last section
    report.to_string().trim_end_matches('\n').to_string()
}

/// Render `stats` and the analyzed file names as pretty-printed JSON.
#[cfg(feature = "serde_json")]
pub fn render_json(stats: &Statistics, files: &[&str]) -> crate::errors::Result<String> {
    #[derive(serde::Serialize)]
    struct Report<'r> {
        files: &'r [&'r str],
        #[serde(flatten)]
        stats: &'r Statistics,
    }

    Ok(serde_json::to_string_pretty(&Report { files, stats })?)
}
