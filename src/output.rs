//! CLI output formatting for the download and build stages.
//!
//! Each stage has a `format_*` function (pure, returns strings) and a
//! `print_*` wrapper that writes to stdout, so tests can assert on output
//! without capturing stdout.
//!
//! ## Download
//!
//! ```text
//! + chapters/en.json
//! = chapters/ha_gumi.json (cached)
//! + quran.json
//! 2 downloaded, 1 cached (3 total)
//! ```
//!
//! ## Build
//!
//! ```text
//! + quran_transliteration.json (114 chapters, 6236 verses)
//! + quran.json (114 chapters, 6236 verses)
//! + quran_en.json (114 chapters, 6236 verses)
//! + chapters/ (114 files + index)
//! + chapters/en/ (114 files + index)
//! + verses/ (6236 files in 63 batches)
//! Generated 3 documents, 2 chapter trees, 6236 verse files
//! ```

use crate::chapters::ChaptersReport;
use crate::download::DownloadReport;
use crate::pipeline::{BuildReport, DocumentReport};

/// One line per download target: fetched targets get a `+`, targets
/// already on disk a `=`.
pub fn format_download_line(report: &DownloadReport) -> String {
    if report.fetched {
        format!("+ {}", report.target)
    } else {
        format!("= {} (cached)", report.target)
    }
}

pub fn format_download_summary(reports: &[DownloadReport]) -> String {
    let fetched = reports.iter().filter(|r| r.fetched).count();
    format!(
        "{} downloaded, {} cached ({} total)",
        fetched,
        reports.len() - fetched,
        reports.len()
    )
}

fn format_document_line(report: &DocumentReport) -> String {
    format!(
        "+ {} ({} chapters, {} verses)",
        report.filename, report.chapters, report.verses
    )
}

fn format_chapters_line(report: &ChaptersReport) -> String {
    format!("+ {}/ ({} files + index)", report.scope, report.files)
}

/// All build output lines: one per artifact group, then a summary.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();
    for document in &report.documents {
        lines.push(format_document_line(document));
    }
    for tree in &report.chapter_trees {
        lines.push(format_chapters_line(tree));
    }
    lines.push(format!(
        "+ verses/ ({} files in {} batches)",
        report.verse_files, report.verse_batches
    ));
    lines.push(format!(
        "Generated {} documents, {} chapter trees, {} verse files",
        report.documents.len(),
        report.chapter_trees.len(),
        report.verse_files
    ));
    lines
}

pub fn print_download_output(reports: &[DownloadReport]) {
    for report in reports {
        println!("{}", format_download_line(report));
    }
    println!("{}", format_download_summary(reports));
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{line}");
    }
}
