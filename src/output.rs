//! CLI output formatting for `build` and `check`.
//!
//! Output leads with the page's position and source file; generated paths
//! follow an arrow. Problems are listed after the pages, one per line, so a
//! run reads as an inventory of what was deployed.
//!
//! ## Build
//!
//! ```text
//! Pages
//! 001 1.intro.txt → 1.intro.html
//! 002 2.body.md → 2.body.html
//! 010 10.appendix.txt → 10.appendix.html
//!
//! Manifest → DeploymentFiles/manifest.txt
//!
//! Skipped (no order prefix)
//!     draft.txt
//!
//! Overwritten
//!     1.intro.html
//!
//! Deployed 3 pages
//! ```
//!
//! ## Check
//!
//! ```text
//! 001 1.intro.txt (text, 2 images)
//!     Header: Úvod
//! 002 2.body.md (markdown)
//!     Header: Tělo
//!
//! 2 files ready to deploy
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::deploy::{DeployReport, FileFailure, Prepared};
use crate::document::Locale;
use crate::parse::ContentFormat;
use crate::render::{unquote, unwrap_paragraph};
use std::path::{Path, PathBuf};

const HEADER_PREVIEW_CHARS: usize = 60;

fn format_index(pos: u32) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn named_list(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    lines.push(String::new());
    lines.push(title.to_string());
    for item in items {
        lines.push(format!("{}{}", indent(1), item));
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the result of a successful `build`.
pub fn format_build_output(report: &DeployReport, root: &Path) -> Vec<String> {
    let mut lines = vec!["Pages".to_string()];
    for page in &report.pages {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(page.order),
            page.source,
            page.output
        ));
    }

    let manifest = report
        .manifest_path
        .strip_prefix(root)
        .unwrap_or(&report.manifest_path);
    lines.push(String::new());
    lines.push(format!("Manifest \u{2192} {}", manifest.display()));

    named_list(&mut lines, "Skipped (no order prefix)", &report.skipped);
    named_list(&mut lines, "Overwritten", &report.overwritten);

    lines.push(String::new());
    lines.push(format!("Deployed {}", plural(report.pages.len(), "page")));
    lines
}

pub fn print_build_output(report: &DeployReport, root: &Path) {
    for line in format_build_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of a successful `check`: one entry per parsed file.
pub fn format_check_output(prepared: &Prepared) -> Vec<String> {
    let mut lines = Vec::new();
    for file in &prepared.files {
        let format = ContentFormat::from_path(Path::new(&file.file_name));
        let images = file.document.images.len();
        let detail = if images == 0 {
            format.to_string()
        } else {
            format!("{}, {}", format, plural(images, "image"))
        };
        lines.push(format!(
            "{} {} ({})",
            format_index(file.order),
            file.file_name,
            detail
        ));

        let header = strip_html_tags(unwrap_paragraph(unquote(
            file.document.header.get(Locale::Cs),
        )));
        let header = truncate(header.trim(), HEADER_PREVIEW_CHARS);
        if !header.is_empty() {
            lines.push(format!("{}Header: {}", indent(1), header));
        }
    }

    named_list(&mut lines, "Skipped (no order prefix)", &prepared.skipped);

    lines.push(String::new());
    lines.push(format!(
        "{} ready to deploy",
        plural(prepared.files.len(), "file")
    ));
    lines
}

pub fn print_check_output(prepared: &Prepared) {
    for line in format_check_output(prepared) {
        println!("{}", line);
    }
}

// ============================================================================
// Failures
// ============================================================================

/// One indented line per failing file.
pub fn format_failures(failures: &[FileFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|failure| format!("{}{}", indent(1), failure))
        .collect()
}

/// Pages left on disk by a run that stopped part way.
pub fn format_written_files(written: &[PathBuf]) -> Vec<String> {
    if written.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "{} already written:",
        plural(written.len(), "page")
    )];
    for path in written {
        lines.push(format!("{}{}", indent(1), path.display()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::deploy::{self, DeployedPage};
    use crate::manifest::Manifest;
    use crate::parse::ParseError;
    use crate::test_helpers::{full_markdown, full_text, setup_project, write_content};

    #[test]
    fn strip_html_tags_removes_tags() {
        assert_eq!(strip_html_tags("<p>Hello <em>world</em></p>"), "Hello world");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("Žluťoučký kůň", 4), "Žluť...");
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn index_is_zero_padded() {
        assert_eq!(format_index(7), "007");
        assert_eq!(format_index(1234), "1234");
    }

    fn report(root: &Path) -> DeployReport {
        DeployReport {
            pages: vec![
                DeployedPage {
                    order: 1,
                    source: "1.intro.txt".to_string(),
                    output: "1.intro.html".to_string(),
                },
                DeployedPage {
                    order: 10,
                    source: "10.appendix.md".to_string(),
                    output: "10.appendix.html".to_string(),
                },
            ],
            manifest: Manifest {
                header: "#Manifest".to_string(),
                entries: Vec::new(),
            },
            manifest_path: root.join("DeploymentFiles").join("manifest.txt"),
            overwritten: vec!["1.intro.html".to_string()],
            skipped: Vec::new(),
        }
    }

    #[test]
    fn build_output_lists_pages_and_manifest() {
        let root = Path::new("/site");
        let lines = format_build_output(&report(root), root);
        assert_eq!(lines[0], "Pages");
        assert_eq!(lines[1], "001 1.intro.txt \u{2192} 1.intro.html");
        assert_eq!(lines[2], "010 10.appendix.md \u{2192} 10.appendix.html");
        assert!(lines.contains(&"Manifest \u{2192} DeploymentFiles/manifest.txt".to_string()));
        assert_eq!(lines.last().unwrap(), "Deployed 2 pages");
    }

    #[test]
    fn build_output_lists_overwritten_but_not_empty_skipped() {
        let root = Path::new("/site");
        let lines = format_build_output(&report(root), root);
        let pos = lines.iter().position(|l| l == "Overwritten").unwrap();
        assert_eq!(lines[pos + 1], "    1.intro.html");
        assert!(!lines.iter().any(|l| l.starts_with("Skipped")));
    }

    #[test]
    fn check_output_shows_format_and_header() {
        let tmp = setup_project();
        write_content(tmp.path(), "1.intro.txt", &full_text());
        write_content(tmp.path(), "2.body.md", &full_markdown());
        write_content(tmp.path(), "notes.txt", "");
        let prepared = deploy::prepare(tmp.path(), &DeployConfig::default()).unwrap();

        let lines = format_check_output(&prepared);
        assert_eq!(lines[0], "001 1.intro.txt (text)");
        assert_eq!(lines[1], "    Header: Header cs");
        assert_eq!(lines[2], "002 2.body.md (markdown)");
        assert_eq!(lines[3], "    Header: Header cs");
        assert!(lines.contains(&"    notes.txt".to_string()));
        assert_eq!(lines.last().unwrap(), "2 files ready to deploy");
    }

    #[test]
    fn failures_one_per_line() {
        let failures = vec![FileFailure {
            file: "2.bad.txt".to_string(),
            error: ParseError::MissingFields(Vec::new()),
        }];
        let lines = format_failures(&failures);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("    2.bad.txt: missing fields"));
    }

    #[test]
    fn written_files_empty_is_silent() {
        assert!(format_written_files(&[]).is_empty());
        let lines = format_written_files(&[PathBuf::from("out/1.a.html")]);
        assert_eq!(lines, vec!["1 page already written:", "    out/1.a.html"]);
    }
}
