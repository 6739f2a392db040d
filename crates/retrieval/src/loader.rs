//! Corpus discovery and document normalization.
//!
//! The corpus root holds one directory per partition (department); files
//! inside a partition directory are the sources. Free-text files are read
//! verbatim; tabular files are flattened to one `header: value` line per
//! row so they chunk like prose.

use crate::types::RawDocument;
use scoperag_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions read verbatim as free text.
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Row cap for tabular sources; bounds memory and chunk count when a table
/// is accidentally huge.
pub const CSV_ROW_CAP: usize = 1000;

/// Discover all supported documents under the corpus root.
///
/// Walks exactly two levels: the first-level directory name is the
/// partition, files below it are sources. Unsupported extensions are
/// skipped, not errored. A missing root is fatal for ingestion.
pub fn discover(root: &Path) -> AppResult<Vec<RawDocument>> {
    if !root.is_dir() {
        return Err(AppError::NotFound(format!(
            "corpus root {:?} does not exist",
            root
        )));
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let partition = match path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
        {
            Some(name) => name.to_string(),
            None => continue,
        };
        let source_id = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let (text, truncated) = match extension.as_deref() {
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => (fs::read_to_string(path)?, false),
            Some("csv") => {
                let raw = fs::read_to_string(path)?;
                let (text, truncated) = render_table(&raw);
                if truncated {
                    tracing::warn!(
                        "Tabular source {}/{} cut at {} rows",
                        partition,
                        source_id,
                        CSV_ROW_CAP
                    );
                }
                (text, truncated)
            }
            _ => {
                tracing::debug!("Skipping unsupported file {:?}", path);
                continue;
            }
        };

        documents.push(RawDocument {
            partition,
            source_id,
            text,
            truncated,
        });
    }

    tracing::info!("Discovered {} documents under {:?}", documents.len(), root);
    Ok(documents)
}

/// Render CSV content as `header: value` lines, one row per line.
///
/// Returns the rendered text and whether the row cap cut the table.
fn render_table(raw: &str) -> (String, bool) {
    let mut lines = raw.lines();
    let headers = match lines.next() {
        Some(header_line) => split_row(header_line),
        None => return (String::new(), false),
    };

    let mut rows = Vec::new();
    let mut truncated = false;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if rows.len() == CSV_ROW_CAP {
            truncated = true;
            break;
        }

        let fields = split_row(line);
        let rendered: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = fields.get(i).map(String::as_str).unwrap_or("");
                format!("{}: {}", header, value)
            })
            .collect();
        rows.push(rendered.join(", "));
    }

    (rows.join("\n"), truncated)
}

/// Split a CSV line on commas, honoring double-quoted fields.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
