//! Fragment-to-Markdown formatting and the per-document file writer.
//!
//! Each fragment becomes its own line, prefixed according to its block kind.
//! Only the monospace flag is rendered; bold, italic, strikethrough and
//! underline are carried in the fragments but not emitted.

use std::path::{Component, Path, PathBuf};

use tracing::{error, info, instrument};

use pagesync_shared::{BlockKind, TextFragment};

/// Extension of every exported file.
const MARKDOWN_EXT: &str = ".md";

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format fragments as a Markdown document headed by `# {title}`.
///
/// The heading line is always followed by a newline, even with no fragments.
pub fn format_markdown(fragments: &[TextFragment], title: &str) -> String {
    let body = fragments
        .iter()
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!("# {title}\n{body}")
}

/// Format a single fragment as one Markdown line.
fn format_line(fragment: &TextFragment) -> String {
    let prefix = line_prefix(fragment.block_kind);

    if fragment.emphasis.monospace {
        format!("{prefix}`{}`", fragment.text)
    } else {
        format!("{prefix}{}", fragment.text)
    }
}

fn line_prefix(kind: BlockKind) -> String {
    match kind {
        BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3 => {
            let level = kind.heading_level().unwrap_or(1);
            format!("{} ", "#".repeat(level))
        }
        BlockKind::BulletItem => "- ".to_string(),
        BlockKind::Paragraph | BlockKind::Unknown => String::new(),
    }
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

/// File name for a document: spaces become hyphens, `.md` is appended.
///
/// No other sanitizing happens, so equal titles map to the same file.
pub fn file_name_for(title: &str) -> String {
    format!("{}{MARKDOWN_EXT}", title.replace(' ', "-"))
}

/// Format and write one document into `dir`.
///
/// Returns the written path, or `None` if the write failed (logged, not raised).
/// An existing file with the same name is overwritten.
#[instrument(skip(fragments), fields(fragments = fragments.len()))]
pub fn write_markdown_file(dir: &Path, title: &str, fragments: &[TextFragment]) -> Option<PathBuf> {
    let file_name = file_name_for(title);
    let path = output_path(dir, &file_name);
    let markdown = format_markdown(fragments, title);

    match std::fs::write(&path, markdown) {
        Ok(()) => {
            info!(path = %path.display(), "markdown file saved");
            Some(path)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to write markdown file");
            None
        }
    }
}

/// Join `file_name` under `dir`, keeping only its normal components.
///
/// Root, prefix and `..` components are dropped, so the result never leaves `dir`.
fn output_path(dir: &Path, file_name: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    path.extend(Path::new(file_name).components().filter_map(|c| match c {
        Component::Normal(part) => Some(part),
        _ => None,
    }));
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
