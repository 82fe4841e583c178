//! Core domain types shared by the exporter and the formatter.

use serde::{Deserialize, Serialize};

/// Title used when a page record carries no usable title.
pub const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A top-level page found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque page identifier.
    pub id: String,
    /// Display title, or [`UNTITLED`].
    pub title: String,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TextFragment
// ---------------------------------------------------------------------------

/// Kind of the block a fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletItem,
    Unknown,
}

impl BlockKind {
    /// Heading depth (1..=3), or `None` for non-heading kinds.
    pub fn heading_level(self) -> Option<usize> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            _ => None,
        }
    }
}

/// Inline emphasis flags of one rich-text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub monospace: bool,
}

/// One inline text run, tagged with the kind of its parent block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFragment {
    pub block_kind: BlockKind,
    pub text: String,
    #[serde(default)]
    pub emphasis: Emphasis,
}

impl TextFragment {
    /// A fragment with no emphasis.
    pub fn plain(block_kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            block_kind,
            text: text.into(),
            emphasis: Emphasis::default(),
        }
    }

    /// A fragment rendered as inline code.
    pub fn monospace(block_kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            block_kind,
            text: text.into(),
            emphasis: Emphasis {
                monospace: true,
                ..Emphasis::default()
            },
        }
    }
}
