//! Wire types for the workspace API, decoded once at the HTTP boundary.
//!
//! Only the fields the exporter reads are modelled; everything else in the
//! payloads is ignored by serde.

use serde::{Deserialize, Serialize};

use pagesync_shared::{BlockKind, Emphasis};

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Body of `POST /v1/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest<'a> {
    pub sort: SearchSort,
    pub filter: SearchFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

impl<'a> SearchRequest<'a> {
    /// Pages only, oldest edit first.
    pub fn pages(start_cursor: Option<&'a str>) -> Self {
        Self {
            sort: SearchSort {
                direction: "ascending",
                timestamp: "last_edited_time",
            },
            filter: SearchFilter {
                property: "object",
                value: "page",
            },
            start_cursor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchSort {
    pub direction: &'static str,
    pub timestamp: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchFilter {
    pub property: &'static str,
    pub value: &'static str,
}

/// One batch of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A search hit, tagged by its `object` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum SearchResult {
    Page(PageRecord),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageRecord {
    pub id: String,
    #[serde(default)]
    pub properties: PageProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageProperties {
    #[serde(default)]
    pub title: Option<TitleProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Vec<TitleRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleRun {
    #[serde(default)]
    pub plain_text: Option<String>,
}

impl PageRecord {
    /// Plain text of the first title run, if there is one.
    pub fn title_text(&self) -> Option<&str> {
        self.properties
            .title
            .as_ref()?
            .title
            .first()?
            .plain_text
            .as_deref()
    }
}

// ---------------------------------------------------------------------------
// Block children
// ---------------------------------------------------------------------------

/// One page of `GET /v1/blocks/{id}/children`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockChildren {
    #[serde(default)]
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A content block, tagged by its `type` field. Each text-bearing variant
/// carries its payload under a key named after the type.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextBlock,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    #[serde(other)]
    Unsupported,
}

impl Block {
    /// The block's kind and its inline runs, or `None` for unsupported blocks.
    pub fn text_content(&self) -> Option<(BlockKind, &[RichText])> {
        let (kind, body) = match self {
            Self::Paragraph { paragraph } => (BlockKind::Paragraph, paragraph),
            Self::Heading1 { heading_1 } => (BlockKind::Heading1, heading_1),
            Self::Heading2 { heading_2 } => (BlockKind::Heading2, heading_2),
            Self::Heading3 { heading_3 } => (BlockKind::Heading3, heading_3),
            Self::BulletedListItem { bulleted_list_item } => {
                (BlockKind::BulletItem, bulleted_list_item)
            }
            Self::Unsupported => return None,
        };
        Some((kind, body.rich_text.as_deref().unwrap_or_default()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Option<Vec<RichText>>,
}

/// One inline run of rich text.
#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    /// Present for `text` runs; absent for mentions and equations.
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub annotations: Annotations,
}

impl RichText {
    /// The run's text content, falling back to `plain_text` for non-text runs.
    pub fn content(&self) -> &str {
        match &self.text {
            Some(text) => &text.content,
            None => &self.plain_text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

impl From<&Annotations> for Emphasis {
    fn from(a: &Annotations) -> Self {
        Self {
            bold: a.bold,
            italic: a.italic,
            strikethrough: a.strikethrough,
            underline: a.underline,
            monospace: a.code,
        }
    }
}
