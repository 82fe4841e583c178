//! Block-to-fragment rendering for a single page.

use tracing::{debug, error, instrument, warn};

use pagesync_shared::{Emphasis, TextFragment};

use crate::NotionClient;
use crate::api::Block;

impl NotionClient {
    /// Render a page's top-level blocks into text fragments.
    ///
    /// Only the first page of children is read; longer documents are truncated.
    /// A failed fetch is logged and yields an empty sequence.
    #[instrument(skip(self, document_id), fields(document_id = %document_id))]
    pub async fn render_content(&self, document_id: &str) -> Vec<TextFragment> {
        let children = match self.list_block_children(document_id).await {
            Ok(children) => children,
            Err(e) => {
                error!(error = %e, "error retrieving page content");
                return Vec::new();
            }
        };

        if children.has_more {
            warn!(
                blocks = children.results.len(),
                "page has more blocks than one response holds, content truncated"
            );
        }

        let fragments = fragments_from_blocks(&children.results);
        debug!(
            blocks = children.results.len(),
            fragments = fragments.len(),
            "page content rendered"
        );
        fragments
    }
}

/// Convert blocks into fragments, in block order then run order.
///
/// Every run inherits its block's kind. Unsupported blocks contribute nothing.
pub fn fragments_from_blocks(blocks: &[Block]) -> Vec<TextFragment> {
    let mut fragments = Vec::with_capacity(blocks.len());

    for block in blocks {
        let Some((block_kind, runs)) = block.text_content() else {
            continue;
        };

        fragments.extend(runs.iter().map(|run| TextFragment {
            block_kind,
            text: run.content().to_string(),
            emphasis: Emphasis::from(&run.annotations),
        }));
    }

    fragments
}
