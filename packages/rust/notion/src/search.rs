//! Full-workspace page enumeration over the paginated search endpoint.

use tracing::{error, info, instrument, warn};

use pagesync_shared::{Document, UNTITLED};

use crate::NotionClient;
use crate::api::SearchResult;

impl NotionClient {
    /// Collect every page in the workspace, oldest edit first.
    ///
    /// Batches are concatenated in fetch order. Any failure stops the walk and
    /// the pages gathered so far are returned; the error is only logged.
    #[instrument(skip(self))]
    pub async fn enumerate_documents(&self) -> Vec<Document> {
        let mut documents = Vec::new();
        let mut cursor: Option<String> = None;
        let mut has_more = true;
        let mut batches = 0usize;

        while has_more {
            let response = match self.search_pages(cursor.as_deref()).await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, collected = documents.len(), "error retrieving pages");
                    break;
                }
            };

            batches += 1;
            documents.extend(documents_from_results(&response.results));

            has_more = response.has_more;
            cursor = response.next_cursor;

            if has_more && cursor.is_none() {
                warn!(batches, "search reported more results without a cursor, stopping");
                break;
            }
        }

        info!(count = documents.len(), batches, "pages enumerated");
        documents
    }
}

/// Extract documents from one batch of search results, in response order.
/// Non-page hits are skipped.
pub fn documents_from_results(results: &[SearchResult]) -> impl Iterator<Item = Document> + '_ {
    results.iter().filter_map(|result| match result {
        SearchResult::Page(page) => Some(Document::new(
            page.id.clone(),
            page.title_text().unwrap_or(UNTITLED),
        )),
        SearchResult::Other => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, fixture};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn single_batch_returns_documents_in_order() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(body_partial_json(serde_json::json!({
                "sort": {"direction": "ascending", "timestamp": "last_edited_time"},
                "filter": {"property": "object", "value": "page"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("search-single.json")))
            .expect(1)
            .mount(&server)
            .await;

        let docs = client_for(&server).enumerate_documents().await;

        assert_eq!(
            docs,
            vec![
                Document::new("page-a", "Meeting Notes"),
                Document::new("page-b", "Untitled"),
                Document::new("page-c", "Reading"),
            ]
        );
    }

    #[tokio::test]
    async fn batches_are_concatenated_in_fetch_order() {
        let server = MockServer::start().await;

        // Second request carries the cursor and wins on priority.
        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(body_partial_json(serde_json::json!({"start_cursor": "cursor-2"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("search-page-2.json")))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("search-page-1.json")))
            .expect(1)
            .mount(&server)
            .await;

        let docs = client_for(&server).enumerate_documents().await;
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();

        assert_eq!(ids, vec!["p1", "p2", "p3", "p4", "p5"]);
    }

    #[tokio::test]
    async fn failure_mid_walk_keeps_partial_results() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(body_partial_json(serde_json::json!({"start_cursor": "cursor-2"})))
            .respond_with(ResponseTemplate::new(502))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixture("search-page-1.json")))
            .mount(&server)
            .await;

        let docs = client_for(&server).enumerate_documents().await;
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "p1");
    }

    #[tokio::test]
    async fn failure_on_first_call_yields_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let docs = client_for(&server).enumerate_documents().await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn missing_cursor_stops_the_walk() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "results": [{"object": "page", "id": "only", "properties": {}}],
                "has_more": true,
                "next_cursor": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let docs = client_for(&server).enumerate_documents().await;
        assert_eq!(docs, vec![Document::new("only", "Untitled")]);
    }

    #[test]
    fn record_without_title_property_is_untitled() {
        let response: crate::api::SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [
                {"object": "page", "id": "x", "properties": {"Status": {"type": "select"}}},
                {"object": "database", "id": "db"}
            ],
            "has_more": false
        }))
        .unwrap();

        let docs: Vec<Document> = documents_from_results(&response.results).collect();
        assert_eq!(docs, vec![Document::new("x", "Untitled")]);
    }
}
