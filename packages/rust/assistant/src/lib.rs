//! Assistant API client: bootstrap, file upload, attachment, and purge.
//!
//! The assistant's retrievable knowledge is the set of files listed in its
//! `file_ids`. A sync replaces that set with freshly uploaded exports.

pub mod api;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use pagesync_shared::{AssistantConfig, PageSyncError, Result};

use crate::api::{
    Assistant, CreateAssistantRequest, DeletedFile, FileList, FileObject, Tool,
    UpdateAssistantRequest,
};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("pagesync/", env!("CARGO_PKG_VERSION"));

/// Uploads can be large, so allow more time than the workspace client.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Purpose tag for files meant for assistant retrieval.
const FILE_PURPOSE: &str = "assistants";

// ---------------------------------------------------------------------------
// AssistantClient
// ---------------------------------------------------------------------------

/// Authenticated client for the assistant and file endpoints.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: Client,
    config: AssistantConfig,
}

impl AssistantClient {
    /// Create a new client from resolved configuration.
    pub fn new(config: AssistantConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PageSyncError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// The assistant id from configuration, if any.
    pub fn configured_assistant_id(&self) -> Option<&str> {
        self.config.assistant_id.as_deref()
    }

    // --- Assistants ---

    /// Fetch an existing assistant.
    #[instrument(skip(self))]
    pub async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        let url = self.endpoint(&format!("v1/assistants/{assistant_id}"));
        let request = self.beta(self.http.get(&url));
        self.send(request, &url).await
    }

    /// Create an assistant with the configured name, model, and instructions,
    /// with retrieval enabled.
    #[instrument(skip(self), fields(name = %self.config.name, model = %self.config.model))]
    pub async fn create_assistant(&self) -> Result<Assistant> {
        let url = self.endpoint("v1/assistants");
        let body = CreateAssistantRequest {
            name: &self.config.name,
            model: &self.config.model,
            instructions: &self.config.instructions,
            tools: vec![Tool::Retrieval],
        };
        let request = self.beta(self.http.post(&url).json(&body));

        let assistant: Assistant = self.send(request, &url).await?;
        info!(assistant_id = %assistant.id, "assistant created");
        Ok(assistant)
    }

    /// Reuse the given assistant, or create one if it is unset or cannot be retrieved.
    pub async fn ensure_assistant(&self, assistant_id: Option<&str>) -> Result<Assistant> {
        if let Some(id) = assistant_id {
            match self.retrieve_assistant(id).await {
                Ok(assistant) => {
                    info!(assistant_id = %assistant.id, "using existing assistant");
                    return Ok(assistant);
                }
                Err(e) => {
                    warn!(assistant_id = id, error = %e, "assistant not retrievable, creating a new one");
                }
            }
        }

        self.create_assistant().await
    }

    /// Replace the assistant's retrievable file set.
    #[instrument(skip(self, file_ids), fields(count = file_ids.len()))]
    pub async fn attach_files(&self, assistant_id: &str, file_ids: &[String]) -> Result<Assistant> {
        let url = self.endpoint(&format!("v1/assistants/{assistant_id}"));
        let request = self.beta(
            self.http
                .post(&url)
                .json(&UpdateAssistantRequest { file_ids }),
        );

        let assistant: Assistant = self.send(request, &url).await?;
        info!(assistant_id = %assistant.id, files = assistant.file_ids.len(), "assistant files updated");
        Ok(assistant)
    }

    // --- Files ---

    /// Upload one file for assistant retrieval and return its id.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PageSyncError::io(path, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PageSyncError::validation(format!("{} has no file name", path.display()))
            })?;

        let form = Form::new()
            .text("purpose", FILE_PURPOSE)
            .part("file", Part::bytes(bytes).file_name(file_name));

        let url = self.endpoint("v1/files");
        let request = self.http.post(&url).multipart(form);

        let file: FileObject = self.send(request, &url).await?;
        debug!(file_id = %file.id, "file uploaded");
        Ok(file.id)
    }

    /// Upload files concurrently. Failed uploads are logged and skipped;
    /// the returned ids follow input order.
    pub async fn upload_files(&self, paths: &[PathBuf]) -> Vec<String> {
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let client = self.clone();
            let path = path.clone();
            handles.push(tokio::spawn(async move {
                let result = client.upload_file(&path).await;
                (path, result)
            }));
        }

        let mut ids = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((_, Ok(id))) => ids.push(id),
                Ok((path, Err(e))) => {
                    error!(path = %path.display(), error = %e, "upload failed, skipping file");
                }
                Err(e) => error!(error = %e, "upload task failed"),
            }
        }

        info!(uploaded = ids.len(), requested = paths.len(), "uploads finished");
        ids
    }

    /// List every uploaded file.
    pub async fn list_files(&self) -> Result<Vec<FileObject>> {
        let url = self.endpoint("v1/files");
        let request = self.http.get(&url);
        let list: FileList = self.send(request, &url).await?;
        Ok(list.data)
    }

    /// Delete one uploaded file.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("v1/files/{file_id}"));
        let request = self.http.delete(&url);
        let deleted: DeletedFile = self.send(request, &url).await?;

        if !deleted.deleted {
            return Err(PageSyncError::validation(format!(
                "file {} was not deleted",
                deleted.id
            )));
        }
        Ok(())
    }

    /// Delete every uploaded file. Individual failures are logged and skipped.
    ///
    /// Returns the number of files deleted. Failing to list files is an error.
    #[instrument(skip(self))]
    pub async fn delete_all_files(&self) -> Result<usize> {
        let files = self.list_files().await?;
        info!(count = files.len(), "deleting uploaded files");

        let mut handles = Vec::with_capacity(files.len());
        for file in files {
            let client = self.clone();
            handles.push(tokio::spawn(async move {
                let result = client.delete_file(&file.id).await;
                (file.id, result)
            }));
        }

        let mut deleted = 0;
        for handle in handles {
            match handle.await {
                Ok((id, Ok(()))) => {
                    debug!(file_id = %id, "file deleted");
                    deleted += 1;
                }
                Ok((id, Err(e))) => error!(file_id = %id, error = %e, "error deleting file"),
                Err(e) => error!(error = %e, "delete task failed"),
            }
        }

        Ok(deleted)
    }

    // --- Plumbing ---

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{path}",
            self.config.api_base.as_str().trim_end_matches('/')
        )
    }

    /// Mark a request as targeting the beta assistants API.
    fn beta(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("OpenAI-Beta", &self.config.beta_header)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let response = request
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| PageSyncError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PageSyncError::Network(format!("{url}: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(PageSyncError::api(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| PageSyncError::Decode(format!("{url}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesync_shared::AssistantSection;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AssistantClient {
        let section = AssistantSection {
            api_base: server.uri(),
            ..AssistantSection::default()
        };
        let config = AssistantConfig::from_section(&section, "sk-test").unwrap();
        assert_eq!(config.api_base, Url::parse(&server.uri()).unwrap());
        AssistantClient::new(config).unwrap()
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pagesync-asst-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn ensure_reuses_existing_assistant() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/assistants/asst_1"))
            .and(header("openai-beta", "assistants=v1"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_1", "object": "assistant", "name": "broski", "file_ids": ["file-old"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/assistants"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let assistant = client_for(&server).ensure_assistant(Some("asst_1")).await.unwrap();
        assert_eq!(assistant.id, "asst_1");
        assert_eq!(assistant.file_ids, vec!["file-old"]);
    }

    #[tokio::test]
    async fn ensure_creates_when_retrieve_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/assistants/asst_gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/assistants"))
            .and(body_json(json!({
                "name": "broski",
                "model": "gpt-4-1106-preview",
                "instructions": "you are a simple chat bot that can access my notion pages and respond to questions about them",
                "tools": [{"type": "retrieval"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "asst_new"})))
            .expect(1)
            .mount(&server)
            .await;

        let assistant = client_for(&server)
            .ensure_assistant(Some("asst_gone"))
            .await
            .unwrap();
        assert_eq!(assistant.id, "asst_new");
        assert!(assistant.file_ids.is_empty());
    }

    #[tokio::test]
    async fn ensure_without_id_creates_directly() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/assistants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "asst_fresh"})))
            .expect(1)
            .mount(&server)
            .await;

        let assistant = client_for(&server).ensure_assistant(None).await.unwrap();
        assert_eq!(assistant.id, "asst_fresh");
    }

    #[tokio::test]
    async fn upload_sends_multipart_with_purpose() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .and(body_string_contains("assistants"))
            .and(body_string_contains("Upload-Me.md"))
            .and(body_string_contains("# Upload Me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "file-abc", "object": "file", "purpose": "assistants"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let path = temp_file("Upload-Me.md", "# Upload Me\nhello");
        let id = client_for(&server).upload_file(&path).await.unwrap();
        assert_eq!(id, "file-abc");
    }

    #[tokio::test]
    async fn upload_files_skips_failures() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "file-ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let good = temp_file("Good.md", "# Good\n");
        let missing = std::env::temp_dir().join("pagesync-asst-missing/Nope.md");

        let ids = client_for(&server).upload_files(&[missing, good]).await;
        assert_eq!(ids, vec!["file-ok"]);
    }

    #[tokio::test]
    async fn attach_replaces_file_ids() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/assistants/asst_1"))
            .and(header("openai-beta", "assistants=v1"))
            .and(body_json(json!({"file_ids": ["file-1", "file-2"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_1", "file_ids": ["file-1", "file-2"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = vec!["file-1".to_string(), "file-2".to_string()];
        let assistant = client_for(&server).attach_files("asst_1", &ids).await.unwrap();
        assert_eq!(assistant.file_ids, ids);
    }

    #[tokio::test]
    async fn delete_all_counts_successes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{"id": "file-1"}, {"id": "file-2"}, {"id": "file-3"}]
            })))
            .mount(&server)
            .await;

        for id in ["file-1", "file-3"] {
            Mock::given(method("DELETE"))
                .and(path(format!("/v1/files/{id}")))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"id": id, "object": "file", "deleted": true})),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        Mock::given(method("DELETE"))
            .and(path("/v1/files/file-2"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let deleted = client_for(&server).delete_all_files().await.unwrap();
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn delete_all_fails_when_listing_fails() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/files"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_all_files().await.unwrap_err();
        assert!(matches!(err, PageSyncError::Api { status: 401, .. }));
    }
}
