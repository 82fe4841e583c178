//! End-to-end pipelines: workspace → markdown files → assistant knowledge.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use pagesync_assistant::AssistantClient;
use pagesync_markdown::write_markdown_file;
use pagesync_notion::NotionClient;
use pagesync_shared::{AssistantConfig, Document, NotionConfig, Result};

/// Configuration for the [`export`] pipeline.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Workspace API settings.
    pub notion: NotionConfig,
    /// Directory receiving one `.md` file per document.
    pub output_dir: PathBuf,
}

/// Result of the [`export`] pipeline.
#[derive(Debug)]
pub struct ExportResult {
    /// Number of documents found in the workspace.
    pub documents: usize,
    /// Files written, in enumeration order.
    pub written: Vec<PathBuf>,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Configuration for the [`sync`] pipeline.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Export settings.
    pub export: ExportConfig,
    /// Assistant API settings, including which assistant to reuse.
    pub assistant: AssistantConfig,
}

/// Result of the [`sync`] pipeline.
#[derive(Debug)]
pub struct SyncResult {
    /// Assistant that now holds the exported files.
    pub assistant_id: String,
    /// Number of documents found in the workspace.
    pub documents: usize,
    /// Number of files written locally.
    pub written: usize,
    /// Number of files uploaded and attached.
    pub uploaded: usize,
    /// Number of previously uploaded files deleted.
    pub purged: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a document has been rendered and written (or failed to write).
    fn document_exported(&self, title: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn document_exported(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self) {}
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Export every workspace page to a markdown file.
///
/// 1. Enumerate all pages
/// 2. Render each page's content concurrently
/// 3. Format and write one file per page
///
/// Per-page failures degrade to less output; only building the HTTP client
/// can fail the whole run.
#[instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
pub async fn export(config: &ExportConfig, progress: &dyn ProgressReporter) -> Result<ExportResult> {
    let start = Instant::now();
    let client = NotionClient::new(config.notion.clone())?;

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        warn!(error = %e, "could not create output directory");
    }

    progress.phase("Enumerating pages");
    let documents = client.enumerate_documents().await;

    progress.phase("Exporting pages");
    let written = export_documents(&client, &documents, &config.output_dir, progress).await;

    let result = ExportResult {
        documents: documents.len(),
        written,
        elapsed: start.elapsed(),
    };

    info!(
        documents = result.documents,
        written = result.written.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "export complete"
    );

    Ok(result)
}

/// Render and write every document. Each document runs in its own task, so a
/// slow or failing page does not hold up the others.
async fn export_documents(
    client: &NotionClient,
    documents: &[Document],
    output_dir: &Path,
    progress: &dyn ProgressReporter,
) -> Vec<PathBuf> {
    let mut handles = Vec::with_capacity(documents.len());

    for document in documents {
        let client = client.clone();
        let document = document.clone();
        let output_dir = output_dir.to_path_buf();

        handles.push(tokio::spawn(async move {
            let fragments = client.render_content(&document.id).await;
            let path = write_markdown_file(&output_dir, &document.title, &fragments);
            (document, path)
        }));
    }

    let total = handles.len();
    let mut written = Vec::with_capacity(total);

    for (i, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok((document, path)) => {
                progress.document_exported(&document.title, i + 1, total);
                written.extend(path);
            }
            Err(e) => error!(error = %e, "export task failed"),
        }
    }

    written
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// Run the full sync.
///
/// 1. Delete previously uploaded files (if configured)
/// 2. Retrieve or create the assistant
/// 3. Export workspace pages to markdown
/// 4. Upload the written files
/// 5. Replace the assistant's file set with the new uploads
#[instrument(skip_all)]
pub async fn sync(config: &SyncConfig, progress: &dyn ProgressReporter) -> Result<SyncResult> {
    let start = Instant::now();
    let assistant_client = AssistantClient::new(config.assistant.clone())?;

    let purged = if config.assistant.purge_before_sync {
        progress.phase("Deleting previously uploaded files");
        assistant_client.delete_all_files().await?
    } else {
        0
    };

    progress.phase("Preparing assistant");
    let assistant = assistant_client
        .ensure_assistant(assistant_client.configured_assistant_id())
        .await?;

    let exported = export(&config.export, progress).await?;

    progress.phase("Uploading files");
    let file_ids = assistant_client.upload_files(&exported.written).await;

    if file_ids.is_empty() {
        warn!("no files uploaded, assistant knowledge will be cleared");
    }

    progress.phase("Updating assistant knowledge");
    assistant_client.attach_files(&assistant.id, &file_ids).await?;

    let result = SyncResult {
        assistant_id: assistant.id,
        documents: exported.documents,
        written: exported.written.len(),
        uploaded: file_ids.len(),
        purged,
        elapsed: start.elapsed(),
    };

    progress.done();

    info!(
        assistant_id = %result.assistant_id,
        documents = result.documents,
        uploaded = result.uploaded,
        purged = result.purged,
        elapsed_ms = result.elapsed.as_millis(),
        "sync complete"
    );

    Ok(result)
}
