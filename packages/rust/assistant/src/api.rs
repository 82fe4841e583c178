//! Request and response shapes for the assistant and file endpoints.

use serde::{Deserialize, Serialize};

/// An assistant as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// Body of `POST /v1/assistants`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAssistantRequest<'a> {
    pub name: &'a str,
    pub model: &'a str,
    pub instructions: &'a str,
    pub tools: Vec<Tool>,
}

/// A tool enabled on an assistant.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    Retrieval,
}

/// Body of `POST /v1/assistants/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateAssistantRequest<'a> {
    pub file_ids: &'a [String],
}

/// An uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
}

/// Body of `GET /v1/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    pub data: Vec<FileObject>,
}

/// Body of `DELETE /v1/files/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletedFile {
    pub id: String,
    #[serde(default)]
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_shape() {
        let body = serde_json::to_value(CreateAssistantRequest {
            name: "helper",
            model: "gpt-4",
            instructions: "be brief",
            tools: vec![Tool::Retrieval],
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "name": "helper",
                "model": "gpt-4",
                "instructions": "be brief",
                "tools": [{"type": "retrieval"}]
            })
        );
    }

    #[test]
    fn file_list_requires_data_array() {
        let ok: FileList = serde_json::from_str(r#"{"object": "list", "data": [{"id": "file-1"}]}"#)
            .unwrap();
        assert_eq!(ok.data[0].id, "file-1");

        let bad = serde_json::from_str::<FileList>(r#"{"object": "list", "data": {}}"#);
        assert!(bad.is_err());
    }
}
