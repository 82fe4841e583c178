//! Shared types, error model, and configuration for pagesync.
//!
//! This crate is the foundation depended on by all other pagesync crates.
//! It provides:
//! - [`PageSyncError`]: the unified error type
//! - Domain types ([`Document`], [`TextFragment`], [`BlockKind`], [`Emphasis`])
//! - Configuration ([`AppConfig`], [`NotionConfig`], [`AssistantConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, AssistantConfig, AssistantSection, NotionConfig, NotionSection, OutputSection,
    config_dir, config_file_path, init_config, load_config, load_config_from, resolve_secret,
};
pub use error::{PageSyncError, Result};
pub use types::{BlockKind, Document, Emphasis, TextFragment, UNTITLED};
