//! Pipeline orchestration for pagesync.
//!
//! This crate ties together page enumeration, content rendering, markdown
//! output, and the assistant upload into end-to-end workflows
//! ([`pipeline::export`] and [`pipeline::sync`]).

pub mod pipeline;
