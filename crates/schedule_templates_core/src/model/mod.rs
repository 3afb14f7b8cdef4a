//! Template domain model.
//!
//! # Responsibility
//! - Define the canonical template record shared by registry, store and export.
//! - Keep the built-in/custom split explicit in one storage shape.
//!
//! # Invariants
//! - Every template is identified by a stable string id.
//! - Exactly one binary source (`file_url` or `file_data`) is populated.

pub mod template;
