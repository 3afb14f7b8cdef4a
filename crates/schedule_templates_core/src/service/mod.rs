//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry, store and codec into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod template_service;
