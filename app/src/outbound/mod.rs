//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **analytics**: analytics events written to the tracing pipeline
//! - **http**: reqwest transport for the REST API client
//! - **rest**: repositories and the identity provider over the REST API
//! - **media**: hosted image uploads
//! - **storage**: file-backed and in-memory key-value stores
//!
//! Adapters translate between domain types and wire formats. They contain
//! no business logic.

pub mod analytics;
pub mod http;
pub mod media;
pub mod rest;
pub mod storage;
