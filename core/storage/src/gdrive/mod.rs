//! Google Drive storage backend for Inkpress.
//!
//! Uploads go through the multipart endpoint for small payloads and a
//! chunked resumable session for large ones, under a bearer token that is
//! refreshed transparently by the auth crate.

pub mod client;
pub mod store;

pub use client::{DriveClient, DriveUpload};
pub use store::DriveStore;
