//! Remote storage publishing for Inkpress.
//!
//! This crate provides the upload half of the pipeline:
//! - [`RemoteStore`], the capability interface a storage backend implements
//! - the Google Drive backend with streaming resumable uploads
//! - [`MemoryStore`], an in-memory backend for tests
//! - [`Publisher`], the auth-gated orchestration over a store
//!
//! # Design Principles
//! - Provider isolation: swapping backends never touches the renderer or
//!   the authorization flow
//! - Async operations: all I/O is async
//! - Streaming support: large documents are uploaded in chunks

pub mod gdrive;
pub mod memory;
pub mod publisher;
pub mod store;

pub use gdrive::DriveStore;
pub use memory::MemoryStore;
pub use publisher::Publisher;
pub use store::{ByteStream, PublishedFile, RemoteStore};
