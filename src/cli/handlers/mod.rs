//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - init: Database initialization
//! - documents: Upload, list, delete and config display
//! - ask: One-shot and interactive questions
//! - serve: API server

pub mod ask;
pub mod documents;
pub mod init;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use documents::*;
pub use init::*;
pub use serve::*;
