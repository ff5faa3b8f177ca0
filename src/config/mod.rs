//! Configuration module for Pocketbook
//!
//! - Platform path resolution
//! - User settings persistence
//! - Name matching policy for reconciliation

pub mod paths;
pub mod settings;

pub use paths::PocketbookPaths;
pub use settings::{NameMatchPolicy, Settings};
