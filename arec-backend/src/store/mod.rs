//! Markdown file stores
//!
//! Flat markdown files are the only persistence in this system. Every store
//! owns an injected path, re-reads the file on each operation, and rewrites
//! the whole file on mutation. There is no locking: this is a single-operator
//! tool and last writer wins.

pub mod meetings;
pub mod memory;
pub mod tasks;

pub use meetings::MeetingStore;
pub use memory::{MemoryBundle, MemoryReader};
pub use tasks::TaskStore;

use std::fmt;

/// Error type shared by the file stores.
///
/// The variants carry the HTTP mapping the dashboard needs: NotFound responds
/// 404, Invalid responds 400, Io responds 500.
#[derive(Debug)]
pub enum StoreError {
    NotFound(String),
    Invalid(String),
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(message) => write!(f, "{}", message),
            Self::Invalid(message) => write!(f, "{}", message),
            Self::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
