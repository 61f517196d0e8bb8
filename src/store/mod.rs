// src/store/mod.rs

//! Persistence capability for raw scan output.
//!
//! The controller hands the captured stdout of a successful run to a
//! [`ResultStore`]. A failed save turns the task `Aborted`; the failure
//! reason itself is opaque to the controller.
//!
//! - [`FileStore`] writes the output below a root directory (production).
//! - [`MemoryStore`] keeps saved outputs in memory (tests, dry runs).

use std::future::Future;
use std::pin::Pin;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Everything needed to persist one task's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutput {
    pub task_id: String,
    pub project_uuid: String,
    /// Stdout chunks in the order they were read.
    pub chunks: Vec<Vec<u8>>,
}

impl RawOutput {
    pub fn concat(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

pub type SaveFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Trait abstracting where raw output ends up.
pub trait ResultStore: Send + Sync {
    fn save(&self, output: RawOutput) -> SaveFuture<'_>;
}
