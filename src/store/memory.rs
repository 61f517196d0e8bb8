// src/store/memory.rs

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;

use super::{RawOutput, ResultStore, SaveFuture};

/// Keeps every saved output in memory. Can be told to fail instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saved: Arc<Mutex<Vec<RawOutput>>>,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every `save` fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            saved: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    pub fn saved(&self) -> Vec<RawOutput> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, output: RawOutput) -> SaveFuture<'_> {
        Box::pin(async move {
            if let Some(reason) = &self.failure {
                return Err(anyhow!("{reason}"));
            }
            self.saved
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(output);
            Ok(())
        })
    }
}
