// src/store/file.rs

use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use tracing::info;

use crate::fs::{FileSystem, RealFileSystem};

use super::{RawOutput, ResultStore, SaveFuture};

/// Stores each task's stdout as `<root>/<project_uuid>/<task_id>.xml`.
#[derive(Debug, Clone)]
pub struct FileStore<F: FileSystem = RealFileSystem> {
    fs: F,
    root: PathBuf,
}

impl FileStore<RealFileSystem> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(RealFileSystem, root)
    }
}

impl<F: FileSystem> FileStore<F> {
    pub fn with_fs(fs: F, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location the output of `task_id` in `project_uuid` is written to.
    pub fn output_path(&self, project_uuid: &str, task_id: &str) -> anyhow::Result<PathBuf> {
        ensure_single_component("project_uuid", project_uuid)?;
        ensure_single_component("task_id", task_id)?;
        Ok(self
            .root
            .join(project_uuid)
            .join(format!("{task_id}.xml")))
    }
}

/// Ids become path components; refuse anything that could leave `root`.
fn ensure_single_component(what: &str, value: &str) -> anyhow::Result<()> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("{what} '{value}' is not usable as a file name"),
    }
}

impl<F: FileSystem> ResultStore for FileStore<F> {
    fn save(&self, output: RawOutput) -> SaveFuture<'_> {
        Box::pin(async move {
            let path = self.output_path(&output.project_uuid, &output.task_id)?;
            let bytes = output.concat();

            self.fs
                .write(&path, &bytes)
                .with_context(|| format!("saving output of task '{}'", output.task_id))?;

            info!(
                task_id = %output.task_id,
                path = %path.display(),
                bytes = bytes.len(),
                chunks = output.chunks.len(),
                "raw scan output saved"
            );
            Ok(())
        })
    }
}
