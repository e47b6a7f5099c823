//! Local filesystem store
//!
//! Artifacts land under the `savePath` parameter. Each write goes through a
//! hidden partial file that is synced and renamed into place.

use crate::config::ExportConfigDefinition;
use crate::core::export::pipeline::DataStore;
use crate::domain::{Result, StrataError};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Parameter naming the target directory
pub const SAVE_PATH: &str = "savePath";

/// Writes artifacts under the `savePath` directory
///
/// Bytes go to a hidden `.<name>.partial` sibling first, are synced to disk
/// and then renamed over the target, so readers only ever see complete
/// files. An existing file of the same name is replaced.
pub struct FilesystemStore;

impl FilesystemStore {
    fn save_path(config: &ExportConfigDefinition) -> Result<PathBuf> {
        config
            .parameters
            .get_non_empty(SAVE_PATH)
            .map(PathBuf::from)
            .ok_or_else(|| {
                StrataError::Configuration(format!(
                    "export '{}': the filesystem store requires the {SAVE_PATH} parameter",
                    config.name
                ))
            })
    }

    fn target(config: &ExportConfigDefinition, filename: &str) -> Result<PathBuf> {
        let relative = Path::new(filename);
        let safe = !filename.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StrataError::Storage(format!(
                "Refusing to write outside the save path: {filename}"
            )));
        }
        Ok(Self::save_path(config)?.join(relative))
    }
}

#[async_trait]
impl DataStore for FilesystemStore {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn validate(&self, config: &ExportConfigDefinition) -> Result<()> {
        Self::save_path(config).map(|_| ())
    }

    async fn store(
        &self,
        content: &[u8],
        filename: &str,
        mime_type: &str,
        config: &ExportConfigDefinition,
    ) -> Result<()> {
        let target = Self::target(config, filename)?;
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let partial = parent.join(format!(".{name}.partial"));

        tokio::fs::create_dir_all(&parent).await.map_err(|e| {
            StrataError::Storage(format!("Cannot create {}: {e}", parent.display()))
        })?;

        if let Err(e) = write_synced(&partial, content).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StrataError::Storage(format!(
                "Cannot write {}: {e}",
                target.display()
            )));
        }
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(StrataError::Storage(format!(
                "Cannot move {} into place: {e}",
                target.display()
            )));
        }

        tracing::debug!(
            path = %target.display(),
            mime_type = %mime_type,
            bytes = content.len(),
            "Stored artifact"
        );
        Ok(())
    }

    async fn read_back(
        &self,
        filename: &str,
        config: &ExportConfigDefinition,
    ) -> Result<Option<Vec<u8>>> {
        let target = Self::target(config, filename)?;
        tokio::fs::read(&target)
            .await
            .map(Some)
            .map_err(|e| StrataError::Storage(format!("Cannot read {}: {e}", target.display())))
    }
}

async fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}
