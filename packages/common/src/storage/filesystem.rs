use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::debug;

use super::error::StorageError;
use super::kind::AttachmentKind;
use super::reference::AttachmentRef;
use super::traits::{AttachmentStore, BoxReader};
use super::validation::ValidatedAttachment;

/// Filesystem-backed attachment store.
///
/// Attachments are partitioned by kind:
/// `{base_path}/{kind}/{kind}_{token}.{ext}`
///
/// Writes go to `{base_path}/.tmp/` first and are renamed into place once the
/// bytes are synced, so a reference never names a partially written file.
pub struct FilesystemAttachmentStore {
    base_path: PathBuf,
    write_timeout: Duration,
}

impl FilesystemAttachmentStore {
    /// Create a new filesystem attachment store, creating its directories.
    pub async fn new(base_path: PathBuf, write_timeout: Duration) -> Result<Self, StorageError> {
        fs::create_dir_all(base_path.join(".tmp")).await?;
        for kind in AttachmentKind::ALL {
            fs::create_dir_all(base_path.join(kind.as_str())).await?;
        }
        Ok(Self {
            base_path,
            write_timeout,
        })
    }

    /// Compute the filesystem path for a given reference.
    fn attachment_path(&self, reference: &AttachmentRef) -> PathBuf {
        self.base_path
            .join(reference.kind().as_str())
            .join(reference.as_str())
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    async fn write_then_rename(
        temp_path: &Path,
        target: &Path,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if fs::try_exists(target).await? {
            return Err(StorageError::Collision(target.display().to_string()));
        }
        fs::rename(temp_path, target).await?;
        Ok(())
    }
}

#[async_trait]
impl AttachmentStore for FilesystemAttachmentStore {
    async fn store(
        &self,
        data: &[u8],
        attachment: &ValidatedAttachment,
    ) -> Result<AttachmentRef, StorageError> {
        let reference = AttachmentRef::generate(attachment.kind(), attachment.extension());
        let target = self.attachment_path(&reference);
        let temp_path = self.temp_path();

        let result = match tokio::time::timeout(
            self.write_timeout,
            Self::write_then_rename(&temp_path, &target, data),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.write_timeout)),
        };

        if let Err(e) = result {
            // Best effort; the temp file may never have been created.
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!(reference = %reference, size = data.len(), "attachment stored");
        Ok(reference)
    }

    async fn retrieve_stream(&self, reference: &AttachmentRef) -> Result<BoxReader, StorageError> {
        match fs::File::open(self.attachment_path(reference)).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, reference: &AttachmentRef) -> Result<bool, StorageError> {
        Ok(fs::try_exists(self.attachment_path(reference)).await?)
    }

    async fn size(&self, reference: &AttachmentRef) -> Result<u64, StorageError> {
        match fs::metadata(self.attachment_path(reference)).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, reference: &AttachmentRef) -> Result<bool, StorageError> {
        match fs::remove_file(self.attachment_path(reference)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
