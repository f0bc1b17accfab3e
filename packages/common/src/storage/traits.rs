use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::error::StorageError;
use super::reference::AttachmentRef;
use super::validation::ValidatedAttachment;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Write-once storage for attachment bytes, keyed by store-generated references.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Persist `data` under a freshly generated reference.
    ///
    /// Either the full byte sequence is stored under the returned reference,
    /// or nothing is observable under it.
    async fn store(
        &self,
        data: &[u8],
        attachment: &ValidatedAttachment,
    ) -> Result<AttachmentRef, StorageError>;

    /// Retrieve all bytes of an attachment.
    async fn retrieve(&self, reference: &AttachmentRef) -> Result<Vec<u8>, StorageError> {
        let mut reader = self.retrieve_stream(reference).await?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Retrieve an attachment as a streaming async reader.
    async fn retrieve_stream(&self, reference: &AttachmentRef) -> Result<BoxReader, StorageError>;

    /// Check whether an attachment exists.
    async fn exists(&self, reference: &AttachmentRef) -> Result<bool, StorageError>;

    /// Get the size of an attachment in bytes.
    async fn size(&self, reference: &AttachmentRef) -> Result<u64, StorageError>;

    /// Remove an attachment. Only used to undo writes of a submission that
    /// failed before its record was inserted.
    ///
    /// Returns `true` if the attachment was deleted, `false` if it did not exist.
    async fn delete(&self, reference: &AttachmentRef) -> Result<bool, StorageError>;
}
