//! # Media Uploads
//!
//! Uploads are two-phase so the document never waits on the network:
//!
//! 1. `EditorSession::begin_upload` inserts a placeholder node
//!    (`loading: true`) and hands back a [`PendingUpload`] owning the
//!    upload future.
//! 2. The host awaits it and passes the [`UploadOutcome`] to
//!    `EditorSession::settle_upload`, which updates the placeholder by id.
//!
//! A placeholder deleted in the meantime makes settling a no-op.

use base64::Engine;
use folio_document::ElementType;
use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Unsupported media type: {0}")]
    Unsupported(String),

    #[error("Upload failed: {0}")]
    Failed(String),
}

/// A file picked or dropped by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Node type a placeholder for this file gets
    pub fn element_type(&self) -> Option<ElementType> {
        if self.is_image() {
            Some(ElementType::Img)
        } else if self.is_video() {
            Some(ElementType::Video)
        } else {
            None
        }
    }
}

/// Turns a file into a URL the document can reference
pub trait Uploader: Send + Sync {
    fn upload_image(&self, file: MediaFile) -> BoxFuture<'static, Result<String, UploadError>>;

    /// Whether this uploader can take the file at all
    fn accepts(&self, file: &MediaFile) -> bool {
        file.element_type().is_some()
    }
}

/// Inlines images as `data:` URLs; anything else needs a real upload handler
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultUploader;

impl Uploader for DefaultUploader {
    fn upload_image(&self, file: MediaFile) -> BoxFuture<'static, Result<String, UploadError>> {
        let result = if file.is_image() {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&file.bytes);
            Ok(format!("data:{};base64,{}", file.mime_type, encoded))
        } else {
            Err(UploadError::Unsupported(file.mime_type))
        };
        futures::future::ready(result).boxed()
    }

    fn accepts(&self, file: &MediaFile) -> bool {
        file.is_image()
    }
}

/// Result of an upload, addressed to its placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub node_id: String,
    pub result: Result<String, UploadError>,
}

/// An upload in flight for the placeholder `node_id`
pub struct PendingUpload {
    pub node_id: String,
    future: BoxFuture<'static, Result<String, UploadError>>,
}

impl PendingUpload {
    pub(crate) fn new(node_id: String, future: BoxFuture<'static, Result<String, UploadError>>) -> Self {
        Self { node_id, future }
    }

    /// Drive the upload to completion
    pub async fn finish(self) -> UploadOutcome {
        let result = self.future.await;
        UploadOutcome {
            node_id: self.node_id,
            result,
        }
    }
}

impl std::fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpload").field("node_id", &self.node_id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_uploader_inlines_images() {
        let file = MediaFile::new("dot.png", "image/png", vec![1, 2, 3]);
        let url = DefaultUploader.upload_image(file).await.unwrap();
        assert_eq!(url, "data:image/png;base64,AQID");
    }

    #[tokio::test]
    async fn test_default_uploader_rejects_video() {
        let file = MediaFile::new("clip.mp4", "video/mp4", vec![]);
        assert!(!DefaultUploader.accepts(&file));
        let err = DefaultUploader.upload_image(file).await.unwrap_err();
        assert_eq!(err, UploadError::Unsupported("video/mp4".into()));
    }

    #[test]
    fn test_element_type_from_mime() {
        assert_eq!(MediaFile::new("a", "image/gif", vec![]).element_type(), Some(ElementType::Img));
        assert_eq!(MediaFile::new("a", "video/webm", vec![]).element_type(), Some(ElementType::Video));
        assert_eq!(MediaFile::new("a", "text/plain", vec![]).element_type(), None);
    }
}
