//! Attachment preparation for new posts.
//!
//! Images are embedded as `data:` URIs so a post is self-contained in the
//! backing. Other files are recorded by name only.

use base64::Engine;
use bytes::Bytes;
use domains::Attachment;
use mime::Mime;

/// Upper bound on attachments per post.
pub const MAX_ATTACHMENTS: usize = 10;
/// Files above this size are dropped.
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

/// A file as handed over by the caller.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    /// Declared content type. Guessed from `name` when absent.
    pub content_type: Option<Mime>,
    pub data: Bytes,
}

impl Upload {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    fn mime(&self) -> Mime {
        self.content_type
            .clone()
            .unwrap_or_else(|| mime_guess::from_path(&self.name).first_or_octet_stream())
    }
}

/// Drops oversized files and caps the total at `MAX_ATTACHMENTS`, counting the
/// `already_selected` files the caller is holding.
pub fn select_uploads(already_selected: usize, uploads: Vec<Upload>) -> Vec<Upload> {
    let room = MAX_ATTACHMENTS.saturating_sub(already_selected);
    uploads
        .into_iter()
        .filter(|u| {
            let fits = u.data.len() <= MAX_ATTACHMENT_BYTES;
            if !fits {
                tracing::debug!(name = %u.name, size = u.data.len(), "dropping oversized upload");
            }
            fits
        })
        .take(room)
        .collect()
}

pub fn encode_attachment(upload: &Upload) -> Attachment {
    let mime = upload.mime();
    if mime.type_() == mime::IMAGE {
        let payload = base64::engine::general_purpose::STANDARD.encode(&upload.data);
        Attachment::image(
            upload.name.clone(),
            format!("data:{};base64,{}", mime.essence_str(), payload),
        )
    } else {
        Attachment::file(upload.name.clone())
    }
}

/// Selects and encodes `uploads` one after another, preserving their order.
pub fn prepare_attachments(uploads: Vec<Upload>) -> Vec<Attachment> {
    select_uploads(0, uploads)
        .iter()
        .map(encode_attachment)
        .collect()
}
