//! Composer-side validation run before a post reaches the store.

use domains::{Attachment, DomainError, NewPost, Result, ANONYMOUS, DEFAULT_COMMUNITY};

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub author_username: Option<String>,
    pub community: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Trims title and content, rejects either when blank, and fills in the
    /// default author and community.
    pub fn into_new_post(self) -> Result<NewPost> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(DomainError::Validation(
                "a post needs both a title and content".into(),
            ));
        }

        let author_username = self
            .author_username
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ANONYMOUS.to_string());
        let community = self
            .community
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string());

        Ok(NewPost {
            title: title.to_string(),
            content: content.to_string(),
            author_username,
            community,
            attachments: self.attachments,
        })
    }
}
