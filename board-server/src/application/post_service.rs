use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::domain::{error::DomainError, post::Post};
use crate::presentation::dto::UpdatePostRequest;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService<R: PostRepository + 'static> {
    repo: Arc<R>,
}

impl<R> PostService<R>
where
    R: PostRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    /// Newest first.
    pub async fn get_posts(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Post>, DomainError> {
        self.repo.get_posts(limit, offset).await
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        username: String,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        require("title", &title)?;
        require("content", &content)?;
        self.repo
            .create(Post::new(author_id, username, title, content))
            .await
    }

    #[instrument(skip(self, update))]
    pub async fn update_post(
        &self,
        author_id: Uuid,
        post_id: Uuid,
        update: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        if let Some(title) = &update.title {
            require("title", title)?;
        }
        if let Some(content) = &update.content {
            require("content", content)?;
        }

        let existing = self.get_post(post_id).await?;
        if existing.user_id != author_id {
            return Err(DomainError::Forbidden);
        }

        self.repo
            .update_post(post_id, author_id, update)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, author_id: Uuid, post_id: Uuid) -> Result<(), DomainError> {
        self.repo.delete_post(post_id, author_id).await
    }

    pub async fn record_view(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .increment_views(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }
}

fn require(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    Ok(())
}
