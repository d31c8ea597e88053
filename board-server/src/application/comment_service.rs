use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::{comment::Comment, error::DomainError};

const COMMENT_MIN_CHARS: usize = 2;

/// Comments are keyed under a post but are not removed with it.
#[derive(Clone)]
pub struct CommentService<C: CommentRepository + 'static, P: PostRepository + 'static> {
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentService<C, P>
where
    C: CommentRepository + 'static,
    P: PostRepository + 'static,
{
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }

    async fn ensure_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        match self.posts.find_by_id(post_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::PostNotFound(post_id)),
        }
    }

    /// Newest first.
    pub async fn list(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.ensure_post(post_id).await?;
        self.comments.list_for_post(post_id).await
    }

    #[instrument(skip(self, content))]
    pub async fn add(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        username: String,
        content: String,
    ) -> Result<Comment, DomainError> {
        if content.chars().count() < COMMENT_MIN_CHARS {
            return Err(DomainError::Validation {
                field: "content",
                message: "comment must be at least 2 characters",
            });
        }
        self.ensure_post(post_id).await?;
        self.comments
            .create(Comment::new(post_id, author_id, username, content))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        author_id: Uuid,
    ) -> Result<(), DomainError> {
        self.comments.delete(post_id, comment_id, author_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::{MemoryCommentRepository, MemoryPostRepository};
    use crate::domain::post::Post;

    struct Fixture {
        service: CommentService<MemoryCommentRepository, MemoryPostRepository>,
        posts: Arc<MemoryPostRepository>,
        post: Post,
    }

    async fn fixture() -> Fixture {
        let posts = Arc::new(MemoryPostRepository::default());
        let post = posts
            .create(Post::new(
                Uuid::new_v4(),
                "kim@example.com".into(),
                "title".into(),
                "body".into(),
            ))
            .await
            .unwrap();
        let service = CommentService::new(
            Arc::new(MemoryCommentRepository::default()),
            Arc::clone(&posts),
        );
        Fixture {
            service,
            posts,
            post,
        }
    }

    #[tokio::test]
    async fn add_then_list_newest_first() {
        let f = fixture().await;
        let author = Uuid::new_v4();
        f.service
            .add(f.post.id, author, "lee".into(), "first".into())
            .await
            .unwrap();
        f.service
            .add(f.post.id, author, "lee".into(), "second".into())
            .await
            .unwrap();

        let contents: Vec<_> = f
            .service
            .list(f.post.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn one_character_comment_is_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .add(f.post.id, Uuid::new_v4(), "lee".into(), "a".into())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "content", .. }));
    }

    #[tokio::test]
    async fn comments_on_unknown_post_are_not_found() {
        let f = fixture().await;
        let err = f.service.list(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::PostNotFound(_)));
    }

    #[tokio::test]
    async fn only_author_may_delete() {
        let f = fixture().await;
        let author = Uuid::new_v4();
        let comment = f
            .service
            .add(f.post.id, author, "lee".into(), "hello".into())
            .await
            .unwrap();

        let err = f
            .service
            .delete(f.post.id, comment.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        f.service.delete(f.post.id, comment.id, author).await.unwrap();
        assert!(f.service.list(f.post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_outlive_their_post() {
        let f = fixture().await;
        let author = Uuid::new_v4();
        let comment = f
            .service
            .add(f.post.id, author, "lee".into(), "orphan".into())
            .await
            .unwrap();

        f.posts.delete_post(f.post.id, f.post.user_id).await.unwrap();

        // the listing is gated on the post, the row itself remains
        assert!(f.service.list(f.post.id).await.is_err());
        f.service.delete(f.post.id, comment.id, author).await.unwrap();
    }
}
