use tracing::{info, warn};

use crate::edit_guard::SaveError;
use crate::error::BoardClientError;
use crate::model::{CurrentUser, Post, PostDraft};
use crate::ownership::is_owner;
use crate::store::BoardStore;
use crate::validation::validate_post;

pub async fn publish_post<S: BoardStore + ?Sized>(
    store: &S,
    identity: Option<&CurrentUser>,
    draft: &PostDraft,
) -> Result<Post, SaveError> {
    if identity.is_none() {
        return Err(SaveError::Remote(BoardClientError::Unauthorized));
    }
    validate_post(&draft.title, &draft.content).map_err(SaveError::Invalid)?;
    let post = store.create_post(draft).await?;
    info!(post_id = %post.id, "post published");
    Ok(post)
}

/// Opens a post for reading, counting the view. If the counter cannot be
/// bumped the post is still shown.
pub async fn open_post<S: BoardStore + ?Sized>(
    store: &S,
    id: &str,
) -> Result<Post, BoardClientError> {
    match store.record_view(id).await {
        Ok(post) => Ok(post),
        Err(BoardClientError::NotFound) => Err(BoardClientError::NotFound),
        Err(err) => {
            warn!(post_id = %id, %err, "failed to count view");
            store.get_post(id).await?.ok_or(BoardClientError::NotFound)
        }
    }
}

/// Deletes a post the identity owns once `confirm` agrees. Returns whether
/// anything was deleted.
pub async fn delete_post<S: BoardStore + ?Sized>(
    store: &S,
    identity: Option<&CurrentUser>,
    post: &Post,
    confirm: impl FnOnce() -> bool,
) -> Result<bool, BoardClientError> {
    if !is_owner(identity, Some(&post.user_id)) {
        return Err(BoardClientError::Forbidden);
    }
    if !confirm() {
        return Ok(false);
    }
    store.delete_post(&post.id).await?;
    info!(post_id = %post.id, "post deleted");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn user(uid: &str) -> CurrentUser {
        CurrentUser {
            uid: uid.into(),
            email: format!("{uid}@example.com"),
        }
    }

    #[tokio::test]
    async fn published_post_lists_first() {
        let store = MemoryStore::signed_in(user("u1"));
        store.seed_post(&user("u1"), "old", "body");
        let draft = PostDraft {
            title: "new".into(),
            content: "body".into(),
        };
        let post = publish_post(&store, Some(&user("u1")), &draft).await.unwrap();
        assert_eq!(post.username, "u1@example.com");

        let posts = store.list_posts().await.unwrap();
        assert_eq!(posts[0].id, post.id);
    }

    #[tokio::test]
    async fn publishing_requires_identity_and_fields() {
        let store = MemoryStore::default();
        let draft = PostDraft {
            title: "t".into(),
            content: "c".into(),
        };
        assert!(matches!(
            publish_post(&store, None, &draft).await,
            Err(SaveError::Remote(BoardClientError::Unauthorized))
        ));
        assert!(matches!(
            publish_post(&store, Some(&user("u1")), &PostDraft::default()).await,
            Err(SaveError::Invalid(_))
        ));
        assert_eq!(store.calls("create_post"), 0);
    }

    #[tokio::test]
    async fn opening_counts_views() {
        let store = MemoryStore::default();
        let post = store.seed_post(&user("u1"), "t", "c");
        assert_eq!(open_post(&store, &post.id).await.unwrap().views, 1);
        assert_eq!(open_post(&store, &post.id).await.unwrap().views, 2);
        assert!(matches!(
            open_post(&store, "missing").await,
            Err(BoardClientError::NotFound)
        ));
    }

    #[tokio::test]
    async fn view_counter_failure_still_shows_post() {
        let store = MemoryStore::default();
        let post = store.seed_post(&user("u1"), "t", "c");
        store.fail_next("record_view");
        let shown = open_post(&store, &post.id).await.unwrap();
        assert_eq!(shown.id, post.id);
        assert_eq!(shown.views, 0);
    }

    #[tokio::test]
    async fn only_owner_deletes_after_confirming() {
        let store = MemoryStore::signed_in(user("u1"));
        let post = store.seed_post(&user("u1"), "t", "c");

        assert!(matches!(
            delete_post(&store, Some(&user("u2")), &post, || true).await,
            Err(BoardClientError::Forbidden)
        ));
        assert!(!delete_post(&store, Some(&user("u1")), &post, || false).await.unwrap());
        assert!(delete_post(&store, Some(&user("u1")), &post, || true).await.unwrap());
        assert!(store.list_posts().await.unwrap().is_empty());
    }
}
