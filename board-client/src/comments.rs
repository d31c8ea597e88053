//! Comment section of a post.
//!
//! Every mutation is followed by a full re-fetch of the thread; there is no
//! optimistic insert and no merge. Two people commenting at once each see
//! whatever their last fetch returned. Fetches are numbered so that a slow,
//! older response can never overwrite a newer one.

use tracing::{debug, warn};

use crate::error::BoardClientError;
use crate::messages;
use crate::model::{Comment, CurrentUser};
use crate::ownership::is_owner;
use crate::store::BoardStore;
use crate::validation::validate_comment;

/// Issued by [`CommentThread::begin_fetch`]; only the latest ticket may
/// replace the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    post_id: String,
    comments: Vec<Comment>,
    issued: u64,
}

impl CommentThread {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            comments: Vec::new(),
            issued: 0,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn count_label(&self) -> String {
        messages::comment_count(self.comments.len())
    }

    /// Whether `identity` gets a delete button next to `comment`.
    pub fn can_delete(identity: Option<&CurrentUser>, comment: &Comment) -> bool {
        is_owner(identity, Some(&comment.user_id))
    }

    /// The comment box takes input only from a signed-in identity and only
    /// while no earlier submit is still in flight.
    pub fn accepts_input(identity: Option<&CurrentUser>, submitting: bool) -> bool {
        identity.is_some() && !submitting
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Applies a fetch result. Returns false, leaving the list untouched,
    /// when a newer fetch has been issued since `ticket`.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, comments: Vec<Comment>) -> bool {
        if ticket.0 != self.issued {
            debug!(post_id = %self.post_id, "discarding stale comment fetch");
            return false;
        }
        self.comments = comments;
        true
    }

    pub async fn refresh<S: BoardStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<(), BoardClientError> {
        let ticket = self.begin_fetch();
        let comments = store.list_comments(&self.post_id).await.map_err(|err| {
            warn!(post_id = %self.post_id, %err, "failed to load comments");
            err
        })?;
        self.finish_fetch(ticket, comments);
        Ok(())
    }

    pub async fn submit<S: BoardStore + ?Sized>(
        &mut self,
        store: &S,
        identity: Option<&CurrentUser>,
        content: &str,
    ) -> Result<Comment, BoardClientError> {
        let comment = post_comment(store, &self.post_id, identity, content).await?;
        self.refresh_after_write(store).await;
        Ok(comment)
    }

    pub async fn delete<S: BoardStore + ?Sized>(
        &mut self,
        store: &S,
        identity: Option<&CurrentUser>,
        comment_id: &str,
        confirm: impl FnOnce() -> bool,
    ) -> Result<DeleteOutcome, BoardClientError> {
        let comment = self
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned()
            .ok_or(BoardClientError::NotFound)?;
        let outcome = remove_comment(store, &self.post_id, identity, &comment, confirm).await?;
        if outcome == DeleteOutcome::Deleted {
            self.refresh_after_write(store).await;
        }
        Ok(outcome)
    }

    /// The write already landed, so a failed re-fetch only leaves the list
    /// stale until the next one.
    async fn refresh_after_write<S: BoardStore + ?Sized>(&mut self, store: &S) {
        if self.refresh(store).await.is_err() {
            warn!(post_id = %self.post_id, "comment saved but the list was not reloaded");
        }
    }
}

/// Validates and stores a new comment. Nothing reaches the store when the
/// content is rejected or nobody is signed in.
pub async fn post_comment<S: BoardStore + ?Sized>(
    store: &S,
    post_id: &str,
    identity: Option<&CurrentUser>,
    content: &str,
) -> Result<Comment, BoardClientError> {
    if identity.is_none() {
        return Err(BoardClientError::Unauthorized);
    }
    validate_comment(content)?;
    store.add_comment(post_id, content).await.map_err(|err| {
        warn!(%post_id, %err, "failed to add comment");
        err
    })
}

/// Deletes `comment` after `confirm` agrees. Refuses comments the identity
/// does not own before asking.
pub async fn remove_comment<S: BoardStore + ?Sized>(
    store: &S,
    post_id: &str,
    identity: Option<&CurrentUser>,
    comment: &Comment,
    confirm: impl FnOnce() -> bool,
) -> Result<DeleteOutcome, BoardClientError> {
    if !CommentThread::can_delete(identity, comment) {
        return Err(BoardClientError::Forbidden);
    }
    if !confirm() {
        return Ok(DeleteOutcome::Cancelled);
    }
    store
        .delete_comment(post_id, &comment.id)
        .await
        .map_err(|err| {
            warn!(%post_id, comment_id = %comment.id, %err, "failed to delete comment");
            err
        })?;
    Ok(DeleteOutcome::Deleted)
}
