//! Access check for the post edit form.
//!
//! The decision is made before any form exists: callers render the form only
//! for [`EditGate::Editable`], and otherwise redirect straight away.

use thiserror::Error;
use tracing::{info, warn};

use crate::error::BoardClientError;
use crate::model::{CurrentUser, Post, PostDraft};
use crate::ownership::is_owner;
use crate::store::BoardStore;
use crate::validation::{FieldError, validate_post};

#[derive(Debug, Clone, PartialEq)]
pub enum EditGate {
    /// The identity owns the post; the form may be shown.
    Editable(Post),
    /// No such post. Alert, then go back to the list.
    NotFound,
    /// Someone else's post, or nobody signed in. Go back one step.
    Denied,
}

pub fn edit_gate(identity: Option<&CurrentUser>, post: Option<Post>) -> EditGate {
    match post {
        None => EditGate::NotFound,
        Some(post) if is_owner(identity, Some(&post.user_id)) => EditGate::Editable(post),
        Some(_) => EditGate::Denied,
    }
}

pub async fn load_edit_gate<S: BoardStore + ?Sized>(
    store: &S,
    identity: Option<&CurrentUser>,
    post_id: &str,
) -> Result<EditGate, BoardClientError> {
    let post = store.get_post(post_id).await.map_err(|err| {
        warn!(%post_id, %err, "failed to load post for editing");
        err
    })?;
    let gate = edit_gate(identity, post);
    if gate == EditGate::Denied {
        info!(%post_id, "edit refused: not the owner");
    }
    Ok(gate)
}

/// Why a save did not happen.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("{}", .0.first().map(|e| e.message).unwrap_or_default())]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Remote(#[from] BoardClientError),
}

/// Saves `draft` over `post`, re-checking ownership first.
pub async fn save_edit<S: BoardStore + ?Sized>(
    store: &S,
    identity: Option<&CurrentUser>,
    post: &Post,
    draft: &PostDraft,
) -> Result<Post, SaveError> {
    if !is_owner(identity, Some(&post.user_id)) {
        return Err(SaveError::Remote(BoardClientError::Forbidden));
    }
    validate_post(&draft.title, &draft.content).map_err(SaveError::Invalid)?;
    let updated = store.update_post(&post.id, draft).await?;
    info!(post_id = %updated.id, "post updated");
    Ok(updated)
}
