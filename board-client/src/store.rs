//! Seams to the hosted backend. The command line talks to it through
//! `BoardClientHttp`, the web front end through its own `gloo-net` client.

use async_trait::async_trait;

use crate::error::BoardClientError;
use crate::model::{Comment, CurrentUser, Post, PostDraft};
use crate::session::Session;

#[async_trait(?Send)]
pub trait BoardStore {
    /// Every post, newest first.
    async fn list_posts(&self) -> Result<Vec<Post>, BoardClientError>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>, BoardClientError>;
    async fn create_post(&self, draft: &PostDraft) -> Result<Post, BoardClientError>;
    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, BoardClientError>;
    async fn delete_post(&self, id: &str) -> Result<(), BoardClientError>;
    /// Bumps the view counter and returns the post as stored afterwards.
    async fn record_view(&self, id: &str) -> Result<Post, BoardClientError>;

    /// Comments under `post_id`, newest first.
    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, BoardClientError>;
    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, BoardClientError>;
    async fn delete_comment(&self, post_id: &str, comment_id: &str)
    -> Result<(), BoardClientError>;
}

#[async_trait(?Send)]
pub trait AuthClient {
    fn session(&self) -> &Session;

    async fn register(&self, email: &str, password: &str)
    -> Result<CurrentUser, BoardClientError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, BoardClientError>;

    /// Resolves a persisted token back into an identity. Clears the session
    /// when the backend no longer accepts it.
    async fn restore(&self) -> Result<Option<CurrentUser>, BoardClientError>;

    fn sign_out(&self) {
        self.session().clear();
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.session().current_user()
    }
}
