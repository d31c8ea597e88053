//! In-memory `BoardStore` for unit tests.
//!
//! Behaves like the REST backend: newest first, ownership enforced on
//! mutations, comments kept per post and not removed with their post.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::BoardClientError;
use crate::model::{Comment, CurrentUser, Post, PostDraft};
use crate::store::BoardStore;

#[derive(Default)]
struct Inner {
    next_id: u64,
    // insertion order; listing walks it backwards
    posts: Vec<Post>,
    comments: BTreeMap<String, Vec<Comment>>,
    calls: BTreeMap<&'static str, usize>,
    failing: HashSet<&'static str>,
}

#[derive(Default)]
pub struct MemoryStore {
    identity: RefCell<Option<CurrentUser>>,
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn signed_in(user: CurrentUser) -> Self {
        let store = Self::default();
        store.sign_in_as(Some(user));
        store
    }

    pub fn sign_in_as(&self, user: Option<CurrentUser>) {
        *self.identity.borrow_mut() = user;
    }

    pub fn seed_post(&self, owner: &CurrentUser, title: &str, content: &str) -> Post {
        let mut inner = self.inner.borrow_mut();
        let post = Post {
            id: next_id(&mut inner, "post"),
            user_id: owner.uid.clone(),
            username: owner.email.clone(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            views: 0,
        };
        inner.posts.push(post.clone());
        post
    }

    pub fn seed_comment(&self, post_id: &str, author: &CurrentUser, content: &str) -> Comment {
        let mut inner = self.inner.borrow_mut();
        let comment = Comment {
            id: next_id(&mut inner, "comment"),
            user_id: author.uid.clone(),
            username: author.email.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner
            .comments
            .entry(post_id.to_string())
            .or_default()
            .push(comment.clone());
        comment
    }

    pub fn calls(&self, op: &str) -> usize {
        self.inner.borrow().calls.get(op).copied().unwrap_or(0)
    }

    /// The next call to `op` fails with a 500.
    pub fn fail_next(&self, op: &'static str) {
        self.inner.borrow_mut().failing.insert(op);
    }

    fn enter(&self, op: &'static str) -> Result<(), BoardClientError> {
        let mut inner = self.inner.borrow_mut();
        *inner.calls.entry(op).or_default() += 1;
        if inner.failing.remove(op) {
            return Err(BoardClientError::Http {
                status: 500,
                code: None,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }

    fn require_identity(&self) -> Result<CurrentUser, BoardClientError> {
        self.identity
            .borrow()
            .clone()
            .ok_or(BoardClientError::Unauthorized)
    }

    fn owned_post_index(&self, id: &str) -> Result<usize, BoardClientError> {
        let user = self.require_identity()?;
        let inner = self.inner.borrow();
        let index = inner
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(BoardClientError::NotFound)?;
        if inner.posts[index].user_id != user.uid {
            return Err(BoardClientError::Forbidden);
        }
        Ok(index)
    }
}

fn next_id(inner: &mut Inner, prefix: &str) -> String {
    inner.next_id += 1;
    format!("{prefix}-{}", inner.next_id)
}

#[async_trait(?Send)]
impl BoardStore for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<Post>, BoardClientError> {
        self.enter("list_posts")?;
        Ok(self.inner.borrow().posts.iter().rev().cloned().collect())
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, BoardClientError> {
        self.enter("get_post")?;
        Ok(self.inner.borrow().posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, BoardClientError> {
        self.enter("create_post")?;
        let user = self.require_identity()?;
        Ok(self.seed_post(&user, &draft.title, &draft.content))
    }

    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, BoardClientError> {
        self.enter("update_post")?;
        let index = self.owned_post_index(id)?;
        let mut inner = self.inner.borrow_mut();
        let post = &mut inner.posts[index];
        post.title = draft.title.clone();
        post.content = draft.content.clone();
        Ok(post.clone())
    }

    async fn delete_post(&self, id: &str) -> Result<(), BoardClientError> {
        self.enter("delete_post")?;
        let index = self.owned_post_index(id)?;
        self.inner.borrow_mut().posts.remove(index);
        Ok(())
    }

    async fn record_view(&self, id: &str) -> Result<Post, BoardClientError> {
        self.enter("record_view")?;
        let mut inner = self.inner.borrow_mut();
        let post = inner
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(BoardClientError::NotFound)?;
        post.views += 1;
        Ok(post.clone())
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, BoardClientError> {
        self.enter("list_comments")?;
        Ok(self
            .inner
            .borrow()
            .comments
            .get(post_id)
            .map(|c| c.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, BoardClientError> {
        self.enter("add_comment")?;
        let user = self.require_identity()?;
        Ok(self.seed_comment(post_id, &user, content))
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), BoardClientError> {
        self.enter("delete_comment")?;
        let user = self.require_identity()?;
        let mut inner = self.inner.borrow_mut();
        let comments = inner
            .comments
            .get_mut(post_id)
            .ok_or(BoardClientError::NotFound)?;
        let index = comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(BoardClientError::NotFound)?;
        if comments[index].user_id != user.uid {
            return Err(BoardClientError::Forbidden);
        }
        comments.remove(index);
        Ok(())
    }
}
