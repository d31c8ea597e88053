//! In-memory repositories for service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::presentation::dto::UpdatePostRequest;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.lock().unwrap();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }
}

/// Posts in insertion order; listing walks them newest first.
#[derive(Default)]
pub struct MemoryPostRepository {
    posts: Mutex<Vec<Post>>,
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let posts = self.posts.lock().unwrap();
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update_post(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: UpdatePostRequest,
    ) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            post.title = title;
        }
        if let Some(content) = update.content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let mut posts = self.posts.lock().unwrap();
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(DomainError::PostNotFound(id))?;
        if posts[index].user_id != user_id {
            return Err(DomainError::Forbidden);
        }
        posts.remove(index);
        Ok(())
    }

    async fn get_posts(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Post>, DomainError> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .rev()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.views += 1;
            p.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryCommentRepository {
    comments: Mutex<Vec<Comment>>,
}

#[async_trait]
impl CommentRepository for MemoryCommentRepository {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn find(&self, post_id: Uuid, id: Uuid) -> Result<Option<Comment>, DomainError> {
        let comments = self.comments.lock().unwrap();
        Ok(comments
            .iter()
            .find(|c| c.post_id == post_id && c.id == id)
            .cloned())
    }

    async fn delete(&self, post_id: Uuid, id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let mut comments = self.comments.lock().unwrap();
        let index = comments
            .iter()
            .position(|c| c.post_id == post_id && c.id == id)
            .ok_or(DomainError::CommentNotFound(id))?;
        if comments[index].user_id != user_id {
            return Err(DomainError::Forbidden);
        }
        comments.remove(index);
        Ok(())
    }
}
