use crate::error::{from_response, storage, transport};
use async_trait::async_trait;
use board_client::{
    AuthClient, BoardClientError, BoardStore, Comment, CurrentUser, Post, PostDraft,
    PreferenceStore, Session,
};
use gloo_net::http::{Request, RequestBuilder};
use gloo_storage::{LocalStorage, Storage};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use tracing::{info, warn};

/// Preferences in the browser's local storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoragePreferences;

impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BoardClientError> {
        LocalStorage::set(key, value).map_err(storage)
    }

    fn remove(&self, key: &str) -> Result<(), BoardClientError> {
        LocalStorage::delete(key);
        Ok(())
    }
}

#[derive(Clone)]
pub struct BoardClientWeb {
    base_url: String,
    session: Session,
}

impl PartialEq for BoardClientWeb {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url
    }
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    user: CurrentUser,
}

impl BoardClientWeb {
    pub fn new(endpoint: &str, session: Session) -> Self {
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, BoardClientError> {
        let token = self.session.token().ok_or(BoardClientError::Unauthorized)?;
        Ok(builder.header("Authorization", &format!("Bearer {token}")))
    }

    async fn send<T: DeserializeOwned>(request: Request) -> Result<T, BoardClientError> {
        let response = request.send().await.map_err(transport)?;
        if response.ok() {
            response.json().await.map_err(transport)
        } else {
            Err(from_response(response).await)
        }
    }

    async fn send_empty(request: Request) -> Result<(), BoardClientError> {
        let response = request.send().await.map_err(transport)?;
        if response.ok() {
            Ok(())
        } else {
            Err(from_response(response).await)
        }
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, BoardClientError> {
        let request = Request::post(&self.url(path))
            .json(&json!({ "email": email, "password": password }))
            .map_err(transport)?;
        let auth: AuthResponse = Self::send(request).await?;
        self.session.establish(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }
}

#[async_trait(?Send)]
impl BoardStore for BoardClientWeb {
    async fn list_posts(&self) -> Result<Vec<Post>, BoardClientError> {
        let request = Request::get(&self.url("/posts")).build().map_err(transport)?;
        let resp: PostsResponse = Self::send(request).await?;
        Ok(resp.posts)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, BoardClientError> {
        let request = Request::get(&self.url(&format!("/posts/{id}")))
            .build()
            .map_err(transport)?;
        match Self::send::<Post>(request).await {
            Ok(post) => Ok(Some(post)),
            Err(BoardClientError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, BoardClientError> {
        let request = self
            .authorized(Request::post(&self.url("/posts")))?
            .json(draft)
            .map_err(transport)?;
        Self::send(request).await
    }

    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, BoardClientError> {
        let request = self
            .authorized(Request::put(&self.url(&format!("/posts/{id}"))))?
            .json(draft)
            .map_err(transport)?;
        Self::send(request).await
    }

    async fn delete_post(&self, id: &str) -> Result<(), BoardClientError> {
        let request = self
            .authorized(Request::delete(&self.url(&format!("/posts/{id}"))))?
            .build()
            .map_err(transport)?;
        Self::send_empty(request).await
    }

    async fn record_view(&self, id: &str) -> Result<Post, BoardClientError> {
        let request = Request::post(&self.url(&format!("/posts/{id}/views")))
            .build()
            .map_err(transport)?;
        Self::send(request).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, BoardClientError> {
        let request = Request::get(&self.url(&format!("/posts/{post_id}/comments")))
            .build()
            .map_err(transport)?;
        let resp: CommentsResponse = Self::send(request).await?;
        Ok(resp.comments)
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, BoardClientError> {
        let request = self
            .authorized(Request::post(&self.url(&format!("/posts/{post_id}/comments"))))?
            .json(&json!({ "content": content }))
            .map_err(transport)?;
        Self::send(request).await
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), BoardClientError> {
        let url = self.url(&format!("/posts/{post_id}/comments/{comment_id}"));
        let request = self
            .authorized(Request::delete(&url))?
            .build()
            .map_err(transport)?;
        Self::send_empty(request).await
    }
}

#[async_trait(?Send)]
impl AuthClient for BoardClientWeb {
    fn session(&self) -> &Session {
        &self.session
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, BoardClientError> {
        let user = self.authenticate("/auth/register", email, password).await?;
        info!(uid = %user.uid, "account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<CurrentUser, BoardClientError> {
        self.authenticate("/auth/login", email, password).await
    }

    async fn restore(&self) -> Result<Option<CurrentUser>, BoardClientError> {
        if self.session.token().is_none() {
            return Ok(None);
        }
        let request = self
            .authorized(Request::get(&self.url("/auth/me")))?
            .build()
            .map_err(transport)?;
        match Self::send::<CurrentUser>(request).await {
            Ok(user) => {
                self.session.resume(user.clone());
                Ok(Some(user))
            }
            Err(BoardClientError::Unauthorized) => {
                warn!("stored token rejected, signing out");
                self.session.clear();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
