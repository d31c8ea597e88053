use crate::error::BoardClientError;
use crate::model::{Comment, CurrentUser, Post, PostDraft};
use crate::session::Session;
use crate::store::{AuthClient, BoardStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct BoardClientHttp {
    client: Client,
    base_url: String,
    session: Session,
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
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String,
    pub user: CurrentUser,
}

impl BoardClientHttp {
    pub fn connect(endpoint: &str, session: Session) -> Result<Self, BoardClientError> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder, BoardClientError> {
        let token = self.session.token().ok_or(BoardClientError::Unauthorized)?;
        Ok(req.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, BoardClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            Ok(resp.json().await?)
        } else {
            Err(BoardClientError::from_http_response(resp).await)
        }
    }

    async fn send_empty(req: RequestBuilder) -> Result<(), BoardClientError> {
        let resp = req.send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(BoardClientError::from_http_response(resp).await)
        }
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, BoardClientError> {
        let req = self.client.post(self.url(path)).json(&json!({
            "email": email,
            "password": password,
        }));
        let auth: AuthResponse = Self::send(req).await?;
        debug!(expires_in = auth.expires_in, "received access token");
        self.session.establish(auth.access_token, auth.user.clone());
        Ok(auth.user)
    }
}

#[async_trait(?Send)]
impl BoardStore for BoardClientHttp {
    async fn list_posts(&self) -> Result<Vec<Post>, BoardClientError> {
        let resp: PostsResponse = Self::send(self.client.get(self.url("/posts"))).await?;
        Ok(resp.posts)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>, BoardClientError> {
        match Self::send::<Post>(self.client.get(self.url(&format!("/posts/{id}")))).await {
            Ok(post) => Ok(Some(post)),
            Err(BoardClientError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn create_post(&self, draft: &PostDraft) -> Result<Post, BoardClientError> {
        let req = self.authorized(self.client.post(self.url("/posts")))?;
        Self::send(req.json(draft)).await
    }

    async fn update_post(&self, id: &str, draft: &PostDraft) -> Result<Post, BoardClientError> {
        let req = self.authorized(self.client.put(self.url(&format!("/posts/{id}"))))?;
        Self::send(req.json(draft)).await
    }

    async fn delete_post(&self, id: &str) -> Result<(), BoardClientError> {
        let req = self.authorized(self.client.delete(self.url(&format!("/posts/{id}"))))?;
        Self::send_empty(req).await
    }

    async fn record_view(&self, id: &str) -> Result<Post, BoardClientError> {
        Self::send(self.client.post(self.url(&format!("/posts/{id}/views")))).await
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>, BoardClientError> {
        let url = self.url(&format!("/posts/{post_id}/comments"));
        let resp: CommentsResponse = Self::send(self.client.get(url)).await?;
        Ok(resp.comments)
    }

    async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, BoardClientError> {
        let url = self.url(&format!("/posts/{post_id}/comments"));
        let req = self.authorized(self.client.post(url))?;
        Self::send(req.json(&json!({ "content": content }))).await
    }

    async fn delete_comment(
        &self,
        post_id: &str,
        comment_id: &str,
    ) -> Result<(), BoardClientError> {
        let url = self.url(&format!("/posts/{post_id}/comments/{comment_id}"));
        let req = self.authorized(self.client.delete(url))?;
        Self::send_empty(req).await
    }
}

#[async_trait(?Send)]
impl AuthClient for BoardClientHttp {
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
        let user = self.authenticate("/auth/login", email, password).await?;
        info!(uid = %user.uid, "signed in");
        Ok(user)
    }

    async fn restore(&self) -> Result<Option<CurrentUser>, BoardClientError> {
        if self.session.token().is_none() {
            return Ok(None);
        }
        let req = self.authorized(self.client.get(self.url("/auth/me")))?;
        let resp = req.send().await?;
        match resp.status() {
            status if status.is_success() => {
                let user: CurrentUser = resp.json().await?;
                self.session.resume(user.clone());
                Ok(Some(user))
            }
            StatusCode::UNAUTHORIZED => {
                warn!("stored token rejected, signing out");
                self.session.clear();
                Ok(None)
            }
            _ => Err(BoardClientError::from_http_response(resp).await),
        }
    }
}
