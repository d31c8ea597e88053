use crate::application::post_service::PostService;
use crate::data::post_repository::PostgresPostRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{
    CreatePostRequest, ListPostsQuery, ListPostsResponse, UpdatePostRequest,
};
use crate::presentation::utils::{AuthenticatedUser, ensure_owner, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::info;
use uuid::Uuid;

type Posts = web::Data<PostService<PostgresPostRepository>>;

#[post("/posts")]
async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse, DomainError> {
    let CreatePostRequest { title, content } = payload.into_inner();
    // display name is derived from the email at write time
    let post = posts
        .create_post(user.id, user.email.clone(), title, content)
        .await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post.id,
        "post created"
    );

    Ok(HttpResponse::Created().json(post))
}

#[put("/posts/{id}")]
async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    payload: web::Json<UpdatePostRequest>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let existing = posts.get_post(post_id).await?;
    ensure_owner(&existing.user_id, &user.id)?;

    let post = posts.update_post(user.id, post_id, payload.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post.id,
        "post updated"
    );

    Ok(HttpResponse::Ok().json(post))
}

#[delete("/posts/{id}")]
async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: Posts,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let existing = posts.get_post(post_id).await?;
    ensure_owner(&existing.user_id, &user.id)?;

    posts.delete_post(user.id, post_id).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post_id,
        "post deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}

#[get("/posts")]
async fn get_posts(
    req: HttpRequest,
    posts: Posts,
    query: web::Query<ListPostsQuery>,
) -> Result<HttpResponse, DomainError> {
    let ListPostsQuery { limit, offset } = query.into_inner();
    let posts = posts.get_posts(limit, offset).await?;

    info!(
        request_id = %request_id(&req),
        count = posts.len(),
        "posts retrieved"
    );

    Ok(HttpResponse::Ok().json(ListPostsResponse {
        total: posts.len(),
        posts,
    }))
}

#[get("/posts/{id}")]
async fn get_post(posts: Posts, path: web::Path<Uuid>) -> Result<HttpResponse, DomainError> {
    let post = posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

#[post("/posts/{id}/views")]
async fn record_view(posts: Posts, path: web::Path<Uuid>) -> Result<HttpResponse, DomainError> {
    let post = posts.record_view(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}
