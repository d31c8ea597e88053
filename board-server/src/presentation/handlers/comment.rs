use crate::application::comment_service::CommentService;
use crate::data::comment_repository::PostgresCommentRepository;
use crate::data::post_repository::PostgresPostRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CreateCommentRequest, ListCommentsResponse};
use crate::presentation::utils::{AuthenticatedUser, request_id};
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use tracing::info;
use uuid::Uuid;

type Comments = web::Data<CommentService<PostgresCommentRepository, PostgresPostRepository>>;

#[get("/posts/{id}/comments")]
async fn list_comments(
    comments: Comments,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comments = comments.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ListCommentsResponse {
        total: comments.len(),
        comments,
    }))
}

#[post("/posts/{id}/comments")]
async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: Comments,
    path: web::Path<Uuid>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    let comment = comments
        .add(post_id, user.id, user.email, payload.into_inner().content)
        .await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post_id,
        comment_id = %comment.id,
        "comment added"
    );

    Ok(HttpResponse::Created().json(comment))
}

#[delete("/posts/{id}/comments/{comment_id}")]
async fn delete_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: Comments,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (post_id, comment_id) = path.into_inner();
    comments.delete(post_id, comment_id, user.id).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post_id,
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
