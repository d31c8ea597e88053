mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;

use anyhow::Context;
use application::auth_service::AuthService;
use application::comment_service::CommentService;
use application::post_service::PostService;
use data::comment_repository::PostgresCommentRepository;
use data::post_repository::PostgresPostRepository;
use data::user_repository::PostgresUserRepository;
use infrastructure::config::AppConfig;
use infrastructure::database;
use infrastructure::logging::init_logging;
use infrastructure::security::JwtKeys;
use presentation::server::{Services, start_rest_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = database::connect(&config.database_url)
        .await
        .context("failed to prepare database")?;

    let user_repo = Arc::new(PostgresUserRepository::new(pool.clone()));
    let post_repo = Arc::new(PostgresPostRepository::new(pool.clone()));
    let comment_repo = Arc::new(PostgresCommentRepository::new(pool));

    let services = Services {
        auth: AuthService::new(
            user_repo,
            JwtKeys::new(config.jwt_secret.clone(), config.jwt_ttl_hours),
        ),
        posts: PostService::new(Arc::clone(&post_repo)),
        comments: CommentService::new(comment_repo, post_repo),
    };

    start_rest_server(config, services).await
}
