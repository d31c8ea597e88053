use crate::application::auth_service::{AuthService, IssuedToken};
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::presentation::middleware::require_bearer;
use crate::presentation::utils::AuthenticatedUser;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, Scope, post, web};
use tracing::info;

type Auth = web::Data<AuthService<PostgresUserRepository>>;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(
            web::resource("/me")
                .wrap(from_fn(require_bearer))
                .route(web::get().to(me)),
        )
}

fn token_response(service: &Auth, issued: IssuedToken) -> AuthResponse {
    AuthResponse {
        access_token: issued.token,
        expires_in: service.keys().expires_in(),
        token_type: "Bearer".to_string(),
        user: UserResponse::from(issued.user),
    }
}

#[post("/register")]
async fn register(
    service: Auth,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, DomainError> {
    let issued = service.register(&payload.email, &payload.password).await?;

    info!(user_id = %issued.user.id, "user registered");

    Ok(HttpResponse::Created().json(token_response(&service, issued)))
}

#[post("/login")]
async fn login(
    service: Auth,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, DomainError> {
    let issued = service.login(&payload.email, &payload.password).await?;

    info!(user_id = %issued.user.id, "user logged in");

    Ok(HttpResponse::Ok().json(token_response(&service, issued)))
}

async fn me(user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse {
        uid: user.id,
        email: user.email,
    })
}
