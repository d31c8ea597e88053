//! Request tracing and bearer-token checks for the board API, written as
//! `from_fn` middleware.

use std::time::Instant;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{Error, HttpMessage, web};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::data::user_repository::PostgresUserRepository;
use crate::domain::error::DomainError;
use crate::presentation::utils::{AuthenticatedUser, extract_user_from_token};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const TIMING_HEADER: HeaderName = HeaderName::from_static("server-timing");

#[derive(Clone)]
pub struct RequestId(pub String);

/// Tags every request with an id (the caller's `x-request-id`, or a fresh
/// one) and logs the outcome against the post and account it touched.
pub async fn trace_request(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let started = Instant::now();
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(request_id.clone()));
    let method = req.method().clone();

    let mut res = next.call(req).await?;
    let elapsed_ms = started.elapsed().as_millis();

    {
        let request = res.request();
        let route = request
            .match_pattern()
            .unwrap_or_else(|| request.path().to_owned());
        // every route names its post segment `id`
        let post_id = request.match_info().get("id");
        let user_id = request
            .extensions()
            .get::<AuthenticatedUser>()
            .map(|user| user.id);
        let status = res.status();
        let status_code = status.as_u16();
        if status.is_server_error() {
            warn!(
                %request_id, %method, %route, post_id, ?user_id,
                status = status_code, elapsed_ms, "board request failed"
            );
        } else {
            info!(
                %request_id, %method, %route, post_id, ?user_id,
                status = status_code, elapsed_ms, "board request"
            );
        }
    }

    let headers = res.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("app;dur={elapsed_ms}")) {
        headers.insert(TIMING_HEADER, value);
    }
    Ok(res)
}

/// Lets a request through only with a bearer token that still resolves to an
/// account. The account lands in the request extensions for
/// [`AuthenticatedUser`] to pick up.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_owned);
    let Some(token) = token else {
        debug!(path = %req.path(), "write attempted without a bearer token");
        return Err(DomainError::Unauthorized.into());
    };

    let auth = req
        .app_data::<web::Data<AuthService<PostgresUserRepository>>>()
        .cloned()
        .ok_or_else(|| DomainError::Internal("auth service not registered".into()))?;

    let user = extract_user_from_token(&token, auth.keys(), auth.get_ref()).await?;
    req.extensions_mut().insert(user);
    next.call(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, test};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[actix_rt::test]
    async fn caller_request_id_is_echoed() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(trace_request))
                .route("/api/posts/{id}", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/posts/42")
            .insert_header(("x-request-id", "req-7"))
            .to_request();
        let res = test::call_service(&app, req).await;
        let id = res.headers().get(&REQUEST_ID_HEADER).unwrap();
        assert_eq!(id.to_str().unwrap(), "req-7");
        assert!(res.headers().contains_key("server-timing"));
    }

    #[actix_rt::test]
    async fn fresh_request_id_when_none_sent() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(trace_request))
                .route("/api/health", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let res = test::call_service(&app, req).await;
        let id = res.headers().get(&REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[actix_rt::test]
    async fn write_without_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(require_bearer))
                .route("/api/posts", web::post().to(ok)),
        )
        .await;

        let req = test::TestRequest::post().uri("/api/posts").to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
