use crate::core::error::AppError;
use crate::features::auth::JwtValidator;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        // Clients need the fingerprint to send it back in If-Match
        .expose_headers([header::ETAG]);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let authorized = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Basic "))
                .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
                .and_then(|decoded| String::from_utf8(decoded).ok())
                .is_some_and(|creds| creds == *credentials);

            if authorized {
                return Ok(next.run(req).await);
            }

            Err((
                StatusCode::UNAUTHORIZED,
                [(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Basic realm=\"Swagger UI\""),
                )],
                "Unauthorized",
            )
                .into_response())
        })
    }
}

pub async fn auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let user = validator.validate_token(token)?;
    tracing::debug!("Authenticated user {} as {}", user.user_id, user.role);

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Attach the caller when a valid bearer token is present, but let anonymous
/// requests through. Public read endpoints use this to decide masking.
pub async fn optional_auth_middleware(
    State(validator): State<Arc<JwtValidator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = token {
        // A presented but invalid token is still an error
        let user = validator.validate_token(&token)?;
        req.extensions_mut().insert(user);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AuthConfig;
    use crate::core::extractor::MaybeUser;
    use crate::features::auth::Claims;
    use axum::{routing::get, Router};
    use axum_test::TestServer;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::time::Duration;

    const SECRET: &str = "middleware-secret";

    fn validator() -> Arc<JwtValidator> {
        Arc::new(JwtValidator::new(&AuthConfig {
            jwt_secret: SECRET.to_string(),
            algorithm: Algorithm::HS256,
            jwt_leeway: Duration::from_secs(0),
        }))
    }

    fn bearer(role: &str) -> HeaderValue {
        let claims = Claims {
            sub: Uuid::now_v7(),
            email: "user@kehati.test".to_string(),
            role: role.to_string(),
            taman_kehati_id: None,
            exp: (chrono::Utc::now().timestamp() + 600) as u64,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
    }

    async fn whoami(MaybeUser(user): MaybeUser) -> String {
        user.map(|u| u.role.to_string())
            .unwrap_or_else(|| "anonymous".to_string())
    }

    fn protected() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(axum::middleware::from_fn_with_state(
                validator(),
                auth_middleware,
            ))
    }

    fn optional() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(axum::middleware::from_fn_with_state(
                validator(),
                optional_auth_middleware,
            ))
    }

    #[tokio::test]
    async fn test_protected_requires_header() {
        let server = TestServer::new(protected()).unwrap();
        server
            .get("/whoami")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_rejects_non_bearer() {
        let server = TestServer::new(protected()).unwrap();
        server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_accepts_valid_token() {
        let server = TestServer::new(protected()).unwrap();
        server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, bearer("admin_taman"))
            .await
            .assert_text("admin_taman");
    }

    #[tokio::test]
    async fn test_optional_allows_anonymous() {
        let server = TestServer::new(optional()).unwrap();
        server.get("/whoami").await.assert_text("anonymous");
        server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, bearer("viewer"))
            .await
            .assert_text("viewer");
    }

    #[tokio::test]
    async fn test_optional_rejects_bad_token() {
        let server = TestServer::new(optional()).unwrap();
        server
            .get("/whoami")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
