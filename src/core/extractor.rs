use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, ConnectInfo, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::model::{AuthenticatedUser, Role};

/// Custom JSON extractor that provides consistent error responses
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppJsonRejection;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(AppJsonRejection(rejection)),
        }
    }
}

pub struct AppJsonRejection(JsonRejection);

impl IntoResponse for AppJsonRejection {
    fn into_response(self) -> Response {
        let message = match self.0 {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
            JsonRejection::MissingJsonContentType(err) => {
                format!("Missing JSON content type: {}", err)
            }
            _ => "Failed to parse JSON body".to_string(),
        };

        AppError::BadRequest(message).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

/// Caller identity on routes where authentication is optional
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    pub fn role(&self) -> Option<Role> {
        self.0.as_ref().map(|u| u.role)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Optional `If-Match` conditional-write token.
///
/// An absent header means the client did not ask for a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IfMatch(pub Option<String>);

impl IfMatch {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for IfMatch
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(header::IF_MATCH) {
            None => Ok(IfMatch(None)),
            Some(value) => {
                let token = value
                    .to_str()
                    .map_err(|_| AppError::BadRequest("Invalid If-Match header".to_string()))?
                    .trim();
                Ok(IfMatch(Some(token.to_string())))
            }
        }
    }
}

/// Caller network details recorded in audit logs and page views
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        // Proxy headers are client-controlled; anything that is not an IP is ignored
        let parse_ip = |v: &str| v.trim().parse::<IpAddr>().ok();

        // First hop of X-Forwarded-For is the original client
        let ip_address = header_str("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .and_then(parse_ip)
            .or_else(|| header_str("x-real-ip").and_then(parse_ip))
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .map(|ip| ip.to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    async fn echo_if_match(if_match: IfMatch) -> String {
        if_match.0.unwrap_or_else(|| "<none>".to_string())
    }

    async fn echo_client(client: ClientInfo) -> String {
        format!(
            "{}|{}",
            client.ip_address.unwrap_or_default(),
            client.user_agent.unwrap_or_default()
        )
    }

    fn app() -> Router {
        Router::new()
            .route("/if-match", get(echo_if_match))
            .route("/client", get(echo_client))
    }

    #[tokio::test]
    async fn test_if_match_absent() {
        let server = TestServer::new(app()).unwrap();
        server.get("/if-match").await.assert_text("<none>");
    }

    #[tokio::test]
    async fn test_if_match_present() {
        let server = TestServer::new(app()).unwrap();
        server
            .get("/if-match")
            .add_header(header::IF_MATCH, HeaderValue::from_static("\"abc123\""))
            .await
            .assert_text("\"abc123\"");
    }

    #[tokio::test]
    async fn test_client_info_prefers_forwarded_for() {
        let server = TestServer::new(app()).unwrap();
        server
            .get("/client")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
            )
            .add_header(header::USER_AGENT, HeaderValue::from_static("kehati-test"))
            .await
            .assert_text("203.0.113.9|kehati-test");
    }

    #[tokio::test]
    async fn test_client_info_ignores_malformed_addresses() {
        let server = TestServer::new(app()).unwrap();
        let junk = "x".repeat(200);
        server
            .get("/client")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_str(&junk).unwrap(),
            )
            .add_header(
                HeaderName::from_static("x-real-ip"),
                HeaderValue::from_static("2001:db8::7"),
            )
            .await
            .assert_text("2001:db8::7|");

        server
            .get("/client")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_static("not-an-ip, 10.0.0.1"),
            )
            .await
            .assert_text("|");
    }
}
