//! Role-based authorization guards for the application.
//!
//! These guards extract the authenticated user and verify they have the required role.
//!
//! Roles (from highest to lowest):
//! - super_admin: manages every Taman Kehati and reads audit logs
//! - admin_taman: manages the single Taman Kehati assigned to the account
//! - viewer: read-only, receives masked coordinates
//!
//! Garden scoping for admin_taman is checked in the services via
//! `AuthenticatedUser::ensure_taman_access`, since the garden id usually comes
//! from the stored record rather than the request.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn authenticated(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for checking if user is super admin.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireSuperAdmin(user): RequireSuperAdmin) { ... }
/// ```
pub struct RequireSuperAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super admin access required".to_string(),
            ));
        }

        Ok(RequireSuperAdmin(user.clone()))
    }
}

/// Guard for write operations on garden data.
///
/// Allows "super_admin" and "admin_taman".
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = authenticated(parts)?;

        if !user.has_admin_access() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::Role;
    use crate::shared::test_helpers::{create_user, with_user};
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    async fn super_only(RequireSuperAdmin(user): RequireSuperAdmin) -> String {
        user.role.to_string()
    }

    async fn admin_only(RequireAdmin(user): RequireAdmin) -> String {
        user.role.to_string()
    }

    fn app() -> Router {
        Router::new()
            .route("/super", get(super_only))
            .route("/admin", get(admin_only))
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        let server = TestServer::new(app()).unwrap();
        server.get("/admin").await.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_viewer_is_forbidden() {
        let server = TestServer::new(with_user(app(), create_user(Role::Viewer, None))).unwrap();
        server.get("/admin").await.assert_status(StatusCode::FORBIDDEN);
        server.get("/super").await.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_taman_is_admin_but_not_super() {
        let server =
            TestServer::new(with_user(app(), create_user(Role::AdminTaman, Some(1)))).unwrap();
        server.get("/admin").await.assert_text("admin_taman");
        server.get("/super").await.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_super_admin_passes_both() {
        let server =
            TestServer::new(with_user(app(), create_user(Role::SuperAdmin, None))).unwrap();
        server.get("/admin").await.assert_status_ok();
        server.get("/super").await.assert_text("super_admin");
    }
}
