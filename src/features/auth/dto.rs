use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::model::{AuthenticatedUser, Role};

/// DTO for /auth/me response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub taman_kehati_id: Option<i32>,
    /// Whether coordinates are returned unmasked for this caller
    pub sees_exact_coordinates: bool,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.user_id,
            email: user.email,
            sees_exact_coordinates: user.role.is_admin(),
            role: user.role,
            taman_kehati_id: user.taman_kehati_id,
        }
    }
}
