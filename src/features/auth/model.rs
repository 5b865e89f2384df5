use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::{ROLE_ADMIN_TAMAN, ROLE_SUPER_ADMIN, ROLE_VIEWER};

/// Capability level of a caller, matching the `userroleenum` database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "userroleenum", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    AdminTaman,
    Viewer,
}

impl Role {
    pub const ALL: [Self; 3] = [Role::SuperAdmin, Role::AdminTaman, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => ROLE_SUPER_ADMIN,
            Role::AdminTaman => ROLE_ADMIN_TAMAN,
            Role::Viewer => ROLE_VIEWER,
        }
    }

    /// Administrative roles always see unmasked coordinates
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::AdminTaman)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_SUPER_ADMIN => Ok(Role::SuperAdmin),
            ROLE_ADMIN_TAMAN => Ok(Role::AdminTaman),
            ROLE_VIEWER => Ok(Role::Viewer),
            other => Err(AppError::Unauthorized(format!("Unknown role: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Garden managed by an `admin_taman` account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taman_kehati_id: Option<i32>,
}

impl AuthenticatedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// super_admin or admin_taman
    pub fn has_admin_access(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether the caller may modify records belonging to the given garden
    pub fn can_manage_taman(&self, taman_kehati_id: i32) -> bool {
        match self.role {
            Role::SuperAdmin => true,
            Role::AdminTaman => self.taman_kehati_id == Some(taman_kehati_id),
            Role::Viewer => false,
        }
    }

    pub fn ensure_taman_access(&self, taman_kehati_id: i32) -> Result<(), AppError> {
        if self.can_manage_taman(taman_kehati_id) {
            Ok(())
        } else {
            tracing::warn!(
                "User {} ({}) denied access to taman_kehati {}",
                self.user_id,
                self.role,
                taman_kehati_id
            );
            Err(AppError::Forbidden(
                "You do not have access to this Taman Kehati".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, taman_kehati_id: Option<i32>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::now_v7(),
            email: "petugas@kehati.test".to_string(),
            role,
            taman_kehati_id,
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("admin_taman".parse::<Role>().unwrap(), Role::AdminTaman);
        assert_eq!("viewer".parse::<Role>().unwrap(), Role::Viewer);
        assert!("root".parse::<Role>().is_err());
        assert!("Viewer".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display_round_trip() {
        for role in [Role::SuperAdmin, Role::AdminTaman, Role::Viewer] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_super_admin_manages_every_taman() {
        let u = user(Role::SuperAdmin, None);
        assert!(u.can_manage_taman(1));
        assert!(u.can_manage_taman(999));
    }

    #[test]
    fn test_admin_taman_scoped_to_own_taman() {
        let u = user(Role::AdminTaman, Some(7));
        assert!(u.can_manage_taman(7));
        assert!(!u.can_manage_taman(8));
        assert!(u.ensure_taman_access(8).is_err());

        let unassigned = user(Role::AdminTaman, None);
        assert!(!unassigned.can_manage_taman(7));
    }

    #[test]
    fn test_viewer_never_manages() {
        let u = user(Role::Viewer, Some(7));
        assert!(!u.can_manage_taman(7));
        assert!(!u.has_admin_access());
    }
}
