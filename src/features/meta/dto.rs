use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::model::Role;
use crate::shared::enums::{MediaCategory, MediaType, StatusEndemik, StatusPublikasi, TipeTaman};

/// Every accepted value of the enumerated fields, in declaration order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetaEnumsDto {
    pub status_publikasi: Vec<StatusPublikasi>,
    pub status_endemik: Vec<StatusEndemik>,
    pub media_type: Vec<MediaType>,
    pub media_category: Vec<MediaCategory>,
    pub tipe_taman: Vec<TipeTaman>,
    pub user_role: Vec<Role>,
}

impl Default for MetaEnumsDto {
    fn default() -> Self {
        Self {
            status_publikasi: StatusPublikasi::ALL.to_vec(),
            status_endemik: StatusEndemik::ALL.to_vec(),
            media_type: MediaType::ALL.to_vec(),
            media_category: MediaCategory::ALL.to_vec(),
            tipe_taman: TipeTaman::ALL.to_vec(),
            user_role: Role::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lists_database_labels() {
        let value = serde_json::to_value(MetaEnumsDto::default()).unwrap();
        assert_eq!(value["status_publikasi"], json!(["draft", "published", "archived"]));
        assert_eq!(value["media_type"], json!(["foto", "video"]));
        assert_eq!(value["user_role"], json!(["super_admin", "admin_taman", "viewer"]));
        assert_eq!(value["tipe_taman"].as_array().unwrap().len(), 6);
        assert_eq!(value["media_category"][0], "taman_umum");
        assert_eq!(value["status_endemik"][2], "tidak_diketahui");
    }
}
