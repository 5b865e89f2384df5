use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::regions::models::{Region, RegionLevel};

/// Query parameters for searching regions
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct RegionSearchQuery {
    /// Search by name or code (case-insensitive, partial match)
    #[param(example = "jawa")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegionResponseDto {
    pub id: i32,
    pub kode: String,
    pub nama: String,
    pub level: RegionLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keterangan: Option<String>,
}

impl RegionResponseDto {
    pub fn from_region(region: Region, level: RegionLevel) -> Self {
        Self {
            id: region.id,
            kode: region.kode,
            nama: region.nama,
            level,
            parent_id: region.parent_id,
            keterangan: region.keterangan,
        }
    }
}
