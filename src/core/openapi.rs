use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::articles::{dtos as artikel_dtos, handlers as artikel_handlers, models as artikel_models};
use crate::features::audit::{dtos as audit_dtos, handlers as audit_handlers, models as audit_models};
use crate::features::auth;
use crate::features::collections::{
    dtos as koleksi_dtos, handlers as koleksi_handlers, models as koleksi_models,
};
use crate::features::gardens::{dtos as taman_dtos, handlers as taman_handlers};
use crate::features::media::{dtos as media_dtos, handlers as media_handlers, models as media_models};
use crate::features::meta;
use crate::features::regions::{dtos as regions_dtos, handlers as regions_handlers, models as regions_models};
use crate::features::search::{dtos as search_dtos, handlers as search_handlers};
use crate::features::views::{dtos as views_dtos, handlers as views_handlers};
use crate::features::zones::{dtos as zona_dtos, handlers as zona_handlers};
use crate::shared::enums::{MediaCategory, MediaType, StatusEndemik, StatusPublikasi, TipeTaman};
use crate::shared::geo_masking::Coordinate;
use crate::shared::geojson::{Feature, FeatureCollection};
use crate::shared::types::{ApiResponse, DeletedDto, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Regions
        regions_handlers::list_provinsi,
        regions_handlers::get_provinsi,
        regions_handlers::list_kabupaten_kota,
        regions_handlers::get_kabupaten_kota,
        regions_handlers::list_kecamatan,
        regions_handlers::get_kecamatan,
        regions_handlers::list_desa,
        regions_handlers::get_desa,
        // Taman Kehati
        taman_handlers::list_taman,
        taman_handlers::get_taman,
        taman_handlers::get_taman_geo,
        taman_handlers::get_taman_stats,
        taman_handlers::near_taman,
        taman_handlers::create_taman,
        taman_handlers::update_taman,
        taman_handlers::delete_taman,
        // Zona
        zona_handlers::list_zona,
        zona_handlers::get_zona,
        zona_handlers::get_zona_geo,
        zona_handlers::import_zona,
        zona_handlers::create_zona,
        zona_handlers::update_zona,
        zona_handlers::delete_zona,
        koleksi_handlers::list_zona_koleksi,
        // Koleksi
        koleksi_handlers::list_koleksi,
        koleksi_handlers::get_koleksi,
        koleksi_handlers::suggest_koleksi,
        koleksi_handlers::koleksi_stats,
        koleksi_handlers::koleksi_map_points,
        koleksi_handlers::koleksi_relations,
        media_handlers::list_koleksi_media,
        koleksi_handlers::create_koleksi,
        koleksi_handlers::update_koleksi,
        koleksi_handlers::delete_koleksi,
        // Export
        koleksi_handlers::export_geojson,
        koleksi_handlers::export_darwin_core,
        // Media
        media_handlers::upload_media,
        media_handlers::list_media,
        media_handlers::get_media,
        media_handlers::update_media,
        media_handlers::delete_media,
        // Artikel
        artikel_handlers::list_artikel,
        artikel_handlers::get_artikel,
        artikel_handlers::get_artikel_by_slug,
        artikel_handlers::related_artikel,
        artikel_handlers::create_artikel,
        artikel_handlers::update_artikel,
        artikel_handlers::publish_artikel,
        artikel_handlers::set_artikel_cover,
        artikel_handlers::delete_artikel,
        // Views
        views_handlers::track_view,
        views_handlers::view_series,
        views_handlers::top_views,
        // Search
        search_handlers::search,
        search_handlers::suggest,
        // Meta
        meta::handler::get_enums,
        // Audit
        audit_handlers::list_audit_logs,
    ),
    components(
        schemas(
            Meta,
            DeletedDto,
            ApiResponse<DeletedDto>,
            // Shared
            Coordinate,
            Feature,
            FeatureCollection,
            StatusPublikasi,
            TipeTaman,
            StatusEndemik,
            MediaType,
            MediaCategory,
            // Auth
            auth::model::Role,
            auth::dto::MeResponseDto,
            ApiResponse<auth::dto::MeResponseDto>,
            // Regions
            regions_models::RegionLevel,
            regions_dtos::RegionResponseDto,
            ApiResponse<regions_dtos::RegionResponseDto>,
            ApiResponse<Vec<regions_dtos::RegionResponseDto>>,
            // Taman Kehati
            taman_dtos::TamanKehatiResponseDto,
            taman_dtos::NearbyTamanDto,
            taman_dtos::TamanStatsDto,
            taman_dtos::CreateTamanKehatiDto,
            taman_dtos::UpdateTamanKehatiDto,
            ApiResponse<taman_dtos::TamanKehatiResponseDto>,
            ApiResponse<Vec<taman_dtos::TamanKehatiResponseDto>>,
            ApiResponse<Vec<taman_dtos::NearbyTamanDto>>,
            ApiResponse<taman_dtos::TamanStatsDto>,
            // Zona
            zona_dtos::ZonaResponseDto,
            zona_dtos::CreateZonaDto,
            zona_dtos::UpdateZonaDto,
            ApiResponse<zona_dtos::ZonaResponseDto>,
            ApiResponse<Vec<zona_dtos::ZonaResponseDto>>,
            // Koleksi
            koleksi_models::KoleksiTumbuhan,
            koleksi_models::StatsGroupBy,
            koleksi_dtos::KoleksiResponseDto,
            koleksi_dtos::StatsGroupDto,
            koleksi_dtos::KoleksiStatsDto,
            koleksi_dtos::KoleksiMapPointDto,
            koleksi_dtos::CreateKoleksiDto,
            koleksi_dtos::UpdateKoleksiDto,
            koleksi_models::RelatedArtikel,
            koleksi_dtos::KoleksiRelationsDto,
            ApiResponse<koleksi_dtos::KoleksiRelationsDto>,
            koleksi_dtos::DarwinCoreRecord,
            koleksi_dtos::DarwinCoreExportDto,
            ApiResponse<koleksi_dtos::KoleksiResponseDto>,
            ApiResponse<Vec<koleksi_dtos::KoleksiResponseDto>>,
            ApiResponse<Vec<String>>,
            ApiResponse<koleksi_dtos::KoleksiStatsDto>,
            ApiResponse<Vec<koleksi_dtos::KoleksiMapPointDto>>,
            ApiResponse<koleksi_dtos::DarwinCoreExportDto>,
            // Media
            media_models::Media,
            media_dtos::UploadMediaDto,
            media_dtos::UpdateMediaDto,
            media_dtos::MediaResponseDto,
            ApiResponse<media_dtos::MediaResponseDto>,
            ApiResponse<Vec<media_dtos::MediaResponseDto>>,
            // Artikel
            artikel_models::Artikel,
            artikel_dtos::CreateArtikelDto,
            artikel_dtos::UpdateArtikelDto,
            artikel_dtos::SetCoverDto,
            ApiResponse<artikel_models::Artikel>,
            ApiResponse<Vec<artikel_models::Artikel>>,
            // Views
            views_dtos::TrackViewDto,
            views_dtos::TrackedViewDto,
            views_dtos::ViewEntity,
            views_dtos::TopEntity,
            views_dtos::ViewRange,
            views_dtos::ViewInterval,
            views_dtos::SeriesPointDto,
            views_dtos::ViewSeriesDto,
            views_dtos::TopViewDto,
            ApiResponse<views_dtos::TrackedViewDto>,
            ApiResponse<views_dtos::ViewSeriesDto>,
            ApiResponse<Vec<views_dtos::TopViewDto>>,
            // Search
            search_dtos::SearchEntity,
            search_dtos::SearchResultDto,
            search_dtos::SearchResponseDto,
            ApiResponse<search_dtos::SearchResponseDto>,
            // Meta
            meta::dto::MetaEnumsDto,
            ApiResponse<meta::dto::MetaEnumsDto>,
            // Audit
            audit_models::AuditAction,
            audit_dtos::AuditUserDto,
            audit_dtos::AuditLogResponseDto,
            ApiResponse<Vec<audit_dtos::AuditLogResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Current caller identity"),
        (name = "regions", description = "Indonesian administrative regions (provinsi, kabupaten/kota, kecamatan, desa)"),
        (name = "taman-kehati", description = "Biodiversity gardens"),
        (name = "zona", description = "Zones inside a garden"),
        (name = "koleksi", description = "Plant collections"),
        (name = "export", description = "GeoJSON and Darwin Core exports of plant collections"),
        (name = "media", description = "Photo and video uploads"),
        (name = "artikel", description = "News and education articles"),
        (name = "views", description = "Page-view tracking and analytics"),
        (name = "search", description = "Full-text search and name autocomplete"),
        (name = "meta", description = "Enum values for client forms"),
        (name = "audit", description = "Audit trail (super admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Taman Kehati API",
        version = "0.1.0",
        description = "API documentation for Taman Kehati",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_feature_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/taman-kehati",
            "/api/koleksi/{id}",
            "/api/koleksi/export/geojson",
            "/api/media",
            "/api/artikel/slug/{slug}",
            "/api/views/track",
            "/api/audit",
            "/api/search",
            "/api/search/suggest",
            "/api/meta/enums",
            "/api/zona/import",
            "/api/zona/{id}/koleksi",
            "/api/koleksi/{id}/media",
            "/api/koleksi/{id}/relations",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
