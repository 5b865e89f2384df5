use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::core::extractor::ClientInfo;
use crate::features::views::models::{SeriesRow, TopRow};
use crate::shared::constants::{DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT};

/// Page type recorded for an article page
pub fn artikel_page_type(artikel_id: i32) -> String {
    format!("artikel-{}", artikel_id)
}

fn validate_target(dto: &TrackViewDto) -> Result<(), ValidationError> {
    if dto.taman_kehati_id.is_none() && dto.koleksi_tumbuhan_id.is_none() {
        let mut err = ValidationError::new("view_target");
        err.message =
            Some("Either taman_kehati_id or koleksi_tumbuhan_id must be provided".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_target"))]
pub struct TrackViewDto {
    pub taman_kehati_id: Option<i32>,
    pub koleksi_tumbuhan_id: Option<i32>,
    /// Page kind, e.g. `taman`, `koleksi` or `artikel-12`
    #[validate(length(min = 1, max = 50, message = "page_type must be 1-50 characters"))]
    pub page_type: String,
    pub referrer: Option<String>,
    #[validate(length(max = 100, message = "session_id must be at most 100 characters"))]
    pub session_id: Option<String>,
    /// Defaults to the requesting client's address
    #[validate(length(max = 45))]
    pub ip_address: Option<String>,
    /// Defaults to the request's User-Agent
    pub user_agent: Option<String>,
}

impl TrackViewDto {
    /// Fill missing client details from the request
    pub fn with_client(mut self, client: &ClientInfo) -> Self {
        if self.ip_address.is_none() {
            self.ip_address = client.ip_address.clone();
        }
        if self.user_agent.is_none() {
            self.user_agent = client.user_agent.clone();
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackedViewDto {
    pub id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewEntity {
    Taman,
    Koleksi,
    Artikel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TopEntity {
    Koleksi,
    Artikel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ViewRange {
    #[default]
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
}

impl ViewRange {
    pub fn days(&self) -> i32 {
        match self {
            ViewRange::Last7Days => 7,
            ViewRange::Last30Days => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ViewInterval {
    #[default]
    Day,
    Week,
    Month,
}

impl ViewInterval {
    /// `DATE_TRUNC` field name
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewInterval::Day => "day",
            ViewInterval::Week => "week",
            ViewInterval::Month => "month",
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SeriesQuery {
    pub entity: ViewEntity,
    pub id: i32,
    #[serde(default)]
    pub range: ViewRange,
    #[serde(default)]
    pub interval: ViewInterval,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SeriesPointDto {
    /// Start of the bucket
    pub date: DateTime<Utc>,
    pub count: i64,
}

impl From<SeriesRow> for SeriesPointDto {
    fn from(row: SeriesRow) -> Self {
        Self {
            date: row.bucket,
            count: row.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViewSeriesDto {
    pub entity: ViewEntity,
    pub id: i32,
    pub range: ViewRange,
    pub interval: ViewInterval,
    pub data: Vec<SeriesPointDto>,
    pub total: i64,
}

impl ViewSeriesDto {
    pub fn new(query: &SeriesQuery, rows: Vec<SeriesRow>) -> Self {
        let data: Vec<SeriesPointDto> = rows.into_iter().map(SeriesPointDto::from).collect();
        let total = data.iter().map(|p| p.count).sum();
        Self {
            entity: query.entity,
            id: query.id,
            range: query.range,
            interval: query.interval,
            data,
            total,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct TopQuery {
    pub entity: TopEntity,
    /// Only count entities of this garden
    pub taman_kehati_id: Option<i32>,
    #[serde(default)]
    pub range: ViewRange,
    /// Entries returned (default 10, max 50)
    pub limit: Option<i64>,
}

impl TopQuery {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopViewDto {
    pub id: i32,
    pub title: String,
    pub view_count: i64,
    pub entity_type: TopEntity,
}

impl TopViewDto {
    pub fn new(row: TopRow, entity: TopEntity) -> Self {
        let title = row.title.unwrap_or_else(|| match entity {
            TopEntity::Koleksi => format!("Koleksi #{}", row.id),
            TopEntity::Artikel => format!("Artikel #{}", row.id),
        });
        Self {
            id: row.id,
            title,
            view_count: row.view_count,
            entity_type: entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fake::{Fake, Faker};

    #[test]
    fn test_track_requires_target() {
        let dto = TrackViewDto {
            page_type: "taman".to_string(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = TrackViewDto {
            koleksi_tumbuhan_id: Some((1..1000).fake()),
            ..dto
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_client_details_fill_gaps_only() {
        let client = ClientInfo {
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
        };
        let supplied_ua: String = Faker.fake();
        let dto = TrackViewDto {
            taman_kehati_id: Some(1),
            page_type: "taman".to_string(),
            user_agent: Some(supplied_ua.clone()),
            ..Default::default()
        }
        .with_client(&client);

        assert_eq!(dto.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(dto.user_agent, Some(supplied_ua));
    }

    #[test]
    fn test_query_labels() {
        assert_eq!(serde_json::to_value(ViewRange::Last30Days).unwrap(), "30d");
        assert_eq!(
            serde_json::from_value::<ViewRange>(serde_json::json!("7d")).unwrap(),
            ViewRange::Last7Days
        );
        assert!(serde_json::from_value::<ViewRange>(serde_json::json!("90d")).is_err());
        assert_eq!(ViewInterval::Week.as_str(), "week");
    }

    #[test]
    fn test_series_total() {
        let query = SeriesQuery {
            entity: ViewEntity::Taman,
            id: 1,
            range: ViewRange::default(),
            interval: ViewInterval::default(),
        };
        let rows = vec![
            SeriesRow {
                bucket: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                count: 4,
            },
            SeriesRow {
                bucket: Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap(),
                count: 6,
            },
        ];
        let series = ViewSeriesDto::new(&query, rows);
        assert_eq!(series.total, 10);
        assert_eq!(series.data.len(), 2);
    }

    #[test]
    fn test_top_title_fallback() {
        let row = TopRow {
            id: 17,
            title: None,
            view_count: 3,
        };
        assert_eq!(TopViewDto::new(row, TopEntity::Koleksi).title, "Koleksi #17");
        assert_eq!(artikel_page_type(5), "artikel-5");
    }
}
