use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    dtos::userdtos::UserSummaryDto,
    models::servicemodel::{AvailabilityStatus, Service, ServiceCategory},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceRangeDto {
    pub min: f64,
    pub max: f64,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceDto {
    #[validate(length(min = 3, max = 100, message = "Service name must be between 3 and 100 characters"))]
    pub name: String,

    pub category: ServiceCategory,

    #[validate(length(min = 10, max = 500, message = "Description must be between 10 and 500 characters"))]
    pub description: String,

    pub price_range: PriceRangeDto,

    pub duration: Option<String>,

    pub specialties: Option<Vec<String>>,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceDto {
    #[validate(length(min = 3, max = 100, message = "Service name must be between 3 and 100 characters"))]
    pub name: Option<String>,

    pub category: Option<ServiceCategory>,

    #[validate(length(min = 10, max = 500, message = "Description must be between 10 and 500 characters"))]
    pub description: Option<String>,

    pub price_range: Option<PriceRangeDto>,

    pub duration: Option<String>,

    pub specialties: Option<Vec<String>>,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: Option<String>,

    pub availability: Option<AvailabilityStatus>,
}

/// Raw query parameters of the public listing endpoint. Everything is text;
/// malformed values degrade to "no constraint".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListQueryDto {
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceSearchQueryDto {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterServiceDto {
    pub id: String,
    pub name: String,
    pub category: ServiceCategory,
    pub description: String,
    pub price_range: PriceRangeDto,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub rating: f64,
    pub review_count: i32,
    pub availability: AvailabilityStatus,
    pub location: Option<String>,
    pub specialties: Vec<String>,
    pub provider: Option<UserSummaryDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterServiceDto {
    pub fn from_service(service: &Service, provider: Option<UserSummaryDto>) -> Self {
        FilterServiceDto {
            id: service.id.to_string(),
            name: service.name.to_owned(),
            category: service.category,
            description: service.description.to_owned(),
            price_range: PriceRangeDto {
                min: service.price_min,
                max: service.price_max,
            },
            duration: service.duration.clone(),
            image: service.image.clone(),
            is_active: service.is_active,
            rating: service.rating,
            review_count: service.review_count,
            availability: service.availability,
            location: service.location.clone(),
            specialties: service.specialties.clone(),
            provider,
            created_at: service.created_at,
            updated_at: service.updated_at,
        }
    }
}

/// Short projection embedded in booking listings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummaryDto {
    pub id: String,
    pub name: String,
    pub category: ServiceCategory,
    pub price_range: PriceRangeDto,
}

impl ServiceSummaryDto {
    pub fn from_service(service: &Service) -> Self {
        ServiceSummaryDto {
            id: service.id.to_string(),
            name: service.name.to_owned(),
            category: service.category,
            price_range: PriceRangeDto {
                min: service.price_min,
                max: service.price_max,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_service_rejects_short_description() {
        let dto = CreateServiceDto {
            name: "Pipe repair".to_string(),
            category: ServiceCategory::Plumbing,
            description: "short".to_string(),
            price_range: PriceRangeDto { min: 50.0, max: 80.0 },
            duration: None,
            specialties: None,
            location: "Springfield".to_string(),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn list_query_accepts_camel_case_sort_params() {
        let query: ServiceListQueryDto =
            serde_json::from_str(r#"{"sortBy":"rating","sortOrder":"desc"}"#).unwrap();
        assert_eq!(query.sort_by.as_deref(), Some("rating"));
        assert_eq!(query.sort_order.as_deref(), Some("desc"));
    }
}
