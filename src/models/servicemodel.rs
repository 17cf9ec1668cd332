use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Plumbing,
    Cleaning,
    Electrical,
    Painting,
    Pest,
    Hvac,
    Carpentry,
    Landscaping,
    Roofing,
    Flooring,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "availability_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Busy,
    Unavailable,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Service {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub name: String,
    pub category: ServiceCategory,
    pub description: String,
    pub price_min: f64,
    pub price_max: f64,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub rating: f64,
    pub review_count: i32,
    pub availability: AvailabilityStatus,
    pub location: Option<String>,
    pub specialties: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Only the owning provider may mutate a service.
    pub fn can_modify(&self, user_id: Uuid) -> bool {
        self.provider_id == user_id
    }

    /// A booking created without an explicit price takes the service's
    /// minimum price.
    pub fn default_booking_price(&self) -> f64 {
        self.price_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_service(provider_id: Uuid) -> Service {
        Service {
            id: Uuid::new_v4(),
            provider_id,
            name: "Pipe repair".to_string(),
            category: ServiceCategory::Plumbing,
            description: "Emergency pipe and drain repair".to_string(),
            price_min: 50.0,
            price_max: 80.0,
            duration: None,
            image: None,
            is_active: true,
            rating: 0.0,
            review_count: 0,
            availability: AvailabilityStatus::Available,
            location: Some("Springfield".to_string()),
            specialties: vec!["drains".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_the_owner_can_modify() {
        let owner = Uuid::new_v4();
        let service = sample_service(owner);
        assert!(service.can_modify(owner));
        assert!(!service.can_modify(Uuid::new_v4()));
    }

    #[test]
    fn default_booking_price_is_the_minimum() {
        let service = sample_service(Uuid::new_v4());
        assert_eq!(service.default_booking_price(), 50.0);
    }

    #[test]
    fn category_rejects_unknown_values() {
        assert!(serde_json::from_str::<ServiceCategory>("\"plumbing\"").is_ok());
        assert!(serde_json::from_str::<ServiceCategory>("\"masonry\"").is_err());
    }
}
