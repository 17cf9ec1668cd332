use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "booking_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in-progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub service_id: Uuid,
    pub customer_id: Uuid,
    // Copied from the service at creation time.
    pub provider_id: Uuid,
    pub date: DateTime<Utc>,
    pub time: String,
    pub duration: f64,
    pub price: f64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub location: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Either participant, customer or provider, may view or mutate a
    /// booking.
    pub fn can_access(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id || self.provider_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_booking(customer_id: Uuid, provider_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            customer_id,
            provider_id,
            date: Utc::now(),
            time: "10:30".to_string(),
            duration: 2.0,
            price: 50.0,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            location: "12 Elm Street".to_string(),
            description: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn both_participants_can_access() {
        let customer = Uuid::new_v4();
        let provider = Uuid::new_v4();
        let booking = sample_booking(customer, provider);
        assert!(booking.can_access(customer));
        assert!(booking.can_access(provider));
    }

    #[test]
    fn third_parties_are_refused() {
        let booking = sample_booking(Uuid::new_v4(), Uuid::new_v4());
        assert!(!booking.can_access(Uuid::new_v4()));
    }

    #[test]
    fn status_is_validated_at_the_enum_boundary() {
        assert_eq!(
            serde_json::from_str::<BookingStatus>("\"in-progress\"").unwrap(),
            BookingStatus::InProgress
        );
        assert!(serde_json::from_str::<BookingStatus>("\"archived\"").is_err());
    }
}
