use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dtos::{servicedtos::ServiceSummaryDto, userdtos::BookingPartyDto},
    models::bookingmodel::{Booking, BookingStatus, PaymentStatus},
};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingDto {
    pub service: Uuid,

    pub date: DateTime<Utc>,

    #[validate(custom = "validate_time")]
    pub time: String,

    pub duration: f64,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
}

fn validate_time(time: &str) -> Result<(), ValidationError> {
    let time_regex = regex::Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$")
        .map_err(|_| ValidationError::new("invalid_time_regex"))?;

    if !time_regex.is_match(time) {
        let mut error = ValidationError::new("invalid_time");
        error.message = Some(Cow::from("Please provide a valid time in HH:MM format"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateBookingDto {
    pub status: Option<BookingStatus>,

    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingListQueryDto {
    pub status: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterBookingDto {
    pub id: String,
    pub service: Option<ServiceSummaryDto>,
    pub customer: Option<BookingPartyDto>,
    pub provider: Option<BookingPartyDto>,
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

impl FilterBookingDto {
    pub fn from_booking(
        booking: &Booking,
        service: Option<ServiceSummaryDto>,
        customer: Option<BookingPartyDto>,
        provider: Option<BookingPartyDto>,
    ) -> Self {
        FilterBookingDto {
            id: booking.id.to_string(),
            service,
            customer,
            provider,
            date: booking.date,
            time: booking.time.to_owned(),
            duration: booking.duration,
            price: booking.price,
            status: booking.status,
            payment_status: booking.payment_status,
            location: booking.location.to_owned(),
            description: booking.description.clone(),
            notes: booking.notes.clone(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create(time: &str) -> CreateBookingDto {
        CreateBookingDto {
            service: Uuid::new_v4(),
            date: Utc::now(),
            time: time.to_string(),
            duration: 2.0,
            location: "12 Elm Street".to_string(),
            description: None,
        }
    }

    #[test]
    fn time_must_be_hh_mm() {
        assert!(sample_create("09:30").validate().is_ok());
        assert!(sample_create("23:59").validate().is_ok());
        assert!(sample_create("24:00").validate().is_err());
        assert!(sample_create("half past nine").validate().is_err());
    }

    #[test]
    fn update_status_outside_the_enum_fails_deserialization() {
        let result = serde_json::from_str::<UpdateBookingDto>(r#"{"status":"archived"}"#);
        assert!(result.is_err());

        let update: UpdateBookingDto =
            serde_json::from_str(r#"{"status":"completed"}"#).unwrap();
        assert_eq!(update.status, Some(BookingStatus::Completed));
    }
}
