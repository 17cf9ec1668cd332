use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{dtos::userdtos::UserSummaryDto, models::reviewmodel::Review};

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(min = 1, max = 1000, message = "Comment must be between 1 and 1000 characters"))]
    pub comment: String,

    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterReviewDto {
    pub id: String,
    pub service_id: String,
    pub customer: Option<UserSummaryDto>,
    pub rating: i32,
    pub comment: String,
    pub response: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl FilterReviewDto {
    pub fn from_review(review: &Review, customer: Option<UserSummaryDto>) -> Self {
        FilterReviewDto {
            id: review.id.to_string(),
            service_id: review.service_id.to_string(),
            customer,
            rating: review.rating,
            comment: review.comment.to_owned(),
            response: review.response.clone(),
            verified: review.verified,
            created_at: review.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_outside_one_to_five_is_rejected() {
        let dto = CreateReviewDto {
            rating: 6,
            comment: "Great work".to_string(),
            booking_id: None,
        };
        assert!(dto.validate().is_err());

        let dto = CreateReviewDto {
            rating: 5,
            comment: "Great work".to_string(),
            booking_id: None,
        };
        assert!(dto.validate().is_ok());
    }
}
