use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::userdtos::UserSummaryDto,
    models::opportunitymodel::{
        Opportunity, OpportunityApplicant, OpportunityCategory, OpportunityStatus,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BudgetRangeDto {
    pub min: f64,
    pub max: f64,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOpportunityDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: String,

    #[validate(length(min = 20, max = 1000, message = "Description must be between 20 and 1000 characters"))]
    pub description: String,

    pub category: OpportunityCategory,

    pub budget: BudgetRangeDto,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: String,

    pub deadline: DateTime<Utc>,

    pub urgent: Option<bool>,

    pub skills_required: Option<Vec<String>>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOpportunityDto {
    #[validate(length(min = 5, max = 200, message = "Title must be between 5 and 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 20, max = 1000, message = "Description must be between 20 and 1000 characters"))]
    pub description: Option<String>,

    pub category: Option<OpportunityCategory>,

    pub budget: Option<BudgetRangeDto>,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: Option<String>,

    pub deadline: Option<DateTime<Utc>>,

    pub status: Option<OpportunityStatus>,

    pub urgent: Option<bool>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct ApplyOpportunityDto {
    #[validate(length(max = 500, message = "Message cannot exceed 500 characters"))]
    pub message: Option<String>,
}

/// Raw query parameters of the public listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityListQueryDto {
    pub category: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub urgent: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantEntryDto {
    pub user: Uuid,
    pub message: Option<String>,
    pub applied_at: DateTime<Utc>,
}

impl ApplicantEntryDto {
    pub fn from_applicant(applicant: &OpportunityApplicant) -> Self {
        ApplicantEntryDto {
            user: applicant.user_id,
            message: applicant.message.clone(),
            applied_at: applicant.applied_at,
        }
    }
}

/// Applicant entry with the applying user's summary embedded, used on the
/// detail endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedApplicantDto {
    pub user: Option<UserSummaryDto>,
    pub message: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOpportunityDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: OpportunityCategory,
    pub budget: BudgetRangeDto,
    pub location: String,
    pub deadline: DateTime<Utc>,
    pub status: OpportunityStatus,
    pub urgent: bool,
    pub skills_required: Vec<String>,
    pub images: Vec<String>,
    pub posted_by: Option<UserSummaryDto>,
    pub applicants: Vec<ApplicantEntryDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterOpportunityDto {
    pub fn from_opportunity(
        opportunity: &Opportunity,
        posted_by: Option<UserSummaryDto>,
        applicants: Vec<ApplicantEntryDto>,
    ) -> Self {
        FilterOpportunityDto {
            id: opportunity.id.to_string(),
            title: opportunity.title.to_owned(),
            description: opportunity.description.to_owned(),
            category: opportunity.category,
            budget: BudgetRangeDto {
                min: opportunity.budget_min,
                max: opportunity.budget_max,
            },
            location: opportunity.location.to_owned(),
            deadline: opportunity.deadline,
            status: opportunity.status,
            urgent: opportunity.urgent,
            skills_required: opportunity.skills_required.clone(),
            images: opportunity.images.clone(),
            posted_by,
            applicants,
            created_at: opportunity.created_at,
            updated_at: opportunity.updated_at,
        }
    }
}

/// Detail view: same shape as the listing, applicants populated with user
/// summaries.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDetailDto {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: OpportunityCategory,
    pub budget: BudgetRangeDto,
    pub location: String,
    pub deadline: DateTime<Utc>,
    pub status: OpportunityStatus,
    pub urgent: bool,
    pub skills_required: Vec<String>,
    pub images: Vec<String>,
    pub posted_by: Option<UserSummaryDto>,
    pub applicants: Vec<PopulatedApplicantDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OpportunityDetailDto {
    pub fn from_opportunity(
        opportunity: &Opportunity,
        posted_by: Option<UserSummaryDto>,
        applicants: Vec<PopulatedApplicantDto>,
    ) -> Self {
        OpportunityDetailDto {
            id: opportunity.id.to_string(),
            title: opportunity.title.to_owned(),
            description: opportunity.description.to_owned(),
            category: opportunity.category,
            budget: BudgetRangeDto {
                min: opportunity.budget_min,
                max: opportunity.budget_max,
            },
            location: opportunity.location.to_owned(),
            deadline: opportunity.deadline,
            status: opportunity.status,
            urgent: opportunity.urgent,
            skills_required: opportunity.skills_required.clone(),
            images: opportunity.images.clone(),
            posted_by,
            applicants,
            created_at: opportunity.created_at,
            updated_at: opportunity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_opportunity_rejects_short_title() {
        let dto = CreateOpportunityDto {
            title: "Fix".to_string(),
            description: "Full rewire of a two-car garage, panel included".to_string(),
            category: OpportunityCategory::Electrical,
            budget: BudgetRangeDto { min: 200.0, max: 600.0 },
            location: "Springfield".to_string(),
            deadline: Utc::now(),
            urgent: None,
            skills_required: None,
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn apply_message_is_capped() {
        let dto = ApplyOpportunityDto {
            message: Some("x".repeat(501)),
        };
        assert!(dto.validate().is_err());
    }
}
