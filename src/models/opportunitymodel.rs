use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "opportunity_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OpportunityCategory {
    Carpentry,
    Electrical,
    Plumbing,
    Painting,
    Cleaning,
    Hvac,
    Landscaping,
    Roofing,
    Flooring,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "opportunity_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum OpportunityStatus {
    Open,
    InProgress,
    Closed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Opportunity {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub title: String,
    pub description: String,
    pub category: OpportunityCategory,
    pub budget_min: f64,
    pub budget_max: f64,
    pub location: String,
    pub deadline: DateTime<Utc>,
    pub status: OpportunityStatus,
    pub urgent: bool,
    pub skills_required: Vec<String>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    /// Only the posting user may mutate an opportunity.
    pub fn can_modify(&self, user_id: Uuid) -> bool {
        self.posted_by == user_id
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct OpportunityApplicant {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub user_id: Uuid,
    pub message: Option<String>,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn only_the_poster_can_modify() {
        let poster = Uuid::new_v4();
        let opportunity = Opportunity {
            id: Uuid::new_v4(),
            posted_by: poster,
            title: "Rewire garage".to_string(),
            description: "Full rewire of a two-car garage".to_string(),
            category: OpportunityCategory::Electrical,
            budget_min: 200.0,
            budget_max: 600.0,
            location: "Springfield".to_string(),
            deadline: Utc::now(),
            status: OpportunityStatus::Open,
            urgent: false,
            skills_required: vec![],
            images: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(opportunity.can_modify(poster));
        assert!(!opportunity.can_modify(Uuid::new_v4()));
    }

    #[test]
    fn status_rejects_values_outside_the_enum() {
        assert_eq!(
            serde_json::from_str::<OpportunityStatus>("\"in-progress\"").unwrap(),
            OpportunityStatus::InProgress
        );
        assert!(serde_json::from_str::<OpportunityStatus>("\"paused\"").is_err());
    }
}
