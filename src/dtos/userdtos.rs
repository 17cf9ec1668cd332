use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::usermodel::{User, UserRole};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,

    #[validate(
        length(min = 1, message = "Confirm Password is required"),
        must_match(other = "password", message = "passwords do not match")
    )]
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,

    #[validate(custom = "validate_phone_number")]
    pub phone: Option<String>,

    #[validate(length(min = 3, max = 100, message = "Location must be between 3 and 100 characters"))]
    pub location: Option<String>,

    pub role: Option<UserRole>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateProfileDto {
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: Option<String>,

    #[validate(custom = "validate_phone_number")]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "Location cannot exceed 100 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 500, message = "Bio cannot exceed 500 characters"))]
    pub bio: Option<String>,

    pub specialties: Option<Vec<String>>,
}

fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let phone_regex = regex::Regex::new(r"^(\+?[0-9]{1,3}[- ]?)?[0-9]{3}[- ]?[0-9]{3}[- ]?[0-9]{4}$")
        .map_err(|_| ValidationError::new("invalid_phone_regex"))?;

    if !phone_regex.is_match(phone) {
        let mut error = ValidationError::new("invalid_phone");
        error.message = Some(Cow::from("Please provide a valid phone number"));
        return Err(error);
    }
    Ok(())
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct AvatarUpdateDto {
    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar: String,
}

/// Public projection of a user record. Never exposes the password hash.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub is_verified: bool,
    pub rating: f64,
    pub specialties: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            role: user.role.to_str().to_string(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
            is_verified: user.is_verified,
            rating: user.rating,
            specialties: user.specialties.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Short projection embedded in service and opportunity listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummaryDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub rating: f64,
    pub location: Option<String>,
    pub avatar: Option<String>,
    pub specialties: Vec<String>,
}

impl UserSummaryDto {
    pub fn from_user(user: &User) -> Self {
        UserSummaryDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            rating: user.rating,
            location: user.location.clone(),
            avatar: user.avatar.clone(),
            specialties: user.specialties.clone(),
        }
    }
}

/// Contact projection embedded in booking listings.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookingPartyDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl BookingPartyDto {
    pub fn from_user(user: &User) -> Self {
        BookingPartyDto {
            id: user.id.to_string(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            phone: user.phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn filter_user_never_carries_the_password_hash() {
        let user = User {
            id: uuid::Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "$argon2id$...".to_string(),
            role: UserRole::Provider,
            phone: None,
            location: None,
            bio: None,
            avatar: None,
            is_verified: false,
            rating: 4.5,
            specialties: vec!["plumbing".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let filtered = FilterUserDto::filter_user(&user);
        let json = serde_json::to_string(&filtered).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"provider\""));
    }

    #[test]
    fn register_dto_requires_matching_passwords() {
        let dto = RegisterUserDto {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
            password_confirm: "secret2".to_string(),
            ..Default::default()
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn phone_number_format_is_checked() {
        let dto = UpdateProfileDto {
            phone: Some("not-a-phone".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateProfileDto {
            phone: Some("+1 555-123-4567".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }
}
