use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    dtos::userdtos::UpdateProfileDto,
    models::usermodel::{User, UserRole},
};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
        phone: Option<String>,
        location: Option<String>,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        profile: UpdateProfileDto,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn update_user_avatar(
        &self,
        user_id: Uuid,
        avatar: &str,
    ) -> Result<Option<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        if let Some(user_id) = user_id {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
        } else if let Some(email) = email {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
        } else {
            Ok(None)
        }
    }

    async fn save_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
        phone: Option<String>,
        location: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password, role, phone, location)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(role)
        .bind(phone)
        .bind(location)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        profile: UpdateProfileDto,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                location = COALESCE($4, location),
                bio = COALESCE($5, bio),
                specialties = COALESCE($6, specialties),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(profile.name)
        .bind(profile.phone)
        .bind(profile.location)
        .bind(profile.bio)
        .bind(profile.specialties)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_avatar(
        &self,
        user_id: Uuid,
        avatar: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(avatar)
        .fetch_optional(&self.pool)
        .await
    }
}
