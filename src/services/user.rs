use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_username(&self, username: &str) -> AppResult<UserModel> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Profile edits touch display names and email only; username and
    /// credentials are not editable here.
    pub async fn update_profile(
        &self,
        user_id: i32,
        first_name: Option<String>,
        last_name: Option<String>,
        email: Option<String>,
    ) -> AppResult<UserModel> {
        let existing = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(new_email) = &email {
            let taken = User::find()
                .filter(user::Column::Email.eq(new_email.as_str()))
                .filter(user::Column::Id.ne(user_id))
                .one(&self.db)
                .await?
                .is_some();
            if taken {
                return Err(AppError::invalid_field(
                    "email",
                    "duplicate",
                    "email already registered",
                ));
            }
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = first_name {
            active.first_name = sea_orm::ActiveValue::Set(Some(first_name));
        }
        if let Some(last_name) = last_name {
            active.last_name = sea_orm::ActiveValue::Set(Some(last_name));
        }
        if let Some(email) = email {
            active.email = sea_orm::ActiveValue::Set(email);
        }
        active.updated_at = sea_orm::ActiveValue::Set(now);

        // The taken-check above races with concurrent edits; the unique
        // index on email is the authority.
        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "email already registered"))?;
        Ok(updated)
    }
}
