use crate::auth;
use crate::error::{AppError, AppResult};
use crate::models::{PersonalInfoUpdate, User, UserCreate, UserLogin};
use crate::repositories::UserRepositoryTrait;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for registration, login and profile updates
pub struct UserService {
    user_repo: Arc<dyn UserRepositoryTrait>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepositoryTrait>) -> Self {
        Self { user_repo }
    }

    /// Register a new user. Usernames are unique.
    pub async fn register(&self, req: UserCreate) -> AppResult<User> {
        req.validate().map_err(AppError::Validation)?;

        if self.user_repo.find_by_username(&req.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        // A concurrent registration can still win the race; the unique
        // index turns that into Duplicate, which maps to Conflict as well.
        let user = self.user_repo.create(&User::new(req)).await?;
        info!("Registered user {} ({})", user.username, user.user_id);
        Ok(user)
    }

    pub async fn login(&self, req: UserLogin) -> AppResult<User> {
        let user = self.user_repo.find_by_username(&req.username).await?;
        let user = auth::verify_credentials(user, &req.pin_hash)?;
        info!("User {} logged in", user.user_id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_user_by_username(&self, username: &str) -> AppResult<User> {
        self.user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Patch personal info; fields absent from the patch are kept
    pub async fn update_personal_info(
        &self,
        user_id: Uuid,
        update: PersonalInfoUpdate,
    ) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        if update.is_empty() {
            return Ok(user);
        }

        update.apply_to(&mut user);
        let user = self.user_repo.update(&user).await?;
        info!("Updated personal info for user {}", user_id);
        Ok(user)
    }
}
