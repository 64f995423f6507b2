//! User service: accounts, sessions and profiles.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use pawpost_common::{AppError, AppResult, Config, IdGenerator, config::AccountsConfig};
use pawpost_db::{
    entities::user::{self, Role},
    repositories::{FollowingRepository, PostRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::{
    audit::{AuditService, ModerationAction, TargetType},
    identity::{Actor, Capability},
    visibility::{PostQuery, scope_for},
};

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user: user::Model,
    /// Approved posts only.
    pub posts_count: u64,
    pub is_following: bool,
    /// Whether the viewer may see the email address.
    pub show_email: bool,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    post_repo: PostRepository,
    following_repo: FollowingRepository,
    audit: AuditService,
    accounts: AccountsConfig,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        post_repo: PostRepository,
        following_repo: FollowingRepository,
        audit: AuditService,
        config: &Config,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
            following_repo,
            audit,
            accounts: config.accounts.clone(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        let input = RegisterInput {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
            password: input.password,
        };
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let role = if self.accounts.is_admin_email(&input.email) {
            Role::Admin
        } else {
            Role::User
        };

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            role: Set(role),
            is_active: Set(true),
            followers_count: Set(0),
            following_count: Set(0),
            posts_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }

    /// Verify credentials and return the session token with the user.
    pub async fn login(&self, input: LoginInput) -> AppResult<(String, user::Model)> {
        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active || !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = match &user.token {
            Some(token) => token.clone(),
            None => {
                let token = self.id_gen.generate_token();
                self.user_repo.set_token(&user.id, &token).await?;
                token
            }
        };

        tracing::debug!(user_id = %user.id, "User logged in");
        Ok((token, user))
    }

    /// Rotate the caller's token, invalidating the current one.
    pub async fn logout(&self, actor: &Actor) -> AppResult<()> {
        let token = self.id_gen.generate_token();
        if !self.user_repo.set_token(&actor.id, &token).await? {
            return Err(AppError::UserNotFound(actor.id.clone()));
        }
        Ok(())
    }

    /// The caller's own account.
    pub async fn me(&self, actor: &Actor) -> AppResult<user::Model> {
        self.user_repo.get_by_id(&actor.id).await
    }

    /// Resolve a bearer token to the caller. Inactive accounts do not resolve.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Actor> {
        self.user_repo
            .find_active_by_token(token)
            .await?
            .as_ref()
            .map(Actor::from)
            .ok_or(AppError::Unauthorized)
    }

    /// A user's public profile.
    pub async fn profile(&self, viewer: Option<&Actor>, user_id: &str) -> AppResult<Profile> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let filter = scope_for(
            viewer,
            &PostQuery::Profile {
                user_id: user.id.clone(),
            },
        )?
        .into_filter();
        let posts_count = self.post_repo.count_filtered(&filter).await?;

        let is_following = match viewer {
            Some(viewer) if !viewer.is(&user.id) => {
                self.following_repo
                    .is_following(&viewer.id, &user.id)
                    .await?
            }
            _ => false,
        };

        let show_email =
            viewer.is_some_and(|v| v.is(&user.id) || v.can(Capability::Moderate));

        Ok(Profile {
            user,
            posts_count,
            is_following,
            show_email,
        })
    }

    // ========== Administration ==========

    /// All users, newest first. Moderators only.
    pub async fn list_users(
        &self,
        actor: &Actor,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        actor.require(Capability::Moderate)?;
        self.user_repo.find_all(limit, offset).await
    }

    /// Change another user's role.
    pub async fn change_role(
        &self,
        actor: &Actor,
        user_id: &str,
        role: Role,
    ) -> AppResult<user::Model> {
        actor.require(Capability::Moderate)?;
        if actor.is(user_id) {
            return Err(AppError::BadRequest(
                "You cannot change your own role".to_string(),
            ));
        }

        let before = self.user_repo.get_by_id(user_id).await?;
        if !self.user_repo.set_role(user_id, role).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        self.audit
            .record(
                actor,
                ModerationAction::ChangeRole,
                TargetType::User,
                user_id,
                Some(format!("{} -> {}", before.role.as_str(), role.as_str())),
            )
            .await;
        tracing::info!(
            user_id = user_id,
            moderator_id = %actor.id,
            role = role.as_str(),
            "User role changed"
        );

        self.user_repo.get_by_id(user_id).await
    }

    /// Activate or deactivate another user.
    pub async fn set_status(
        &self,
        actor: &Actor,
        user_id: &str,
        is_active: bool,
    ) -> AppResult<user::Model> {
        actor.require(Capability::Moderate)?;
        if actor.is(user_id) && !is_active {
            return Err(AppError::BadRequest(
                "You cannot deactivate your own account".to_string(),
            ));
        }

        if !self.user_repo.set_active(user_id, is_active).await? {
            return Err(AppError::UserNotFound(user_id.to_string()));
        }

        let detail = if is_active { "activated" } else { "deactivated" };
        self.audit
            .record(
                actor,
                ModerationAction::ChangeStatus,
                TargetType::User,
                user_id,
                Some(detail.to_string()),
            )
            .await;
        tracing::info!(user_id = user_id, moderator_id = %actor.id, is_active, "User status changed");

        self.user_repo.get_by_id(user_id).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
