use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        password::CredentialHasher,
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    items::repo_types::OwnerId,
};

/// Registration, login checks and identity-to-owner resolution over the user store.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    #[instrument(skip(self, raw_password))]
    pub async fn register(&self, username: &str, raw_password: &str) -> AppResult<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::invalid("username must not be empty"));
        }

        if self.users.exists_by_username(username).await? {
            warn!(%username, "username already registered");
            return Err(AppError::DuplicateUsername);
        }

        let hash = self.hasher.hash(raw_password)?;

        // The insert is conflict-safe, so a concurrent registration still lands here.
        let Some(user) = self.users.insert(NewUser::new(username, hash)).await? else {
            warn!(%username, "username taken during insert");
            return Err(AppError::DuplicateUsername);
        };

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(())
    }

    #[instrument(skip(self, raw_password))]
    pub async fn authenticate(&self, username: &str, raw_password: &str) -> AppResult<User> {
        let username = username.trim();
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(%username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        };

        if !self.hasher.verify(raw_password, &user.password_hash)? {
            warn!(%username, user_id = user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = user.id, %username, "user logged in");
        Ok(user)
    }

    /// Loads the account behind an authenticated identity.
    ///
    /// A missing account means the identity outlived its user, which is an
    /// integrity failure and is reported as `UserNotFound`.
    pub async fn current_user(&self, username: &str) -> AppResult<User> {
        match self.users.find_by_username(username).await? {
            Some(user) => Ok(user),
            None => {
                error!(%username, "authenticated identity has no account");
                Err(AppError::UserNotFound(username.to_string()))
            }
        }
    }

    pub async fn resolve_owner(&self, username: &str) -> AppResult<OwnerId> {
        let user = self.current_user(username).await?;
        Ok(OwnerId::new(user.id))
    }
}
