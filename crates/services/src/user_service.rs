use std::sync::Arc;

use quiz_core::model::{User, UserId, UserRole};
use storage::repository::UserRepository;

use crate::error::UserServiceError;

/// Orchestrates account management for administrators.
///
/// Credential handling and login bookkeeping live outside this crate;
/// the service only manages the account records the statistics and
/// ranking views join against.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Create a new account with a generated id and persist it.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for validation failures.
    /// Returns `UserServiceError::Storage` if persistence fails.
    pub async fn create_user(
        &self,
        username: String,
        role: UserRole,
    ) -> Result<UserId, UserServiceError> {
        let user = User::new(UserId::random(), username, role)?;
        self.users.upsert_user(&user).await?;
        tracing::debug!(user = %user.id(), "user created");
        Ok(user.id())
    }

    /// Rename an account, preserving its role.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` if validation fails.
    /// Returns `UserServiceError::Storage` if the user does not exist or
    /// repository access fails.
    pub async fn rename_user(
        &self,
        user_id: UserId,
        username: String,
    ) -> Result<(), UserServiceError> {
        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(storage::repository::StorageError::NotFound)?;

        let updated = User::new(user.id(), username, user.role())?;
        self.users.upsert_user(&updated).await?;
        Ok(())
    }

    /// Fetch an account by ID.
    ///
    /// Returns `Ok(None)` when the account does not exist.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, UserServiceError> {
        let user = self.users.get_user(user_id).await?;
        Ok(user)
    }

    /// List accounts ordered by username, up to the given limit.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if repository access fails.
    pub async fn list_users(&self, limit: u32) -> Result<Vec<User>, UserServiceError> {
        let users = self.users.list_users(limit).await?;
        Ok(users)
    }

    /// Delete an account together with its aggregate stats row.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Storage` if the user does not exist or
    /// repository access fails.
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), UserServiceError> {
        self.users.delete_user(user_id).await?;
        tracing::debug!(user = %user_id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service(repo: &InMemoryRepository) -> UserService {
        UserService::new(Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn create_and_fetch_user() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let user_id = svc
            .create_user("ana".to_string(), UserRole::Student)
            .await
            .unwrap();
        let fetched = svc.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(fetched.username(), "ana");
        assert!(!fetched.is_admin());
    }

    #[tokio::test]
    async fn create_user_rejects_blank_username() {
        let repo = InMemoryRepository::new();
        let err = service(&repo)
            .create_user("   ".to_string(), UserRole::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::User(_)));
    }

    #[tokio::test]
    async fn rename_user_preserves_role() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let user_id = svc
            .create_user("root".to_string(), UserRole::Admin)
            .await
            .unwrap();
        svc.rename_user(user_id, "superuser".to_string())
            .await
            .unwrap();

        let fetched = svc.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(fetched.username(), "superuser");
        assert!(fetched.is_admin());
    }

    #[tokio::test]
    async fn list_users_orders_by_username() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        for name in ["zoe", "ana", "mia"] {
            svc.create_user(name.to_string(), UserRole::Student)
                .await
                .unwrap();
        }

        let users = svc.list_users(10).await.unwrap();
        let names: Vec<&str> = users.iter().map(User::username).collect();
        assert_eq!(names, vec!["ana", "mia", "zoe"]);
    }

    #[tokio::test]
    async fn delete_user_removes_the_account() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);

        let user_id = svc
            .create_user("gone".to_string(), UserRole::Student)
            .await
            .unwrap();
        svc.delete_user(user_id).await.unwrap();
        assert!(svc.get_user(user_id).await.unwrap().is_none());
    }
}
