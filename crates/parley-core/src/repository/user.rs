//! User and chat-history repository trait definition.

use parley_types::chat::ChatTurn;
use parley_types::error::RepositoryError;
use parley_types::user::{NewUser, User, UserCredentials, UserId};

/// Repository trait for user accounts and their ordered chat turns.
///
/// Implementations live in parley-infra (e.g., SqliteUserRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Emails reach the repository already normalized (trimmed, lowercase).
pub trait UserRepository: Send + Sync {
    /// Create a user. Fails with `RepositoryError::Conflict` when the email is taken.
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Look up a user by email. Never exposes the password hash.
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// The only read that includes the stored password hash; used by login.
    fn find_credentials(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserCredentials>, RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// All turns for a user in append order.
    fn get_turns(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// Append `turns` after the existing history, all or nothing.
    ///
    /// Fails with `RepositoryError::NotFound` when the user does not exist.
    fn append_turns(
        &self,
        id: &UserId,
        turns: &[ChatTurn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove every turn for a user. Succeeds on an already-empty history.
    ///
    /// Fails with `RepositoryError::NotFound` when the user does not exist.
    fn clear_history(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count_users(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
