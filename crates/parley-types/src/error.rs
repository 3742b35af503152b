use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parley-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// A single failed input rule. `Display` is the short message shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },

    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email")]
    EmailInvalid,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Password must be at most {0} characters")]
    PasswordTooLong(usize),

    #[error("Password must include uppercase, lowercase, numbers, and special characters")]
    PasswordTooWeak,

    #[error("Message is required")]
    MessageEmpty,

    #[error("Message must be between 1 and {0} characters")]
    MessageTooLong(usize),
}

/// Errors from signup, login and session handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("user already registered")]
    DuplicateEmail,

    /// Wrong password or unknown email; the two are indistinguishable on purpose.
    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Token(String),

    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
            other => AuthError::Storage(other),
        }
    }
}

/// Errors from the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("user not found")]
    UserNotFound,

    #[error("upstream model provider is rate limiting requests")]
    UpstreamRateLimited { retry_after_ms: Option<u64> },

    #[error("upstream model provider is unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("upstream model provider failed: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl From<RepositoryError> for ChatError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ChatError::UserNotFound,
            other => ChatError::Storage(other),
        }
    }
}
