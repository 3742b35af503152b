//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `parley-core` using sqlx with split read/write pools:
//! raw queries, private Row structs, reads on the reader pool and every
//! mutation on the single-connection writer.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_core::repository::user::UserRepository;
use parley_types::chat::{ChatTurn, MessageRole};
use parley_types::error::RepositoryError;
use parley_types::user::{NewUser, User, UserCredentials, UserId};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct UserRow {
    id: String,
    name: String,
    email: String,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        Ok(User {
            id: UserId::from_uuid(id),
            name: self.name,
            email: self.email,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

struct TurnRow {
    role: String,
    content: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<ChatTurn, RepositoryError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatTurn {
            role,
            content: self.content,
            timestamp: parse_datetime(&self.created_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

// ---------------------------------------------------------------------------
// UserRepository implementation
// ---------------------------------------------------------------------------

impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let created = User {
            id: UserId::new(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(created.id.to_string())
        .bind(&created.name)
        .bind(&created.email)
        .bind(&user.password_hash)
        .bind(format_datetime(&created.created_at))
        .bind(format_datetime(&created.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(created),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("email '{}' already registered", user.email)),
            ),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map_err(query_err)?.into_user())
            .transpose()
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let password_hash: String = row.try_get("password_hash").map_err(query_err)?;
        let user = UserRow::from_row(&row).map_err(query_err)?.into_user()?;

        Ok(Some(UserCredentials {
            user,
            password_hash,
        }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|r| UserRow::from_row(&r).map_err(query_err)?.into_user())
            .transpose()
    }

    async fn get_turns(&self, id: &UserId) -> Result<Vec<ChatTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT role, content, created_at FROM chat_turns WHERE user_id = ? ORDER BY seq ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter()
            .map(|r| TurnRow::from_row(r).map_err(query_err)?.into_turn())
            .collect()
    }

    async fn append_turns(&self, id: &UserId, turns: &[ChatTurn]) -> Result<(), RepositoryError> {
        let user_id = id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let exists = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_err)?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let (next_seq,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(seq), 0) + 1 FROM chat_turns WHERE user_id = ?")
                .bind(&user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(query_err)?;

        for (offset, turn) in (0_i64..).zip(turns) {
            sqlx::query(
                r#"INSERT INTO chat_turns (id, user_id, seq, role, content, created_at)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(Uuid::now_v7().to_string())
            .bind(&user_id)
            .bind(next_seq + offset)
            .bind(turn.role.to_string())
            .bind(&turn.content)
            .bind(format_datetime(&turn.timestamp))
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        }

        sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)
    }

    async fn clear_history(&self, id: &UserId) -> Result<(), RepositoryError> {
        let user_id = id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let updated = sqlx::query("UPDATE users SET updated_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM chat_turns WHERE user_id = ?")
            .bind(&user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        tx.commit().await.map_err(query_err)
    }

    async fn count_users(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_err)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn test_repo() -> (SqliteUserRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("users.db").display());
        let pool = DatabasePool::new(&url, 4).await.unwrap();
        (SqliteUserRepository::new(pool), dir)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$fake".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (repo, _dir) = test_repo().await;
        let created = repo.create_user(&new_user("ada@example.com")).await.unwrap();

        let by_email = repo.find_by_email("ada@example.com").await.unwrap().unwrap();
        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(by_email.id, created.id);
        assert_eq!(by_id.email, "ada@example.com");
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_case_insensitively() {
        let (repo, _dir) = test_repo().await;
        repo.create_user(&new_user("ada@example.com")).await.unwrap();

        let err = repo
            .create_user(&new_user("ADA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_credentials_carry_hash() {
        let (repo, _dir) = test_repo().await;
        repo.create_user(&new_user("ada@example.com")).await.unwrap();

        let creds = repo
            .find_credentials("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(creds.password_hash, "$argon2id$v=19$fake");
        assert!(repo.find_credentials("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_turn_round_trip_preserves_order() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(&new_user("ada@example.com")).await.unwrap();
        let now = Utc::now();
        let turns = vec![
            ChatTurn::user("hi", now),
            ChatTurn::assistant("hello", now + Duration::milliseconds(5)),
        ];

        repo.append_turns(&user.id, &turns).await.unwrap();

        assert_eq!(repo.get_turns(&user.id).await.unwrap(), turns);
    }

    #[tokio::test]
    async fn test_appends_accumulate() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(&new_user("ada@example.com")).await.unwrap();
        let now = Utc::now();

        repo.append_turns(&user.id, &[ChatTurn::user("one", now), ChatTurn::assistant("1", now)])
            .await
            .unwrap();
        repo.append_turns(&user.id, &[ChatTurn::user("two", now), ChatTurn::assistant("2", now)])
            .await
            .unwrap();

        let contents: Vec<String> = repo
            .get_turns(&user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, ["one", "1", "two", "2"]);
    }

    #[tokio::test]
    async fn test_append_for_missing_user() {
        let (repo, _dir) = test_repo().await;
        let err = repo
            .append_turns(&UserId::new(), &[ChatTurn::user("hi", Utc::now())])
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_clear_history() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(&new_user("ada@example.com")).await.unwrap();

        // Clearing an empty history is fine
        repo.clear_history(&user.id).await.unwrap();

        repo.append_turns(&user.id, &[ChatTurn::user("hi", Utc::now())])
            .await
            .unwrap();
        repo.clear_history(&user.id).await.unwrap();

        assert!(repo.get_turns(&user.id).await.unwrap().is_empty());
        assert!(matches!(
            repo.clear_history(&UserId::new()).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }
}
