//! Account storage.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::core::errors::ApiError;
use crate::core::security::Role;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserRecord, ApiError> {
        let id = uuid::Uuid::new_v4().to_string();

        let result = sqlx::query(
            "INSERT INTO users (id, username, password_hash, role) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&id)
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(UserRecord {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                role,
            }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                ApiError::BadRequest(format!("username '{}' is already taken", username)),
            ),
            Err(err) => Err(ApiError::internal(err)),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, ApiError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(row.and_then(|row| {
            let role: String = row.get("role");
            Role::from_str(&role).map(|role| UserRecord {
                id: row.get("id"),
                username: row.get("username"),
                password_hash: row.get("password_hash"),
                role,
            })
        }))
    }

    pub async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, UserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::with_path(dir.path().join("users.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_and_find_round_trip() {
        let (_dir, store) = test_store().await;

        store.create("alice", "hash-a", Role::Admin).await.unwrap();
        let found = store.find_by_username("alice").await.unwrap().unwrap();

        assert_eq!(found.username, "alice");
        assert_eq!(found.password_hash, "hash-a");
        assert_eq!(found.role, Role::Admin);

        assert!(store.find_by_username("nobody").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_is_a_bad_request() {
        let (_dir, store) = test_store().await;

        store.create("alice", "hash-a", Role::Admin).await.unwrap();
        let result = store.create("alice", "hash-b", Role::User).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
