use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{NewUser, UserId, UserRecord};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        let rec = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?) RETURNING id")
            .bind(&user.name)
            .bind(&user.email)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert user")?;
        Ok(user.clone().with_id(UserId(rec.get::<i64, _>(0))))
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load user {}", user_id.0))?;
        Ok(row.as_ref().map(user_from_row))
    }

    /// Rewrites name and email of `user.id`; returns the number of rows touched.
    pub async fn update_user(&self, user: &UserRecord) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update user {}", user.id.0))?;
        Ok(result.rows_affected())
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let rows = sqlx::query("SELECT id, name, email FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list users")?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    pub async fn delete_user(&self, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete user {}", user_id.0))?;
        Ok(result.rows_affected() > 0)
    }
}

fn user_from_row(row: &SqliteRow) -> UserRecord {
    UserRecord {
        id: UserId(row.get::<i64, _>("id")),
        name: row.get::<String, _>("name"),
        email: row.get::<String, _>("email"),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
