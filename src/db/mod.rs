use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::review::Review;
pub use repositories::user::{User, hash_password};

/// Facade over the connection pool and the per-table repositories.
///
/// Each operation borrows a connection from the pool for the duration of a
/// single statement and releases it on every exit path; no application-level
/// transaction spans multiple statements.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn review_repo(&self) -> repositories::review::ReviewRepository {
        repositories::review::ReviewRepository::new(self.conn.clone())
    }

    /// Create a user; `Ok(None)` means the username is already taken.
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<User>> {
        self.user_repo().create(username, password_hash).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn insert_review(
        &self,
        owner: &str,
        movie: &str,
        sentiment: &str,
        confidence: &str,
        created_at: &str,
    ) -> Result<i32> {
        self.review_repo()
            .insert(owner, movie, sentiment, confidence, created_at)
            .await
    }

    pub async fn list_reviews_by_owner(&self, owner: &str) -> Result<Vec<Review>> {
        self.review_repo().list_by_owner(owner).await
    }

    /// Permissive update: no existence or ownership check on the id.
    pub async fn update_review(
        &self,
        id: i32,
        movie: &str,
        sentiment: &str,
        confidence: &str,
    ) -> Result<()> {
        self.review_repo()
            .update(id, movie, sentiment, confidence)
            .await
    }

    /// Permissive delete: silent no-op on unknown ids.
    pub async fn delete_review(&self, id: i32) -> Result<()> {
        self.review_repo().delete(id).await
    }

    /// Hash a password with the configured Argon2id parameters, off the
    /// async runtime.
    pub async fn hash_password_blocking(
        &self,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<String> {
        let password = password.to_string();
        let config = config.clone();

        tokio::task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task panicked: {e}"))?
    }
}
