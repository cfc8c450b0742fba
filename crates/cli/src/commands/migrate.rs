//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ss-cli migrate
//! ```
//!
//! # Migration Files
//!
//! `crates/admin/migrations/`, applied in filename order. The session table
//! used by the admin service is created here too.

use super::{DatabaseError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run admin database migrations.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!("Running admin migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
