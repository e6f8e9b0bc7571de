//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! upsell-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `UPSELL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/server/migrations/`.

use upsell_server::config::get_database_url;
use upsell_server::db;

use super::CommandError;

/// Run the server's database migrations.
pub async fn run() -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let database_url = get_database_url("UPSELL_DATABASE_URL")?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
