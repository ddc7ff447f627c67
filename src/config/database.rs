//! Database configuration for the planner's remote tables.
//!
//! Handles the `SQLite` connection and creates one table per synced collection from the
//! entity definitions with `Schema::create_table_from_entity`, so the schema always
//! matches the models.

use crate::entities::{Budget, Guest, Task, Vendor, WeddingInfo};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema};
use tracing::{debug, info};

/// Used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/wedding_planner.sqlite?mode=rwc";

/// Gets the database URL from `DATABASE_URL` or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Connects to the database named by [`get_database_url`].
///
/// The `data/` directory is created first when the default URL is in use.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    connect(&database_url).await
}

/// Connects to `database_url`.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<()> {
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!("Table {} ready", entity.table_name());
    Ok(())
}

/// Creates the guests, vendors, tasks, budget and wedding info tables if missing.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Guest).await?;
    create_table(db, &schema, Vendor).await?;
    create_table(db, &schema, Task).await?;
    create_table(db, &schema, Budget).await?;
    create_table(db, &schema, WeddingInfo).await?;

    Ok(())
}
