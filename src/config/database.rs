//! Database configuration module.
//!
//! This module handles the row-store connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! models without hand-written SQL.

use crate::entities::{Account, Budget, BudgetCategory, Goal, Transaction, budget};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

const BUDGET_MONTH_INDEX: &str = "idx_budgets_owner_month";
const DEFAULT_DATABASE_URL: &str = "sqlite://data/envelope_ledger.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// returns the default local `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every ledger table that does not exist yet.
///
/// Tables are created parents first so foreign keys resolve: accounts and
/// budgets, then categories, then transactions and goals. Budgets also get a
/// unique index on `(owner, month)`.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Account).await?;
    create_table(db, &schema, Budget).await?;
    create_budget_month_index(db).await?;
    create_table(db, &schema, BudgetCategory).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, Goal).await?;

    info!("Ledger tables are in place");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

async fn create_budget_month_index<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let statement = Index::create()
        .name(BUDGET_MONTH_INDEX)
        .table(Budget)
        .col(budget::Column::Owner)
        .col(budget::Column::Month)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(db.get_database_backend().build(&statement)).await?;
    Ok(())
}
