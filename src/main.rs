#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use envelope_ledger::{
    config::{database, settings},
    core::{budget::local_today, ready_to_assign::ready_to_assign_for_owner, seed::seed_from_settings},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load ledger settings
    let settings_path = settings::settings_path();
    let settings = settings::load_settings(&settings_path)
        .inspect_err(|e| error!("Failed to load settings from {}: {}", settings_path, e))?;
    info!(
        owner = %settings.owner,
        accounts = settings.accounts.len(),
        "Loaded settings"
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    // 5. Seed accounts and envelopes for the current month
    let summary = seed_from_settings(&db, &settings, local_today())
        .await
        .inspect_err(|e| error!("Failed to seed ledger: {}", e))?;

    // 6. Report what is still waiting for an envelope
    for rta in ready_to_assign_for_owner(&db, &settings.owner, summary.budget_id).await? {
        info!(
            account_id = rta.account_id,
            balance = rta.balance,
            assigned = rta.assigned,
            ready_to_assign = rta.ready_to_assign,
            "Ready to assign"
        );
    }

    Ok(())
}
