use anyhow::{Context, Result};
use sport_prediction::{
    Address, Deployment, InMemoryNativeLedger, InMemoryToken, SharedClock, SharedNative, SharedToken,
    Settings, SystemClock,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!("Deploying sport prediction contracts");

    let owner = Address::new(settings.owner.clone());
    let admin = Address::new(settings.admin.clone());
    if owner == admin {
        warn!("Registry admin is the owner {} - outcomes are declared by the deployer", owner);
    }

    let engine_config = settings.engine_config()?;

    let mut token = InMemoryToken::new(settings.token_symbol.clone());
    token
        .mint(&owner, settings.base_units(settings.owner_supply_tokens)?)
        .context("Failed to mint owner supply")?;
    let token: SharedToken = token.into_shared();
    let native: SharedNative = InMemoryNativeLedger::new().into_shared();
    let clock: SharedClock = Arc::new(SystemClock);

    let deployment = Deployment::deploy(&owner, &admin, token.clone(), native, clock, engine_config)
        .await
        .context("Deployment failed")?;

    // Fund the treasury so the first winners can be paid
    let funding = settings.base_units(settings.treasury_funding_tokens)?;
    let treasury_address = deployment.treasury.lock().await.address().clone();
    token
        .lock()
        .await
        .transfer(&owner, &treasury_address, funding)
        .context("Failed to fund treasury")?;
    info!(
        "Treasury funded with {} {}",
        settings.treasury_funding_tokens, settings.token_symbol
    );

    let summary = deployment.summary().await;
    info!(
        "Event registry: {}, prediction engine: {}, treasury: {}",
        summary.registry, summary.engine, summary.treasury
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
