use crate::account::Address;
use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::event_registry::{EventRegistry, SharedRegistry};
use crate::prediction_engine::{PredictionEngine, SharedEngine};
use crate::token::{SharedNative, SharedToken};
use crate::treasury::{SharedTreasury, Treasury};
use serde::Serialize;
use tracing::info;

/// The three components wired together in the order settlement depends on.
pub struct Deployment {
    pub registry: SharedRegistry,
    pub treasury: SharedTreasury,
    pub engine: SharedEngine,
    pub token: SharedToken,
    pub native: SharedNative,
    pub clock: SharedClock,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentSummary {
    pub registry: Address,
    pub engine: Address,
    pub treasury: Address,
    pub token: Address,
    pub admin: Address,
    pub config: EngineConfig,
}

impl Deployment {
    /// Registry, then treasury, then engine; finally the treasury learns the
    /// engine identity so that claims can be paid.
    pub async fn deploy(
        owner: &Address,
        admin: &Address,
        token: SharedToken,
        native: SharedNative,
        clock: SharedClock,
        config: EngineConfig,
    ) -> Result<Self> {
        let registry = EventRegistry::new(owner.clone(), admin.clone(), clock.clone()).into_shared();
        let treasury = Treasury::new(owner.clone(), native.clone()).into_shared();
        let engine = PredictionEngine::new(
            owner.clone(),
            registry.clone(),
            treasury.clone(),
            token.clone(),
            clock.clone(),
            config,
        )?
        .into_shared();

        let engine_address = engine.lock().await.address().clone();
        treasury
            .lock()
            .await
            .set_sport_prediction_address(owner, engine_address.clone())?;

        info!(
            "Deployed registry {}, engine {}, treasury {}",
            registry.read().await.address(),
            engine_address,
            treasury.lock().await.address()
        );

        Ok(Self {
            registry,
            treasury,
            engine,
            token,
            native,
            clock,
        })
    }

    pub async fn summary(&self) -> DeploymentSummary {
        let engine = self.engine.lock().await;
        let registry = self.registry.read().await;
        DeploymentSummary {
            registry: registry.address().clone(),
            engine: engine.address().clone(),
            treasury: self.treasury.lock().await.address().clone(),
            token: self.token.lock().await.address().clone(),
            admin: registry.admin().clone(),
            config: engine.config().clone(),
        }
    }
}
