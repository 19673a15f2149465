use crate::account::Address;
use crate::clock::SharedClock;
use crate::config::EngineConfig;
use crate::error::{PredictionError, Result};
use crate::event::{EventId, EventStatus, SportEvent};
use crate::event_registry::SharedRegistry;
use crate::prediction::{Prediction, PredictionBook};
use crate::token::SharedToken;
use crate::treasury::SharedTreasury;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub type SharedEngine = Arc<Mutex<PredictionEngine>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineNotice {
    Predicted {
        event_id: EventId,
        account: Address,
        team_a_score: u16,
        team_b_score: u16,
        amount: u128,
    },
    Claimed {
        account: Address,
        event_id: EventId,
        reward: u128,
    },
    OracleAddressUpdated(Address),
    TreasuryAddressUpdated(Address),
    PredictAmountUpdated(u128),
    MultiplierUpdated(u128),
    MaxPredictionsUpdated(u32),
}

/// Escrows stakes against predicted scores and settles winners through the
/// treasury.
///
/// Lock order is engine, registry, treasury, token ledger. The engine holds the
/// registry read lock for the whole of `predict` and `claim` so the event
/// cannot change state underneath a decision.
pub struct PredictionEngine {
    address: Address,
    owner: Address,
    registry: SharedRegistry,
    treasury: SharedTreasury,
    token: SharedToken,
    clock: SharedClock,
    config: EngineConfig,
    book: PredictionBook,
    notices: Vec<EngineNotice>,
}

impl PredictionEngine {
    pub fn new(
        owner: Address,
        registry: SharedRegistry,
        treasury: SharedTreasury,
        token: SharedToken,
        clock: SharedClock,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            address: Address::generate(),
            owner,
            registry,
            treasury,
            token,
            clock,
            config,
            book: PredictionBook::new(),
            notices: Vec::new(),
        })
    }

    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn treasury(&self) -> &SharedTreasury {
        &self.treasury
    }

    pub fn token(&self) -> &SharedToken {
        &self.token
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn notices(&self) -> &[EngineNotice] {
        &self.notices
    }

    /// Hands the buffered notices to the caller and starts a fresh buffer.
    pub fn take_notices(&mut self) -> Vec<EngineNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn multiplier(&self) -> u128 {
        self.config.multiplier
    }

    pub fn predict_amount(&self) -> u128 {
        self.config.stake_amount
    }

    pub fn max_predictions(&self) -> u32 {
        self.config.max_predictions_per_event
    }

    fn require_owner(&self, caller: &Address, action: &'static str) -> Result<()> {
        if caller != &self.owner {
            warn!("Engine rejected {} from {}", action, caller);
            return Err(PredictionError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    pub async fn set_oracle_address(&mut self, caller: &Address, registry: SharedRegistry) -> Result<()> {
        self.require_owner(caller, "set oracle address")?;
        let address = registry.read().await.address().clone();
        self.registry = registry;
        info!("Engine oracle set to {}", address);
        self.notices.push(EngineNotice::OracleAddressUpdated(address));
        Ok(())
    }

    pub async fn set_treasury_address(&mut self, caller: &Address, treasury: SharedTreasury) -> Result<()> {
        self.require_owner(caller, "set treasury address")?;
        let address = treasury.lock().await.address().clone();
        self.treasury = treasury;
        info!("Engine treasury set to {}", address);
        self.notices.push(EngineNotice::TreasuryAddressUpdated(address));
        Ok(())
    }

    /// Applies to predictions placed from now on; existing ones keep their stake.
    pub fn set_predict_amount(&mut self, caller: &Address, amount: u128) -> Result<()> {
        self.require_owner(caller, "set predict amount")?;
        if amount == 0 {
            return Err(PredictionError::InvalidAmount { field: "predict amount" });
        }
        self.config.stake_amount = amount;
        info!("Predict amount set to {}", amount);
        self.notices.push(EngineNotice::PredictAmountUpdated(amount));
        Ok(())
    }

    /// Applies to predictions placed from now on; existing rewards are frozen.
    pub fn set_multiplier(&mut self, caller: &Address, multiplier: u128) -> Result<()> {
        self.require_owner(caller, "set multiplier")?;
        if multiplier == 0 {
            return Err(PredictionError::InvalidAmount { field: "multiplier" });
        }
        self.config.multiplier = multiplier;
        info!("Reward multiplier set to {}", multiplier);
        self.notices.push(EngineNotice::MultiplierUpdated(multiplier));
        Ok(())
    }

    pub fn set_max_predictions(&mut self, caller: &Address, count: u32) -> Result<()> {
        self.require_owner(caller, "set max predictions")?;
        if count == 0 {
            return Err(PredictionError::InvalidAmount {
                field: "max predictions",
            });
        }
        self.config.max_predictions_per_event = count;
        info!("Max predictions per event set to {}", count);
        self.notices.push(EngineNotice::MaxPredictionsUpdated(count));
        Ok(())
    }

    /// Pulls the configured stake from `caller` and records the predicted score.
    pub async fn predict(
        &mut self,
        caller: &Address,
        event_id: EventId,
        team_a_score: u16,
        team_b_score: u16,
    ) -> Result<()> {
        let now = self.clock.now();
        let registry = self.registry.read().await;
        let status = registry.event(&event_id)?.status_at(now);
        if !status.is_predictable() {
            return Err(PredictionError::NotPredictable { event_id, status });
        }
        if self.book.contains(&event_id, caller) {
            return Err(PredictionError::AlreadyPredicted {
                event_id,
                account: caller.clone(),
            });
        }
        let max = self.config.max_predictions_per_event;
        if self.book.count_for(&event_id) >= max as usize {
            return Err(PredictionError::CapacityExceeded { event_id, max });
        }

        let stake = self.config.stake_amount;
        let prediction = Prediction::new(
            event_id,
            caller.clone(),
            (team_a_score, team_b_score),
            stake,
            self.config.multiplier,
            now,
        )?;
        self.token
            .lock()
            .await
            .transfer_from(&self.address, caller, &self.address, stake)?;
        self.book.insert(prediction)?;
        drop(registry);

        info!(
            "Prediction placed: {} predicts {}-{} on {} (stake {})",
            caller, team_a_score, team_b_score, event_id, stake
        );
        self.notices.push(EngineNotice::Predicted {
            event_id,
            account: caller.clone(),
            team_a_score,
            team_b_score,
            amount: stake,
        });
        Ok(())
    }

    /// Pending and live events, most recently added first.
    pub async fn get_predictable_events(&self) -> Vec<SportEvent> {
        self.registry
            .read()
            .await
            .events_newest_first(EventStatus::is_predictable)
    }

    pub fn get_user_predictions(&self, account: &Address, event_ids: &[EventId]) -> Result<Vec<Prediction>> {
        event_ids
            .iter()
            .map(|event_id| self.book.get(event_id, account).cloned())
            .collect()
    }

    /// Every prediction on the event, in the order they were placed.
    pub async fn get_predictions(&self, event_id: &EventId) -> Result<Vec<Prediction>> {
        if !self.registry.read().await.event_exists(event_id) {
            return Err(PredictionError::UnknownEvent(*event_id));
        }
        Ok(self.book.for_event(event_id))
    }

    /// Whether each prediction won. Every listed event must be declared.
    pub async fn user_predict_status(&self, account: &Address, event_ids: &[EventId]) -> Result<Vec<bool>> {
        let registry = self.registry.read().await;
        event_ids
            .iter()
            .map(|event_id| {
                let event = registry.event(event_id)?;
                if !event.declared {
                    return Err(PredictionError::NotDeclared(*event_id));
                }
                Ok(self.book.get(event_id, account)?.won(event))
            })
            .collect()
    }

    /// Settles every listed event for `caller` or none of them. Returns the
    /// total paid by the treasury.
    pub async fn claim(&mut self, caller: &Address, event_ids: &[EventId]) -> Result<u128> {
        let registry = self.registry.read().await;
        let mut seen = HashSet::with_capacity(event_ids.len());
        let mut payouts = Vec::with_capacity(event_ids.len());
        let mut total: u128 = 0;

        for event_id in event_ids {
            let event = registry.event(event_id)?;
            let prediction = self.book.get(event_id, caller)?;
            if prediction.claimed || !seen.insert(*event_id) {
                warn!("Repeated claim by {} on {}", caller, event_id);
                return Err(PredictionError::AlreadyClaimed(*event_id));
            }
            if !prediction.won(event) {
                return Err(PredictionError::NotAWinner(*event_id));
            }
            total = total
                .checked_add(prediction.reward)
                .ok_or(PredictionError::Overflow { what: "claim total" })?;
            payouts.push((*event_id, prediction.reward));
        }

        if payouts.is_empty() {
            return Ok(0);
        }

        self.treasury
            .lock()
            .await
            .withdraw_token(&self.address, &self.token, caller, total)
            .await?;

        for (event_id, reward) in payouts {
            self.book.mark_claimed(&event_id, caller)?;
            info!("Reward claimed: {} receives {} for {}", caller, reward, event_id);
            self.notices.push(EngineNotice::Claimed {
                account: caller.clone(),
                event_id,
                reward,
            });
        }
        drop(registry);
        Ok(total)
    }
}
