use crate::account::Address;
use crate::error::{LedgerError, PredictionError, Result};
use crate::token::{SharedNative, SharedToken};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub type SharedTreasury = Arc<Mutex<Treasury>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryNotice {
    Received {
        from: Address,
        amount: u128,
    },
    SportPredictionAddressUpdated {
        previous: Option<Address>,
        current: Address,
    },
    Withdrawal {
        to: Address,
        amount: u128,
    },
    TokenWithdrawal {
        token: Address,
        to: Address,
        amount: u128,
    },
}

/// Custodial pool that pays rewards. Besides its owner it trusts exactly one
/// spender identity, the registered prediction engine.
pub struct Treasury {
    address: Address,
    owner: Address,
    sport_prediction: Option<Address>,
    native: SharedNative,
    notices: Vec<TreasuryNotice>,
}

impl Treasury {
    pub fn new(owner: Address, native: SharedNative) -> Self {
        Self {
            address: Address::generate(),
            owner,
            sport_prediction: None,
            native,
            notices: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedTreasury {
        Arc::new(Mutex::new(self))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn sport_prediction_address(&self) -> Option<&Address> {
        self.sport_prediction.as_ref()
    }

    pub fn notices(&self) -> &[TreasuryNotice] {
        &self.notices
    }

    /// Hands the buffered notices to the caller and starts a fresh buffer.
    pub fn take_notices(&mut self) -> Vec<TreasuryNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_authorized(&self, identity: &Address) -> bool {
        identity == &self.owner || self.sport_prediction.as_ref() == Some(identity)
    }

    fn require_owner(&self, caller: &Address, action: &'static str) -> Result<()> {
        if caller != &self.owner {
            warn!("Treasury rejected {} from {}", action, caller);
            return Err(PredictionError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    /// Replaces the authorized spender; the previous one loses access.
    pub fn set_sport_prediction_address(&mut self, caller: &Address, engine: Address) -> Result<()> {
        self.require_owner(caller, "set sport prediction address")?;
        let previous = self.sport_prediction.replace(engine.clone());
        info!("Treasury spender set to {} (was {:?})", engine, previous);
        self.notices.push(TreasuryNotice::SportPredictionAddressUpdated {
            previous,
            current: engine,
        });
        Ok(())
    }

    pub async fn native_balance(&self) -> u128 {
        self.native.lock().await.balance_of(&self.address)
    }

    /// Native currency sent to the treasury by anyone.
    pub async fn deposit_native(&mut self, from: &Address, amount: u128) -> Result<()> {
        self.native.lock().await.transfer(from, &self.address, amount)?;
        info!("Treasury received {} native from {}", amount, from);
        self.notices.push(TreasuryNotice::Received {
            from: from.clone(),
            amount,
        });
        Ok(())
    }

    pub async fn withdraw(&mut self, caller: &Address, amount: u128) -> Result<()> {
        self.require_owner(caller, "withdraw native")?;
        let mut native = self.native.lock().await;
        let available = native.balance_of(&self.address);
        if amount > available {
            return Err(PredictionError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        native
            .transfer(&self.address, caller, amount)
            .map_err(insufficient_balance)?;
        drop(native);

        info!("Treasury withdrew {} native to {}", amount, caller);
        self.notices.push(TreasuryNotice::Withdrawal {
            to: caller.clone(),
            amount,
        });
        Ok(())
    }

    /// Authorization is checked before any balance is looked at.
    pub async fn withdraw_token(
        &mut self,
        caller: &Address,
        token: &SharedToken,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        if !self.is_authorized(caller) {
            warn!("Treasury rejected token withdrawal by {}", caller);
            return Err(PredictionError::Unauthorized {
                caller: caller.clone(),
                action: "withdraw token",
            });
        }

        let mut ledger = token.lock().await;
        ledger
            .transfer(&self.address, to, amount)
            .map_err(insufficient_balance)?;
        let token_address = ledger.address().clone();
        info!("Treasury paid {} {} to {}", amount, ledger.symbol(), to);
        drop(ledger);

        self.notices.push(TreasuryNotice::TokenWithdrawal {
            token: token_address,
            to: to.clone(),
            amount,
        });
        Ok(())
    }
}

/// A shortfall in the treasury's own custody is reported as its balance.
fn insufficient_balance(err: LedgerError) -> PredictionError {
    match err {
        LedgerError::InsufficientFunds {
            needed, available, ..
        } => PredictionError::InsufficientBalance { needed, available },
        other => PredictionError::from(other),
    }
}
