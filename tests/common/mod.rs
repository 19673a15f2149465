#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use sport_prediction::{
    Address, Deployment, EngineConfig, EventId, InMemoryNativeLedger, InMemoryToken, ManualClock,
    NewSportEvent, Result, TokenLedger,
};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TOKEN: u128 = 1_000_000_000_000_000_000;
pub const STAKE: u128 = 100 * TOKEN;
pub const MULTIPLIER: u128 = 10;
pub const MAX_PREDICTIONS: u32 = 50;

pub fn genesis() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap()
}

/// Two events registered by the admin, both starting in one hour and ending in two.
pub struct Fixture {
    pub clock: Arc<ManualClock>,
    pub token: Arc<Mutex<InMemoryToken>>,
    pub native: Arc<Mutex<InMemoryNativeLedger>>,
    pub deployment: Deployment,
    pub owner: Address,
    pub admin: Address,
    pub user: Address,
    pub psg_lyon: EventId,
    pub juventus_liverpool: EventId,
}

pub fn psg_lyon(now: DateTime<Utc>) -> NewSportEvent {
    let start = now + Duration::hours(1);
    NewSportEvent::new("PSG", "Lyon", "French Cup", "Semi Final", 2022, start, now + Duration::hours(2))
}

pub fn juventus_liverpool(now: DateTime<Utc>) -> NewSportEvent {
    let start = now + Duration::hours(1);
    NewSportEvent::new(
        "Juventus",
        "Liverpool",
        "International Champions Cup",
        "Final",
        2022,
        start,
        now + Duration::hours(2),
    )
}

impl Fixture {
    pub async fn new() -> Self {
        let clock = Arc::new(ManualClock::new(genesis()));
        let owner = Address::new("0xdeployer");
        let admin = Address::new("0xadmin");
        let user = Address::new("0xuser");

        let token = InMemoryToken::new("PRED").into_shared();
        token.lock().await.mint(&owner, 1_000_000 * TOKEN).unwrap();
        let native = InMemoryNativeLedger::new().into_shared();

        let config = EngineConfig {
            stake_amount: STAKE,
            multiplier: MULTIPLIER,
            max_predictions_per_event: MAX_PREDICTIONS,
        };
        let deployment = Deployment::deploy(
            &owner,
            &admin,
            token.clone(),
            native.clone(),
            clock.clone(),
            config,
        )
        .await
        .unwrap();

        let ids = deployment
            .registry
            .write()
            .await
            .add_events(&admin, vec![psg_lyon(genesis()), juventus_liverpool(genesis())])
            .unwrap();

        Self {
            clock,
            token,
            native,
            deployment,
            owner,
            admin,
            user,
            psg_lyon: ids[0],
            juventus_liverpool: ids[1],
        }
    }

    pub async fn engine_address(&self) -> Address {
        self.deployment.engine.lock().await.address().clone()
    }

    pub async fn treasury_address(&self) -> Address {
        self.deployment.treasury.lock().await.address().clone()
    }

    pub async fn balance_of(&self, account: &Address) -> u128 {
        self.token.lock().await.balance_of(account)
    }

    pub async fn approve_and_predict(&self, account: &Address, event_id: EventId, a: u16, b: u16) -> Result<()> {
        let engine_address = self.engine_address().await;
        self.token.lock().await.approve(account, &engine_address, STAKE);
        self.deployment
            .engine
            .lock()
            .await
            .predict(account, event_id, a, b)
            .await
    }

    pub async fn fund_treasury(&self, amount: u128) {
        let treasury = self.treasury_address().await;
        self.token
            .lock()
            .await
            .transfer(&self.owner, &treasury, amount)
            .unwrap();
    }

    pub async fn give_tokens(&self, account: &Address, amount: u128) {
        self.token
            .lock()
            .await
            .transfer(&self.owner, account, amount)
            .unwrap();
    }

    /// Moves the clock a full day ahead, past both event windows.
    pub fn finish_events(&self) {
        self.clock.advance(Duration::days(1));
    }

    pub async fn declare(&self, event_id: EventId, a: u16, b: u16) -> Result<()> {
        self.deployment
            .registry
            .write()
            .await
            .declare_outcome(&self.admin, event_id, a, b)
    }

    pub async fn claim(&self, account: &Address, event_ids: &[EventId]) -> Result<u128> {
        self.deployment.engine.lock().await.claim(account, event_ids).await
    }
}
