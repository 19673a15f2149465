use crate::account::Address;
use crate::error::{PredictionError, Result};
use crate::event::{EventId, SportEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub event_id: EventId,
    pub account: Address,
    pub team_a_score: u16,
    pub team_b_score: u16,
    pub stake: u128,
    /// Stake times the multiplier in force when the prediction was placed.
    pub reward: u128,
    pub claimed: bool,
    pub predicted_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(
        event_id: EventId,
        account: Address,
        (team_a_score, team_b_score): (u16, u16),
        stake: u128,
        multiplier: u128,
        predicted_at: DateTime<Utc>,
    ) -> Result<Self> {
        let reward = stake
            .checked_mul(multiplier)
            .ok_or(PredictionError::Overflow { what: "reward" })?;
        Ok(Self {
            event_id,
            account,
            team_a_score,
            team_b_score,
            stake,
            reward,
            claimed: false,
            predicted_at,
        })
    }

    pub fn won(&self, event: &SportEvent) -> bool {
        event.id == self.event_id && event.matches_score(self.team_a_score, self.team_b_score)
    }
}

/// Prediction ledger keyed by (event, account), with per-event placement order.
#[derive(Debug, Default)]
pub struct PredictionBook {
    predictions: HashMap<(EventId, Address), Prediction>,
    by_event: HashMap<EventId, Vec<Address>>,
}

impl PredictionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event_id: &EventId, account: &Address) -> bool {
        self.predictions.contains_key(&(*event_id, account.clone()))
    }

    pub fn count_for(&self, event_id: &EventId) -> usize {
        self.by_event.get(event_id).map_or(0, Vec::len)
    }

    pub fn insert(&mut self, prediction: Prediction) -> Result<()> {
        let key = (prediction.event_id, prediction.account.clone());
        if self.predictions.contains_key(&key) {
            return Err(PredictionError::AlreadyPredicted {
                event_id: prediction.event_id,
                account: prediction.account,
            });
        }
        self.by_event
            .entry(prediction.event_id)
            .or_default()
            .push(prediction.account.clone());
        self.predictions.insert(key, prediction);
        Ok(())
    }

    pub fn get(&self, event_id: &EventId, account: &Address) -> Result<&Prediction> {
        self.predictions
            .get(&(*event_id, account.clone()))
            .ok_or_else(|| PredictionError::UnknownPrediction {
                event_id: *event_id,
                account: account.clone(),
            })
    }

    /// Irreversible; the caller has already checked the claim conditions.
    pub fn mark_claimed(&mut self, event_id: &EventId, account: &Address) -> Result<()> {
        let prediction = self
            .predictions
            .get_mut(&(*event_id, account.clone()))
            .ok_or_else(|| PredictionError::UnknownPrediction {
                event_id: *event_id,
                account: account.clone(),
            })?;
        if prediction.claimed {
            return Err(PredictionError::AlreadyClaimed(*event_id));
        }
        prediction.claimed = true;
        Ok(())
    }

    pub fn for_event(&self, event_id: &EventId) -> Vec<Prediction> {
        self.by_event
            .get(event_id)
            .into_iter()
            .flatten()
            .filter_map(|account| self.predictions.get(&(*event_id, account.clone())))
            .cloned()
            .collect()
    }
}
