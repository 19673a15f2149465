use crate::account::Address;
use crate::event::{EventId, EventStatus};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PredictionError>;

/// Failures reported by a token or native ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{account} holds {available}, needs {needed}")]
    InsufficientFunds {
        account: Address,
        needed: u128,
        available: u128,
    },

    #[error("{spender} may move {available} on behalf of {owner}, needs {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: u128,
        available: u128,
    },

    #[error("balance of {account} would overflow")]
    Overflow { account: Address },
}

/// Coarse classification used by callers to drive retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    InvalidInput,
    DuplicateEvent,
    NotFound,
    InvalidState,
    InsufficientFunds,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error("{caller} is not allowed to {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    #[error("event window is empty: end {end} is not after start {start}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("{field} must be greater than zero")]
    InvalidAmount { field: &'static str },

    #[error("position {position} is outside the registry (length {length})")]
    PositionOutOfRange { position: usize, length: usize },

    #[error("arithmetic overflow computing {what}")]
    Overflow { what: &'static str },

    #[error("event {0} already exists")]
    DuplicateEvent(EventId),

    #[error("event {0} does not exist")]
    UnknownEvent(EventId),

    #[error("{account} has no prediction on event {event_id}")]
    UnknownPrediction { event_id: EventId, account: Address },

    #[error("event {0} has not ended yet")]
    NotYetEnded(EventId),

    #[error("event {0} outcome is already declared")]
    AlreadyDeclared(EventId),

    #[error("event {0} outcome is not declared yet")]
    NotDeclared(EventId),

    #[error("event {0} is cancelled")]
    EventCancelled(EventId),

    #[error("event {event_id} is {status:?} and no longer accepts predictions")]
    NotPredictable { event_id: EventId, status: EventStatus },

    #[error("{account} already predicted event {event_id}")]
    AlreadyPredicted { event_id: EventId, account: Address },

    #[error("event {event_id} reached its limit of {max} predictions")]
    CapacityExceeded { event_id: EventId, max: u32 },

    #[error("prediction on event {0} did not win")]
    NotAWinner(EventId),

    #[error("reward for event {0} was already claimed")]
    AlreadyClaimed(EventId),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(LedgerError),

    #[error("insufficient allowance: {0}")]
    InsufficientAllowance(LedgerError),

    #[error("treasury balance {available} cannot cover {needed}")]
    InsufficientBalance { needed: u128, available: u128 },
}

impl PredictionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidWindow { .. }
            | Self::InvalidAmount { .. }
            | Self::PositionOutOfRange { .. }
            | Self::Overflow { .. } => ErrorKind::InvalidInput,
            Self::DuplicateEvent(_) => ErrorKind::DuplicateEvent,
            Self::UnknownEvent(_) | Self::UnknownPrediction { .. } => ErrorKind::NotFound,
            Self::NotYetEnded(_)
            | Self::AlreadyDeclared(_)
            | Self::NotDeclared(_)
            | Self::EventCancelled(_)
            | Self::NotPredictable { .. }
            | Self::AlreadyPredicted { .. }
            | Self::CapacityExceeded { .. }
            | Self::NotAWinner(_)
            | Self::AlreadyClaimed(_) => ErrorKind::InvalidState,
            Self::InsufficientFunds(_)
            | Self::InsufficientAllowance(_)
            | Self::InsufficientBalance { .. } => ErrorKind::InsufficientFunds,
        }
    }
}

impl From<LedgerError> for PredictionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds { .. } => Self::InsufficientFunds(err),
            LedgerError::InsufficientAllowance { .. } => Self::InsufficientAllowance(err),
            LedgerError::Overflow { .. } => Self::Overflow {
                what: "ledger balance",
            },
        }
    }
}
