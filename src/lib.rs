// Core modules
pub mod account;
pub mod clock;
pub mod config;
pub mod deploy;
pub mod error;
pub mod event;
pub mod event_registry;
pub mod prediction;
pub mod prediction_engine;
pub mod token;
pub mod treasury;

// Re-exports
pub use account::Address;
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use crate::config::{EngineConfig, Settings};
pub use deploy::{Deployment, DeploymentSummary};
pub use error::{ErrorKind, LedgerError, PredictionError, Result};
pub use event::{EventId, EventStatus, MatchOutcome, NewSportEvent, SportEvent, UNDECLARED_SCORE};
pub use event_registry::{EventRegistry, RegistryNotice, SharedRegistry};
pub use prediction::{Prediction, PredictionBook};
pub use prediction_engine::{EngineNotice, PredictionEngine, SharedEngine};
pub use token::{InMemoryNativeLedger, InMemoryToken, NativeLedger, SharedNative, SharedToken, TokenLedger};
pub use treasury::{SharedTreasury, Treasury, TreasuryNotice};
