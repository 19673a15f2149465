use crate::account::Address;
use crate::clock::SharedClock;
use crate::error::{PredictionError, Result};
use crate::event::{EventId, EventStatus, NewSportEvent, SportEvent};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub type SharedRegistry = Arc<RwLock<EventRegistry>>;

/// Observable side effects of registry writes, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryNotice {
    EventAdded(EventId),
    EventCancelled(EventId),
    OutcomeDeclared {
        event_id: EventId,
        team_a_score: u16,
        team_b_score: u16,
    },
    AdminChanged {
        previous: Address,
        current: Address,
    },
}

/// Source of truth for sport events and their declared outcomes.
///
/// Events are kept in an append-only insertion sequence next to an id map.
/// `get_all_events` pages that sequence in ascending order while the
/// status-filtered views walk it newest first.
pub struct EventRegistry {
    address: Address,
    owner: Address,
    admin: Address,
    clock: SharedClock,
    order: Vec<EventId>,
    events: HashMap<EventId, SportEvent>,
    notices: Vec<RegistryNotice>,
}

impl EventRegistry {
    pub fn new(owner: Address, admin: Address, clock: SharedClock) -> Self {
        Self {
            address: Address::generate(),
            owner,
            admin,
            clock,
            order: Vec::new(),
            events: HashMap::new(),
            notices: Vec::new(),
        }
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn notices(&self) -> &[RegistryNotice] {
        &self.notices
    }

    /// Hands the buffered notices to the caller and starts a fresh buffer.
    pub fn take_notices(&mut self) -> Vec<RegistryNotice> {
        std::mem::take(&mut self.notices)
    }

    fn require_admin(&self, caller: &Address, action: &'static str) -> Result<()> {
        if caller != &self.admin {
            warn!("Rejected {} from non-admin {}", action, caller);
            return Err(PredictionError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    /// Only the registry owner may hand the admin role to someone else.
    pub fn set_admin_address(&mut self, caller: &Address, admin: Address) -> Result<()> {
        if caller != &self.owner {
            warn!("Rejected admin change from non-owner {}", caller);
            return Err(PredictionError::Unauthorized {
                caller: caller.clone(),
                action: "set admin address",
            });
        }
        let previous = std::mem::replace(&mut self.admin, admin.clone());
        info!("Registry admin changed: {} -> {}", previous, admin);
        self.notices.push(RegistryNotice::AdminChanged {
            previous,
            current: admin,
        });
        Ok(())
    }

    fn validate_new(&self, new: &NewSportEvent, staged: &HashSet<EventId>) -> Result<EventId> {
        if new.end <= new.start {
            return Err(PredictionError::InvalidWindow {
                start: new.start,
                end: new.end,
            });
        }
        let id = new.id();
        if self.events.contains_key(&id) || staged.contains(&id) {
            return Err(PredictionError::DuplicateEvent(id));
        }
        Ok(id)
    }

    fn insert(&mut self, new: NewSportEvent) -> EventId {
        let event = SportEvent::register(new);
        let id = event.id;
        info!(
            "Event added: {} vs {} ({} {}, season {}) id={}",
            event.team_a, event.team_b, event.league, event.round, event.season, id
        );
        self.order.push(id);
        self.events.insert(id, event);
        self.notices.push(RegistryNotice::EventAdded(id));
        id
    }

    pub fn add_event(&mut self, caller: &Address, new: NewSportEvent) -> Result<EventId> {
        self.require_admin(caller, "add event")?;
        self.validate_new(&new, &HashSet::new())?;
        Ok(self.insert(new))
    }

    /// All-or-nothing: every element is validated before any is inserted.
    pub fn add_events(&mut self, caller: &Address, batch: Vec<NewSportEvent>) -> Result<Vec<EventId>> {
        self.require_admin(caller, "add events")?;
        let mut staged = HashSet::with_capacity(batch.len());
        for new in &batch {
            let id = self.validate_new(new, &staged)?;
            staged.insert(id);
        }
        Ok(batch.into_iter().map(|new| self.insert(new)).collect())
    }

    /// Unknown ids abort the whole batch. Re-cancelling is a silent no-op and
    /// declared events can no longer be cancelled.
    pub fn cancel_events(&mut self, caller: &Address, ids: &[EventId]) -> Result<()> {
        self.require_admin(caller, "cancel events")?;
        for id in ids {
            let event = self.event(id)?;
            if event.declared {
                return Err(PredictionError::AlreadyDeclared(*id));
            }
        }
        for id in ids {
            if let Some(event) = self.events.get_mut(id) {
                if event.cancelled {
                    debug!("Event {} already cancelled", id);
                    continue;
                }
                event.cancelled = true;
                info!("Event cancelled: {} vs {} id={}", event.team_a, event.team_b, id);
                self.notices.push(RegistryNotice::EventCancelled(*id));
            }
        }
        Ok(())
    }

    pub fn declare_outcome(
        &mut self,
        caller: &Address,
        id: EventId,
        team_a_score: u16,
        team_b_score: u16,
    ) -> Result<()> {
        self.declare_outcomes(caller, &[(id, team_a_score, team_b_score)])
    }

    /// All-or-nothing over `(id, team_a_score, team_b_score)` triples.
    pub fn declare_outcomes(&mut self, caller: &Address, outcomes: &[(EventId, u16, u16)]) -> Result<()> {
        self.require_admin(caller, "declare outcomes")?;
        let now = self.clock.now();
        let mut staged = HashSet::with_capacity(outcomes.len());
        for (id, _, _) in outcomes {
            let event = self.event(id)?;
            if event.declared || staged.contains(id) {
                return Err(PredictionError::AlreadyDeclared(*id));
            }
            if event.cancelled {
                return Err(PredictionError::EventCancelled(*id));
            }
            if now < event.end {
                return Err(PredictionError::NotYetEnded(*id));
            }
            staged.insert(*id);
        }

        for &(id, team_a_score, team_b_score) in outcomes {
            if let Some(event) = self.events.get_mut(&id) {
                event.real_team_a_score = i32::from(team_a_score);
                event.real_team_b_score = i32::from(team_b_score);
                event.declared = true;
                info!(
                    "Outcome declared: {} {} - {} {} id={}",
                    event.team_a, team_a_score, team_b_score, event.team_b, id
                );
                self.notices.push(RegistryNotice::OutcomeDeclared {
                    event_id: id,
                    team_a_score,
                    team_b_score,
                });
            }
        }
        Ok(())
    }

    pub fn event_exists(&self, id: &EventId) -> bool {
        self.events.contains_key(id)
    }

    pub fn event(&self, id: &EventId) -> Result<&SportEvent> {
        self.events.get(id).ok_or(PredictionError::UnknownEvent(*id))
    }

    pub fn status(&self, id: &EventId) -> Result<EventStatus> {
        let now = self.clock.now();
        Ok(self.event(id)?.status_at(now))
    }

    /// Records in exactly the requested order.
    pub fn get_events(&self, ids: &[EventId]) -> Result<Vec<SportEvent>> {
        ids.iter().map(|id| self.event(id).cloned()).collect()
    }

    /// Records at the given insertion positions, in the order of `positions`.
    pub fn get_indexed_events(&self, positions: &[usize]) -> Result<Vec<SportEvent>> {
        positions
            .iter()
            .map(|&position| {
                let id = self.order.get(position).ok_or(PredictionError::PositionOutOfRange {
                    position,
                    length: self.order.len(),
                })?;
                self.event(id).cloned()
            })
            .collect()
    }

    /// Ascending page of the insertion sequence; clamped to what exists.
    pub fn get_all_events(&self, offset: usize, count: usize) -> Vec<SportEvent> {
        self.order
            .iter()
            .skip(offset)
            .take(count)
            .filter_map(|id| self.events.get(id).cloned())
            .collect()
    }

    pub fn get_pending_events(&self) -> Vec<SportEvent> {
        self.events_newest_first(|status| status == EventStatus::Pending)
    }

    pub fn get_live_events(&self) -> Vec<SportEvent> {
        self.events_newest_first(|status| status == EventStatus::Live)
    }

    /// Status-filtered view, most recently added first, judged at one instant.
    pub fn events_newest_first<F>(&self, keep: F) -> Vec<SportEvent>
    where
        F: Fn(EventStatus) -> bool,
    {
        let now = self.clock.now();
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.events.get(id))
            .filter(|event| keep(event.status_at(now)))
            .cloned()
            .collect()
    }

    pub fn get_events_length(&self) -> usize {
        self.order.len()
    }
}
