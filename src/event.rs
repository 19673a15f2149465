use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Score recorded for a team until the outcome is declared.
pub const UNDECLARED_SCORE: i32 = -1;

/// Deterministic identity of a sport event.
///
/// SHA-256 over the length-prefixed team names, league and round, followed by
/// the big-endian season, start seconds and start sub-second nanoseconds. The
/// end timestamp is not part of the identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId([u8; 32]);

impl EventId {
    pub fn compute(
        team_a: &str,
        team_b: &str,
        league: &str,
        round: &str,
        season: u16,
        start: DateTime<Utc>,
    ) -> Self {
        let mut hasher = Sha256::new();
        for field in [team_a, team_b, league, round] {
            hasher.update((field.len() as u32).to_be_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(season.to_be_bytes());
        hasher.update(start.timestamp().to_be_bytes());
        hasher.update(start.timestamp_subsec_nanos().to_be_bytes());
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId(")?;
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..)")
    }
}

/// Lifecycle phase derived from the current instant and the stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Pending,   // before start
    Live,      // start <= now < end
    Ended,     // past end, outcome not declared
    Declared,
    Cancelled,
}

impl EventStatus {
    /// Predictions close at the end instant, not at kick-off.
    pub fn is_predictable(self) -> bool {
        matches!(self, EventStatus::Pending | EventStatus::Live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Undeclared,
    TeamAWin,
    TeamBWin,
    Draw,
}

/// Input for registering an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSportEvent {
    pub team_a: String,
    pub team_b: String,
    pub league: String,
    pub round: String,
    pub season: u16,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewSportEvent {
    pub fn new(
        team_a: impl Into<String>,
        team_b: impl Into<String>,
        league: impl Into<String>,
        round: impl Into<String>,
        season: u16,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            team_a: team_a.into(),
            team_b: team_b.into(),
            league: league.into(),
            round: round.into(),
            season,
            start,
            end,
        }
    }

    pub fn id(&self) -> EventId {
        EventId::compute(
            &self.team_a,
            &self.team_b,
            &self.league,
            &self.round,
            self.season,
            self.start,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportEvent {
    pub id: EventId,
    pub team_a: String,
    pub team_b: String,
    pub league: String,
    pub round: String,
    pub season: u16,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub real_team_a_score: i32,
    pub real_team_b_score: i32,
    pub declared: bool,
    pub cancelled: bool,
}

impl SportEvent {
    pub(crate) fn register(new: NewSportEvent) -> Self {
        Self {
            id: new.id(),
            team_a: new.team_a,
            team_b: new.team_b,
            league: new.league,
            round: new.round,
            season: new.season,
            start: new.start,
            end: new.end,
            real_team_a_score: UNDECLARED_SCORE,
            real_team_b_score: UNDECLARED_SCORE,
            declared: false,
            cancelled: false,
        }
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        if self.cancelled {
            EventStatus::Cancelled
        } else if self.declared {
            EventStatus::Declared
        } else if now < self.start {
            EventStatus::Pending
        } else if now < self.end {
            EventStatus::Live
        } else {
            EventStatus::Ended
        }
    }

    pub fn outcome(&self) -> MatchOutcome {
        if !self.declared {
            return MatchOutcome::Undeclared;
        }
        match self.real_team_a_score.cmp(&self.real_team_b_score) {
            std::cmp::Ordering::Greater => MatchOutcome::TeamAWin,
            std::cmp::Ordering::Less => MatchOutcome::TeamBWin,
            std::cmp::Ordering::Equal => MatchOutcome::Draw,
        }
    }

    /// True only for a declared event whose real score equals the prediction.
    pub fn matches_score(&self, team_a_score: u16, team_b_score: u16) -> bool {
        self.declared
            && self.real_team_a_score == i32::from(team_a_score)
            && self.real_team_b_score == i32::from(team_b_score)
    }
}
