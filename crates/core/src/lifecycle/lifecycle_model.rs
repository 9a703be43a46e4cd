//! Event lifecycle domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::ledger::{LedgerAggregate, LedgerEntry};
use crate::validation::parse_amount;

/// Event state. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    Active,
    Stopped,
}

impl EventState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventState::Active => "ACTIVE",
            EventState::Stopped => "STOPPED",
        }
    }
}

impl std::str::FromStr for EventState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(EventState::Active),
            "STOPPED" => Ok(EventState::Stopped),
            other => Err(format!("unknown event state: {other}")),
        }
    }
}

/// A fundraising event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: Option<String>,
    pub goal_amount: Decimal,
    pub state: EventState,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub report_ref: Option<String>,
}

impl Event {
    pub fn is_active(&self) -> bool {
        self.state == EventState::Active
    }

    /// Fails with `EventClosed` unless the event still accepts intake.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::EventClosed(self.id.clone()))
        }
    }

    /// The one allowed transition, `Active -> Stopped`.
    pub fn stopped(mut self, at: DateTime<Utc>) -> Result<Self> {
        self.ensure_active()?;
        self.state = EventState::Stopped;
        self.stopped_at = Some(at);
        Ok(self)
    }
}

/// Input model for starting an event. The goal arrives as typed text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: Option<String>,
    pub goal_amount: String,
}

impl NewEvent {
    pub fn new(goal_amount: impl Into<String>) -> Self {
        Self {
            name: None,
            goal_amount: goal_amount.into(),
        }
    }

    /// Parses the goal with the amount rules; any failure is `InvalidGoal`.
    pub fn parse_goal(&self) -> Result<Decimal> {
        parse_amount(&self.goal_amount).map_err(|e| {
            Error::Validation(ValidationError::InvalidGoal(match e {
                ValidationError::InvalidAmount(detail) => detail,
                other => other.to_string(),
            }))
        })
    }

    /// Name trimmed, with blank names dropped.
    pub fn display_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }
}

/// A freshly stopped event and its ledger, read in the stopping transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalLedger {
    pub event: Event,
    pub entries: Vec<LedgerEntry>,
}

/// Result of stopping an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEvent {
    pub event: Event,
    pub aggregate: LedgerAggregate,
    pub report_ref: Option<String>,
}
