//! Database models for events.

use diesel::prelude::*;

use pledgeboard_core::lifecycle::{Event, EventState};

use crate::errors::StorageError;
use crate::utils::{
    format_timestamp, parse_decimal, parse_enum, parse_optional_timestamp, parse_timestamp,
};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct EventDB {
    pub id: String,
    pub name: Option<String>,
    pub goal_amount: String,
    pub state: String,
    pub started_at: String,
    pub stopped_at: Option<String>,
    pub report_ref: Option<String>,
}

impl TryFrom<EventDB> for Event {
    type Error = StorageError;

    fn try_from(db: EventDB) -> Result<Self, Self::Error> {
        Ok(Self {
            goal_amount: parse_decimal("events.goal_amount", &db.goal_amount)?,
            state: parse_enum::<EventState>("events.state", &db.state)?,
            started_at: parse_timestamp("events.started_at", &db.started_at)?,
            stopped_at: parse_optional_timestamp("events.stopped_at", db.stopped_at.as_deref())?,
            id: db.id,
            name: db.name,
            report_ref: db.report_ref,
        })
    }
}

impl From<&Event> for EventDB {
    fn from(domain: &Event) -> Self {
        Self {
            id: domain.id.clone(),
            name: domain.name.clone(),
            goal_amount: domain.goal_amount.to_string(),
            state: domain.state.as_str().to_string(),
            started_at: format_timestamp(domain.started_at),
            stopped_at: domain.stopped_at.map(format_timestamp),
            report_ref: domain.report_ref.clone(),
        }
    }
}
