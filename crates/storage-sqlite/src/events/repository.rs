use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;

use pledgeboard_core::errors::{Error, Result};
use pledgeboard_core::lifecycle::{Event, EventRepositoryTrait, FinalLedger};

use super::model::EventDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::ledger::load_entries;
use crate::schema::events;

pub struct EventRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl EventRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        EventRepository { pool, writer }
    }
}

/// Loads an event on the given connection, mapping a missing row to
/// `NotFound`. Used by every write job that has to re-check event state.
pub(crate) fn load_event(conn: &mut SqliteConnection, event_id: &str) -> Result<Event> {
    let row = events::table
        .find(event_id)
        .first::<EventDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::not_found(format!("event {event_id}")))?;
    Event::try_from(row).into_core()
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn create(&self, event: Event) -> Result<Event> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Event> {
                diesel::insert_into(events::table)
                    .values(EventDB::from(&event))
                    .execute(conn)
                    .into_core()?;
                load_event(conn, &event.id)
            })
            .await
    }

    async fn mark_stopped(
        &self,
        event_id: &str,
        stopped_at: DateTime<Utc>,
    ) -> Result<FinalLedger> {
        let event_id = event_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<FinalLedger> {
                let stopped = load_event(conn, &event_id)?.stopped(stopped_at)?;
                diesel::update(events::table.find(&event_id))
                    .set(EventDB::from(&stopped))
                    .execute(conn)
                    .into_core()?;
                Ok(FinalLedger {
                    event: load_event(conn, &event_id)?,
                    entries: load_entries(conn, &event_id, 0)?,
                })
            })
            .await
    }

    async fn set_report_ref(&self, event_id: &str, report_ref: &str) -> Result<Event> {
        let event_id = event_id.to_string();
        let report_ref = report_ref.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Event> {
                let updated = diesel::update(events::table.find(&event_id))
                    .set(events::report_ref.eq(&report_ref))
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::not_found(format!("event {event_id}")));
                }
                load_event(conn, &event_id)
            })
            .await
    }

    fn get_by_id(&self, event_id: &str) -> Result<Event> {
        let mut conn = get_connection(&self.pool)?;
        load_event(&mut conn, event_id)
    }

    fn list(&self) -> Result<Vec<Event>> {
        let mut conn = get_connection(&self.pool)?;
        events::table
            .order((events::started_at.desc(), events::id.desc()))
            .load::<EventDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(|row| Event::try_from(row).map_err(Error::from))
            .collect()
    }
}
