use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;

use crate::clock::{minute_of_day, parse_clock};
use crate::error::{ApiError, StoreError};
use crate::focus::FocusSession;
use crate::models::Db;
use crate::planner;
use crate::store::{self, KeyValueStore};

// Shared by all handlers.
pub struct AppState {
    store: Box<dyn KeyValueStore>,
    // Serializes load -> transition -> save cycles.
    write_lock: tokio::sync::Mutex<()>,
    focus: Mutex<Option<FocusSession>>,
    // Replaces the wall clock when set.
    pinned_now: Option<DateTime<FixedOffset>>,
}

impl AppState {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            write_lock: tokio::sync::Mutex::new(()),
            focus: Mutex::new(None),
            pinned_now: None,
        }
    }

    pub fn pinned_at(mut self, now: DateTime<FixedOffset>) -> Self {
        self.pinned_now = Some(now);
        self
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.pinned_now.unwrap_or_else(now_fixed_offset)
    }

    fn open(&self, today: NaiveDate) -> Result<Db, StoreError> {
        let db = store::load_db(self.store.as_ref())?;
        let (db, rolled_over) = planner::open_day(&db, today);
        if rolled_over {
            store::save_db(self.store.as_ref(), &db)?;
        }
        Ok(db)
    }

    // Current state for `today`, after the start-of-day sweep.
    pub async fn read(&self, today: NaiveDate) -> Result<Db, ApiError> {
        let _guard = self.write_lock.lock().await;
        Ok(self.open(today)?)
    }

    /// Apply one transition and persist the result.
    ///
    /// Nothing is written when `transition` fails.
    pub async fn update<T>(
        &self,
        today: NaiveDate,
        transition: impl FnOnce(&Db) -> Result<(Db, T), ApiError>,
    ) -> Result<T, ApiError> {
        let _guard = self.write_lock.lock().await;
        let db = self.open(today)?;
        let (next, out) = transition(&db)?;
        store::save_db(self.store.as_ref(), &next)?;
        Ok(out)
    }

    pub fn focus(&self) -> Option<FocusSession> {
        self.focus.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_focus(&self, session: Option<FocusSession>) {
        *self.focus.lock().unwrap_or_else(|e| e.into_inner()) = session;
    }

    // Clears the running session only if it is still `session`.
    pub fn clear_focus_if(&self, session: &FocusSession) -> bool {
        let mut focus = self.focus.lock().unwrap_or_else(|e| e.into_inner());
        if focus.as_ref() == Some(session) {
            *focus = None;
            return true;
        }
        false
    }
}

// Local -> FixedOffset (current system offset)
pub fn now_fixed_offset() -> DateTime<FixedOffset> {
    chrono::Local::now().fixed_offset()
}

// Optional "HH:MM" override of the wall clock.
#[derive(Debug, Default, Deserialize)]
pub struct AtQuery {
    pub at: Option<String>,
}

impl AtQuery {
    pub fn minutes(&self, now: DateTime<FixedOffset>) -> Result<u32, ApiError> {
        match &self.at {
            Some(at) => parse_clock(at).map_err(|e| ApiError::BadRequest(e.to_string())),
            None => Ok(minute_of_day(now.time())),
        }
    }
}
