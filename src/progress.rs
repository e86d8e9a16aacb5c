//! Best-score and streak ledger.

pub mod sqlite;

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use chrono::{NaiveDate, Utc};

use crate::{error::StoreError, models::progress::Streak};

pub use sqlite::SqliteProgressStore;

pub trait ProgressStore: Send + Sync {
    /// Best score recorded under `key`, 0 when there is none.
    fn get_best(&self, key: &str) -> Result<u32, StoreError>;

    /// Raises the best score under `key` to `score`; lower scores are ignored.
    fn set_best_if_higher(&self, key: &str, score: u32) -> Result<(), StoreError>;

    fn get_streak(&self) -> Result<Streak, StoreError>;

    /// Counts a completed session on `today` and returns the new streak length.
    fn record_completion_today(&self, today: NaiveDate) -> Result<u32, StoreError>;
}

/// Source of the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Calendar days in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl Clock for UtcClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Default)]
pub struct InMemoryProgressStore {
    inner: Mutex<ProgressLedger>,
}

#[derive(Default)]
struct ProgressLedger {
    best: HashMap<String, u32>,
    streak: Streak,
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, ProgressLedger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressStore for InMemoryProgressStore {
    fn get_best(&self, key: &str) -> Result<u32, StoreError> {
        Ok(self.ledger().best.get(key).copied().unwrap_or(0))
    }

    fn set_best_if_higher(&self, key: &str, score: u32) -> Result<(), StoreError> {
        let mut ledger = self.ledger();
        let best = ledger.best.entry(key.to_string()).or_insert(0);
        if score > *best {
            *best = score;
        }
        Ok(())
    }

    fn get_streak(&self) -> Result<Streak, StoreError> {
        Ok(self.ledger().streak)
    }

    fn record_completion_today(&self, today: NaiveDate) -> Result<u32, StoreError> {
        let mut ledger = self.ledger();
        ledger.streak = ledger.streak.record(today);
        Ok(ledger.streak.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn best_score_only_rises() {
        let store = InMemoryProgressStore::new();
        assert_eq!(store.get_best("Quantitative").unwrap(), 0);

        store.set_best_if_higher("Quantitative", 5).unwrap();
        store.set_best_if_higher("Quantitative", 3).unwrap();
        assert_eq!(store.get_best("Quantitative").unwrap(), 5);

        store.set_best_if_higher("Quantitative", 8).unwrap();
        assert_eq!(store.get_best("Quantitative").unwrap(), 8);
        assert_eq!(store.get_best("Logical").unwrap(), 0);
    }

    #[test]
    fn streak_follows_calendar_days() {
        let store = InMemoryProgressStore::new();
        assert_eq!(store.get_streak().unwrap(), Streak::default());

        assert_eq!(store.record_completion_today(day(10)).unwrap(), 1);
        assert_eq!(store.record_completion_today(day(10)).unwrap(), 1);
        assert_eq!(store.record_completion_today(day(11)).unwrap(), 2);
        assert_eq!(store.record_completion_today(day(14)).unwrap(), 1);

        let streak = store.get_streak().unwrap();
        assert_eq!(streak.count, 1);
        assert_eq!(streak.last_date, Some(day(14)));
    }
}
