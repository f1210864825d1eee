//! Explicit context threaded into the pager, scheduler and reconciler in
//! place of process-wide settings.

use std::{fmt, sync::Arc};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use parking_lot::Mutex;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut guard = self.now.lock();
        *guard = guard
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[derive(Clone)]
pub struct CoreContext {
    language: Option<String>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreContext")
            .field("language", &self.language)
            .field("clock", &self.clock)
            .finish()
    }
}

impl CoreContext {
    pub fn new(language: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self { language, clock }
    }

    pub fn system(language: Option<String>) -> Self {
        Self::new(language, Arc::new(SystemClock))
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let context = CoreContext::new(Some("en-US".into()), clock.clone());

        clock.advance(TimeDelta::days(1));
        assert_eq!(context.today(), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(context.language(), Some("en-US"));
    }
}
