//! Read-through cache for availability bundles. Owned state with explicit
//! invalidation, keyed by (date, staff); write paths that change a day's
//! occupancy or schedule call `invalidate_date`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use time::Date;
use uuid::Uuid;

use crate::availability::service::AvailabilityBundle;

type CacheKey = (Date, Option<Uuid>);

#[derive(Debug)]
pub struct AvailabilityCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, (AvailabilityBundle, Instant)>>,
}

impl AvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, date: Date, staff_id: Option<Uuid>) -> Option<AvailabilityBundle> {
        let mut entries = self.entries.lock().unwrap();
        let key = (date, staff_id);
        match entries.get(&key) {
            Some((bundle, stored_at)) if stored_at.elapsed() < self.ttl => Some(bundle.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, date: Date, staff_id: Option<Uuid>, bundle: AvailabilityBundle) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert((date, staff_id), (bundle, Instant::now()));
    }

    /// Drop every cached bundle for a date, staff-specific or not.
    pub fn invalidate_date(&self, date: Date) {
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|(d, _), _| *d != date);
    }
}
