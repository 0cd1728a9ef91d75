use async_trait::async_trait;
use movie_log_models::{DateRange, ImdbId, NewViewing, PriorViewing, ViewingEntry};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

use crate::backend::LogBackend;
use crate::error::StoreError;

/// In-memory `movies` table with switches to simulate connection and parameter faults.
pub struct MemoryBackend {
    rows: Mutex<Vec<ViewingEntry>>,
    connected: AtomicBool,
    refuse_reconnect: AtomicBool,
    reject_inserts: AtomicBool,
    reconnects: AtomicU64,
    lookups: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::with_rows(Vec::new())
    }
}

impl MemoryBackend {
    pub fn with_rows(rows: Vec<ViewingEntry>) -> Self {
        Self {
            rows: Mutex::new(rows),
            connected: AtomicBool::new(true),
            refuse_reconnect: AtomicBool::new(false),
            reject_inserts: AtomicBool::new(false),
            reconnects: AtomicU64::new(0),
            lookups: AtomicU64::new(0),
        }
    }

    /// Every operation fails with a lost connection until the next reconnect.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn refuse_reconnect(&self, refuse: bool) {
        self.refuse_reconnect.store(refuse, Ordering::SeqCst);
    }

    pub fn reject_inserts(&self, reject: bool) {
        self.reject_inserts.store(reject, Ordering::SeqCst);
    }

    pub fn reconnect_count(&self) -> u64 {
        self.reconnects.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub async fn row_count(&self) -> usize {
        self.rows.lock().await.len()
    }

    fn check_connected(&self) -> Result<(), StoreError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::ConnectionLost("connection closed by server".to_string()))
        }
    }
}

#[async_trait]
impl LogBackend for MemoryBackend {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn rows_between(&self, range: &DateRange) -> Result<Vec<ViewingEntry>, StoreError> {
        self.check_connected()?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| row.viewing_date.map_or(false, |d| range.contains(d)))
            .cloned()
            .collect())
    }

    async fn viewings_of(&self, imdb_id: &ImdbId) -> Result<Vec<PriorViewing>, StoreError> {
        self.check_connected()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().await;
        let mut matches: Vec<&ViewingEntry> = rows
            .iter()
            .filter(|row| imdb_id.is_contained_in(&row.movie_url))
            .collect();
        // newest first, undated rows last
        matches.sort_by_key(|row| Reverse(row.viewing_date));
        Ok(matches.into_iter().map(PriorViewing::from).collect())
    }

    async fn insert(&self, entry: &NewViewing) -> Result<(), StoreError> {
        self.check_connected()?;
        if self.reject_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::InvalidParams("Incorrect value for column".to_string()));
        }
        self.rows.lock().await.push(entry.clone().into_entry());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_connected()
    }

    async fn reconnect(&self) -> Result<(), StoreError> {
        self.reconnects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_reconnect.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionLost("connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }
}
