//! # Queue Manager
//!
//! Owns the patient service queue and its status progression. Independent
//! of inventory; the only shared mutable state here is the entry table and
//! the per-day token sequence.
//!
//! ## Token Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Service-Day Token Sequence                           │
//! │                                                                         │
//! │  day boundary = 06:00 (configurable)                                   │
//! │                                                                         │
//! │  05:55  check_in ──► token 41   (still yesterday's service day)        │
//! │  06:05  check_in ──► token 1    (sequence reset at the boundary)       │
//! │  06:20  check_in ──► token 2                                           │
//! │                                                                         │
//! │  Tokens are strictly increasing and unique within one service day.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entries reaching `Completed` are archived: removed from the active queue
//! but retained for audit queries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use tracing::info;
use uuid::Uuid;

use rxops_core::error::{EngineError, EngineResult};
use rxops_core::types::{QueueEntry, QueueStatus, QueueType};
use rxops_core::validation::validate_patient_ref;

// =============================================================================
// Configuration
// =============================================================================

/// Queue manager configuration.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Time of day at which the token sequence resets. A check-in before
    /// the boundary still belongs to the previous service day.
    pub day_boundary: NaiveTime,
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            day_boundary: NaiveTime::MIN, // midnight
        }
    }
}

// =============================================================================
// Queue Manager
// =============================================================================

/// Per-service-day token counter. Guarded by its own mutex so check-ins
/// serialize only on token assignment, not on the whole queue.
#[derive(Debug, Default)]
struct TokenCounter {
    day: Option<NaiveDate>,
    next: u32,
}

/// The queue manager: exclusive owner of all `QueueEntry` records.
/// It has no write access to inventory.
#[derive(Debug, Default)]
pub struct QueueManager {
    config: QueueConfig,

    /// Active entries. Each entry carries its own mutex so advances on
    /// different entries proceed concurrently.
    entries: RwLock<HashMap<String, Arc<Mutex<QueueEntry>>>>,

    /// Completed entries, retained for audit.
    archived: Mutex<Vec<QueueEntry>>,

    tokens: Mutex<TokenCounter>,

    /// Bumped on every successful mutation; read by the stats aggregator.
    revision: AtomicU64,
}

impl QueueManager {
    /// Creates a queue manager with the given configuration.
    pub fn new(config: QueueConfig) -> Self {
        QueueManager {
            config,
            ..Default::default()
        }
    }

    /// Checks a patient in: creates a `Waiting` entry with the next
    /// sequential token number of the current service day.
    pub fn check_in(&self, patient_ref: &str, entry_type: QueueType) -> EngineResult<QueueEntry> {
        self.check_in_at(patient_ref, entry_type, Utc::now())
    }

    /// Advances a queue entry to `target` along the monotonic chain
    /// `Waiting → Servicing → Completed`. Skips, regressions, and repeats
    /// are rejected. On reaching `Completed` the entry is archived.
    pub fn advance_status(
        &self,
        entry_id: &str,
        target: QueueStatus,
    ) -> EngineResult<QueueStatus> {
        let slot = self.slot(entry_id)?;

        // The entry lock is released before the table lock is taken below;
        // queries hold the table lock while locking entries, so holding
        // both here in the opposite order could deadlock.
        let completed = {
            let mut entry = slot.lock().expect("queue entry lock poisoned");
            match entry.status.successor() {
                Some(next) if next == target => {
                    entry.status = target;
                    (target == QueueStatus::Completed).then(|| entry.clone())
                }
                _ => {
                    return Err(EngineError::InvalidTransition {
                        entity: "queue entry",
                        from: entry.status.label().to_string(),
                        to: target.label().to_string(),
                    });
                }
            }
        };

        if let Some(entry) = completed {
            {
                let mut table = self.entries.write().expect("queue table lock poisoned");
                table.remove(&entry.id);
            }
            self.archived
                .lock()
                .expect("queue archive lock poisoned")
                .push(entry);
        }

        self.bump_revision();
        info!(entry_id = %entry_id, status = target.label(), "queue entry advanced");
        Ok(target)
    }

    /// Number of entries not yet `Completed`.
    pub fn current_queue_length(&self) -> usize {
        self.snapshot_active()
            .iter()
            .filter(|entry| entry.status != QueueStatus::Completed)
            .count()
    }

    /// The oldest `Waiting` entry (FIFO by check-in time, ties broken by
    /// token number), or `None` if nobody is waiting.
    pub fn next_to_serve(&self) -> Option<QueueEntry> {
        self.snapshot_active()
            .into_iter()
            .filter(|entry| entry.status == QueueStatus::Waiting)
            .min_by_key(|entry| (entry.checked_in_at, entry.token_number))
    }

    /// All active entries in check-in order (dashboard listing).
    pub fn active_entries(&self) -> Vec<QueueEntry> {
        let mut entries: Vec<QueueEntry> = self
            .snapshot_active()
            .into_iter()
            .filter(|entry| entry.status != QueueStatus::Completed)
            .collect();
        entries.sort_by_key(|entry| (entry.checked_in_at, entry.token_number));
        entries
    }

    /// Completed entries, oldest first (audit listing).
    pub fn completed_entries(&self) -> Vec<QueueEntry> {
        self.archived
            .lock()
            .expect("queue archive lock poisoned")
            .clone()
    }

    /// Returns a point-in-time snapshot of a single entry, active or
    /// archived.
    pub fn get(&self, entry_id: &str) -> EngineResult<QueueEntry> {
        if let Ok(slot) = self.slot(entry_id) {
            let entry = slot.lock().expect("queue entry lock poisoned");
            return Ok(entry.clone());
        }
        self.archived
            .lock()
            .expect("queue archive lock poisoned")
            .iter()
            .find(|entry| entry.id == entry_id)
            .cloned()
            .ok_or_else(|| EngineError::QueueEntryNotFound {
                id: entry_id.to_string(),
            })
    }

    /// Current revision counter value.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Check-in with an explicit clock, so the day-boundary reset is
    /// testable without waiting for midnight.
    fn check_in_at(
        &self,
        patient_ref: &str,
        entry_type: QueueType,
        now: DateTime<Utc>,
    ) -> EngineResult<QueueEntry> {
        validate_patient_ref(patient_ref)?;

        let token_number = {
            let mut counter = self.tokens.lock().expect("token counter lock poisoned");
            let day = self.service_day(now);
            if counter.day != Some(day) {
                counter.day = Some(day);
                counter.next = 1;
            }
            let token = counter.next;
            counter.next += 1;
            token
        };

        let entry = QueueEntry {
            id: Uuid::new_v4().to_string(),
            patient_ref: patient_ref.to_string(),
            token_number,
            status: QueueStatus::Waiting,
            entry_type,
            checked_in_at: now,
        };

        {
            let mut table = self.entries.write().expect("queue table lock poisoned");
            table.insert(entry.id.clone(), Arc::new(Mutex::new(entry.clone())));
        }

        self.bump_revision();
        info!(
            entry_id = %entry.id,
            patient_ref = %entry.patient_ref,
            token = entry.token_number,
            "patient checked in"
        );
        Ok(entry)
    }

    /// The service day a timestamp belongs to: the calendar day of
    /// `now - day_boundary`, so a 05:55 check-in with a 06:00 boundary
    /// still counts towards the previous day's sequence.
    fn service_day(&self, now: DateTime<Utc>) -> NaiveDate {
        let offset = Duration::seconds(self.config.day_boundary.num_seconds_from_midnight() as i64);
        (now - offset).date_naive()
    }

    fn slot(&self, entry_id: &str) -> EngineResult<Arc<Mutex<QueueEntry>>> {
        let table = self.entries.read().expect("queue table lock poisoned");
        table
            .get(entry_id)
            .cloned()
            .ok_or_else(|| EngineError::QueueEntryNotFound {
                id: entry_id.to_string(),
            })
    }

    fn snapshot_active(&self) -> Vec<QueueEntry> {
        let table = self.entries.read().expect("queue table lock poisoned");
        table
            .values()
            .map(|slot| slot.lock().expect("queue entry lock poisoned").clone())
            .collect()
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tokens_strictly_increasing_within_day() {
        let queue = QueueManager::new(QueueConfig::default());

        let a = queue.check_in("PAT-001", QueueType::Otc).unwrap();
        let b = queue.check_in("PAT-002", QueueType::Prn).unwrap();
        let c = queue.check_in("PAT-003", QueueType::Insurance).unwrap();

        assert_eq!(a.token_number, 1);
        assert_eq!(b.token_number, 2);
        assert_eq!(c.token_number, 3);
        assert_eq!(queue.current_queue_length(), 3);
    }

    #[test]
    fn test_token_sequence_resets_at_day_boundary() {
        let queue = QueueManager::new(QueueConfig {
            day_boundary: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        });

        // 05:55 belongs to the previous service day
        let before = Utc.with_ymd_and_hms(2026, 8, 23, 5, 55, 0).unwrap();
        let a = queue.check_in_at("PAT-001", QueueType::Otc, before).unwrap();
        let b = queue.check_in_at("PAT-002", QueueType::Otc, before).unwrap();
        assert_eq!(a.token_number, 1);
        assert_eq!(b.token_number, 2);

        // 06:05 crosses the boundary: sequence resets
        let after = Utc.with_ymd_and_hms(2026, 8, 23, 6, 5, 0).unwrap();
        let c = queue.check_in_at("PAT-003", QueueType::Otc, after).unwrap();
        assert_eq!(c.token_number, 1);
    }

    #[test]
    fn test_advance_chain_and_archival() {
        let queue = QueueManager::new(QueueConfig::default());
        let entry = queue.check_in("PAT-001", QueueType::Otc).unwrap();

        assert_eq!(
            queue.advance_status(&entry.id, QueueStatus::Servicing).unwrap(),
            QueueStatus::Servicing
        );
        assert_eq!(queue.current_queue_length(), 1);

        queue.advance_status(&entry.id, QueueStatus::Completed).unwrap();
        assert_eq!(queue.current_queue_length(), 0);

        // Archived, still queryable
        let archived = queue.completed_entries();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, entry.id);
        assert_eq!(queue.get(&entry.id).unwrap().status, QueueStatus::Completed);
    }

    #[test]
    fn test_advance_rejects_skip_and_regression() {
        let queue = QueueManager::new(QueueConfig::default());
        let entry = queue.check_in("PAT-001", QueueType::Prn).unwrap();

        // Skip: Waiting → Completed
        assert!(matches!(
            queue.advance_status(&entry.id, QueueStatus::Completed),
            Err(EngineError::InvalidTransition { .. })
        ));
        assert_eq!(queue.get(&entry.id).unwrap().status, QueueStatus::Waiting);

        queue.advance_status(&entry.id, QueueStatus::Servicing).unwrap();

        // Regression and repeat
        assert!(matches!(
            queue.advance_status(&entry.id, QueueStatus::Waiting),
            Err(EngineError::InvalidTransition { .. })
        ));
        assert!(matches!(
            queue.advance_status(&entry.id, QueueStatus::Servicing),
            Err(EngineError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_advance_unknown_entry() {
        let queue = QueueManager::new(QueueConfig::default());
        assert!(matches!(
            queue.advance_status("no-such-entry", QueueStatus::Servicing),
            Err(EngineError::QueueEntryNotFound { .. })
        ));
    }

    #[test]
    fn test_next_to_serve_is_fifo() {
        let queue = QueueManager::new(QueueConfig::default());
        assert!(queue.next_to_serve().is_none());

        let t0 = Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap();
        let a = queue.check_in_at("PAT-001", QueueType::Otc, t0).unwrap();
        let b = queue
            .check_in_at("PAT-002", QueueType::Otc, t0 + Duration::minutes(1))
            .unwrap();

        assert_eq!(queue.next_to_serve().unwrap().id, a.id);

        // Once the first entry is being serviced, the second is next
        queue.advance_status(&a.id, QueueStatus::Servicing).unwrap();
        assert_eq!(queue.next_to_serve().unwrap().id, b.id);

        queue.advance_status(&b.id, QueueStatus::Servicing).unwrap();
        assert!(queue.next_to_serve().is_none());
    }

    #[test]
    fn test_next_to_serve_ties_broken_by_token() {
        let queue = QueueManager::new(QueueConfig::default());
        let t0 = Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap();

        // Same check-in instant: the lower token wins
        let a = queue.check_in_at("PAT-001", QueueType::Otc, t0).unwrap();
        let _b = queue.check_in_at("PAT-002", QueueType::Otc, t0).unwrap();

        assert_eq!(queue.next_to_serve().unwrap().id, a.id);
    }
}
