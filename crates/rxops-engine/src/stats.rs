//! # Stats Aggregator
//!
//! A read-only projection over the inventory ledger, the order manager,
//! and the queue manager. It owns no domain state, only read handles and
//! a memo cell.
//!
//! ## Memoization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Revision-Keyed Snapshot Cache                           │
//! │                                                                         │
//! │  snapshot() ──► read (ledger.rev, orders.rev, queue.rev)               │
//! │       │                                                                 │
//! │       ├── key == cached key ──► return cached StatsSnapshot            │
//! │       │                                                                 │
//! │       └── key changed ────────► recompute, cache under new key         │
//! │                                                                         │
//! │  Any successful mutation anywhere bumps a revision, so the cache is    │
//! │  invalidated on the next query. Staleness is bounded by the time       │
//! │  since the last observed revision bump, never unbounded.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The aggregator takes no locks of its own beyond the memo cell; reads are
//! best-effort consistent and tolerate slightly stale aggregates under
//! concurrent writes.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use rxops_core::money::Money;
use rxops_core::types::OrderStatus;

use crate::ledger::InventoryLedger;
use crate::orders::OrderManager;
use crate::queue::QueueManager;

/// How far ahead the snapshot's expiring-stock figure looks.
const EXPIRING_SOON_DAYS: i64 = 30;

/// Combined revision key of the three managers.
type RevisionKey = (u64, u64, u64);

// =============================================================================
// Stats Snapshot
// =============================================================================

/// The dashboard summary figures, computed in one pass and memoized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub orders_pending: usize,
    pub orders_ready: usize,
    pub orders_dispatched: usize,
    pub orders_delivered: usize,
    pub orders_cancelled: usize,
    /// Lifetime sum of amounts over orders in {Ready, Dispatched, Delivered}.
    pub lifetime_sales_paise: i64,
    pub low_stock_count: usize,
    /// Active items whose batch expires within the next 30 days.
    pub expiring_soon_count: usize,
    pub active_queue_length: usize,
}

// =============================================================================
// Stats Aggregator
// =============================================================================

/// Read-only aggregator over the three managers.
#[derive(Debug)]
pub struct StatsAggregator {
    ledger: Arc<InventoryLedger>,
    orders: Arc<OrderManager>,
    queue: Arc<QueueManager>,
    memo: Mutex<Option<(RevisionKey, StatsSnapshot)>>,
}

impl StatsAggregator {
    /// Creates an aggregator holding read capabilities into the managers.
    pub fn new(
        ledger: Arc<InventoryLedger>,
        orders: Arc<OrderManager>,
        queue: Arc<QueueManager>,
    ) -> Self {
        StatsAggregator {
            ledger,
            orders,
            queue,
            memo: Mutex::new(None),
        }
    }

    /// Sum of amounts of orders with status in {Ready, Dispatched,
    /// Delivered} created within the range (`from` inclusive, `to`
    /// exclusive).
    pub fn total_sales(&self, range: (DateTime<Utc>, DateTime<Utc>)) -> Money {
        self.orders
            .list_orders(None, Some(range))
            .iter()
            .filter(|order| order.status.counts_as_sale())
            .fold(Money::zero(), |acc, order| acc + order.amount())
    }

    /// Count of orders, optionally filtered by status.
    pub fn orders_count(&self, status: Option<OrderStatus>) -> usize {
        self.orders.list_orders(status, None).len()
    }

    /// Delegates to the queue manager's active length.
    pub fn active_queue_count(&self) -> usize {
        self.queue.current_queue_length()
    }

    /// Count of items at or below their reorder level.
    pub fn low_stock_count(&self) -> usize {
        self.ledger.query_low_stock().len()
    }

    /// The memoized dashboard summary.
    ///
    /// The revision key is read before computing, so if a write lands
    /// mid-computation the cached key is already stale and the next query
    /// recomputes.
    pub fn snapshot(&self) -> StatsSnapshot {
        let key = self.revision_key();

        {
            let memo = self.memo.lock().expect("stats memo lock poisoned");
            if let Some((cached_key, snapshot)) = memo.as_ref() {
                if *cached_key == key {
                    return snapshot.clone();
                }
            }
        }

        let snapshot = self.compute();
        let mut memo = self.memo.lock().expect("stats memo lock poisoned");
        *memo = Some((key, snapshot.clone()));
        snapshot
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn revision_key(&self) -> RevisionKey {
        (
            self.ledger.revision(),
            self.orders.revision(),
            self.queue.revision(),
        )
    }

    fn compute(&self) -> StatsSnapshot {
        let orders = self.orders.list_orders(None, None);

        let mut snapshot = StatsSnapshot {
            orders_pending: 0,
            orders_ready: 0,
            orders_dispatched: 0,
            orders_delivered: 0,
            orders_cancelled: 0,
            lifetime_sales_paise: 0,
            low_stock_count: self.ledger.query_low_stock().len(),
            expiring_soon_count: 0,
            active_queue_length: self.queue.current_queue_length(),
        };

        for order in &orders {
            match order.status {
                OrderStatus::Pending => snapshot.orders_pending += 1,
                OrderStatus::Ready => snapshot.orders_ready += 1,
                OrderStatus::Dispatched => snapshot.orders_dispatched += 1,
                OrderStatus::Delivered => snapshot.orders_delivered += 1,
                OrderStatus::Cancelled => snapshot.orders_cancelled += 1,
            }
            if order.status.counts_as_sale() {
                snapshot.lifetime_sales_paise += order.amount_paise;
            }
        }

        let horizon = Utc::now().date_naive() + Duration::days(EXPIRING_SOON_DAYS);
        snapshot.expiring_soon_count = self.ledger.query_expiring_before(horizon).len();

        snapshot
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueConfig;
    use chrono::NaiveDate;
    use rxops_core::types::{BatchInfo, QueueType, Schedule};

    fn batch(reorder_level: i64) -> BatchInfo {
        BatchInfo {
            name: "Test Item".to_string(),
            category: "test".to_string(),
            reorder_level,
            price_paise: 200,
            mrp_paise: None,
            expiry_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            manufacturer: "Cipla".to_string(),
            shelf_location: "A-1".to_string(),
            batch_number: "B001".to_string(),
            salt: "test".to_string(),
            hsn_code: "3004".to_string(),
            gst_bps: 0,
            schedule: Schedule::Unscheduled,
        }
    }

    fn setup() -> (
        Arc<InventoryLedger>,
        Arc<OrderManager>,
        Arc<QueueManager>,
        StatsAggregator,
    ) {
        let ledger = Arc::new(InventoryLedger::new());
        let orders = Arc::new(OrderManager::new(Arc::clone(&ledger)));
        let queue = Arc::new(QueueManager::new(QueueConfig::default()));
        let stats = StatsAggregator::new(
            Arc::clone(&ledger),
            Arc::clone(&orders),
            Arc::clone(&queue),
        );
        (ledger, orders, queue, stats)
    }

    #[test]
    fn test_snapshot_memoized_until_revision_changes() {
        let (ledger, _orders, _queue, stats) = setup();
        ledger.receive_stock("PARA500", batch(20), 100).unwrap();

        let first = stats.snapshot();
        let second = stats.snapshot();
        assert_eq!(first, second);
        assert_eq!(first.low_stock_count, 0);

        // A mutation invalidates the memo
        ledger.adjust_stock("PARA500", -90).unwrap();
        let third = stats.snapshot();
        assert_eq!(third.low_stock_count, 1);
    }

    #[test]
    fn test_total_sales_counts_only_sale_statuses() {
        let (ledger, orders, _queue, stats) = setup();
        ledger.receive_stock("PARA500", batch(0), 100).unwrap();

        let order = orders
            .create_order("PAT-001", &[("PARA500".to_string(), 5)])
            .unwrap();

        let window = (Utc::now() - Duration::hours(1), Utc::now() + Duration::hours(1));

        // Pending orders are not sales yet
        assert_eq!(stats.total_sales(window).paise(), 0);

        orders.advance_status(&order.id, OrderStatus::Ready).unwrap();
        assert_eq!(stats.total_sales(window).paise(), order.amount_paise);

        // Still counted when further along the chain
        orders
            .advance_status(&order.id, OrderStatus::Dispatched)
            .unwrap();
        assert_eq!(stats.total_sales(window).paise(), order.amount_paise);
    }

    #[test]
    fn test_orders_count_with_filter() {
        let (ledger, orders, _queue, stats) = setup();
        ledger.receive_stock("PARA500", batch(0), 100).unwrap();

        let a = orders
            .create_order("PAT-001", &[("PARA500".to_string(), 1)])
            .unwrap();
        let _b = orders
            .create_order("PAT-002", &[("PARA500".to_string(), 1)])
            .unwrap();
        orders.advance_status(&a.id, OrderStatus::Ready).unwrap();

        assert_eq!(stats.orders_count(None), 2);
        assert_eq!(stats.orders_count(Some(OrderStatus::Pending)), 1);
        assert_eq!(stats.orders_count(Some(OrderStatus::Ready)), 1);
        assert_eq!(stats.orders_count(Some(OrderStatus::Delivered)), 0);
    }

    #[test]
    fn test_queue_and_expiry_figures() {
        let (ledger, _orders, queue, stats) = setup();

        let mut expiring = batch(0);
        expiring.expiry_date = Utc::now().date_naive() + Duration::days(10);
        ledger.receive_stock("SOON", expiring, 5).unwrap();

        queue.check_in("PAT-001", QueueType::Otc).unwrap();
        queue.check_in("PAT-002", QueueType::Insurance).unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.active_queue_length, 2);
        assert_eq!(snapshot.expiring_soon_count, 1);
        assert_eq!(stats.active_queue_count(), 2);
    }
}
