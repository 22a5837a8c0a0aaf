//! # rxops-engine: Stateful Managers for the RxOps Pharmacy Engine
//!
//! This crate hosts the four stateful components of the RxOps domain engine
//! and the [`Engine`] facade that wires them together. All domain rules live
//! in `rxops-core`; this crate adds ownership, locking, and aggregation.
//!
//! ## Component Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Engine (facade)                                │
//! │                                                                         │
//! │  ┌─────────────────┐   reserve/compensate   ┌─────────────────┐        │
//! │  │  OrderManager   │ ──────────────────────► │ InventoryLedger │        │
//! │  │  owns Orders    │                         │ owns Items      │        │
//! │  └────────┬────────┘                         └────────┬────────┘        │
//! │           │ revision                                  │ revision        │
//! │           ▼                                           ▼                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      StatsAggregator                            │   │
//! │  │        read-only, memoized on combined revisions                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │           ▲ revision                                                    │
//! │  ┌────────┴────────┐                                                    │
//! │  │  QueueManager   │   (no inventory access)                            │
//! │  │  owns Entries   │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each manager is the exclusive owner of its entity type. Cross-component
//! effects flow through explicit method calls (orders reserving stock), never
//! through shared mutable state.
//!
//! ## Locking Discipline
//!
//! 1. Entity tables are `RwLock<HashMap<_, Arc<Mutex<_>>>>`: queries take the
//!    table read lock, mutations of one entity take only that entity's mutex
//! 2. Multi-SKU reservations always acquire SKUs in sorted order
//! 3. No entity lock is held while acquiring a table write lock
//! 4. Every successful mutation bumps the owning manager's revision counter

// =============================================================================
// Module Declarations
// =============================================================================

pub mod ledger;
pub mod orders;
pub mod queue;
pub mod stats;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use ledger::InventoryLedger;
pub use orders::OrderManager;
pub use queue::{QueueConfig, QueueManager};
pub use stats::{StatsAggregator, StatsSnapshot};

use std::sync::Arc;

// =============================================================================
// Engine Facade
// =============================================================================

/// The assembled engine: one ledger, one order manager bound to it, one
/// queue manager, and a stats aggregator reading all three.
///
/// Cloning is cheap (`Arc` handles); every clone observes the same state,
/// so one `Engine` can be shared across request-handling threads.
#[derive(Debug, Clone)]
pub struct Engine {
    ledger: Arc<InventoryLedger>,
    orders: Arc<OrderManager>,
    queue: Arc<QueueManager>,
    stats: Arc<StatsAggregator>,
}

impl Engine {
    /// Wires up a fresh, empty engine.
    pub fn new(queue_config: QueueConfig) -> Self {
        let ledger = Arc::new(InventoryLedger::new());
        let orders = Arc::new(OrderManager::new(Arc::clone(&ledger)));
        let queue = Arc::new(QueueManager::new(queue_config));
        let stats = Arc::new(StatsAggregator::new(
            Arc::clone(&ledger),
            Arc::clone(&orders),
            Arc::clone(&queue),
        ));

        Engine {
            ledger,
            orders,
            queue,
            stats,
        }
    }

    /// The inventory ledger.
    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    /// The order lifecycle manager.
    pub fn orders(&self) -> &OrderManager {
        &self.orders
    }

    /// The patient queue manager.
    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    /// The stats aggregator.
    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(QueueConfig::default())
    }
}
