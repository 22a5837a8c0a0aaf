//! # Order Lifecycle Manager
//!
//! Owns orders placed against the inventory ledger, their status
//! progression, and the stock reservations they imply.
//!
//! ## All-or-Nothing Order Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order Reservation Flow                        │
//! │                                                                         │
//! │  lines: [(PARA500, 5), (AMOX250, 1000)]                                │
//! │       │                                                                 │
//! │       ▼ merge duplicates, sort by SKU (fixed global lock order)        │
//! │  reserve PARA500 × 5 ────► OK   (stock 100 → 95)                       │
//! │       │                                                                 │
//! │  reserve AMOX250 × 1000 ──► InsufficientStock (only 10 on hand)        │
//! │       │                                                                 │
//! │       ▼ COMPENSATE: re-increment every prior decrement                 │
//! │  adjust PARA500 + 5 ──────► stock back to 100                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Err(InsufficientStock) — no order created, no stock moved             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger guarantees atomicity per SKU only; this manager supplies the
//! cross-line all-or-nothing semantics by compensation. Processing lines in
//! sorted-SKU order means two orders sharing SKUs always touch them in the
//! same sequence, so their reservations cannot deadlock.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use rxops_core::error::{EngineError, EngineResult, ValidationError};
use rxops_core::money::Money;
use rxops_core::types::{Order, OrderLine, OrderStatus};
use rxops_core::validation::{validate_patient_ref, validate_quantity};
use rxops_core::MAX_ORDER_LINES;

use crate::ledger::InventoryLedger;

/// The order lifecycle manager: exclusive owner of all `Order` records,
/// holding a read/decrement capability into the inventory ledger.
///
/// Orders are retained indefinitely for audit and never deleted; terminal
/// states (`Delivered`, `Cancelled`) make them immutable.
#[derive(Debug)]
pub struct OrderManager {
    ledger: Arc<InventoryLedger>,

    /// Order table. Each order carries its own mutex so status advances on
    /// different orders proceed concurrently.
    orders: RwLock<HashMap<String, Arc<Mutex<Order>>>>,

    /// Bumped on every successful mutation; read by the stats aggregator.
    revision: AtomicU64,
}

impl OrderManager {
    /// Creates an order manager bound to a ledger.
    pub fn new(ledger: Arc<InventoryLedger>) -> Self {
        OrderManager {
            ledger,
            orders: RwLock::new(HashMap::new()),
            revision: AtomicU64::new(0),
        }
    }

    /// Creates an order, reserving stock for every line.
    ///
    /// ## Behavior
    /// - Duplicate SKUs in the request are merged before reservation
    /// - Lines are reserved in sorted-SKU order (fixed global order)
    /// - On any line failure, all prior decrements of this call are
    ///   compensated and the original error is returned
    /// - Pricing and GST are snapshotted from the ledger at creation time
    /// - Amount = Σ (quantity × unit price + GST on the line total)
    ///
    /// On success the order enters `Pending`.
    pub fn create_order(&self, patient_ref: &str, lines: &[(String, i64)]) -> EngineResult<Order> {
        validate_patient_ref(patient_ref)?;

        if lines.is_empty() {
            return Err(ValidationError::Required {
                field: "lines".to_string(),
            }
            .into());
        }

        // Merge duplicate SKUs; BTreeMap gives the fixed global SKU order.
        let mut merged: BTreeMap<&str, i64> = BTreeMap::new();
        for (sku, qty) in lines {
            *merged.entry(sku.as_str()).or_insert(0) += qty;
        }

        if merged.len() > MAX_ORDER_LINES {
            return Err(ValidationError::OutOfRange {
                field: "lines".to_string(),
                min: 1,
                max: MAX_ORDER_LINES as i64,
            }
            .into());
        }

        for qty in merged.values() {
            validate_quantity(*qty)?;
        }

        // Reserve line by line, compensating on the first failure.
        let mut reserved: Vec<(String, i64)> = Vec::with_capacity(merged.len());
        let mut order_lines: Vec<OrderLine> = Vec::with_capacity(merged.len());
        let mut amount = Money::zero();

        for (sku, qty) in &merged {
            let line = self
                .ledger
                .get(sku)
                .and_then(|item| {
                    self.ledger.reserve_and_decrement(sku, *qty)?;
                    let line_total = item.price().multiply_quantity(*qty);
                    let gst = line_total.gst(item.gst_rate());
                    Ok(OrderLine {
                        sku: item.sku,
                        quantity: *qty,
                        unit_price_paise: item.price_paise,
                        gst_bps: item.gst_bps,
                        line_total_paise: line_total.paise(),
                        gst_paise: gst.paise(),
                    })
                });

            match line {
                Ok(line) => {
                    amount += Money::from_paise(line.total_with_gst_paise());
                    reserved.push((line.sku.clone(), *qty));
                    order_lines.push(line);
                }
                Err(err) => {
                    self.compensate(&reserved);
                    return Err(err);
                }
            }
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            patient_ref: patient_ref.to_string(),
            lines: order_lines,
            amount_paise: amount.paise(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        {
            let mut table = self.orders.write().expect("order table lock poisoned");
            table.insert(order.id.clone(), Arc::new(Mutex::new(order.clone())));
        }

        self.bump_revision();
        info!(
            order_id = %order.id,
            patient_ref = %order.patient_ref,
            lines = order.lines.len(),
            amount = %order.amount(),
            "order created"
        );
        Ok(order)
    }

    /// Advances an order to `target`.
    ///
    /// The target must be the immediate successor of the current status in
    /// the `Pending → Ready → Dispatched → Delivered` chain. Re-issuing the
    /// same target twice is rejected: the first call already advanced the
    /// state, so the repeat is a skipped-stage bug on the caller's side.
    pub fn advance_status(&self, order_id: &str, target: OrderStatus) -> EngineResult<OrderStatus> {
        let slot = self.slot(order_id)?;

        {
            let mut order = slot.lock().expect("order lock poisoned");
            match order.status.successor() {
                Some(next) if next == target => {
                    order.status = target;
                }
                _ => {
                    return Err(EngineError::InvalidTransition {
                        entity: "order",
                        from: order.status.label().to_string(),
                        to: target.label().to_string(),
                    });
                }
            }
        }

        self.bump_revision();
        info!(order_id = %order_id, status = target.label(), "order advanced");
        Ok(target)
    }

    /// Cancels a `Pending` order, returning every reserved quantity to the
    /// ledger. Orders that have progressed past `Pending` cannot be
    /// cancelled.
    pub fn cancel_order(&self, order_id: &str) -> EngineResult<()> {
        let slot = self.slot(order_id)?;

        {
            let mut order = slot.lock().expect("order lock poisoned");
            if order.status != OrderStatus::Pending {
                return Err(EngineError::InvalidTransition {
                    entity: "order",
                    from: order.status.label().to_string(),
                    to: OrderStatus::Cancelled.label().to_string(),
                });
            }

            let reserved: Vec<(String, i64)> = order
                .lines
                .iter()
                .map(|line| (line.sku.clone(), line.quantity))
                .collect();
            self.compensate(&reserved);

            order.status = OrderStatus::Cancelled;
        }

        self.bump_revision();
        info!(order_id = %order_id, "order cancelled");
        Ok(())
    }

    /// Lists orders, optionally filtered by status and/or creation-time
    /// range (`from` inclusive, `to` exclusive), ordered by creation time
    /// descending.
    pub fn list_orders(
        &self,
        status: Option<OrderStatus>,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .snapshot_orders()
            .into_iter()
            .filter(|order| status.map_or(true, |s| order.status == s))
            .filter(|order| {
                range.map_or(true, |(from, to)| {
                    order.created_at >= from && order.created_at < to
                })
            })
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        orders
    }

    /// Returns a point-in-time snapshot of a single order.
    pub fn get(&self, order_id: &str) -> EngineResult<Order> {
        let slot = self.slot(order_id)?;
        let order = slot.lock().expect("order lock poisoned");
        Ok(order.clone())
    }

    /// Current revision counter value.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn slot(&self, order_id: &str) -> EngineResult<Arc<Mutex<Order>>> {
        let table = self.orders.read().expect("order table lock poisoned");
        table
            .get(order_id)
            .cloned()
            .ok_or_else(|| EngineError::OrderNotFound {
                id: order_id.to_string(),
            })
    }

    fn snapshot_orders(&self) -> Vec<Order> {
        let table = self.orders.read().expect("order table lock poisoned");
        table
            .values()
            .map(|slot| slot.lock().expect("order lock poisoned").clone())
            .collect()
    }

    /// Re-increments already-decremented lines after a partial failure or a
    /// cancellation. Items are never removed from the ledger, so this
    /// cannot legitimately fail; a failure here is logged, not propagated.
    fn compensate(&self, reserved: &[(String, i64)]) {
        for (sku, qty) in reserved {
            if let Err(err) = self.ledger.adjust_stock(sku, *qty) {
                warn!(sku = %sku, quantity = qty, error = %err, "compensation failed");
            }
        }
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
