//! # Inventory Ledger
//!
//! Owns the set of stock-keeping units, their quantities, batch/expiry
//! records, and reorder state.
//!
//! ## Concurrency Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-SKU Mutual Exclusion                             │
//! │                                                                         │
//! │  items: RwLock<HashMap<sku, Arc<Mutex<InventoryItem>>>>                │
//! │             │                        │                                  │
//! │             │ (short-lived:          │ (held for one logical           │
//! │             │  lookup / insert)      │  mutation only)                 │
//! │             ▼                        ▼                                  │
//! │  POS #1 ── reserve PARA500 ──► lock(PARA500) ── check ── decrement     │
//! │  POS #2 ── reserve AMOX250 ──► lock(AMOX250) ── proceeds concurrently  │
//! │  POS #3 ── reserve PARA500 ──► blocks until #1 releases, then          │
//! │                                observes the reduced stock              │
//! │                                                                         │
//! │  Every successful mutation bumps an AtomicU64 revision counter that    │
//! │  the stats aggregator uses for cache invalidation.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No lock is ever held across two operations, and the table lock is never
//! acquired while an item lock is held, so mutations on different SKUs
//! proceed concurrently and cannot deadlock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use rxops_core::error::{EngineError, EngineResult, ValidationError};
use rxops_core::types::{BatchInfo, InventoryItem};
use rxops_core::validation::{validate_batch, validate_quantity, validate_sku};

/// The inventory ledger: exclusive owner of all `InventoryItem` records.
///
/// Items are never hard-deleted. A SKU that reaches zero stock can be
/// soft-retired with [`InventoryLedger::retire`], which keeps its batch and
/// expiry history queryable.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    /// SKU table. The outer lock guards the map shape; each item carries
    /// its own mutex for single-writer-at-a-time per SKU.
    items: RwLock<HashMap<String, Arc<Mutex<InventoryItem>>>>,

    /// Monotonically increasing revision, bumped on every successful
    /// mutation. Read by the stats aggregator for cache invalidation.
    revision: AtomicU64,
}

impl InventoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives stock for a SKU.
    ///
    /// ## Behavior
    /// - Unseen SKU: creates a new `InventoryItem` from the batch payload
    /// - Existing SKU: adds the quantity and refreshes the batch/expiry
    ///   fields to the incoming batch
    /// - A soft-retired item is re-activated by a restock
    ///
    /// ## Returns
    /// The post-receipt stock level.
    ///
    /// ## Errors
    /// `Validation` if `quantity <= 0` or the batch payload is malformed
    /// (negative price, mrp below price, GST out of range, ...).
    pub fn receive_stock(&self, sku: &str, batch: BatchInfo, quantity: i64) -> EngineResult<i64> {
        validate_sku(sku)?;
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }
        validate_batch(&batch)?;

        let slot = {
            let mut table = self.items.write().expect("inventory table lock poisoned");
            table
                .entry(sku.to_string())
                .or_insert_with(|| {
                    let now = Utc::now();
                    Arc::new(Mutex::new(InventoryItem {
                        sku: sku.to_string(),
                        name: batch.name.clone(),
                        category: batch.category.clone(),
                        stock: 0,
                        reorder_level: batch.reorder_level,
                        price_paise: batch.price_paise,
                        mrp_paise: batch.mrp_paise,
                        expiry_date: batch.expiry_date,
                        manufacturer: batch.manufacturer.clone(),
                        shelf_location: batch.shelf_location.clone(),
                        batch_number: batch.batch_number.clone(),
                        salt: batch.salt.clone(),
                        hsn_code: batch.hsn_code.clone(),
                        gst_bps: batch.gst_bps,
                        schedule: batch.schedule,
                        is_active: true,
                        created_at: now,
                        updated_at: now,
                    }))
                })
                .clone()
        };

        let stock = {
            let mut item = slot.lock().expect("inventory item lock poisoned");
            item.stock += quantity;
            item.name = batch.name;
            item.category = batch.category;
            item.reorder_level = batch.reorder_level;
            item.price_paise = batch.price_paise;
            item.mrp_paise = batch.mrp_paise;
            item.expiry_date = batch.expiry_date;
            item.manufacturer = batch.manufacturer;
            item.shelf_location = batch.shelf_location;
            item.batch_number = batch.batch_number;
            item.salt = batch.salt;
            item.hsn_code = batch.hsn_code;
            item.gst_bps = batch.gst_bps;
            item.schedule = batch.schedule;
            item.is_active = true;
            item.updated_at = Utc::now();
            item.stock
        };

        self.bump_revision();
        info!(sku = %sku, quantity, stock, "stock received");
        Ok(stock)
    }

    /// Atomically checks `stock >= quantity` and decrements.
    ///
    /// The check and the decrement happen under the per-SKU mutex, so no
    /// two concurrent calls can both observe sufficient stock and drive it
    /// negative. On failure the state is untouched (no partial decrement).
    ///
    /// ## Returns
    /// The post-decrement stock level.
    pub fn reserve_and_decrement(&self, sku: &str, quantity: i64) -> EngineResult<i64> {
        validate_quantity(quantity)?;
        let slot = self.slot(sku)?;

        let stock = {
            let mut item = slot.lock().expect("inventory item lock poisoned");
            if item.stock < quantity {
                return Err(EngineError::InsufficientStock {
                    sku: sku.to_string(),
                    available: item.stock,
                    requested: quantity,
                });
            }
            item.stock -= quantity;
            item.updated_at = Utc::now();
            item.stock
        };

        self.bump_revision();
        debug!(sku = %sku, quantity, stock, "stock reserved");
        Ok(stock)
    }

    /// Administrative stock correction by a signed delta.
    ///
    /// Also used by the order manager to compensate (re-increment) lines
    /// of a partially failed or cancelled order.
    ///
    /// ## Errors
    /// `Validation` if the resulting stock would go negative.
    pub fn adjust_stock(&self, sku: &str, delta: i64) -> EngineResult<i64> {
        let slot = self.slot(sku)?;

        let stock = {
            let mut item = slot.lock().expect("inventory item lock poisoned");
            let new_stock = item.stock + delta;
            if new_stock < 0 {
                return Err(ValidationError::WouldGoNegative {
                    field: "stock".to_string(),
                    current: item.stock,
                    delta,
                }
                .into());
            }
            item.stock = new_stock;
            if new_stock > 0 {
                item.is_active = true;
            }
            item.updated_at = Utc::now();
            item.stock
        };

        self.bump_revision();
        info!(sku = %sku, delta, stock, "stock adjusted");
        Ok(stock)
    }

    /// Soft-retires a SKU: flags it inactive while keeping its batch and
    /// expiry history queryable. Only legal once stock has reached zero.
    pub fn retire(&self, sku: &str) -> EngineResult<()> {
        let slot = self.slot(sku)?;

        {
            let mut item = slot.lock().expect("inventory item lock poisoned");
            if item.stock != 0 {
                return Err(ValidationError::MustBeZero {
                    field: "stock".to_string(),
                    value: item.stock,
                }
                .into());
            }
            item.is_active = false;
            item.updated_at = Utc::now();
        }

        self.bump_revision();
        info!(sku = %sku, "sku retired");
        Ok(())
    }

    /// Returns all active items at or below their reorder level,
    /// ordered by (stock ascending, then SKU) for deterministic output.
    pub fn query_low_stock(&self) -> Vec<InventoryItem> {
        let mut low: Vec<InventoryItem> = self
            .snapshot_items()
            .into_iter()
            .filter(|item| item.is_active && item.is_low_stock())
            .collect();
        low.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.sku.cmp(&b.sku)));
        low
    }

    /// Returns all active items whose current batch expires on or before
    /// the given date, ordered by (expiry ascending, then SKU).
    pub fn query_expiring_before(&self, date: NaiveDate) -> Vec<InventoryItem> {
        let mut expiring: Vec<InventoryItem> = self
            .snapshot_items()
            .into_iter()
            .filter(|item| item.is_active && item.expiry_date <= date)
            .collect();
        expiring.sort_by(|a, b| {
            a.expiry_date
                .cmp(&b.expiry_date)
                .then_with(|| a.sku.cmp(&b.sku))
        });
        expiring
    }

    /// Returns a point-in-time snapshot of a single item.
    pub fn get(&self, sku: &str) -> EngineResult<InventoryItem> {
        let slot = self.slot(sku)?;
        let item = slot.lock().expect("inventory item lock poisoned");
        Ok(item.clone())
    }

    /// Current revision counter value.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Looks up the per-SKU slot without holding the table lock afterwards.
    fn slot(&self, sku: &str) -> EngineResult<Arc<Mutex<InventoryItem>>> {
        let table = self.items.read().expect("inventory table lock poisoned");
        table
            .get(sku)
            .cloned()
            .ok_or_else(|| EngineError::SkuNotFound {
                sku: sku.to_string(),
            })
    }

    /// Clones a snapshot of every item. Item locks are taken one at a time,
    /// so the snapshot is best-effort consistent, never torn per item.
    fn snapshot_items(&self) -> Vec<InventoryItem> {
        let table = self.items.read().expect("inventory table lock poisoned");
        table
            .values()
            .map(|slot| slot.lock().expect("inventory item lock poisoned").clone())
            .collect()
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
