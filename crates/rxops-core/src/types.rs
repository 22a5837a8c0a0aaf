//! # Domain Types
//!
//! Core domain types used throughout the RxOps engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  InventoryItem  │   │      Order      │   │   QueueEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  sku (business) │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  stock          │   │  patient_ref    │   │  token_number   │       │
//! │  │  reorder_level  │   │  lines          │   │  status         │       │
//! │  │  expiry / batch │   │  status         │   │  entry_type     │       │
//! │  │  schedule       │   │  amount_paise   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    GstRate      │   │   OrderStatus   │   │   QueueStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  Waiting        │       │
//! │  │  1200 = 12%     │   │  Ready          │   │  Servicing      │       │
//! │  └─────────────────┘   │  Dispatched     │   │  Completed      │       │
//! │                        │  Delivered      │   └─────────────────┘       │
//! │                        │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Lifecycles
//! Both lifecycles are closed enums with explicit `successor()` tables.
//! The engine rejects any advance where `current.successor() != Some(target)`,
//! which makes skipped, regressed, or repeated stages unrepresentable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1200 bps = 12% (the common GST slab for medicines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate (exempt goods).
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate::zero()
    }
}

// =============================================================================
// Regulatory Schedule
// =============================================================================

/// Regulatory schedule tag of a stocked medicine.
///
/// The engine records the schedule on every item and surfaces it in
/// snapshots. It applies no ordering restriction yet; whether controlled
/// schedules require extra approval before dispensing is an open product
/// question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
    /// No schedule restriction (over-the-counter).
    Unscheduled,
    /// Prescription-only (Schedule H).
    PrescriptionOnly,
    /// Narcotic / controlled substance (Schedule X).
    NarcoticControlled,
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Unscheduled
    }
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A stocked SKU in the inventory ledger.
///
/// ## Invariants (enforced by the ledger)
/// - `stock >= 0` at all times
/// - `price_paise >= 0`
/// - if `mrp_paise` is present, `mrp_paise >= price_paise`
///
/// ## Lifecycle
/// Created on first stock receipt of a SKU/batch; mutated by stock
/// adjustments and order fulfillment; never hard-deleted. Once stock reaches
/// zero an item may be soft-retired (`is_active = false`) so historical
/// batch/expiry data remains queryable.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown on the dashboard and on labels.
    pub name: String,

    /// Category (analgesic, antibiotic, supplement, ...).
    pub category: String,

    /// On-hand stock. Never negative.
    pub stock: i64,

    /// Reorder threshold: stock <= reorder_level flags the item as low.
    pub reorder_level: i64,

    /// Selling price in paise.
    pub price_paise: i64,

    /// Max retail price in paise, when printed on the pack.
    pub mrp_paise: Option<i64>,

    /// Expiry date of the current batch.
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,

    /// Manufacturer name.
    pub manufacturer: String,

    /// Shelf location code (e.g. "A-12").
    pub shelf_location: String,

    /// Batch number of the current batch.
    pub batch_number: String,

    /// Salt / active ingredient name.
    pub salt: String,

    /// HSN tax code.
    pub hsn_code: String,

    /// GST rate in basis points (1200 = 12%).
    pub gst_bps: u32,

    /// Regulatory schedule tag.
    pub schedule: Schedule,

    /// Whether the item is active (soft retirement flag).
    pub is_active: bool,

    /// When the SKU was first received.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the item was last mutated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> GstRate {
        GstRate::from_bps(self.gst_bps)
    }

    /// Checks whether the item sits at or below its reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_level
    }
}

// =============================================================================
// Batch Info
// =============================================================================

/// Payload for `receive_stock`: everything needed to create a new
/// `InventoryItem` or refresh the batch fields of an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BatchInfo {
    pub name: String,
    pub category: String,
    pub reorder_level: i64,
    pub price_paise: i64,
    pub mrp_paise: Option<i64>,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    pub manufacturer: String,
    pub shelf_location: String,
    pub batch_number: String,
    pub salt: String,
    pub hsn_code: String,
    pub gst_bps: u32,
    pub schedule: Schedule,
}

// =============================================================================
// Order Status
// =============================================================================

/// The delivery-status lifecycle of an order.
///
/// ## Transition Table
/// ```text
/// Pending → Ready → Dispatched → Delivered (terminal)
///    │
///    └────► Cancelled (terminal, via cancel_order only)
/// ```
/// Transitions are monotonic; no stage may be skipped or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, stock reserved.
    Pending,
    /// Fully prepared, awaiting dispatch.
    Ready,
    /// Handed to delivery.
    Dispatched,
    /// Terminal success.
    Delivered,
    /// Terminal: cancelled while still pending, stock returned.
    Cancelled,
}

impl OrderStatus {
    /// The immediate successor in the monotonic chain, or `None` for
    /// terminal states. `Cancelled` is reachable only through
    /// `cancel_order`, never through `advance_status`.
    pub const fn successor(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Dispatched),
            OrderStatus::Dispatched => Some(OrderStatus::Delivered),
            OrderStatus::Delivered | OrderStatus::Cancelled => None,
        }
    }

    /// Whether the status counts towards sales figures.
    pub const fn counts_as_sale(&self) -> bool {
        matches!(
            self,
            OrderStatus::Ready | OrderStatus::Dispatched | OrderStatus::Delivered
        )
    }

    /// Lowercase label used in error messages and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A line item in an order.
/// Uses the snapshot pattern to freeze pricing at time of order creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    /// SKU the line reserves.
    pub sku: String,
    /// Quantity reserved.
    pub quantity: i64,
    /// Unit price in paise at time of order (frozen).
    pub unit_price_paise: i64,
    /// GST rate in basis points at time of order (frozen).
    pub gst_bps: u32,
    /// Line total before GST (unit_price × quantity).
    pub line_total_paise: i64,
    /// GST for this line.
    pub gst_paise: i64,
}

impl OrderLine {
    /// Line total including GST.
    #[inline]
    pub fn total_with_gst_paise(&self) -> i64 {
        self.line_total_paise + self.gst_paise
    }
}

/// An order placed against the inventory ledger.
///
/// Orders are retained indefinitely for audit; they are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Patient reference (opaque to the engine).
    pub patient_ref: String,

    /// Ordered line items with frozen pricing.
    pub lines: Vec<OrderLine>,

    /// Total amount in paise: Σ (line total + GST).
    pub amount_paise: i64,

    /// Delivery-status lifecycle position.
    pub status: OrderStatus,

    /// Creation timestamp.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }
}

// =============================================================================
// Queue Status & Type
// =============================================================================

/// The service-status lifecycle of a queue entry.
///
/// ## Transition Table
/// ```text
/// Waiting → Servicing → Completed (terminal, archived)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Waiting,
    Servicing,
    Completed,
}

impl QueueStatus {
    /// The immediate successor in the monotonic chain.
    pub const fn successor(&self) -> Option<QueueStatus> {
        match self {
            QueueStatus::Waiting => Some(QueueStatus::Servicing),
            QueueStatus::Servicing => Some(QueueStatus::Completed),
            QueueStatus::Completed => None,
        }
    }

    /// Lowercase label used in error messages and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::Servicing => "servicing",
            QueueStatus::Completed => "completed",
        }
    }
}

impl Default for QueueStatus {
    fn default() -> Self {
        QueueStatus::Waiting
    }
}

/// How the patient entered the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    /// Ad-hoc / as-needed visit.
    Prn,
    /// Over-the-counter purchase.
    Otc,
    /// Insurance-backed visit.
    Insurance,
}

// =============================================================================
// Queue Entry
// =============================================================================

/// A patient in the service queue.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QueueEntry {
    /// Unique token identifier (UUID v4).
    pub id: String,

    /// Patient reference (opaque to the engine).
    pub patient_ref: String,

    /// Sequential token number, monotonic per service day.
    pub token_number: u32,

    /// Service-status lifecycle position.
    pub status: QueueStatus,

    /// How the patient entered the queue.
    pub entry_type: QueueType,

    /// Check-in timestamp.
    #[ts(as = "String")]
    pub checked_in_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gst_rate_from_bps() {
        let rate = GstRate::from_bps(1200);
        assert_eq!(rate.bps(), 1200);
        assert!((rate.percentage() - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_order_status_chain() {
        assert_eq!(OrderStatus::Pending.successor(), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::Ready.successor(), Some(OrderStatus::Dispatched));
        assert_eq!(
            OrderStatus::Dispatched.successor(),
            Some(OrderStatus::Delivered)
        );
        assert_eq!(OrderStatus::Delivered.successor(), None);
        assert_eq!(OrderStatus::Cancelled.successor(), None);
    }

    #[test]
    fn test_order_status_sale_set() {
        assert!(!OrderStatus::Pending.counts_as_sale());
        assert!(OrderStatus::Ready.counts_as_sale());
        assert!(OrderStatus::Dispatched.counts_as_sale());
        assert!(OrderStatus::Delivered.counts_as_sale());
        assert!(!OrderStatus::Cancelled.counts_as_sale());
    }

    #[test]
    fn test_queue_status_chain() {
        assert_eq!(QueueStatus::Waiting.successor(), Some(QueueStatus::Servicing));
        assert_eq!(
            QueueStatus::Servicing.successor(),
            Some(QueueStatus::Completed)
        );
        assert_eq!(QueueStatus::Completed.successor(), None);
    }

    #[test]
    fn test_order_line_total_with_gst() {
        let line = OrderLine {
            sku: "PARA500".to_string(),
            quantity: 5,
            unit_price_paise: 200,
            gst_bps: 1200,
            line_total_paise: 1000,
            gst_paise: 120,
        };
        assert_eq!(line.total_with_gst_paise(), 1120);
    }

    #[test]
    fn test_low_stock_predicate() {
        let mut item = InventoryItem {
            sku: "PARA500".to_string(),
            name: "Paracetamol 500mg".to_string(),
            category: "analgesic".to_string(),
            stock: 5,
            reorder_level: 20,
            price_paise: 200,
            mrp_paise: Some(250),
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            manufacturer: "Cipla".to_string(),
            shelf_location: "A-1".to_string(),
            batch_number: "B001".to_string(),
            salt: "paracetamol".to_string(),
            hsn_code: "3004".to_string(),
            gst_bps: 1200,
            schedule: Schedule::Unscheduled,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(item.is_low_stock());

        item.stock = 21;
        assert!(!item.is_low_stock());
    }
}
