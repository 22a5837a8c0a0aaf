//! # rxops-core: Pure Domain Logic for the RxOps Pharmacy Engine
//!
//! This crate is the **heart** of the RxOps domain engine. It contains the
//! domain types, money/GST arithmetic, validation rules, and error types as
//! pure, deterministic code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RxOps Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Dashboard / POS / Counters                      │   │
//! │  │    Inventory UI ──► Orders UI ──► Queue UI ──► Stats Cards     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ command/query API                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rxops-engine                                  │   │
//! │  │    InventoryLedger, OrderManager, QueueManager, Stats           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rxops-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │ Inventory │  │   Money   │  │  Engine   │  │   rules   │  │   │
//! │  │   │ Order/Qu. │  │  GstRate  │  │  Error    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (InventoryItem, Order, QueueEntry, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64) to avoid float errors
//! 4. **Closed Status Sets**: Lifecycles are enums with explicit successor tables,
//!    so an invalid transition is an exhaustiveness concern, not a string bug
//!
//! ## Example Usage
//!
//! ```rust
//! use rxops_core::money::Money;
//! use rxops_core::types::GstRate;
//!
//! // Create money from paise (never from floats!)
//! let price = Money::from_paise(2000); // ₹20.00
//!
//! // Calculate GST with integer rounding
//! let rate = GstRate::from_bps(1200); // 12%
//! let gst = price.gst(rate);
//!
//! // GST on ₹20.00 at 12% = ₹2.40
//! assert_eq!(gst.paise(), 240);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use rxops_core::Money` instead of
// `use rxops_core::money::Money`

pub use error::{EngineError, EngineResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order.
///
/// ## Business Reason
/// Prevents runaway orders and keeps the per-order reservation loop bounded.
/// Can be made configurable per store in future versions.
pub const MAX_ORDER_LINES: usize = 50;

/// Maximum quantity of a single SKU per order line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., a scanned barcode repeating into
/// the quantity field). Bulk receipts go through `receive_stock`, which is
/// not capped.
pub const MAX_LINE_QUANTITY: i64 = 9999;

/// Maximum unit price in paise (₹10,00,000.00).
///
/// ## Business Reason
/// No pharmacy item legitimately prices above ten lakh rupees; a larger
/// value is a data-entry error. Capping here also keeps every line total
/// (`price × MAX_LINE_QUANTITY`) safely inside i64.
pub const MAX_PRICE_PAISE: i64 = 100_000_000;
