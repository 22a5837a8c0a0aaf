//! # Error Types
//!
//! Domain-specific error types for the RxOps engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rxops-core errors (this file)                                         │
//! │  ├── EngineError      - Command/query failures at the engine boundary  │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  Flow: ValidationError → EngineError → caller (dashboard/POS)          │
//! │                                                                         │
//! │  Every failure is scoped to the single requested command; no error     │
//! │  condition is fatal to the process.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (SKU, ID, statuses)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Engine Error
// =============================================================================

/// Engine command/query errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are returned as explicit failure results to the immediate caller;
/// nothing throws past the command/query boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failed (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// SKU does not exist in the inventory ledger.
    #[error("SKU not found: {sku}")]
    SkuNotFound { sku: String },

    /// Order id is unknown to the order lifecycle manager.
    #[error("Order not found: {id}")]
    OrderNotFound { id: String },

    /// Queue entry id is unknown to the queue manager.
    #[error("Queue entry not found: {id}")]
    QueueEntryNotFound { id: String },

    /// A decrement would drive stock negative.
    ///
    /// ## When This Occurs
    /// - An order line requests more than the available stock
    /// - Two concurrent decrements race; the loser of the per-SKU lock
    ///   observes the reduced stock and fails cleanly
    ///
    /// ## User Workflow
    /// ```text
    /// Create Order (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "PARA500", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 PARA500 in stock"
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A status advance skipped, regressed, or repeated a stage.
    ///
    /// ## When This Occurs
    /// - Advancing an order `Pending → Dispatched` (skips `Ready`)
    /// - Re-issuing the same target twice (the first call already advanced)
    /// - Cancelling an order that has progressed past `Pending`
    #[error("Invalid {entity} transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero before the operation is permitted.
    #[error("{field} must be zero, found {value}")]
    MustBeZero { field: String, value: i64 },

    /// Invalid format (e.g., bad SKU characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// MRP (max retail price) below the selling price.
    #[error("mrp {mrp_paise} cannot be below price {price_paise}")]
    MrpBelowPrice { mrp_paise: i64, price_paise: i64 },

    /// Applying the delta would drive the value negative.
    #[error("{field} adjustment by {delta} would go negative (current {current})")]
    WouldGoNegative {
        field: String,
        current: i64,
        delta: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::InsufficientStock {
            sku: "PARA500".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for PARA500: available 3, requested 5"
        );

        let err = EngineError::InvalidTransition {
            entity: "order",
            from: "pending".to_string(),
            to: "dispatched".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid order transition: pending -> dispatched"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "sku".to_string(),
        };
        assert_eq!(err.to_string(), "sku is required");

        let err = ValidationError::WouldGoNegative {
            field: "stock".to_string(),
            current: 2,
            delta: -5,
        };
        assert_eq!(
            err.to_string(),
            "stock adjustment by -5 would go negative (current 2)"
        );
    }

    #[test]
    fn test_validation_converts_to_engine_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let engine_err: EngineError = validation_err.into();
        assert!(matches!(engine_err, EngineError::Validation(_)));
    }
}
