//! # Validation Module
//!
//! Input validation utilities for the RxOps engine.
//!
//! ## Validation Strategy
//! Validation runs at the engine's command boundary, before any lock is
//! taken or any state is touched. A command that fails validation leaves
//! every entity unaffected.
//!
//! ## Usage
//! ```rust,no_run
//! use rxops_core::validation::{validate_sku, validate_quantity};
//!
//! // Validate SKU before touching the ledger
//! validate_sku("PARA500").unwrap();
//!
//! // Validate quantity before a stock mutation
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::BatchInfo;
use crate::{MAX_LINE_QUANTITY, MAX_PRICE_PAISE};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use rxops_core::validation::validate_sku;
///
/// assert!(validate_sku("PARA500").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an item display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a patient reference.
///
/// The engine treats patient references as opaque, but an empty reference
/// is always a caller bug.
pub fn validate_patient_ref(patient_ref: &str) -> ValidationResult<()> {
    if patient_ref.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "patient_ref".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a stock/order quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (9999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in paise.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free/sample items)
/// - Must not exceed MAX_PRICE_PAISE, so line totals
///   (price × MAX_LINE_QUANTITY) cannot overflow
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_PAISE).contains(&paise) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_PAISE,
        });
    }

    Ok(())
}

/// Validates an MRP against the selling price.
///
/// ## Rules
/// - When present, mrp >= price
pub fn validate_mrp(mrp_paise: Option<i64>, price_paise: i64) -> ValidationResult<()> {
    if let Some(mrp) = mrp_paise {
        if mrp < price_paise {
            return Err(ValidationError::MrpBelowPrice {
                mrp_paise: mrp,
                price_paise,
            });
        }
    }

    Ok(())
}

/// Validates a GST rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_gst_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "gst_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a reorder level.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_reorder_level(level: i64) -> ValidationResult<()> {
    if level < 0 {
        return Err(ValidationError::OutOfRange {
            field: "reorder_level".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates an entire `BatchInfo` payload before a stock receipt.
pub fn validate_batch(batch: &BatchInfo) -> ValidationResult<()> {
    validate_name(&batch.name)?;
    validate_price_paise(batch.price_paise)?;
    validate_mrp(batch.mrp_paise, batch.price_paise)?;
    validate_gst_bps(batch.gst_bps)?;
    validate_reorder_level(batch.reorder_level)?;

    if batch.batch_number.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "batch_number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
