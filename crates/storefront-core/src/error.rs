//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Caller contract violations                     │
//! │  └── ValidationError  - Form / snapshot validation failures            │
//! │                                                                         │
//! │  storefront-client errors (separate crate)                             │
//! │  └── ClientError      - Network, session and config failures           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → Shell message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Expected business outcomes are returned as values, never as `Err`:
//! - orphaned cart records → [`crate::cart::Reconciliation::orphaned_ids`]
//! - insufficient balance / missing address → [`crate::checkout::CheckoutRejection`]
//! - duplicate add-to-cart → [`crate::cart::CartUpdateRejected`]

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised when a caller hands the core malformed input.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A catalog snapshot contains an entry that breaks the Product contract.
    #[error("Invalid catalog entry {product_id}: {source}")]
    InvalidCatalogEntry {
        product_id: String,
        #[source]
        source: ValidationError,
    },

    /// A cart record carries a quantity outside `1..=MAX_ITEM_QUANTITY`.
    #[error("Cart record for {product_id} has invalid quantity {quantity}")]
    InvalidCartRecord { product_id: String, quantity: i64 },

    /// A line cost or the cart total does not fit in `Money`.
    #[error("Cart total overflows at {product_id}")]
    AmountOverflow { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// The display strings are the messages shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is a required field")]
    Required { field: String },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Two fields that must agree do not (`field` names them in the plural).
    #[error("{field} do not match")]
    Mismatch { field: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
