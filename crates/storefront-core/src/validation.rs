//! # Validation Module
//!
//! Input validation for shopper-entered forms and for snapshots received
//! from the backend.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Forms (login, register, address, search box)                 │
//! │  └── THIS MODULE: required fields, lengths, matching passwords         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Snapshots from the backend (catalog, cart records)           │
//! │  └── THIS MODULE: contract checks, fail fast on malformed data         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Authoritative checks (wallet balance, product existence)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages match what the shopper sees, e.g. "Username is a required field".

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{CartRecord, Product};
use crate::{MAX_ITEM_QUANTITY, MAX_RATING};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum username length at registration.
pub const MIN_USERNAME_LEN: usize = 6;

/// Minimum password length at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest address the address form accepts.
pub const MAX_ADDRESS_LEN: usize = 256;

/// Longest search query sent to the backend.
pub const MAX_SEARCH_QUERY_LEN: usize = 100;

// =============================================================================
// Form Validators
// =============================================================================

/// Validates the login form.
///
/// ```rust
/// use storefront_core::validation::validate_login;
///
/// assert!(validate_login("crio.do", "learnbydoing").is_ok());
/// assert_eq!(
///     validate_login("", "x").unwrap_err().to_string(),
///     "Username is a required field"
/// );
/// ```
pub fn validate_login(username: &str, password: &str) -> ValidationResult<()> {
    if username.is_empty() {
        return Err(ValidationError::required("Username"));
    }
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    Ok(())
}

/// Validates the registration form.
///
/// ## Rules
/// - Username required, at least [`MIN_USERNAME_LEN`] characters
/// - Password required, at least [`MIN_PASSWORD_LEN`] characters
/// - Password and confirmation must match
pub fn validate_registration(
    username: &str,
    password: &str,
    confirm_password: &str,
) -> ValidationResult<()> {
    if username.is_empty() {
        return Err(ValidationError::required("Username"));
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "Username".to_string(),
            min: MIN_USERNAME_LEN,
        });
    }
    if password.is_empty() {
        return Err(ValidationError::required("Password"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "Password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirm_password {
        return Err(ValidationError::Mismatch {
            field: "Passwords".to_string(),
        });
    }
    Ok(())
}

/// Validates a new address and returns it trimmed.
pub fn validate_address_text(text: &str) -> ValidationResult<String> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::required("Address"));
    }

    if text.chars().count() > MAX_ADDRESS_LEN {
        return Err(ValidationError::TooLong {
            field: "Address".to_string(),
            max: MAX_ADDRESS_LEN,
        });
    }

    Ok(text.to_string())
}

/// Validates a search query against `max_len` characters and returns it
/// trimmed. [`MAX_SEARCH_QUERY_LEN`] is the usual limit.
///
/// An empty query is valid here; whether to send it is the dispatcher's call.
pub fn validate_search_query(query: &str, max_len: usize) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: max_len,
        });
    }

    Ok(query.to_string())
}

/// Validates a cart quantity (1..=MAX_ITEM_QUANTITY).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Snapshot Validators
// =============================================================================

/// Checks one catalog entry against the Product contract.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    if !product.cost.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "cost".to_string(),
        });
    }

    if product.rating > MAX_RATING {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: i64::from(MAX_RATING),
        });
    }

    Ok(())
}

/// Checks a whole catalog snapshot, failing on the first bad entry.
pub fn validate_catalog(catalog: &[Product]) -> CoreResult<()> {
    for product in catalog {
        validate_product(product).map_err(|source| CoreError::InvalidCatalogEntry {
            product_id: product.id.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Checks that every cart record has a quantity the cart can hold
/// (see [`validate_quantity`]), failing on the first bad record.
pub fn validate_cart_records(records: &[CartRecord]) -> CoreResult<()> {
    for record in records {
        validate_quantity(record.quantity).map_err(|_| CoreError::InvalidCartRecord {
            product_id: record.product_id.clone(),
            quantity: record.quantity,
        })?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
