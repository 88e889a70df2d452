//! # Checkout Module
//!
//! Decides whether a checkout request may be sent to the backend.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate(cart_total, wallet_balance, address_book)                     │
//! │       │                                                                 │
//! │       ├── balance < total?      → INSUFFICIENT_BALANCE                  │
//! │       │                                                                 │
//! │       ├── no saved addresses?   → NO_ADDRESS                            │
//! │       │                                                                 │
//! │       ├── nothing selected?     → NO_ADDRESS_SELECTED                   │
//! │       │                                                                 │
//! │       └── OK → submit_checkout(selected_id)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first failing check wins. A shopper with too little balance and no
//! addresses sees the balance message.
//!
//! The wallet balance is passed in by the caller; this module never looks
//! at the session.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::AddressBook;

// =============================================================================
// Rejection Reasons
// =============================================================================

/// Why checkout was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutRejection {
    InsufficientBalance,
    NoAddress,
    NoAddressSelected,
}

impl CheckoutRejection {
    /// Machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            CheckoutRejection::InsufficientBalance => "INSUFFICIENT_BALANCE",
            CheckoutRejection::NoAddress => "NO_ADDRESS",
            CheckoutRejection::NoAddressSelected => "NO_ADDRESS_SELECTED",
        }
    }

    /// Message shown to the shopper.
    pub const fn message(&self) -> &'static str {
        match self {
            CheckoutRejection::InsufficientBalance => {
                "You do not have enough balance in your wallet for this purchase."
            }
            CheckoutRejection::NoAddress => "Please add a new address before proceeding.",
            CheckoutRejection::NoAddressSelected => {
                "Please select one shipping address to proceed."
            }
        }
    }
}

impl std::fmt::Display for CheckoutRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// =============================================================================
// Decision
// =============================================================================

/// Outcome of [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDecision {
    pub ok: bool,
    pub reason: Option<CheckoutRejection>,
}

impl CheckoutDecision {
    pub const fn pass() -> Self {
        CheckoutDecision {
            ok: true,
            reason: None,
        }
    }

    pub const fn reject(reason: CheckoutRejection) -> Self {
        CheckoutDecision {
            ok: false,
            reason: Some(reason),
        }
    }

    /// `Ok(())` when checkout may proceed, otherwise the rejection.
    pub fn into_result(self) -> Result<(), CheckoutRejection> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Validates a checkout request. Pure; no side effects.
///
/// ```rust
/// use storefront_core::checkout::{validate, CheckoutRejection};
/// use storefront_core::{AddressBook, Money};
///
/// let decision = validate(Money::new(100), Money::new(10), &AddressBook::new());
/// assert_eq!(decision.reason, Some(CheckoutRejection::InsufficientBalance));
/// ```
pub fn validate(cart_total: Money, wallet_balance: Money, book: &AddressBook) -> CheckoutDecision {
    if wallet_balance < cart_total {
        return CheckoutDecision::reject(CheckoutRejection::InsufficientBalance);
    }

    if book.is_empty() {
        return CheckoutDecision::reject(CheckoutRejection::NoAddress);
    }

    if book.selected_id().is_none() {
        return CheckoutDecision::reject(CheckoutRejection::NoAddressSelected);
    }

    CheckoutDecision::pass()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Address;

    fn book_with(ids: &[&str]) -> AddressBook {
        AddressBook::with_entries(
            ids.iter()
                .map(|id| Address::new(*id, format!("Address {}", id)))
                .collect(),
        )
    }

    #[test]
    fn test_balance_check_wins_over_missing_address() {
        let decision = validate(Money::new(100), Money::new(10), &AddressBook::new());
        assert!(!decision.ok);
        assert_eq!(decision.reason, Some(CheckoutRejection::InsufficientBalance));
    }

    #[test]
    fn test_no_address() {
        let decision = validate(Money::new(50), Money::new(100), &AddressBook::new());
        assert_eq!(decision, CheckoutDecision::reject(CheckoutRejection::NoAddress));
    }

    #[test]
    fn test_no_address_selected() {
        let decision = validate(Money::new(50), Money::new(100), &book_with(&["a1", "a2"]));
        assert_eq!(decision.reason, Some(CheckoutRejection::NoAddressSelected));
    }

    #[test]
    fn test_success() {
        let mut book = book_with(&["a1"]);
        assert!(book.select("a1"));

        let decision = validate(Money::new(50), Money::new(100), &book);
        assert!(decision.ok);
        assert_eq!(decision.reason, None);
        assert!(decision.into_result().is_ok());
    }

    #[test]
    fn test_exact_balance_is_enough() {
        let mut book = book_with(&["a1"]);
        book.select("a1");
        assert!(validate(Money::new(100), Money::new(100), &book).ok);
    }

    #[test]
    fn test_empty_cart_still_needs_address() {
        let decision = validate(Money::zero(), Money::zero(), &AddressBook::new());
        assert_eq!(decision.reason, Some(CheckoutRejection::NoAddress));
    }

    #[test]
    fn test_rejection_codes_and_messages() {
        assert_eq!(CheckoutRejection::InsufficientBalance.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(CheckoutRejection::NoAddress.code(), "NO_ADDRESS");
        assert_eq!(CheckoutRejection::NoAddressSelected.code(), "NO_ADDRESS_SELECTED");
        assert_eq!(
            CheckoutRejection::NoAddressSelected.to_string(),
            "Please select one shipping address to proceed."
        );

        let json = serde_json::to_string(&CheckoutRejection::NoAddress).unwrap();
        assert_eq!(json, "\"NO_ADDRESS\"");
    }
}
