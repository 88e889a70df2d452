//! # storefront-core: Pure Business Logic for the Storefront
//!
//! This crate holds the storefront rules that do not need a network, a
//! clock, or a disk. Everything here is a deterministic function of its
//! arguments.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Application Shell (apps/shell)                  │   │
//! │  │    catalog ──► search ──► cart ──► addresses ──► checkout       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │      storefront-client (REST backend, debounce, session)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots in, decisions out            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │  Product  │  │   Money   │  │ reconcile │  │ validate  │  │   │
//! │  │   │  Address  │  │           │  │  totals   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartRecord, Address, AddressBook)
//! - [`money`] - Integer money type
//! - [`cart`] - Cart reconciliation, totals and cart-update planning
//! - [`checkout`] - Checkout validation
//! - [`validation`] - Form input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::{reconcile, total_cart_value};
//! use storefront_core::{CartRecord, Money, Product};
//!
//! let catalog = vec![
//!     Product::new("p1", "Basketball", "Sports", Money::new(10), 5, ""),
//!     Product::new("p2", "Tennis Ball", "Sports", Money::new(5), 4, ""),
//! ];
//! let records = vec![CartRecord::new("p1", 2), CartRecord::new("p2", 1)];
//!
//! let cart = reconcile(&records, &catalog);
//! assert_eq!(total_cart_value(&cart.items), Money::new(25));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartUpdate, CartUpdateOrigin, CartUpdateRejected, Reconciliation};
pub use checkout::{CheckoutDecision, CheckoutRejection};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single product in the cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest product rating the catalog may report.
pub const MAX_RATING: u8 = 5;
