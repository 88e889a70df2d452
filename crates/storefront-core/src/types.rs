//! # Domain Types
//!
//! Core domain types shared between the backend client and the front-end.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   CartRecord    │   │  CartLineItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id   (_id)     │◄──│  product_id     │   │  product        │       │
//! │  │  name, category │   │  quantity (qty) │──►│  quantity       │       │
//! │  │  cost, rating   │   └─────────────────┘   └─────────────────┘       │
//! │  │  image_url      │      server-held            derived, never        │
//! │  └─────────────────┘                             persisted             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────────────┐                 │
//! │  │    Address      │   │        AddressBook          │                 │
//! │  │  id   (_id)     │   │  entries  (all)             │                 │
//! │  │  text (address) │   │  selected_id (selected)     │                 │
//! │  └─────────────────┘   └─────────────────────────────┘                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names in parentheses are the REST wire names.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog entry. Read-only to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    pub category: String,

    /// Unit cost; always positive for a well-formed catalog.
    pub cost: Money,

    /// Aggregate rating out of five.
    pub rating: u8,

    #[serde(rename = "image")]
    pub image_url: String,
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        cost: Money,
        rating: u8,
        image_url: impl Into<String>,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            cost,
            rating,
            image_url: image_url.into(),
        }
    }
}

// =============================================================================
// Cart Record
// =============================================================================

/// A server-reported cart entry: what the shopper added, without product detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub product_id: String,

    #[serde(rename = "qty")]
    pub quantity: i64,
}

impl CartRecord {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        CartRecord {
            product_id: product_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Cart Line Item
// =============================================================================

/// A cart record joined with its product. Rebuilt on every reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    pub product: Product,
    pub quantity: i64,
}

impl CartLineItem {
    /// Cost of this line: unit cost × quantity.
    #[inline]
    pub fn cost(&self) -> Money {
        crate::cart::line_item_cost(self)
    }
}

// =============================================================================
// Address
// =============================================================================

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    #[serde(rename = "_id")]
    pub id: String,

    /// Full address as typed by the shopper.
    #[serde(rename = "address")]
    pub text: String,
}

impl Address {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Address {
            id: id.into(),
            text: text.into(),
        }
    }
}

// =============================================================================
// Address Book
// =============================================================================

/// The shopper's saved addresses plus the one picked for delivery.
///
/// ## Invariant
/// `selected_id`, when set, names an entry in `entries`. Every mutator keeps
/// this true: selecting an unknown id is refused, and replacing the entries
/// drops a selection that no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddressBook {
    #[serde(rename = "all")]
    entries: Vec<Address>,

    #[serde(rename = "selected")]
    selected_id: Option<String>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a book with no selection.
    pub fn with_entries(entries: Vec<Address>) -> Self {
        AddressBook {
            entries,
            selected_id: None,
        }
    }

    pub fn entries(&self) -> &[Address] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The selected id, treating an empty string as no selection.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref().filter(|id| !id.is_empty())
    }

    /// The selected address, if any.
    pub fn selected(&self) -> Option<&Address> {
        let id = self.selected_id()?;
        self.entries.iter().find(|a| a.id == id)
    }

    /// Selects an address by id. Returns `false` (and changes nothing) when
    /// the id is not in the book.
    pub fn select(&mut self, id: &str) -> bool {
        if self.entries.iter().any(|a| a.id == id) {
            self.selected_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    /// Replaces the entries with a fresh list from the backend.
    ///
    /// The current selection survives only if its id is still present.
    pub fn replace_entries(&mut self, entries: Vec<Address>) {
        self.entries = entries;
        let still_present = self
            .selected_id()
            .map(|id| self.entries.iter().any(|a| a.id == id))
            .unwrap_or(false);
        if !still_present {
            self.selected_id = None;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
