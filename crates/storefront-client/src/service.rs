//! # Storefront Service
//!
//! The shopper-facing operations, composed from the backend and the pure
//! rules in `storefront-core`.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login ──► Session (token, balance) ──► SessionStore                   │
//! │                                                                         │
//! │  load_cart:  fetch_catalog ─┐                                          │
//! │                             ├─► validate ─► reconcile ─► Reconciliation │
//! │              fetch_cart ────┘                                          │
//! │                                                                         │
//! │  update_cart: plan_cart_update ─► POST /cart  (or Rejected, no call)   │
//! │                                                                         │
//! │  checkout:   checkout::validate(total, session balance, addresses)     │
//! │                 ├── rejected ─► CheckoutOutcome::Rejected (no call)     │
//! │                 └── ok ───────► POST /cart/checkout ─► Placed           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use storefront_core::cart::{plan_cart_update, reconcile};
use storefront_core::checkout;
use storefront_core::validation::{
    validate_address_text, validate_cart_records, validate_catalog, validate_login,
    validate_registration,
};
use storefront_core::{
    AddressBook, CartRecord, CartUpdateOrigin, CartUpdateRejected, CheckoutRejection, Money,
    Product, Reconciliation,
};
use tracing::{debug, info, warn};

use crate::backend::StorefrontBackend;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionStore};

// =============================================================================
// Outcomes
// =============================================================================

/// Result of a checkout attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The backend accepted the order.
    Placed { address_id: String, total: Money },
    /// Refused locally; the backend was not called.
    Rejected(CheckoutRejection),
}

/// Result of a cart change that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartUpdateOutcome {
    /// The backend accepted the change and returned the new cart.
    Updated(Vec<CartRecord>),
    /// Refused locally; the backend was not called.
    Rejected(CartUpdateRejected),
}

// =============================================================================
// Service
// =============================================================================

/// Shopper session plus the state the storefront screens share.
pub struct StorefrontService {
    backend: Arc<dyn StorefrontBackend>,
    store: Option<SessionStore>,
    session: Option<Session>,
    addresses: AddressBook,
    cart_records: Vec<CartRecord>,
}

impl StorefrontService {
    /// Creates the service, restoring a saved session from `store` if present.
    pub fn new(backend: Arc<dyn StorefrontBackend>, store: Option<SessionStore>) -> Self {
        let session = store.as_ref().and_then(SessionStore::load);
        if let Some(ref s) = session {
            debug!(username = %s.username, "Restored saved session");
        }
        Self {
            backend,
            store,
            session,
            addresses: AddressBook::new(),
            cart_records: Vec::new(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Cart records from the most recent load or update.
    pub fn cart_records(&self) -> &[CartRecord] {
        &self.cart_records
    }

    fn token(&self) -> ClientResult<String> {
        self.session
            .as_ref()
            .map(|s| s.token.clone())
            .ok_or(ClientError::NotLoggedIn)
    }

    // =========================================================================
    // Account
    // =========================================================================

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<&Session> {
        validate_login(username, password)?;

        let response = self.backend.login(username, password).await?;
        let session = Session::new(response.token, response.username, response.balance);

        if let Some(ref store) = self.store {
            store.save(&session)?;
        }
        info!(username = %session.username, balance = %session.balance, "Logged in");

        Ok(self.session.insert(session))
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> ClientResult<()> {
        validate_registration(username, password, confirm_password)?;
        self.backend.register(username, password).await?;
        info!(username = %username, "Registered");
        Ok(())
    }

    /// Forgets the session, locally and on disk.
    pub fn logout(&mut self) -> ClientResult<()> {
        self.session = None;
        self.addresses = AddressBook::new();
        self.cart_records.clear();
        if let Some(ref store) = self.store {
            store.clear()?;
        }
        info!("Logged out");
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn catalog(&self) -> ClientResult<Vec<Product>> {
        let catalog = self.backend.fetch_catalog().await?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetches catalog and cart together and joins them.
    ///
    /// Records for products missing from the catalog are left out of the
    /// line items and reported in `orphaned_ids`.
    pub async fn load_cart(&mut self) -> ClientResult<Reconciliation> {
        let token = self.token()?;
        let (catalog, records) = tokio::try_join!(
            self.backend.fetch_catalog(),
            self.backend.fetch_cart_records(&token)
        )?;

        validate_catalog(&catalog)?;
        validate_cart_records(&records)?;

        let cart = reconcile(&records, &catalog);
        let total = cart.checked_total()?;
        if cart.has_orphans() {
            warn!(
                orphans = cart.orphaned_ids.len(),
                ids = ?cart.orphaned_ids,
                "Cart references products missing from the catalog"
            );
        }
        debug!(items = cart.items.len(), total = %total, "Cart loaded");

        self.cart_records = records;
        Ok(cart)
    }

    /// Requests a cart change.
    ///
    /// Planned against the records from the last [`load_cart`] or update.
    ///
    /// [`load_cart`]: Self::load_cart
    pub async fn update_cart(
        &mut self,
        product_id: &str,
        quantity: i64,
        origin: CartUpdateOrigin,
    ) -> ClientResult<CartUpdateOutcome> {
        let token = self.token()?;

        let update = match plan_cart_update(&self.cart_records, product_id, quantity, origin) {
            Ok(update) => update,
            Err(rejected) => {
                debug!(product_id = %product_id, reason = %rejected.message(), "Cart update refused");
                return Ok(CartUpdateOutcome::Rejected(rejected));
            }
        };

        let records = self
            .backend
            .update_cart(&token, update.product_id(), update.quantity())
            .await?;
        validate_cart_records(&records)?;

        info!(product_id = %update.product_id(), quantity = update.quantity(), "Cart updated");
        self.cart_records = records.clone();
        Ok(CartUpdateOutcome::Updated(records))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    pub async fn load_addresses(&mut self) -> ClientResult<&AddressBook> {
        let token = self.token()?;
        let entries = self.backend.fetch_addresses(&token).await?;
        self.addresses.replace_entries(entries);
        Ok(&self.addresses)
    }

    pub async fn add_address(&mut self, text: &str) -> ClientResult<&AddressBook> {
        let token = self.token()?;
        let text = validate_address_text(text)?;
        let entries = self.backend.add_address(&token, &text).await?;
        self.addresses.replace_entries(entries);
        info!(count = self.addresses.len(), "Address added");
        Ok(&self.addresses)
    }

    pub async fn delete_address(&mut self, address_id: &str) -> ClientResult<&AddressBook> {
        let token = self.token()?;
        let entries = self.backend.delete_address(&token, address_id).await?;
        self.addresses.replace_entries(entries);
        info!(address_id = %address_id, "Address deleted");
        Ok(&self.addresses)
    }

    /// Picks the delivery address. Returns `false` for an unknown id.
    pub fn select_address(&mut self, address_id: &str) -> bool {
        self.addresses.select(address_id)
    }

    /// Picks the delivery address, failing for an id not in the loaded book.
    pub fn require_address(&mut self, address_id: &str) -> ClientResult<()> {
        if self.select_address(address_id) {
            debug!(address_id = %address_id, "Delivery address selected");
            Ok(())
        } else {
            Err(ClientError::UnknownAddress(address_id.to_string()))
        }
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Validates and, if allowed, places the order for `cart`.
    ///
    /// On success the local cart is emptied and the order total is taken off
    /// the session balance.
    pub async fn checkout(&mut self, cart: &Reconciliation) -> ClientResult<CheckoutOutcome> {
        let token = self.token()?;
        let balance = self
            .session
            .as_ref()
            .map(|s| s.balance)
            .ok_or(ClientError::NotLoggedIn)?;
        let total = cart.checked_total()?;

        if let Err(rejection) = checkout::validate(total, balance, &self.addresses).into_result() {
            info!(code = rejection.code(), "Checkout refused");
            return Ok(CheckoutOutcome::Rejected(rejection));
        }

        let address_id = match self.addresses.selected_id() {
            Some(id) => id.to_string(),
            None => return Ok(CheckoutOutcome::Rejected(CheckoutRejection::NoAddressSelected)),
        };

        self.backend.submit_checkout(&token, &address_id).await?;
        info!(address_id = %address_id, total = %total, "Order placed");

        self.cart_records.clear();
        if let Some(session) = self.session.as_mut() {
            session.balance -= total;
            if let Some(ref store) = self.store {
                store.save(session)?;
            }
        }

        Ok(CheckoutOutcome::Placed { address_id, total })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
