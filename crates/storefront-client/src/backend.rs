//! # Backend Abstraction
//!
//! The operations the storefront needs from its REST backend.
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │  Operation                   │  Endpoint                                │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │  fetch_catalog               │  GET    /products                        │
//! │  search_catalog              │  GET    /products/search?value=<q>       │
//! │  fetch_cart_records          │  GET    /cart                    (auth)  │
//! │  update_cart                 │  POST   /cart                    (auth)  │
//! │  submit_checkout             │  POST   /cart/checkout           (auth)  │
//! │  fetch_addresses             │  GET    /user/addresses          (auth)  │
//! │  add_address                 │  POST   /user/addresses          (auth)  │
//! │  delete_address              │  DELETE /user/addresses/{id}     (auth)  │
//! │  login                       │  POST   /auth/login                      │
//! │  register                    │  POST   /auth/register                   │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! [`crate::http::HttpBackend`] is the production implementation. Tests use
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_core::{Address, CartRecord, Money, Product};

use crate::error::ClientResult;

/// Successful login payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    /// Wallet balance at login time.
    pub balance: Money,
}

/// The storefront REST backend.
#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    async fn fetch_catalog(&self) -> ClientResult<Vec<Product>>;

    /// Products matching `query`. The backend decides what "matching" means.
    async fn search_catalog(&self, query: &str) -> ClientResult<Vec<Product>>;

    async fn fetch_cart_records(&self, token: &str) -> ClientResult<Vec<CartRecord>>;

    /// Sets a product's quantity (zero removes it). Returns the whole cart.
    async fn update_cart(
        &self,
        token: &str,
        product_id: &str,
        quantity: i64,
    ) -> ClientResult<Vec<CartRecord>>;

    async fn submit_checkout(&self, token: &str, address_id: &str) -> ClientResult<()>;

    async fn fetch_addresses(&self, token: &str) -> ClientResult<Vec<Address>>;

    /// Saves an address. Returns the full address list.
    async fn add_address(&self, token: &str, text: &str) -> ClientResult<Vec<Address>>;

    /// Deletes an address. Returns the remaining addresses.
    async fn delete_address(&self, token: &str, address_id: &str) -> ClientResult<Vec<Address>>;

    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse>;

    async fn register(&self, username: &str, password: &str) -> ClientResult<()>;
}
