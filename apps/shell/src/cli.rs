use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Browse the catalog, manage your cart and check out")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Path to client.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every product
    Catalog,

    /// Search the catalog.
    ///
    /// Without a query, reads the search box from stdin: each line is the
    /// box's new content, and results print once typing pauses.
    Search {
        query: Option<String>,
    },

    /// Log in and remember the session
    Login {
        username: String,
        #[arg(long, short)]
        password: String,
    },

    /// Create an account
    Register {
        username: String,
        #[arg(long, short)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the cart with line totals
    Cart,

    /// Add a product to the cart
    Add {
        product_id: String,
        /// Starting quantity
        #[arg(long, short, default_value_t = 1)]
        quantity: i64,
    },

    /// Change a cart line's quantity (0 removes it)
    SetQty {
        product_id: String,
        quantity: i64,
    },

    /// List saved addresses
    Addresses,

    /// Save a new address
    AddAddress {
        text: String,
    },

    /// Delete a saved address
    DeleteAddress {
        address_id: String,
    },

    /// Place the order
    Checkout {
        /// Shipping address id (see `addresses`). Chosen per order, never saved.
        #[arg(long)]
        address: Option<String>,
    },

    /// Show or create client.toml
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file, environment and flags)
    Show,

    /// Write a client.toml with default settings
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
