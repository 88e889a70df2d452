//! Subcommand handlers.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use storefront_client::{
    CartUpdateOutcome, CheckoutOutcome, ClientConfig, HttpBackend, SearchDispatcher, SearchState,
    SessionStore, StorefrontBackend, StorefrontService,
};
use storefront_core::cart::total_quantity;
use storefront_core::{AddressBook, CartUpdateOrigin, Product, Reconciliation};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::cli::{Cli, Command, ConfigAction};

pub type ShellResult = Result<(), Box<dyn Error>>;

pub async fn run(cli: Cli) -> ShellResult {
    if let Command::Config {
        action: ConfigAction::Init { force },
    } = cli.command
    {
        return init_config(cli.config, cli.endpoint, force);
    }

    let mut config = ClientConfig::load(cli.config)?;
    if let Some(endpoint) = cli.endpoint {
        config.backend.endpoint = endpoint;
        config.validate()?;
    }
    info!(endpoint = %config.endpoint(), "Using backend");

    let backend: Arc<dyn StorefrontBackend> = Arc::new(HttpBackend::from_config(&config)?);
    let store = config.session_path().map(SessionStore::new);
    let mut service = StorefrontService::new(Arc::clone(&backend), store);

    match cli.command {
        Command::Catalog => {
            print_products(&service.catalog().await?);
        }

        Command::Search { query: Some(query) } => {
            let mut search = SearchDispatcher::from_config(backend, &config);
            let mut rx = search.subscribe();
            search.on_input_changed(&query);
            if search.last_issued() == 0 {
                println!("Nothing to search for.");
                return Ok(());
            }
            rx.changed().await?;
            let state = rx.borrow().clone();
            print_search_state(&state);
        }

        Command::Search { query: None } => {
            let search = SearchDispatcher::from_config(backend, &config);
            interactive_search(search).await?;
        }

        Command::Login { username, password } => {
            let session = service.login(&username, &password).await?;
            println!(
                "Logged in as {}. Wallet balance: {}",
                session.username, session.balance
            );
        }

        Command::Register {
            username,
            password,
            confirm_password,
        } => {
            service
                .register(&username, &password, &confirm_password)
                .await?;
            println!("Registered {}. You can now log in.", username);
        }

        Command::Logout => {
            service.logout()?;
            println!("Logged out.");
        }

        Command::Cart => {
            let cart = service.load_cart().await?;
            print_cart(&cart);
        }

        Command::Add {
            product_id,
            quantity,
        } => {
            service.load_cart().await?;
            let outcome = service
                .update_cart(&product_id, quantity, CartUpdateOrigin::AddButton)
                .await?;
            report_cart_update(outcome);
        }

        Command::SetQty {
            product_id,
            quantity,
        } => {
            service.load_cart().await?;
            let outcome = service
                .update_cart(&product_id, quantity, CartUpdateOrigin::QuantityControl)
                .await?;
            report_cart_update(outcome);
        }

        Command::Addresses => {
            print_addresses(service.load_addresses().await?);
        }

        Command::AddAddress { text } => {
            print_addresses(service.add_address(&text).await?);
        }

        Command::DeleteAddress { address_id } => {
            print_addresses(service.delete_address(&address_id).await?);
        }

        Command::Checkout { address } => {
            service.load_addresses().await?;
            if let Some(ref id) = address {
                service.require_address(id)?;
            }

            let cart = service.load_cart().await?;
            match service.checkout(&cart).await? {
                CheckoutOutcome::Placed { address_id, total } => {
                    println!("Order placed! Shipping to {}. Total: {}", address_id, total);
                    if let Some(session) = service.session() {
                        println!("Remaining balance: {}", session.balance);
                    }
                }
                CheckoutOutcome::Rejected(rejection) => {
                    eprintln!("{}", rejection);
                }
            }
        }

        // `config init` returned before the file was read.
        Command::Config { .. } => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Writes a default client.toml, with `--endpoint` applied if given.
fn init_config(path: Option<PathBuf>, endpoint: Option<String>, force: bool) -> ShellResult {
    let target = ClientConfig::resolve_path(path).ok_or("No config path available")?;
    if target.exists() && !force {
        return Err(format!(
            "{} already exists (pass --force to replace it)",
            target.display()
        )
        .into());
    }

    let mut config = ClientConfig::new();
    if let Some(endpoint) = endpoint {
        config.backend.endpoint = endpoint;
    }
    config.validate()?;

    let written = config.save(Some(target))?;
    println!("Wrote {}", written.display());
    Ok(())
}

/// Feeds stdin lines to the dispatcher as successive search-box contents and
/// prints results as they arrive. Returns once input ends and the last
/// scheduled search has answered.
async fn interactive_search(mut search: SearchDispatcher) -> ShellResult {
    let mut rx = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(text) => search.on_input_changed(text.trim_end()),
                    None => {
                        input_open = false;
                        let answered = rx.borrow().seq().unwrap_or(0);
                        if answered == search.last_issued() {
                            break;
                        }
                        debug!(waiting_for = search.last_issued(), "Input closed, waiting for last search");
                    }
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                print_search_state(&state);
                if !input_open && state.seq() == Some(search.last_issued()) {
                    break;
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found");
        return;
    }
    for p in products {
        println!(
            "{:<20} {:<32} {:<12} {:>8}  {}/5",
            p.id, p.name, p.category, p.cost, p.rating
        );
    }
}

fn print_search_state(state: &SearchState) {
    match state {
        SearchState::Idle => {}
        SearchState::Results {
            query, products, ..
        } => {
            println!("Results for \"{}\":", query);
            print_products(products);
        }
        SearchState::Failed { query, message, .. } => {
            eprintln!("Search for \"{}\" failed: {}", query, message);
        }
    }
}

fn print_cart(cart: &Reconciliation) {
    if cart.is_empty() {
        println!("Your cart is empty.");
    }
    for item in &cart.items {
        println!(
            "{:<20} {:<32} {:>4} x {:>8} = {:>8}",
            item.product.id,
            item.product.name,
            item.quantity,
            item.product.cost,
            item.cost()
        );
    }
    if cart.has_orphans() {
        eprintln!(
            "{} item(s) in your cart are no longer in the catalog: {}",
            cart.orphaned_ids.len(),
            cart.orphaned_ids.join(", ")
        );
    }
    println!(
        "Items: {}  Total: {}",
        total_quantity(&cart.items),
        cart.total()
    );
}

fn report_cart_update(outcome: CartUpdateOutcome) {
    match outcome {
        CartUpdateOutcome::Updated(records) => {
            println!("Cart updated. {} product(s) in cart.", records.len());
        }
        CartUpdateOutcome::Rejected(rejected) => {
            eprintln!("{}", rejected.message());
        }
    }
}

fn print_addresses(book: &AddressBook) {
    if book.is_empty() {
        println!("No addresses found for this account. Add one to proceed.");
        return;
    }
    for address in book.entries() {
        let marker = if book.selected_id() == Some(address.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {:<20} {}", marker, address.id, address.text.replace('\n', ", "));
    }
}
