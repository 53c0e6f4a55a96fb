//! Cart commands. The cart lives in the local state directory.

use clap::Subcommand;
use fakestore_core::CartPersistence;
use fakestore_state::CartStore;

use crate::products::truncate;
use crate::App;

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a catalog product
    Add {
        /// Catalog product id
        product_id: i64,
    },
    /// Remove a product from the cart
    Remove { product_id: i64 },
    /// Set the quantity of a product already in the cart
    Update {
        product_id: i64,
        /// New quantity; 0 is ignored, use `cart remove` instead
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

pub(crate) async fn run(app: &App, command: CartCommands) -> anyhow::Result<()> {
    let mut cart = app.cart()?;
    if cart.persistence() == CartPersistence::Session {
        eprintln!("note: session cart, changes are dropped when this command exits");
    }
    match command {
        CartCommands::Show => {}
        CartCommands::Add { product_id } => {
            let product = app.catalog()?.get_product(product_id).await?;
            cart.add_to_cart(&product)?;
            println!("added {} to cart", product.title);
        }
        CartCommands::Remove { product_id } => cart.remove_from_cart(product_id)?,
        CartCommands::Update {
            product_id,
            quantity,
        } => {
            if quantity == 0 {
                eprintln!("quantity must be at least 1; use `cart remove {product_id}` to drop it");
            }
            if cart.item(product_id).is_none() {
                eprintln!("product {product_id} is not in the cart");
            }
            cart.update_quantity(product_id, quantity)?;
        }
        CartCommands::Clear => cart.clear_cart()?,
    }
    print_cart(&cart);
    Ok(())
}

pub(crate) fn print_cart(cart: &CartStore) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }
    println!("{:<6}{:>5}{:>12}{:>12}  TITLE", "ID", "QTY", "PRICE", "LINE");
    for item in cart.items() {
        println!(
            "{:<6}{:>5}{:>12.2}{:>12.2}  {}",
            item.product.id,
            item.quantity,
            item.product.price,
            item.line_total(),
            truncate(&item.product.title, 40)
        );
    }
    println!();
    println!("items: {}", cart.total_items());
    println!("total: {:.2}", cart.total_price());
}
