//! Product browsing commands.

use clap::Subcommand;
use fakestore_core::{Product, SortKey};
use fakestore_state::FilterStore;
use rust_decimal::Decimal;

use crate::App;

/// Sub-commands available under `products`.
#[derive(Debug, Subcommand)]
pub enum ProductsCommands {
    /// List products, optionally filtered and sorted
    List {
        /// Case-insensitive text matched against title and description
        #[arg(long)]
        search: Option<String>,
        /// Exact category tag (e.g. "men's clothing")
        #[arg(long)]
        category: Option<String>,
        /// Lowest price to include
        #[arg(long, default_value = "0")]
        min_price: Decimal,
        /// Highest price to include
        #[arg(long, default_value = "1000")]
        max_price: Decimal,
        /// One of price-asc, price-desc, name-asc, name-desc
        #[arg(long, default_value = "price-asc")]
        sort: SortKey,
        /// Print the available categories instead of products
        #[arg(long)]
        categories: bool,
    },
    /// Show a single product
    Show {
        /// Catalog product id
        id: i64,
    },
}

pub(crate) async fn run(app: &App, command: ProductsCommands) -> anyhow::Result<()> {
    let catalog = app.catalog()?;
    match command {
        ProductsCommands::List {
            search,
            category,
            min_price,
            max_price,
            sort,
            categories,
        } => {
            let products = catalog.list_products().await?;
            if categories {
                for category in FilterStore::categories(&products) {
                    println!("{category}");
                }
                return Ok(());
            }

            let mut filter = FilterStore::new();
            filter.set_search_query(search.unwrap_or_default());
            filter.set_category(category.unwrap_or_default());
            filter.set_price_range(min_price, max_price);
            filter.set_sort_by(sort);
            print_table(&filter.filter_products(&products));
        }
        ProductsCommands::Show { id } => {
            let product = catalog.get_product(id).await?;
            println!("{} (#{})", product.title, product.id);
            println!("Price:    {:.2}", product.price);
            println!("Category: {}", product.category);
            println!(
                "Rating:   {} ({} reviews)",
                product.rating.rate, product.rating.count
            );
            if !product.description.is_empty() {
                println!();
                println!("{}", product.description);
            }
        }
    }
    Ok(())
}

fn print_table(products: &[Product]) {
    if products.is_empty() {
        println!("no products match the current filters");
        return;
    }
    println!("{:<6}{:>10}  {:<20}TITLE", "ID", "PRICE", "CATEGORY");
    for product in products {
        println!(
            "{:<6}{:>10.2}  {:<20}{}",
            product.id,
            product.price,
            truncate(&product.category, 18),
            truncate(&product.title, 50)
        );
    }
}

pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_owned()
    }
}
