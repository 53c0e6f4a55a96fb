mod auth;
mod cart;
mod checkout;
mod products;
mod users;

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use fakestore_catalog::CatalogClient;
use fakestore_core::AppConfig;
use fakestore_state::{AuthStore, CartStore, FileStorage, StateStorage};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthCommands;
use crate::cart::CartCommands;
use crate::checkout::CheckoutCommands;
use crate::products::ProductsCommands;
use crate::users::UsersCommands;

#[derive(Debug, Parser)]
#[command(name = "fakestore-cli")]
#[command(about = "Storefront client for the demo product catalog")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse, search and filter the product catalog
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Inspect and change the shopping cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Sign in and out of the catalog
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Administer catalog user accounts
    Users {
        #[command(subcommand)]
        command: UsersCommands,
    },
    /// Pay for the contents of the cart
    Checkout {
        #[command(subcommand)]
        command: CheckoutCommands,
    },
}

/// Shared handles for command handlers: configuration plus the local state
/// directory every store persists to.
pub(crate) struct App {
    pub(crate) config: AppConfig,
    pub(crate) storage: Arc<dyn StateStorage>,
}

impl App {
    fn new(config: AppConfig) -> anyhow::Result<Self> {
        let storage = FileStorage::open(&config.state_dir)?;
        tracing::debug!(state_dir = %storage.dir().display(), "state directory ready");
        Ok(Self {
            config,
            storage: Arc::new(storage),
        })
    }

    pub(crate) fn catalog(&self) -> anyhow::Result<CatalogClient> {
        Ok(CatalogClient::from_config(&self.config)?)
    }

    pub(crate) fn cart(&self) -> anyhow::Result<CartStore> {
        Ok(CartStore::open(
            Arc::clone(&self.storage),
            self.config.cart_persistence,
        )?)
    }

    pub(crate) fn auth(&self) -> anyhow::Result<AuthStore> {
        Ok(AuthStore::open(Arc::clone(&self.storage))?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = fakestore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let app = App::new(config)?;
    match command {
        Commands::Products { command } => products::run(&app, command).await,
        Commands::Cart { command } => cart::run(&app, command).await,
        Commands::Auth { command } => auth::run(&app, command).await,
        Commands::Users { command } => users::run(&app, command).await,
        Commands::Checkout { command } => checkout::run(&app, command).await,
    }
}
