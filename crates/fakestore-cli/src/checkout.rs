//! Checkout commands.
//!
//! Failures are printed with the shopper-facing message from
//! [`CheckoutError::user_message`] rather than the full error chain.

use clap::Subcommand;
use fakestore_checkout::{
    CardDetails, CheckoutError, CheckoutOutcome, CheckoutService, ContactDetails, PaymentMethod,
};

use crate::cart::print_cart;
use crate::App;

/// Sub-commands available under `checkout`.
#[derive(Debug, Subcommand)]
pub enum CheckoutCommands {
    /// Pay by credit card
    Card {
        #[arg(long)]
        number: String,
        /// Cardholder name
        #[arg(long)]
        name: String,
        /// MM/YY
        #[arg(long)]
        expiry: String,
        #[arg(long)]
        cvv: String,
    },
    /// Pay through the hosted payment gateway
    Gateway {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    /// Pay with PayPal
    Paypal,
    /// Pay by bank transfer
    Bank,
    /// Confirm a gateway payment from its return redirect
    Confirm {
        /// The `tx_ref` carried by the return redirect
        tx_ref: String,
    },
}

pub(crate) async fn run(app: &App, command: CheckoutCommands) -> anyhow::Result<()> {
    let service = CheckoutService::from_config(&app.config, app.storage.clone())?;
    let mut cart = app.cart()?;

    let method = match command {
        CheckoutCommands::Confirm { tx_ref } => {
            service
                .confirm_return(&mut cart, &tx_ref)
                .map_err(shopper_error)?;
            println!("payment {tx_ref} confirmed, thank you for your purchase");
            return Ok(());
        }
        CheckoutCommands::Card {
            number,
            name,
            expiry,
            cvv,
        } => PaymentMethod::CreditCard(CardDetails {
            number,
            name,
            expiry,
            cvv,
        }),
        CheckoutCommands::Gateway {
            first_name,
            last_name,
            phone,
            email,
        } => PaymentMethod::Gateway(ContactDetails {
            first_name,
            last_name,
            phone,
            email,
        }),
        CheckoutCommands::Paypal => PaymentMethod::PayPal,
        CheckoutCommands::Bank => PaymentMethod::BankTransfer,
    };

    let auth = app.auth()?;
    print_cart(&cart);
    println!();
    match service
        .begin(&auth, &mut cart, &method)
        .await
        .map_err(shopper_error)?
    {
        CheckoutOutcome::Completed { amount, .. } => {
            println!("Payment of {amount:.2} successful! Thank you for your purchase.");
        }
        CheckoutOutcome::Redirect {
            checkout_url,
            tx_ref,
        } => {
            println!("complete your payment at:");
            println!("  {checkout_url}");
            println!("then run `fakestore-cli checkout confirm {tx_ref}`");
        }
    }
    Ok(())
}

fn shopper_error(err: CheckoutError) -> anyhow::Error {
    tracing::debug!(error = ?err, "checkout failed");
    anyhow::anyhow!(err.user_message())
}
