//! Checkout orchestration.
//!
//! Card, PayPal and bank transfer payments complete locally and empty the
//! cart. Gateway payments are initialized remotely and finish when the
//! shopper comes back through the return redirect, see
//! [`CheckoutService::confirm_return`].

use std::sync::Arc;

use fakestore_core::AppConfig;
use fakestore_state::storage::{load_json, save_json, TX_REF_KEY};
use fakestore_state::{AuthStore, CartStore, StateStorage};
use rust_decimal::Decimal;

use crate::error::{CheckoutError, GatewayError};
use crate::gateway::{Customization, GatewayClient, InitializeRequest};
use crate::tx_ref::new_tx_ref;
use crate::validation::{CardDetails, ContactDetails};

const PAYMENT_DESCRIPTION: &str = "Payment for your order";

#[derive(Debug, Clone)]
pub enum PaymentMethod {
    CreditCard(CardDetails),
    PayPal,
    BankTransfer,
    Gateway(ContactDetails),
}

impl PaymentMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard(_) => "credit_card",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Gateway(_) => "gateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Paid locally; the cart has been emptied.
    Completed { method: &'static str, amount: Decimal },
    /// The shopper must be sent to `checkout_url`. `tx_ref` has been stored
    /// for [`CheckoutService::confirm_return`].
    Redirect { checkout_url: String, tx_ref: String },
}

/// Values copied into every gateway request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub currency: String,
    /// Used as both the callback and the return URL.
    pub return_url: String,
    pub store_title: String,
}

impl CheckoutSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            currency: config.gateway_currency.clone(),
            return_url: config.checkout_return_url.clone(),
            store_title: config.store_title.clone(),
        }
    }
}

#[derive(Debug)]
pub struct CheckoutService {
    gateway: Option<GatewayClient>,
    settings: CheckoutSettings,
    storage: Arc<dyn StateStorage>,
}

impl CheckoutService {
    /// `gateway` may be `None` when no gateway secret is configured; gateway
    /// payments then fail with [`GatewayError::MissingSecretKey`] while the
    /// other methods keep working.
    #[must_use]
    pub fn new(
        gateway: Option<GatewayClient>,
        settings: CheckoutSettings,
        storage: Arc<dyn StateStorage>,
    ) -> Self {
        Self {
            gateway,
            settings,
            storage,
        }
    }

    /// Builds the service from application config.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if a secret key is configured but the
    /// gateway client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        storage: Arc<dyn StateStorage>,
    ) -> Result<Self, GatewayError> {
        let gateway = match GatewayClient::from_config(config) {
            Ok(client) => Some(client),
            Err(GatewayError::MissingSecretKey) => {
                tracing::debug!("no gateway secret key configured, gateway payments disabled");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(
            gateway,
            CheckoutSettings::from_config(config),
            storage,
        ))
    }

    /// Pays for the current cart.
    ///
    /// Preconditions are checked before anything else: a signed-in session,
    /// a non-empty cart, then the form for `method`. No request is sent if
    /// any of them fails.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::LoginRequired`] when signed out.
    /// - [`CheckoutError::EmptyCart`] when there is nothing to pay for.
    /// - [`CheckoutError::Validation`] for an invalid form.
    /// - [`CheckoutError::Gateway`] if the gateway payment cannot be
    ///   initialized.
    /// - [`CheckoutError::Storage`] if local state cannot be written.
    pub async fn begin(
        &self,
        auth: &AuthStore,
        cart: &mut CartStore,
        method: &PaymentMethod,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if !auth.is_authenticated() {
            return Err(CheckoutError::LoginRequired);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = cart.total_price();
        match method {
            PaymentMethod::Gateway(contact) => {
                contact.validate()?;
                self.begin_gateway(contact, amount).await
            }
            PaymentMethod::CreditCard(card) => {
                card.validate()?;
                Self::complete_locally(cart, method, amount)
            }
            PaymentMethod::PayPal | PaymentMethod::BankTransfer => {
                Self::complete_locally(cart, method, amount)
            }
        }
    }

    /// Settles a gateway payment when the shopper returns with `tx_ref`.
    ///
    /// On a match the stored reference is removed and the cart emptied. A
    /// mismatch leaves both untouched.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NoPendingPayment`] if no reference is stored.
    /// - [`CheckoutError::TransactionMismatch`] if `tx_ref` differs from the
    ///   stored one.
    /// - [`CheckoutError::Storage`] if local state cannot be read or written.
    pub fn confirm_return(&self, cart: &mut CartStore, tx_ref: &str) -> Result<(), CheckoutError> {
        let Some(pending) = self.pending_tx_ref()? else {
            return Err(CheckoutError::NoPendingPayment);
        };
        if pending != tx_ref {
            tracing::warn!(%tx_ref, "return redirect does not match pending payment");
            return Err(CheckoutError::TransactionMismatch {
                received: tx_ref.to_owned(),
            });
        }

        self.storage.remove(TX_REF_KEY)?;
        cart.clear_cart()?;
        tracing::info!(%tx_ref, "gateway payment confirmed");
        Ok(())
    }

    /// The reference of the gateway payment awaiting its return redirect.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`](fakestore_state::StateError) if the stored
    /// reference cannot be read.
    pub fn pending_tx_ref(&self) -> Result<Option<String>, CheckoutError> {
        Ok(load_json(self.storage.as_ref(), TX_REF_KEY)?)
    }

    async fn begin_gateway(
        &self,
        contact: &ContactDetails,
        amount: Decimal,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(GatewayError::MissingSecretKey)?;

        let tx_ref = new_tx_ref();
        let request = InitializeRequest {
            amount,
            currency: self.settings.currency.clone(),
            email: contact.email.trim().to_owned(),
            first_name: contact.first_name.trim().to_owned(),
            last_name: contact.last_name.trim().to_owned(),
            tx_ref: tx_ref.clone(),
            callback_url: self.settings.return_url.clone(),
            return_url: self.settings.return_url.clone(),
            customization: Customization {
                title: self.settings.store_title.clone(),
                description: PAYMENT_DESCRIPTION.to_owned(),
            },
        };

        let checkout_url = gateway.initialize(&request).await.inspect_err(|e| {
            tracing::warn!(%tx_ref, error = %e, "gateway checkout failed");
        })?;

        save_json(self.storage.as_ref(), TX_REF_KEY, &tx_ref)?;
        Ok(CheckoutOutcome::Redirect {
            checkout_url,
            tx_ref,
        })
    }

    fn complete_locally(
        cart: &mut CartStore,
        method: &PaymentMethod,
        amount: Decimal,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        cart.clear_cart()?;
        tracing::info!(method = method.as_str(), %amount, "payment completed");
        Ok(CheckoutOutcome::Completed {
            method: method.as_str(),
            amount,
        })
    }
}
