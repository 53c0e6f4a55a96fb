//! Checkout for the storefront: form validation, transaction references, the
//! hosted payment gateway client and the flow that ties them to the cart and
//! session.

pub mod checkout;
pub mod error;
pub mod gateway;
pub mod tx_ref;
pub mod validation;

pub use checkout::{CheckoutOutcome, CheckoutService, CheckoutSettings, PaymentMethod};
pub use error::{CheckoutError, GatewayError};
pub use gateway::{GatewayClient, InitializeRequest};
pub use tx_ref::new_tx_ref;
pub use validation::{CardDetails, ContactDetails, ValidationError};
