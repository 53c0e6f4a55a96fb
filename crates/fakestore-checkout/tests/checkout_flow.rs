//! End-to-end checkout tests against a mocked gateway.

use std::sync::Arc;
use std::time::Duration;

use fakestore_checkout::{
    CardDetails, CheckoutError, CheckoutOutcome, CheckoutService, CheckoutSettings,
    ContactDetails, GatewayClient, GatewayError, PaymentMethod, ValidationError,
};
use fakestore_core::{CartPersistence, Product, Rating, RetryPolicy};
use fakestore_state::storage::TX_REF_KEY;
use fakestore_state::{AuthStore, CartStore, MemoryStorage, StateStorage};
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    storage: Arc<MemoryStorage>,
    auth: AuthStore,
    cart: CartStore,
}

fn product(id: i64, price: Decimal) -> Product {
    Product {
        id,
        title: format!("Product {id}"),
        price,
        description: String::new(),
        category: "electronics".to_owned(),
        image: String::new(),
        rating: Rating::default(),
    }
}

fn fixture(signed_in: bool) -> Fixture {
    let storage = Arc::new(MemoryStorage::new());
    if signed_in {
        storage
            .write(
                "auth-storage",
                &json!({
                    "session": {
                        "user": { "id": 1, "username": "johnd", "email": "john@gmail.com" },
                        "token": "jwt",
                        "authenticated_at": "2026-01-01T00:00:00Z"
                    }
                })
                .to_string(),
            )
            .unwrap();
    }
    let auth = AuthStore::open(storage.clone()).unwrap();
    let mut cart = CartStore::open(storage.clone(), CartPersistence::Durable).unwrap();
    cart.add_to_cart(&product(1, Decimal::new(1999, 2))).unwrap();
    cart.add_to_cart(&product(1, Decimal::new(1999, 2))).unwrap();
    cart.add_to_cart(&product(2, Decimal::new(252, 2))).unwrap();
    Fixture {
        storage,
        auth,
        cart,
    }
}

fn settings() -> CheckoutSettings {
    CheckoutSettings {
        currency: "ETB".to_owned(),
        return_url: "http://localhost:3000/payment/success".to_owned(),
        store_title: "E-Commerce Store".to_owned(),
    }
}

fn service(gateway_url: Option<&str>, storage: Arc<MemoryStorage>) -> CheckoutService {
    let gateway = gateway_url.map(|url| {
        GatewayClient::with_base_url(url, "sk-test", 5, "fakestore-test/0.1")
            .unwrap()
            .with_retry(RetryPolicy::fixed(3, Duration::ZERO))
    });
    CheckoutService::new(gateway, settings(), storage)
}

fn contact() -> ContactDetails {
    ContactDetails {
        first_name: "Abebe".to_owned(),
        last_name: "Bikila".to_owned(),
        phone: "+251 912 345 678".to_owned(),
        email: "abebe@example.com".to_owned(),
    }
}

fn card() -> CardDetails {
    CardDetails {
        number: "4242424242424242".to_owned(),
        name: "Abebe Bikila".to_owned(),
        expiry: "09/28".to_owned(),
        cvv: "321".to_owned(),
    }
}

#[tokio::test]
async fn signed_out_checkout_is_refused() {
    let mut f = fixture(false);
    let svc = service(None, f.storage.clone());

    let err = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::PayPal)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::LoginRequired));
    assert!(!f.cart.is_empty());
}

#[tokio::test]
async fn empty_cart_is_refused() {
    let mut f = fixture(true);
    f.cart.clear_cart().unwrap();
    let svc = service(None, f.storage.clone());

    let err = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::BankTransfer)
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn local_payment_clears_cart() {
    let mut f = fixture(true);
    let svc = service(None, f.storage.clone());

    let outcome = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::CreditCard(card()))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CheckoutOutcome::Completed {
            method: "credit_card",
            amount: Decimal::new(4250, 2),
        }
    );
    assert!(f.cart.is_empty());
}

#[tokio::test]
async fn invalid_card_blocks_payment() {
    let mut f = fixture(true);
    let svc = service(None, f.storage.clone());
    let payment = PaymentMethod::CreditCard(CardDetails {
        expiry: "9/28".to_owned(),
        ..card()
    });

    let err = svc.begin(&f.auth, &mut f.cart, &payment).await.unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Validation(ValidationError::InvalidExpiry)
    ));
    assert_eq!(err.user_message(), "Please enter a valid expiry date (MM/YY)");
    assert_eq!(f.cart.total_items(), 3);
}

#[tokio::test]
async fn invalid_contact_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut f = fixture(true);
    let svc = service(Some(&server.uri()), f.storage.clone());
    let payment = PaymentMethod::Gateway(ContactDetails {
        email: "abebe@example".to_owned(),
        ..contact()
    });

    let err = svc.begin(&f.auth, &mut f.cart, &payment).await.unwrap_err();

    assert_eq!(err.user_message(), "Please enter a valid email address");
}

#[tokio::test]
async fn gateway_checkout_stores_tx_ref_and_keeps_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(body_partial_json(json!({
            "amount": "42.50",
            "currency": "ETB",
            "email": "abebe@example.com",
            "first_name": "Abebe",
            "last_name": "Bikila",
            "callback_url": "http://localhost:3000/payment/success",
            "return_url": "http://localhost:3000/payment/success",
            "customization": {
                "title": "E-Commerce Store",
                "description": "Payment for your order"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "checkout_url": "https://checkout.example/pay/1" }
        })))
        .mount(&server)
        .await;

    let mut f = fixture(true);
    let svc = service(Some(&server.uri()), f.storage.clone());

    let outcome = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::Gateway(contact()))
        .await
        .unwrap();

    let CheckoutOutcome::Redirect {
        checkout_url,
        tx_ref,
    } = outcome
    else {
        panic!("expected a redirect outcome");
    };
    assert_eq!(checkout_url, "https://checkout.example/pay/1");
    assert!(tx_ref.starts_with("tx-"));
    assert_eq!(svc.pending_tx_ref().unwrap().as_deref(), Some(tx_ref.as_str()));
    assert!(!f.cart.is_empty(), "cart is only cleared on return");

    svc.confirm_return(&mut f.cart, &tx_ref).unwrap();

    assert!(f.cart.is_empty());
    assert_eq!(f.storage.read(TX_REF_KEY).unwrap(), None);
}

#[tokio::test]
async fn mismatched_return_keeps_pending_payment() {
    let mut f = fixture(true);
    f.storage
        .write(TX_REF_KEY, "\"tx-1-aaaaaaaaaaaaa\"")
        .unwrap();
    let svc = service(None, f.storage.clone());

    let err = svc
        .confirm_return(&mut f.cart, "tx-1-bbbbbbbbbbbbb")
        .unwrap_err();

    assert!(matches!(err, CheckoutError::TransactionMismatch { .. }));
    assert_eq!(
        svc.pending_tx_ref().unwrap().as_deref(),
        Some("tx-1-aaaaaaaaaaaaa")
    );
    assert!(!f.cart.is_empty());
}

#[tokio::test]
async fn return_without_pending_payment_is_an_error() {
    let mut f = fixture(true);
    let svc = service(None, f.storage.clone());
    let err = svc.confirm_return(&mut f.cart, "tx-1-x").unwrap_err();
    assert!(matches!(err, CheckoutError::NoPendingPayment));
}

#[tokio::test]
async fn failed_gateway_stores_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(502))
        .expect(4)
        .mount(&server)
        .await;

    let mut f = fixture(true);
    let svc = service(Some(&server.uri()), f.storage.clone());

    let err = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::Gateway(contact()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Gateway(GatewayError::Rejected { status: 502, .. })
    ));
    assert_eq!(svc.pending_tx_ref().unwrap(), None);
    assert!(!f.cart.is_empty());
}

#[tokio::test]
async fn unreachable_gateway_shows_network_message() {
    let mut f = fixture(true);
    let svc = service(Some("http://127.0.0.1:1"), f.storage.clone());

    let err = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::Gateway(contact()))
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(),
        "Network error: Please check your internet connection and try again."
    );
}

#[tokio::test]
async fn gateway_without_secret_is_unavailable() {
    let mut f = fixture(true);
    let svc = service(None, f.storage.clone());

    let err = svc
        .begin(&f.auth, &mut f.cart, &PaymentMethod::Gateway(contact()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Gateway(GatewayError::MissingSecretKey)
    ));
}
