//! Integration tests for `GatewayClient` using wiremock HTTP mocks.

use std::time::Duration;

use fakestore_checkout::gateway::Customization;
use fakestore_checkout::{GatewayClient, GatewayError, InitializeRequest};
use fakestore_core::RetryPolicy;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> GatewayClient {
    GatewayClient::with_base_url(base_url, "CHASECK_TEST-secret", 5, "fakestore-test/0.1")
        .expect("client construction should not fail")
        .with_retry(RetryPolicy::fixed(3, Duration::ZERO))
}

fn request() -> InitializeRequest {
    InitializeRequest {
        amount: Decimal::new(4250, 2),
        currency: "ETB".to_owned(),
        email: "abebe@example.com".to_owned(),
        first_name: "Abebe".to_owned(),
        last_name: "Bikila".to_owned(),
        tx_ref: "tx-1700000000000-abcdefghijklm".to_owned(),
        callback_url: "http://localhost:3000/payment/success".to_owned(),
        return_url: "http://localhost:3000/payment/success".to_owned(),
        customization: Customization {
            title: "E-Commerce Store".to_owned(),
            description: "Payment for your order".to_owned(),
        },
    }
}

#[tokio::test]
async fn initialize_returns_checkout_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .and(header("authorization", "Bearer CHASECK_TEST-secret"))
        .and(body_partial_json(json!({
            "amount": "42.50",
            "currency": "ETB",
            "tx_ref": "tx-1700000000000-abcdefghijklm",
            "customization": { "title": "E-Commerce Store" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Hosted Link",
            "status": "success",
            "data": { "checkout_url": "https://checkout.chapa.co/checkout/payment/abc" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = test_client(&server.uri())
        .initialize(&request())
        .await
        .expect("initialize should succeed");

    assert_eq!(url, "https://checkout.chapa.co/checkout/payment/abc");
}

#[tokio::test]
async fn always_failing_endpoint_is_tried_four_times() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(500))
        .expect(4)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .initialize(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Rejected { status: 500, .. }));
    assert_eq!(err.to_string(), "HTTP error! status: 500");
}

#[tokio::test]
async fn recovers_when_a_later_attempt_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "checkout_url": "https://checkout.example/pay" }
        })))
        .mount(&server)
        .await;

    let url = test_client(&server.uri())
        .initialize(&request())
        .await
        .unwrap();

    assert_eq!(url, "https://checkout.example/pay");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn rejection_message_comes_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid API Key" })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .initialize(&request())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid API Key");
}

#[tokio::test]
async fn success_without_checkout_url_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transaction/initialize"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "failed", "data": null })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .initialize(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::NoCheckoutUrl));
    assert_eq!(err.to_string(), "Failed to get checkout URL");
}

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    // Nothing listens on port 1.
    let err = test_client("http://127.0.0.1:1")
        .initialize(&request())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Http(_)), "got: {err:?}");
}
