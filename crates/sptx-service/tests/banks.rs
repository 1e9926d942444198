//! Bank account resolution integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::TestHarness;

async fn mount_resolve(harness: &TestHarness, bank_code: &str) {
    Mock::given(method("GET"))
        .and(path("/bank/resolve"))
        .and(query_param("account_number", "0123456789"))
        .and(query_param("bank_code", bank_code))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "message": "Account number resolved",
            "data": {"account_number": "0123456789", "account_name": "ADA OBI", "bank_id": 9}
        })))
        .mount(&harness.external)
        .await;
}

#[tokio::test]
async fn gtbank_aliases_resolve() {
    let harness = TestHarness::new().await;
    mount_resolve(&harness, "058").await;

    for bank in ["GTBank", "GT Bank", "Guaranty Trust Bank"] {
        let response = harness
            .server
            .get("/verify")
            .add_query_param("accountNumber", "0123456789")
            .add_query_param("bankName", bank)
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["accountName"], "ADA OBI");
        assert_eq!(body["bankCode"], "058");
        assert_eq!(body["bankName"], bank);
    }
}

#[tokio::test]
async fn unknown_bank_is_bad_request() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .get("/verify")
        .add_query_param("accountNumber", "0123456789")
        .add_query_param("bankName", "Bank of Atlantis")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("Bank of Atlantis"));
}

#[tokio::test]
async fn account_number_must_be_ten_digits() {
    let harness = TestHarness::new().await;

    for account in ["12345", "01234567890", "01234x6789"] {
        harness
            .server
            .get("/verify")
            .add_query_param("accountNumber", account)
            .add_query_param("bankName", "Zenith Bank")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    harness
        .server
        .get("/verify")
        .add_query_param("bankName", "Zenith Bank")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn gateway_rejection_is_server_error() {
    let harness = TestHarness::new().await;

    Mock::given(method("GET"))
        .and(path("/bank/resolve"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "status": false,
            "message": "Could not resolve account name. Check parameters or try again."
        })))
        .mount(&harness.external)
        .await;

    let response = harness
        .server
        .get("/verify")
        .add_query_param("accountNumber", "0123456789")
        .add_query_param("bankName", "Access Bank")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.json::<Value>()["message"]
        .as_str()
        .unwrap()
        .contains("Could not resolve account name"));
}
