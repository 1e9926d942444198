//! Ticket issuance integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{is_ticket_id, TestHarness, TICKET_TEMPLATE_ID};
use sptx_core::{ReferenceStatus, Referral, TicketLocation};
use sptx_store::Store;

async fn mount_side_calls(harness: &TestHarness, status: u16) {
    for route in ["/api/inventory/sale", "/api/analytics/ticket-sale"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&harness.external)
            .await;
    }
    let mail = if status < 300 {
        ResponseTemplate::new(201).set_body_json(json!({"messageId": "<m@relay>"}))
    } else {
        ResponseTemplate::new(status).set_body_json(json!({"message": "relay down"}))
    };
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .respond_with(mail)
        .mount(&harness.external)
        .await;
}

#[tokio::test]
async fn paid_ticket_is_issued() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-PAID1", ReferenceStatus::Successful);
    mount_side_calls(&harness, 200).await;

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-PAID1"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(is_ticket_id(&body["ticketId"]), "{}", body["ticketId"]);
    assert_eq!(body["totalAmount"], 1_050_000);
    assert_eq!(body["attendeeName"], "Ada Obi");
    assert_eq!(body["paymentMethod"], "paystack");
    assert_eq!(body["alreadyIssued"], false);
    assert_eq!(body["sideEffects"]["inventory"], "completed");
    assert_eq!(body["sideEffects"]["email"], "completed");

    let record = harness.reference("SPTX-REF-PAID1");
    assert!(record.ticket_generated);
    assert_eq!(
        record.ticket_id.map(|id| id.to_string()).as_deref(),
        body["ticketId"].as_str()
    );
}

#[tokio::test]
async fn issuing_twice_reuses_the_ticket() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-TWICE", ReferenceStatus::Successful);
    mount_side_calls(&harness, 200).await;

    let first: Value = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-TWICE"}))
        .await
        .json();
    let second: Value = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-TWICE"}))
        .await
        .json();

    assert_eq!(first["ticketId"], second["ticketId"]);
    assert_eq!(first["createdAt"], second["createdAt"]);
    assert_eq!(second["alreadyIssued"], true);

    for (location, owner) in [
        (TicketLocation::UserHistory, "user-ada"),
        (TicketLocation::EventAttendees, "event-jazz"),
        (TicketLocation::AdminLedger, "event-jazz"),
    ] {
        assert_eq!(harness.store.list_tickets(location, owner).unwrap().len(), 1);
    }
}

#[tokio::test]
async fn pending_payment_is_reported() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-WAIT", ReferenceStatus::Pending);

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-WAIT"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "PaymentPending");
    assert_eq!(body["attempts"], 3);
    assert!(harness.reference("SPTX-REF-WAIT").ticket_id.is_none());
}

#[tokio::test]
async fn failed_payment_issues_nothing() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-FAIL", ReferenceStatus::Failed);

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-FAIL"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "PaymentRejected");
    assert_eq!(body["reference"], "SPTX-REF-FAIL");

    assert!(harness.reference("SPTX-REF-FAIL").ticket_id.is_none());
    assert!(harness
        .store
        .list_tickets(TicketLocation::UserHistory, "user-ada")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn malformed_references_are_rejected() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "PAY-123"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid reference format"));

    let response = harness.server.post("/ticket/iwss").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness
        .server
        .post("/ticket/free")
        .json(&json!({"reference": "SPTX-REF-123"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_reference_and_user_are_not_found() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-GHOST"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    harness.seed_paid_reference("SPTX-REF-NOUSER", ReferenceStatus::Successful);
    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-NOUSER"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(harness
        .store
        .list_tickets(TicketLocation::EventAttendees, "event-jazz")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn side_call_failures_do_not_change_the_response() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-FLAKY", ReferenceStatus::Successful);
    mount_side_calls(&harness, 500).await;

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-FLAKY"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(is_ticket_id(&body["ticketId"]));
    assert_eq!(body["sideEffects"]["inventory"], "failed");
    assert_eq!(body["sideEffects"]["analytics"], "failed");
    assert_eq!(body["sideEffects"]["email"], "failed");
    assert!(harness.reference("SPTX-REF-FLAKY").ticket_generated);
}

#[tokio::test]
async fn confirmation_email_uses_ticket_template() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_paid_reference("SPTX-REF-MAIL", ReferenceStatus::Successful);

    // Mounted first so it answers ahead of the catch-all mail mock.
    Mock::given(method("POST"))
        .and(path("/v3/smtp/email"))
        .and(header("api-key", "mail-key"))
        .and(body_partial_json(json!({
            "templateId": TICKET_TEMPLATE_ID,
            "to": [{"email": "ada@example.com"}],
            "params": {"eventName": "Lagos Jazz Night", "amountPaid": "\u{20a6}10,500.00"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"messageId": "<t@relay>"})))
        .expect(1)
        .mount(&harness.external)
        .await;
    mount_side_calls(&harness, 200).await;

    harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": "SPTX-REF-MAIL"}))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn referral_usage_is_recorded_once() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness
        .store
        .put_referral(&Referral::new("AMAKA10", "user-amaka"))
        .unwrap();

    let mut record = sptx_core::ReferenceRecord::pending(
        "SPTX-REF-REFER".parse().unwrap(),
        sptx_core::TicketSnapshot {
            referral_code: Some("AMAKA10".into()),
            ..common::snapshot()
        },
    );
    record.status = ReferenceStatus::Successful;
    harness.store.put_reference(&record).unwrap();

    for _ in 0..2 {
        let body: Value = harness
            .server
            .post("/ticket/iwss")
            .json(&json!({"reference": "SPTX-REF-REFER"}))
            .await
            .json();
        assert_eq!(body["sideEffects"]["referral"], "completed");
    }

    let referral = harness.store.get_referral("AMAKA10").unwrap().unwrap();
    assert_eq!(referral.usage_count, 1);
    assert_eq!(referral.usages[0].user_id, "user-ada");
}

#[tokio::test]
async fn free_ticket_is_issued_at_zero_cost() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    harness.seed_free_reference("SPTX-FREE-123");
    mount_side_calls(&harness, 200).await;

    let response = harness
        .server
        .post("/ticket/free")
        .json(&json!({"reference": "SPTX-FREE-123"}))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["ticketPrice"], 0);
    assert_eq!(body["serviceFee"], 0);
    assert_eq!(body["totalAmount"], 0);
    assert_eq!(body["paymentMethod"], "free");
    assert!(is_ticket_id(&body["ticketId"]));
}

#[tokio::test]
async fn free_path_rejects_paid_references() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");

    let mut record = sptx_core::ReferenceRecord::free(
        "SPTX-FREE-NOTFREE".parse().unwrap(),
        common::snapshot(),
    );
    record.vendor = Some("paystack".into());
    harness.store.put_reference(&record).unwrap();

    let response = harness
        .server
        .post("/ticket/free")
        .json(&json!({"reference": "SPTX-FREE-NOTFREE"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "BadRequest");
}

#[tokio::test]
async fn reserve_then_issue_free_ticket() {
    let harness = TestHarness::new().await;
    harness.seed_user("user-ada", "Ada Obi", "ada@example.com");
    mount_side_calls(&harness, 200).await;

    let response = harness
        .server
        .post("/ticket/free/reserve")
        .json(&json!({
            "userId": "user-ada",
            "eventId": "event-open",
            "eventName": "Open Mic",
            "ticketType": "General",
            "ticketPrice": 5000
        }))
        .await;

    response.assert_status_ok();
    let reserved: Value = response.json();
    assert_eq!(reserved["status"], "settled");
    let reference = reserved["reference"].as_str().unwrap().to_string();
    assert!(reference.starts_with("SPTX-FREE-"));

    let issued: Value = harness
        .server
        .post("/ticket/free")
        .json(&json!({"reference": reference}))
        .await
        .json();
    assert_eq!(issued["eventId"], "event-open");
    assert_eq!(issued["ticketPrice"], 0);
}

#[tokio::test]
async fn reserve_requires_user_and_event() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/ticket/free/reserve")
        .json(&json!({"eventId": "event-open"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = harness
        .server
        .post("/ticket/free/reserve")
        .json(&json!({"userId": " ", "eventId": "event-open"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/ticket/iwss")
        .json(&json!({"reference": 123}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "BadRequest");
    assert!(body["message"].as_str().unwrap().contains("reference"));

    let response = harness.server.post("/ticket/free").text("not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "BadRequest");

    let response = harness
        .server
        .post("/ticket/free/reserve")
        .bytes("{\"userId\":".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "BadRequest");
}
