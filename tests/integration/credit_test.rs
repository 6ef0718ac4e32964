//! Credit-request workflow: maker/checker transitions, client-side
//! guards, and idempotent conflict handling.

use smsadmin_client::credits::{ApprovalOutcome, CreditClient, CreditStatus};
use smsadmin_core::error::ErrorKind;
use smsadmin_core::types::PageQuery;

use crate::helpers::{TestApp, credit};

#[tokio::test]
async fn test_approve_then_reload_shows_checker() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.credits.push(credit(11, "PENDING"));

    let client = CreditClient::new(app.transport.clone());
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let request = page.content.into_iter().find(|r| r.id == 11).unwrap();

    let outcome = client.approve(&request).await.unwrap();
    assert_eq!(outcome, ApprovalOutcome::Applied);

    // Server-assigned fields appear on the next listing, never locally.
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let reloaded = page.content.into_iter().find(|r| r.id == 11).unwrap();
    assert_eq!(reloaded.status, CreditStatus::Approved);
    assert_eq!(reloaded.checker_email.as_deref(), Some("checker@gateway.sn"));
    assert!(reloaded.validated_at.is_some());

    assert_eq!(app.gateway.lock().await.approve_hits, 1);
}

#[tokio::test]
async fn test_approve_resolved_request_sends_nothing() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.credits.push(credit(12, "APPROVED"));

    let client = CreditClient::new(app.transport.clone());
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let request = page.content.into_iter().find(|r| r.id == 12).unwrap();

    let outcome = client.approve(&request).await.unwrap();
    assert_eq!(outcome, ApprovalOutcome::AlreadyResolved);
    assert_eq!(app.gateway.lock().await.approve_hits, 0);
}

#[tokio::test]
async fn test_lost_race_conflict_is_an_idempotent_no_op() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.credits.push(credit(13, "PENDING"));

    let client = CreditClient::new(app.transport.clone());
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let request = page.content.into_iter().find(|r| r.id == 13).unwrap();

    // A concurrent admin resolves it behind this client's back.
    app.gateway.lock().await.credits[0]["status"] = serde_json::json!("REJECTED");

    let outcome = client.approve(&request).await.unwrap();
    assert_eq!(outcome, ApprovalOutcome::AlreadyResolved);
    // The call went out and came back 409; it was not swallowed locally.
    assert_eq!(app.gateway.lock().await.approve_hits, 1);
}

#[tokio::test]
async fn test_reject_blank_reason_sends_nothing() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.credits.push(credit(14, "PENDING"));

    let client = CreditClient::new(app.transport.clone());
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let request = page.content.into_iter().find(|r| r.id == 14).unwrap();

    let err = client.reject(&request, "   ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.gateway.lock().await.reject_hits, 0);
}

#[tokio::test]
async fn test_reject_carries_trimmed_reason() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.credits.push(credit(15, "PENDING"));

    let client = CreditClient::new(app.transport.clone());
    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let request = page.content.into_iter().find(|r| r.id == 15).unwrap();

    let outcome = client.reject(&request, "  price too high  ").await.unwrap();
    assert_eq!(outcome, ApprovalOutcome::Applied);

    let gateway = app.gateway.lock().await;
    assert_eq!(gateway.reject_hits, 1);
    assert_eq!(gateway.last_reject_reason.as_deref(), Some("price too high"));
    drop(gateway);

    let page = client.list(PageQuery::new(0, 10), None).await.unwrap();
    let reloaded = page.content.into_iter().find(|r| r.id == 15).unwrap();
    assert_eq!(reloaded.status, CreditStatus::Rejected);
    assert_eq!(reloaded.reject_reason.as_deref(), Some("price too high"));
}

#[tokio::test]
async fn test_list_narrowed_by_status() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    {
        let mut gateway = app.gateway.lock().await;
        gateway.credits.push(credit(21, "PENDING"));
        gateway.credits.push(credit(22, "APPROVED"));
        gateway.credits.push(credit(23, "PENDING"));
    }

    let client = CreditClient::new(app.transport.clone());
    let page = client
        .list(PageQuery::new(0, 10), Some(CreditStatus::Pending))
        .await
        .unwrap();

    assert_eq!(page.content.len(), 2);
    assert!(page.content.iter().all(|r| r.status == CreditStatus::Pending));
}
