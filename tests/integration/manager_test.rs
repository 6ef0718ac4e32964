//! Manager listing backoff, status actions, and roster reconciliation.

use std::sync::Arc;

use tokio::sync::Mutex;

use smsadmin_client::managers::{
    AccountStatus, ManagerClient, ManagerPoller, ManagerRoster, UpdateManager,
};
use smsadmin_core::error::ErrorKind;

use crate::helpers::{TestApp, manager};

#[tokio::test]
async fn test_list_retries_through_transient_failures() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    {
        let mut gateway = app.gateway.lock().await;
        gateway.managers.push(manager(1, "ACTIF"));
        gateway.manager_failures_remaining = 2;
    }

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    let managers = client.list().await.unwrap();

    assert_eq!(managers.len(), 1);
    // Two 500s, then the successful third attempt.
    assert_eq!(app.gateway.lock().await.manager_list_hits, 3);
}

#[tokio::test]
async fn test_list_gives_up_after_max_attempts() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    app.gateway.lock().await.manager_failures_remaining = 5;

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    let err = client.list().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert_eq!(app.gateway.lock().await.manager_list_hits, 3);
}

#[tokio::test]
async fn test_signed_out_list_never_dials() {
    let app = TestApp::new().await;

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    let err = client.list().await.unwrap_err();

    // Authentication is not transient; no attempt reached the gateway.
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(app.gateway.lock().await.manager_list_hits, 0);
}

#[tokio::test]
async fn test_status_action_confirmed_by_reconcile() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    {
        let mut gateway = app.gateway.lock().await;
        gateway.managers.push(manager(1, "ACTIF"));
        gateway.managers.push(manager(2, "ACTIF"));
    }

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    let mut roster = ManagerRoster::new();
    roster.reconcile(client.list().await.unwrap());

    roster.apply_optimistic(1, AccountStatus::Suspendu);
    assert!(roster.has_pending());

    client.suspend(1).await.unwrap();
    roster.reconcile(client.list().await.unwrap());

    assert!(!roster.has_pending());
    let suspended = roster
        .entries()
        .iter()
        .find(|m| m.id_manager == 1)
        .unwrap();
    assert_eq!(suspended.statut_compte, AccountStatus::Suspendu);
}

#[tokio::test]
async fn test_archive_and_unarchive_round_trip() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    app.gateway.lock().await.managers.push(manager(4, "ACTIF"));

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());

    client.archive(4).await.unwrap();
    let listed = client.list().await.unwrap();
    assert_eq!(listed[0].statut_compte, AccountStatus::Archive);

    client.unarchive(4).await.unwrap();
    let listed = client.list().await.unwrap();
    assert_eq!(listed[0].statut_compte, AccountStatus::Actif);
}

#[tokio::test]
async fn test_update_patches_only_the_sent_fields() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    app.gateway.lock().await.managers.push(manager(1, "ACTIF"));

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    client
        .update(
            1,
            &UpdateManager {
                numero_telephone_manager: Some("+221771234567".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = client.list().await.unwrap();
    assert_eq!(listed[0].numero_telephone_manager, "+221771234567");
    // Fields the patch left unset keep their gateway values.
    assert_eq!(listed[0].nom_manager, "Ndiaye");
}

#[tokio::test]
async fn test_poller_refreshes_roster_silently() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    app.gateway.lock().await.managers.push(manager(1, "ACTIF"));

    let client = ManagerClient::new(app.transport.clone(), app.retry.clone());
    let roster = Arc::new(Mutex::new(ManagerRoster::new()));
    let poller = ManagerPoller::new(client, Arc::clone(&roster), 30);

    poller.poll_once().await;
    assert_eq!(roster.lock().await.entries().len(), 1);

    // A failing cycle is swallowed and leaves the roster as it was.
    app.gateway.lock().await.manager_failures_remaining = 1;
    poller.poll_once().await;
    assert_eq!(roster.lock().await.entries().len(), 1);
}
