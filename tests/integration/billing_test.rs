//! Billing exercises, the sparse calendar, invoice generation, and the
//! scoped PDF document.

use smsadmin_client::billing::{BillingClient, CreateExercice, month_slots};
use smsadmin_core::error::ErrorKind;

use crate::helpers::{TestApp, calendrier_mois};

fn payload(annee: i32, overwrite: bool) -> CreateExercice {
    CreateExercice {
        annee,
        invoice_day_of_next_month: 5,
        overwrite_if_exists: overwrite,
    }
}

#[tokio::test]
async fn test_duplicate_exercice_conflicts_until_overwritten() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    let client = BillingClient::new(app.transport.clone());

    let exercice = client.create_exercice(&payload(2025, false)).await.unwrap();
    assert_eq!(exercice.annee, 2025);

    let err = client
        .create_exercice(&payload(2025, false))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.message.contains("2025"));

    // Resubmitting with the overwrite flag is an explicit decision.
    client.create_exercice(&payload(2025, true)).await.unwrap();
}

#[tokio::test]
async fn test_invalid_invoice_day_never_reaches_the_gateway() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    let client = BillingClient::new(app.transport.clone());

    let bad = CreateExercice {
        annee: 2025,
        invoice_day_of_next_month: 31,
        overwrite_if_exists: false,
    };
    let err = client.create_exercice(&bad).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(app.gateway.lock().await.exercice_years.is_empty());
}

#[tokio::test]
async fn test_sparse_calendar_keeps_absent_months_empty() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    app.gateway.lock().await.calendrier.push(calendrier_mois(3));

    let client = BillingClient::new(app.transport.clone());
    let entries = client.fetch_calendrier(2025).await.unwrap();
    let slots = month_slots(entries);

    assert!(slots[2].is_some());
    assert_eq!(slots.iter().filter(|s| s.is_some()).count(), 1);
}

#[tokio::test]
async fn test_generation_report_then_fresh_listing() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    let client = BillingClient::new(app.transport.clone());

    assert!(client.list_factures(2025, 3).await.unwrap().is_empty());

    let report = client.generate_invoices(2025, 3).await.unwrap();
    assert_eq!(report.generated, 12);
    assert_eq!(report.skipped_zero, 3);

    let factures = client.list_factures(2025, 3).await.unwrap();
    assert_eq!(factures.len(), 12);
    assert!(factures.iter().all(|f| f.montant > 0.0));
}

#[tokio::test]
async fn test_invoice_pdf_is_scoped_to_its_handle() {
    let app = TestApp::new().await;
    app.sign_in("ADMIN");
    let client = BillingClient::new(app.transport.clone());

    let dir = tempfile::tempdir().unwrap();
    let path;
    {
        let document = client.download_invoice(7, dir.path()).await.unwrap();
        path = document.path().to_path_buf();
        let contents = std::fs::read(&path).unwrap();
        assert!(contents.starts_with(b"%PDF-1.4"));
    }
    // Released with the handle, not with the viewer.
    assert!(!path.exists());
}

#[tokio::test]
async fn test_footer_save_is_last_write_wins() {
    let app = TestApp::new().await;
    app.sign_in("SUPER_ADMIN");
    let client = BillingClient::new(app.transport.clone());

    let mut footer = client.footer().await.unwrap();
    assert_eq!(footer.raison_sociale, "SMS Gateway SA");

    footer.telephone = "+221339999999".to_string();
    client.save_footer(&footer).await.unwrap();

    let reloaded = client.footer().await.unwrap();
    assert_eq!(reloaded.telephone, "+221339999999");
    assert_eq!(reloaded.raison_sociale, "SMS Gateway SA");
}
