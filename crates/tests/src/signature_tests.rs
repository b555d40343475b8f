//! Background e-signature requests and stale-result handling.

use crate::common::{date, mediation_request, test_config, test_office, test_office_with, TestOffice};
use office::engine::signature::{SignatureEvent, SignatureProvider, SimulatedSignatureProvider};
use shared_types::{AppError, AppErrorKind, Document, DocumentKind, DocumentStatus, NotificationType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

struct Rejecting;

#[async_trait::async_trait]
impl SignatureProvider for Rejecting {
    async fn sign(&self, _document: &Document) -> Result<Vec<String>, AppError> {
        Err(AppError::bad_request("İmza sertifikası geçersiz"))
    }
}

/// Signs the first request at once and stalls on every later one.
#[derive(Default)]
struct QuickThenStalled {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl SignatureProvider for QuickThenStalled {
    async fn sign(&self, _document: &Document) -> Result<Vec<String>, AppError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(vec!["İlk İmza".to_string()]);
        }
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec!["İkinci İmza".to_string()])
    }
}

struct Crashing;

#[async_trait::async_trait]
impl SignatureProvider for Crashing {
    async fn sign(&self, _document: &Document) -> Result<Vec<String>, AppError> {
        panic!("provider crashed")
    }
}

fn status_of(t: &TestOffice, mediation_id: Uuid, doc_id: Uuid) -> DocumentStatus {
    t.office.mediation(mediation_id).unwrap().document(doc_id).unwrap().status
}

/// Office with one mediation holding a sent fee contract.
fn with_fee_contract(mut t: TestOffice) -> (TestOffice, Uuid, Uuid) {
    let m = t.office.create_mediation(mediation_request("2025/ARB-3")).unwrap();
    let m = t.office.send_document(m.id, DocumentKind::Ucret, "Sözleşme").unwrap();
    let doc_id = m.documents[0].id;
    (t, m.id, doc_id)
}

fn slow_provider() -> Option<Arc<dyn SignatureProvider>> {
    Some(Arc::new(SimulatedSignatureProvider::new(Duration::from_secs(30), "x")))
}

#[tokio::test]
async fn completed_signature_is_applied() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office(date(2025, 10, 1)));

    let m = t.office.request_signature(mediation_id, doc_id).unwrap();
    assert_eq!(m.document(doc_id).unwrap().status, DocumentStatus::AwaitingSignature);
    assert_eq!(t.office.pending_signatures(), 1);

    let event = t.office.next_signature_event().await.unwrap();
    let updated = t.office.apply_signature_event(event).unwrap().unwrap();
    let doc = updated.document(doc_id).unwrap();
    assert_eq!(doc.status, DocumentStatus::Signed);
    assert_eq!(doc.signed_by, vec!["E-İmza".to_string()]);
    assert_eq!(t.office.pending_signatures(), 0);

    assert!(t
        .sink
        .events()
        .iter()
        .any(|e| e.event_type == NotificationType::SignatureCompleted));
}

#[tokio::test]
async fn provider_failure_restores_sent_status() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office_with(
        date(2025, 10, 1),
        test_config(),
        Some(Arc::new(Rejecting)),
    ));

    t.office.request_signature(mediation_id, doc_id).unwrap();
    let event = t.office.next_signature_event().await.unwrap();
    let updated = t.office.apply_signature_event(event).unwrap().unwrap();
    let doc = updated.document(doc_id).unwrap();
    assert_eq!(doc.status, DocumentStatus::Sent);
    assert_eq!(doc.pre_signature_status, None);
    assert!(updated.fee_contract_sent);

    let failed: Vec<_> = t
        .sink
        .events()
        .into_iter()
        .filter(|e| e.event_type == NotificationType::SignatureFailed)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].message, "İmza sertifikası geçersiz");
}

#[tokio::test]
async fn drain_applies_arrived_results() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office(date(2025, 10, 1)));
    t.office.request_signature(mediation_id, doc_id).unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let updated = t.office.drain_signature_events().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(
        t.office.mediation(mediation_id).unwrap().document(doc_id).unwrap().status,
        DocumentStatus::Signed
    );
}

#[tokio::test]
async fn closing_the_file_cancels_in_flight_requests() {
    let (mut t, mediation_id, doc_id) =
        with_fee_contract(test_office_with(date(2025, 10, 1), test_config(), slow_provider()));

    t.office.request_signature(mediation_id, doc_id).unwrap();
    assert_eq!(t.office.close_mediation(mediation_id).unwrap(), 1);
    assert_eq!(t.office.pending_signatures(), 0);
    assert_eq!(status_of(&t, mediation_id, doc_id), DocumentStatus::Sent);
    assert!(t.office.next_signature_event().await.is_none());
    assert_eq!(t.office.close_mediation(mediation_id).unwrap(), 0);
}

#[tokio::test]
async fn late_result_for_a_moved_on_document_is_discarded() {
    let (mut t, mediation_id, doc_id) =
        with_fee_contract(test_office_with(date(2025, 10, 1), test_config(), slow_provider()));
    t.office.request_signature(mediation_id, doc_id).unwrap();
    t.office.close_mediation(mediation_id).unwrap();
    let before = t.office.mediation(mediation_id).unwrap().clone();

    let late = SignatureEvent::Completed {
        request_id: Uuid::new_v4(),
        mediation_id,
        document_id: doc_id,
        signed_by: vec!["Ayşe Kaya".to_string()],
    };
    assert!(t.office.apply_signature_event(late).unwrap().is_none());
    assert_eq!(t.office.mediation(mediation_id).unwrap(), &before);
}

#[tokio::test]
async fn result_for_deleted_file_is_discarded() {
    let (mut t, mediation_id, doc_id) =
        with_fee_contract(test_office_with(date(2025, 10, 1), test_config(), slow_provider()));
    t.office.request_signature(mediation_id, doc_id).unwrap();
    t.office.delete_mediation(mediation_id).unwrap();
    assert_eq!(t.office.pending_signatures(), 0);

    let late = SignatureEvent::Failed {
        request_id: Uuid::new_v4(),
        mediation_id,
        document_id: doc_id,
        reason: "timeout".to_string(),
    };
    assert!(t.office.apply_signature_event(late).unwrap().is_none());
}

#[tokio::test]
async fn signed_document_cannot_be_requested_again() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office(date(2025, 10, 1)));
    t.office.request_signature(mediation_id, doc_id).unwrap();
    let event = t.office.next_signature_event().await.unwrap();
    t.office.apply_signature_event(event).unwrap();

    let err = t.office.request_signature(mediation_id, doc_id).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Conflict);
}

#[tokio::test]
async fn disabled_feature_rejects_requests() {
    let mut config = test_config();
    config.features.e_signature = false;
    let (mut t, mediation_id, doc_id) =
        with_fee_contract(test_office_with(date(2025, 10, 1), config, None));

    let err = t.office.request_signature(mediation_id, doc_id).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::BadRequest);
    assert_eq!(
        t.office.mediation(mediation_id).unwrap().document(doc_id).unwrap().status,
        DocumentStatus::Sent
    );
}

#[test]
fn request_outside_a_runtime_changes_nothing() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office(date(2025, 10, 1)));
    let err = t.office.request_signature(mediation_id, doc_id).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::InternalError);
    assert_eq!(
        t.office.mediation(mediation_id).unwrap().document(doc_id).unwrap().status,
        DocumentStatus::Sent
    );
}

#[tokio::test]
async fn result_of_a_cancelled_request_does_not_touch_the_new_one() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office_with(
        date(2025, 10, 1),
        test_config(),
        Some(Arc::new(QuickThenStalled::default())),
    ));

    t.office.request_signature(mediation_id, doc_id).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(t.office.close_mediation(mediation_id).unwrap(), 1);
    t.office.request_signature(mediation_id, doc_id).unwrap();

    let applied = t.office.drain_signature_events().unwrap();
    assert!(applied.is_empty());
    assert_eq!(t.office.pending_signatures(), 1);
    let doc = t.office.mediation(mediation_id).unwrap().document(doc_id).unwrap();
    assert_eq!(doc.status, DocumentStatus::AwaitingSignature);
    assert!(doc.signed_by.is_empty());
}

#[tokio::test]
async fn waiting_again_before_applying_does_not_block() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office(date(2025, 10, 1)));
    t.office.request_signature(mediation_id, doc_id).unwrap();

    let event = t.office.next_signature_event().await.unwrap();
    let second = tokio::time::timeout(Duration::from_secs(2), t.office.next_signature_event())
        .await
        .expect("second wait returned");
    assert!(second.is_none());

    t.office.apply_signature_event(event).unwrap().unwrap();
    assert_eq!(status_of(&t, mediation_id, doc_id), DocumentStatus::Signed);
}

#[tokio::test]
async fn crashed_provider_is_reported_as_failure() {
    let (mut t, mediation_id, doc_id) = with_fee_contract(test_office_with(
        date(2025, 10, 1),
        test_config(),
        Some(Arc::new(Crashing)),
    ));
    t.office.request_signature(mediation_id, doc_id).unwrap();

    let event = tokio::time::timeout(Duration::from_secs(2), t.office.next_signature_event())
        .await
        .expect("wait returned")
        .unwrap();
    assert!(matches!(event, SignatureEvent::Failed { .. }));
    t.office.apply_signature_event(event).unwrap().unwrap();
    assert_eq!(status_of(&t, mediation_id, doc_id), DocumentStatus::Sent);
    assert_eq!(t.office.pending_signatures(), 0);
}
