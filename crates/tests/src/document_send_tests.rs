//! Invitation and fee-contract sends through the office service.

use crate::common::{date, mediation_request, test_office};
use shared_types::{AppErrorKind, DocumentKind, DocumentStatus, MediationOutcome, NotificationType};

#[test]
fn invitation_twice_keeps_flag_and_grows_history() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-2")).unwrap();

    let m1 = t.office.send_document(m.id, DocumentKind::Davet, "Davet metni").unwrap();
    assert!(m1.invitation_sent);
    assert_eq!(m1.documents.len(), 1);
    assert_eq!(m1.documents[0].status, DocumentStatus::Sent);
    assert_eq!(m1.documents[0].created_date, date(2025, 10, 1));

    t.clock.advance_days(1);
    let m2 = t.office.send_document(m.id, DocumentKind::Davet, "Davet metni").unwrap();
    assert!(m2.invitation_sent);
    assert_eq!(m2.documents.len(), 2);
    assert_eq!(m2.documents[1].created_date, date(2025, 10, 2));

    let sent: Vec<_> = t
        .sink
        .events()
        .into_iter()
        .filter(|e| e.event_type == NotificationType::DocumentSent)
        .collect();
    assert_eq!(sent.len(), 2);
}

#[test]
fn missing_template_leaves_file_untouched() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-2")).unwrap();
    t.templates.remove_template(DocumentKind::Ucret);

    let err = t.office.send_document(m.id, DocumentKind::Ucret, "").unwrap_err();
    assert_eq!(err.kind, AppErrorKind::NotFound);
    let stored = t.office.mediation(m.id).unwrap();
    assert!(!stored.fee_contract_sent);
    assert!(stored.documents.is_empty());
}

#[test]
fn flags_survive_finalization() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-2")).unwrap();
    t.office.send_document(m.id, DocumentKind::Ucret, "").unwrap();
    let done = t.office.record_outcome(m.id, MediationOutcome::Cancelled).unwrap();
    assert!(done.fee_contract_sent);
    assert_eq!(done.documents.len(), 2);
    assert_eq!(done.documents[1].kind, DocumentKind::Tutanak);
}
