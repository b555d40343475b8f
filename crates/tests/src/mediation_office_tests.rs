//! Mediation files through the office service.

use crate::common::{date, mediation_request, meeting_on, reopen, test_config, test_office, test_office_with};
use shared_types::{
    AppErrorKind, MediationOutcome, MediationStatus, MeetingOutcome, NotificationType,
};
use uuid::Uuid;

#[test]
fn schedule_first_meeting_end_to_end() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    assert_eq!(m.status, MediationStatus::Applied);

    let m = t.office.schedule_meeting(m.id, meeting_on(date(2025, 10, 10))).unwrap();
    assert_eq!(m.status, MediationStatus::Process);
    assert_eq!(m.meetings.len(), 1);

    let events = t.sink.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, NotificationType::MeetingScheduled);
    assert!(events[0].message.contains("Ayşe Kaya"));
}

#[test]
fn duplicate_file_number_conflicts() {
    let mut t = test_office(date(2025, 10, 1));
    t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    let err = t.office.create_mediation(mediation_request(" 2025/ARB-1 ")).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::Conflict);
    assert_eq!(t.office.mediations().len(), 1);
}

#[test]
fn intake_requires_parties_and_mediator() {
    let mut t = test_office(date(2025, 10, 1));

    let mut request = mediation_request("2025/ARB-1");
    request.parties.clear();
    let err = t.office.create_mediation(request).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::ValidationError);
    assert!(err.field_errors.contains_key("parties"));

    let mut request = mediation_request("2025/ARB-1");
    request.mediator_name = String::new();
    let err = t.office.create_mediation(request).unwrap_err();
    assert!(err.field_errors.contains_key("mediator_name"));

    assert!(t.office.mediations().is_empty());
}

#[test]
fn finalized_file_rejects_changes_and_keeps_stored_record() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    t.office.schedule_meeting(m.id, meeting_on(date(2025, 10, 10))).unwrap();
    let done = t.office.record_outcome(m.id, MediationOutcome::Agreement).unwrap();
    assert_eq!(done.status, MediationStatus::Agreement);

    let err = t.office.record_outcome(m.id, MediationOutcome::Cancelled).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::AlreadyFinalized);
    let err = t.office.schedule_meeting(m.id, meeting_on(date(2025, 10, 20))).unwrap_err();
    assert_eq!(err.kind, AppErrorKind::AlreadyFinalized);

    assert_eq!(t.office.mediation(m.id).unwrap(), &done);
    assert_eq!(reopen(&t).mediation(m.id).unwrap(), &done);
}

#[test]
fn cancel_meeting_notifies_parties_and_keeps_status() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    let m = t.office.schedule_meeting(m.id, meeting_on(date(2025, 10, 10))).unwrap();
    t.sink.take();

    let meeting_id = m.meetings[0].id;
    let m = t.office.cancel_meeting(m.id, meeting_id, "Taraf talebi").unwrap();
    assert_eq!(m.status, MediationStatus::Process);
    assert_eq!(m.meetings[0].outcome, MeetingOutcome::Cancelled);

    let events = t.sink.take();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, NotificationType::MeetingCancelled);
    assert!(events[0].message.contains("Taraf talebi"));
}

#[test]
fn failed_cancellation_sends_nothing() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    let err = t.office.cancel_meeting(m.id, Uuid::new_v4(), "x").unwrap_err();
    assert_eq!(err.kind, AppErrorKind::NotFound);
    assert!(t.sink.events().is_empty());
}

#[test]
fn notifications_respect_feature_flag() {
    let mut config = test_config();
    config.features.notifications = false;
    let mut t = test_office_with(date(2025, 10, 1), config, None);
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    t.office.schedule_meeting(m.id, meeting_on(date(2025, 10, 10))).unwrap();
    assert!(t.sink.events().is_empty());
}

#[test]
fn delete_mediation_is_hard_delete() {
    let mut t = test_office(date(2025, 10, 1));
    let m = t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
    t.office.delete_mediation(m.id).unwrap();
    assert_eq!(t.office.mediation(m.id).unwrap_err().kind, AppErrorKind::NotFound);
    assert!(reopen(&t).mediations().is_empty());
    // File number is free again.
    t.office.create_mediation(mediation_request("2025/ARB-1")).unwrap();
}
