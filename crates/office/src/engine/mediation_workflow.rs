//! Mediation file state machine.
//!
//! ```text
//! Applied ──schedule_meeting──▶ Process ──record_outcome──▶ Agreement
//!    │                            │  ▲                      NoAgreement
//!    │                            └──┘ schedule_meeting     Cancelled
//!    └──────record_outcome(Cancelled)──────────────────────▶ Cancelled
//! ```
//!
//! Every transition takes the current record by reference and returns a
//! new one. Terminal files reject transitions with `AlreadyFinalized`.
//! Meeting cancellation and document sends never change the status.

use chrono::NaiveDate;
use shared_types::{
    AppError, CreateMediationRequest, Document, DocumentKind, DocumentStatus, Mediation,
    MediationMeeting, MediationOutcome, MediationStatus, MeetingOutcome, ScheduleMeetingRequest,
};
use uuid::Uuid;

use crate::templates::TemplateStore;

/// Build a fresh file in `Applied` from an intake request.
pub fn open_mediation(request: &CreateMediationRequest, today: NaiveDate) -> Result<Mediation, AppError> {
    let file_number = request.file_number.trim();
    if file_number.is_empty() {
        return Err(AppError::invalid_field("file_number", "File number is required"));
    }
    if request.parties.iter().any(|p| p.name.trim().is_empty()) {
        return Err(AppError::invalid_field("parties", "Party name is required"));
    }

    Ok(Mediation {
        id: Uuid::new_v4(),
        file_number: file_number.to_string(),
        application_date: request.application_date.unwrap_or(today),
        parties: request.parties.clone(),
        subject: request.subject.trim().to_string(),
        mediator_name: request.mediator_name.trim().to_string(),
        status: MediationStatus::Applied,
        meetings: Vec::new(),
        documents: Vec::new(),
        invitation_sent: false,
        fee_contract_sent: false,
    })
}

fn ensure_open(mediation: &Mediation) -> Result<(), AppError> {
    if mediation.is_terminal() {
        return Err(AppError::already_finalized(format!(
            "Mediation {} is already finalized ({})",
            mediation.file_number,
            mediation.status.as_str()
        )));
    }
    Ok(())
}

/// Append a pending meeting and move the file into `Process`.
pub fn schedule_meeting(
    mediation: &Mediation,
    details: &ScheduleMeetingRequest,
) -> Result<Mediation, AppError> {
    ensure_open(mediation)?;

    let mut next = mediation.clone();
    next.meetings.push(MediationMeeting {
        id: Uuid::new_v4(),
        date: details.date,
        participants: details.participants.clone(),
        notes: details.notes.clone(),
        meeting_type: details.meeting_type,
        outcome: MeetingOutcome::Postponed,
        cancellation_reason: None,
    });
    next.status = MediationStatus::Process;
    Ok(next)
}

/// Close the file with a final outcome and attach draft minutes.
///
/// `Agreement` and `NoAgreement` need at least one meeting (`Process`);
/// an application can be cancelled straight from `Applied`.
pub fn record_outcome(
    mediation: &Mediation,
    outcome: MediationOutcome,
    today: NaiveDate,
) -> Result<Mediation, AppError> {
    ensure_open(mediation)?;

    if mediation.status == MediationStatus::Applied && outcome != MediationOutcome::Cancelled {
        return Err(AppError::conflict(format!(
            "Mediation {} has no meetings yet; only cancellation is possible",
            mediation.file_number
        )));
    }

    let mut next = mediation.clone();
    next.status = outcome.status();
    next.documents.push(Document {
        id: Uuid::new_v4(),
        name: outcome.minutes_title().to_string(),
        kind: DocumentKind::Tutanak,
        created_date: today,
        status: DocumentStatus::Draft,
        signed_by: Vec::new(),
        content: String::new(),
        pre_signature_status: None,
    });
    Ok(next)
}

/// Mark one meeting as cancelled. The file status is left alone.
pub fn cancel_meeting(
    mediation: &Mediation,
    meeting_id: Uuid,
    reason: &str,
) -> Result<Mediation, AppError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::invalid_field("reason", "Cancellation reason is required"));
    }

    let meeting = mediation
        .meeting(meeting_id)
        .ok_or_else(|| AppError::not_found(format!("Meeting {meeting_id} not found")))?;
    if meeting.outcome == MeetingOutcome::Cancelled {
        return Err(AppError::conflict(format!(
            "Meeting {meeting_id} is already cancelled"
        )));
    }

    let mut next = mediation.clone();
    for m in next.meetings.iter_mut().filter(|m| m.id == meeting_id) {
        m.outcome = MeetingOutcome::Cancelled;
        m.cancellation_reason = Some(reason.to_string());
    }
    Ok(next)
}

/// Record a sent document of `kind` and raise the matching flag.
///
/// Requires a stored template for `kind`. The flags are monotonic: repeat
/// sends only grow the document history.
pub fn send_document(
    mediation: &Mediation,
    kind: DocumentKind,
    rendered_content: &str,
    templates: &dyn TemplateStore,
    today: NaiveDate,
) -> Result<Mediation, AppError> {
    let template = templates
        .find_template(kind)
        .ok_or_else(|| {
            AppError::not_found(format!("Template missing for {}", kind.display_name()))
        })?;

    let mut next = mediation.clone();
    next.documents.push(Document {
        id: Uuid::new_v4(),
        name: template.name,
        kind,
        created_date: today,
        status: DocumentStatus::Sent,
        signed_by: Vec::new(),
        content: rendered_content.to_string(),
        pre_signature_status: None,
    });
    match kind {
        DocumentKind::Davet => next.invitation_sent = true,
        DocumentKind::Ucret => next.fee_contract_sent = true,
        DocumentKind::Tutanak => {}
    }
    Ok(next)
}

/// Hand a document to the signature provider (`Taslak`/`Gönderildi` → `İmzada`).
pub fn request_signature(document: &Document) -> Result<Document, AppError> {
    match document.status {
        DocumentStatus::Draft | DocumentStatus::Sent => Ok(Document {
            status: DocumentStatus::AwaitingSignature,
            pre_signature_status: Some(document.status),
            ..document.clone()
        }),
        other => Err(AppError::conflict(format!(
            "Document {} cannot be sent for signature from {}",
            document.name,
            other.as_str()
        ))),
    }
}

/// Provider confirmed the signature (`İmzada` → `İmzalandı`).
pub fn complete_signature(document: &Document, signers: &[String]) -> Result<Document, AppError> {
    if document.status != DocumentStatus::AwaitingSignature {
        return Err(AppError::conflict(format!(
            "Document {} is not awaiting signature",
            document.name
        )));
    }
    let mut next = document.clone();
    next.status = DocumentStatus::Signed;
    next.pre_signature_status = None;
    for signer in signers {
        if !next.signed_by.contains(signer) {
            next.signed_by.push(signer.clone());
        }
    }
    Ok(next)
}

/// The request ended without a signature. The document returns to the
/// status it held before the request (`Taslak` or `Gönderildi`).
pub fn fail_signature(document: &Document) -> Result<Document, AppError> {
    if document.status != DocumentStatus::AwaitingSignature {
        return Err(AppError::conflict(format!(
            "Document {} is not awaiting signature",
            document.name
        )));
    }
    Ok(Document {
        status: document.pre_signature_status.unwrap_or(DocumentStatus::Draft),
        pre_signature_status: None,
        ..document.clone()
    })
}

/// Swap a document in the file for an updated copy.
pub fn replace_document(mediation: &Mediation, document: Document) -> Result<Mediation, AppError> {
    let mut next = mediation.clone();
    let slot = next
        .documents
        .iter_mut()
        .find(|d| d.id == document.id)
        .ok_or_else(|| AppError::not_found(format!("Document {} not found", document.id)))?;
    *slot = document;
    Ok(next)
}
