//! Service facade over the case and mediation collections.
//!
//! Each mutating call validates its input, runs the pure engine function,
//! writes the whole collection back to storage and only then swaps the
//! in-memory copy. A failed write leaves the loaded state untouched.

use chrono::NaiveDate;
use shared_types::{
    AppConfig, AppError, Case, CreateCaseRequest, CreateDeadlineFromTemplateRequest,
    CreateMediationRequest, DeadlineAlert, DeadlineComputeRequest, DeadlineSummary,
    DeadlineTemplate, DocumentKind, DocumentStatus, LegalDeadline, Mediation, MediationOutcome,
    NotificationEvent, NotificationType, ScheduleMeetingRequest,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::engine::deadline_engine;
use crate::engine::mediation_workflow as workflow;
use crate::engine::signature::{
    spawn_signature, SignatureEvent, SignatureProvider, SignatureTask, SimulatedSignatureProvider,
};
use crate::error_convert::ValidateRequest;
use crate::notify::{NotificationSink, TracingSink};
use crate::storage::{
    load_collection, save_collection, JsonFileStorage, MemoryStorage, Storage, CASES_KEY,
    MEDIATIONS_KEY,
};
use crate::templates::{InMemoryTemplateStore, TemplateStore};

/// How often a waiting caller re-checks for requests that ended silently.
const SIGNATURE_POLL: Duration = Duration::from_millis(50);

/// Collaborators injected into [`Office`].
#[derive(Clone)]
pub struct OfficeDeps {
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub templates: Arc<dyn TemplateStore>,
    pub notifier: Arc<dyn NotificationSink>,
    pub signature_provider: Arc<dyn SignatureProvider>,
    pub config: AppConfig,
}

impl OfficeDeps {
    /// Production wiring: JSON files under `office.data_dir`, wall clock,
    /// persisted template catalog, log notifications and the simulated
    /// signature provider.
    pub fn from_config(config: AppConfig) -> Result<Self, AppError> {
        let storage = Arc::new(JsonFileStorage::open(&config.office.data_dir)?);
        let templates = Arc::new(InMemoryTemplateStore::load(storage.as_ref())?);
        let provider = SimulatedSignatureProvider::new(
            Duration::from_millis(config.office.signature_delay_ms),
            "E-İmza",
        );
        Ok(Self {
            storage,
            clock: Arc::new(SystemClock),
            templates,
            notifier: Arc::new(TracingSink),
            signature_provider: Arc::new(provider),
            config,
        })
    }

    /// Everything in memory; used by tests and previews.
    pub fn in_memory(clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        let provider = SimulatedSignatureProvider::new(
            Duration::from_millis(config.office.signature_delay_ms),
            "E-İmza",
        );
        Self {
            storage: Arc::new(MemoryStorage::new()),
            clock,
            templates: Arc::new(InMemoryTemplateStore::with_defaults()),
            notifier: Arc::new(TracingSink),
            signature_provider: Arc::new(provider),
            config,
        }
    }
}

pub struct Office {
    deps: OfficeDeps,
    cases: Vec<Case>,
    mediations: Vec<Mediation>,
    signature_tasks: HashMap<Uuid, SignatureTask>,
    events_tx: mpsc::UnboundedSender<SignatureEvent>,
    events_rx: mpsc::UnboundedReceiver<SignatureEvent>,
}

impl Office {
    /// Load the case and mediation collections from storage.
    pub fn open(deps: OfficeDeps) -> Result<Self, AppError> {
        let cases: Vec<Case> = load_collection(deps.storage.as_ref(), CASES_KEY)?;
        let mediations: Vec<Mediation> = load_collection(deps.storage.as_ref(), MEDIATIONS_KEY)?;
        tracing::info!(
            cases = cases.len(),
            mediations = mediations.len(),
            "office data loaded"
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Ok(Self {
            deps,
            cases,
            mediations,
            signature_tasks: HashMap::new(),
            events_tx,
            events_rx,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.deps.config
    }

    pub fn today(&self) -> NaiveDate {
        self.deps.clock.today()
    }

    fn urgent_threshold(&self) -> i64 {
        self.deps.config.office.urgent_threshold_days
    }

    fn notify(&self, event: NotificationEvent) {
        if self.deps.config.features.notifications {
            self.deps.notifier.notify(event);
        } else {
            tracing::debug!(title = %event.title, "notification skipped; notifications disabled");
        }
    }

    // -----------------------------------------------------------------------
    // Cases & deadlines
    // -----------------------------------------------------------------------

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn case(&self, case_id: Uuid) -> Result<&Case, AppError> {
        self.cases
            .iter()
            .find(|c| c.id == case_id)
            .ok_or_else(|| AppError::not_found(format!("Case {case_id} not found")))
    }

    fn commit_case(&mut self, case: Case) -> Result<Case, AppError> {
        let mut next = self.cases.clone();
        match next.iter_mut().find(|c| c.id == case.id) {
            Some(slot) => *slot = case.clone(),
            None => next.push(case.clone()),
        }
        save_collection(self.deps.storage.as_ref(), CASES_KEY, &next)?;
        self.cases = next;
        Ok(case)
    }

    #[tracing::instrument(skip(self, request), fields(case_number = %request.case_number))]
    pub fn create_case(&mut self, request: CreateCaseRequest) -> Result<Case, AppError> {
        request.validate_request()?;
        let case_number = request.case_number.trim().to_string();
        if self.cases.iter().any(|c| c.case_number == case_number) {
            return Err(AppError::conflict(format!(
                "A case with number {case_number} already exists"
            )));
        }

        let case = Case {
            id: Uuid::new_v4(),
            case_number,
            title: request.title.trim().to_string(),
            client_name: request.client_name.trim().to_string(),
            court: request.court,
            opened_on: request.opened_on.unwrap_or_else(|| self.today()),
            deadlines: Vec::new(),
        };
        let case = self.commit_case(case)?;
        tracing::info!(case_id = %case.id, "case created");
        Ok(case)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_case(&mut self, case_id: Uuid) -> Result<(), AppError> {
        self.case(case_id)?;
        let next: Vec<Case> = self.cases.iter().filter(|c| c.id != case_id).cloned().collect();
        save_collection(self.deps.storage.as_ref(), CASES_KEY, &next)?;
        self.cases = next;
        tracing::info!("case deleted");
        Ok(())
    }

    pub fn deadline_templates(&self) -> Vec<DeadlineTemplate> {
        self.deps.templates.deadline_templates()
    }

    fn attach_deadline(&mut self, case_id: Uuid, deadline: LegalDeadline) -> Result<LegalDeadline, AppError> {
        let mut case = self.case(case_id)?.clone();
        case.deadlines.push(deadline.clone());
        self.commit_case(case)?;
        tracing::info!(
            %case_id,
            deadline_id = %deadline.id,
            due_date = %deadline.due_date,
            "deadline added"
        );
        Ok(deadline)
    }

    /// Add a deadline computed from a catalog template.
    #[tracing::instrument(skip(self, request), fields(template_id = %request.template_id))]
    pub fn add_deadline_from_template(
        &mut self,
        case_id: Uuid,
        request: CreateDeadlineFromTemplateRequest,
    ) -> Result<LegalDeadline, AppError> {
        self.case(case_id)?;
        let deadline = deadline_engine::deadline_from_template(self.deps.templates.as_ref(), &request)?;
        self.attach_deadline(case_id, deadline)
    }

    /// Add a deadline with a custom title and period.
    #[tracing::instrument(skip(self, request))]
    pub fn add_custom_deadline(
        &mut self,
        case_id: Uuid,
        request: DeadlineComputeRequest,
    ) -> Result<LegalDeadline, AppError> {
        request.validate_request()?;
        self.case(case_id)?;
        let deadline = deadline_engine::compute_deadline(&request)?;
        self.attach_deadline(case_id, deadline)
    }

    #[tracing::instrument(skip(self))]
    pub fn toggle_deadline(&mut self, case_id: Uuid, deadline_id: Uuid) -> Result<LegalDeadline, AppError> {
        let mut case = self.case(case_id)?.clone();
        let slot = case
            .deadlines
            .iter_mut()
            .find(|d| d.id == deadline_id)
            .ok_or_else(|| AppError::not_found(format!("Deadline {deadline_id} not found")))?;
        *slot = deadline_engine::toggle_completion(slot);
        let toggled = slot.clone();
        self.commit_case(case)?;
        tracing::info!(completed = toggled.is_completed, "deadline toggled");
        Ok(toggled)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_deadline(&mut self, case_id: Uuid, deadline_id: Uuid) -> Result<(), AppError> {
        let mut case = self.case(case_id)?.clone();
        let before = case.deadlines.len();
        case.deadlines.retain(|d| d.id != deadline_id);
        if case.deadlines.len() == before {
            return Err(AppError::not_found(format!("Deadline {deadline_id} not found")));
        }
        self.commit_case(case)?;
        tracing::info!("deadline deleted");
        Ok(())
    }

    /// Open deadlines that are urgent or overdue as of today.
    pub fn deadline_digest(&self) -> Vec<DeadlineAlert> {
        deadline_engine::deadline_digest(&self.cases, self.today(), self.urgent_threshold())
    }

    pub fn deadline_summary(&self) -> DeadlineSummary {
        deadline_engine::summarize(&self.cases, self.today(), self.urgent_threshold())
    }

    // -----------------------------------------------------------------------
    // Mediations
    // -----------------------------------------------------------------------

    pub fn mediations(&self) -> &[Mediation] {
        &self.mediations
    }

    pub fn mediation(&self, mediation_id: Uuid) -> Result<&Mediation, AppError> {
        self.mediations
            .iter()
            .find(|m| m.id == mediation_id)
            .ok_or_else(|| AppError::not_found(format!("Mediation {mediation_id} not found")))
    }

    fn commit_mediation(&mut self, mediation: Mediation) -> Result<Mediation, AppError> {
        let mut next = self.mediations.clone();
        match next.iter_mut().find(|m| m.id == mediation.id) {
            Some(slot) => *slot = mediation.clone(),
            None => next.push(mediation.clone()),
        }
        save_collection(self.deps.storage.as_ref(), MEDIATIONS_KEY, &next)?;
        self.mediations = next;
        Ok(mediation)
    }

    fn log_rejection(err: &AppError) {
        tracing::warn!(kind = %err.kind, "mediation transition rejected: {}", err.message);
    }

    #[tracing::instrument(skip(self, request), fields(file_number = %request.file_number))]
    pub fn create_mediation(&mut self, request: CreateMediationRequest) -> Result<Mediation, AppError> {
        request.validate_request()?;
        let mediation = workflow::open_mediation(&request, self.today())?;
        if self
            .mediations
            .iter()
            .any(|m| m.file_number == mediation.file_number)
        {
            return Err(AppError::conflict(format!(
                "A mediation with file number {} already exists",
                mediation.file_number
            )));
        }
        let mediation = self.commit_mediation(mediation)?;
        tracing::info!(mediation_id = %mediation.id, "mediation opened");
        Ok(mediation)
    }

    /// Hard delete. Pending signature requests for the file are cancelled.
    #[tracing::instrument(skip(self))]
    pub fn delete_mediation(&mut self, mediation_id: Uuid) -> Result<(), AppError> {
        self.mediation(mediation_id)?;
        let next: Vec<Mediation> = self
            .mediations
            .iter()
            .filter(|m| m.id != mediation_id)
            .cloned()
            .collect();
        save_collection(self.deps.storage.as_ref(), MEDIATIONS_KEY, &next)?;
        self.mediations = next;
        let cancelled = self.cancel_signature_tasks(mediation_id);
        tracing::info!(cancelled_signatures = cancelled.len(), "mediation deleted");
        Ok(())
    }

    #[tracing::instrument(skip(self, request), fields(date = %request.date))]
    pub fn schedule_meeting(
        &mut self,
        mediation_id: Uuid,
        request: ScheduleMeetingRequest,
    ) -> Result<Mediation, AppError> {
        let current = self.mediation(mediation_id)?;
        let next = workflow::schedule_meeting(current, &request).inspect_err(Self::log_rejection)?;
        let next = self.commit_mediation(next)?;
        tracing::info!(meetings = next.meetings.len(), "meeting scheduled");
        self.notify(NotificationEvent::new(
            NotificationType::MeetingScheduled,
            format!("Meeting scheduled: {}", next.file_number),
            format!(
                "A {:?} meeting for {} is set for {}.",
                request.meeting_type,
                next.party_names().join(", "),
                request.date
            ),
        ));
        Ok(next)
    }

    /// Cancel one meeting and let the parties know.
    #[tracing::instrument(skip(self, reason))]
    pub fn cancel_meeting(
        &mut self,
        mediation_id: Uuid,
        meeting_id: Uuid,
        reason: &str,
    ) -> Result<Mediation, AppError> {
        let current = self.mediation(mediation_id)?;
        let next = workflow::cancel_meeting(current, meeting_id, reason)
            .inspect_err(Self::log_rejection)?;
        let next = self.commit_mediation(next)?;
        tracing::info!("meeting cancelled");
        self.notify(NotificationEvent::new(
            NotificationType::MeetingCancelled,
            format!("Meeting cancelled: {}", next.file_number),
            format!(
                "The meeting for {} was cancelled: {}",
                next.party_names().join(", "),
                reason.trim()
            ),
        ));
        Ok(next)
    }

    #[tracing::instrument(skip(self))]
    pub fn record_outcome(
        &mut self,
        mediation_id: Uuid,
        outcome: MediationOutcome,
    ) -> Result<Mediation, AppError> {
        let today = self.today();
        let current = self.mediation(mediation_id)?;
        let next = workflow::record_outcome(current, outcome, today).inspect_err(Self::log_rejection)?;
        let next = self.commit_mediation(next)?;
        tracing::info!(status = next.status.as_str(), "mediation finalized");
        self.notify(NotificationEvent::new(
            NotificationType::MediationFinalized,
            format!("Mediation finalized: {}", next.file_number),
            format!("Outcome recorded as {}.", next.status.as_str()),
        ));
        Ok(next)
    }

    /// Record a sent invitation, fee contract or minutes.
    #[tracing::instrument(skip(self, rendered_content))]
    pub fn send_document(
        &mut self,
        mediation_id: Uuid,
        kind: DocumentKind,
        rendered_content: &str,
    ) -> Result<Mediation, AppError> {
        let today = self.today();
        let current = self.mediation(mediation_id)?;
        let next = workflow::send_document(
            current,
            kind,
            rendered_content,
            self.deps.templates.as_ref(),
            today,
        )
        .inspect_err(Self::log_rejection)?;
        let next = self.commit_mediation(next)?;
        tracing::info!(documents = next.documents.len(), "document sent");
        self.notify(NotificationEvent::new(
            NotificationType::DocumentSent,
            format!("{} sent: {}", kind.display_name(), next.file_number),
            format!("{} was sent to {}.", kind.display_name(), next.party_names().join(", ")),
        ));
        Ok(next)
    }

    // -----------------------------------------------------------------------
    // Signatures
    // -----------------------------------------------------------------------

    /// Move a document to `İmzada` and start the provider request in the
    /// background. Must be called from within a tokio runtime.
    #[tracing::instrument(skip(self))]
    pub fn request_signature(
        &mut self,
        mediation_id: Uuid,
        document_id: Uuid,
    ) -> Result<Mediation, AppError> {
        if !self.deps.config.features.e_signature {
            return Err(AppError::bad_request("E-signature is disabled"));
        }
        tokio::runtime::Handle::try_current()
            .map_err(|_| AppError::internal("Signature requests need an async runtime"))?;

        let current = self.mediation(mediation_id)?;
        let document = current
            .document(document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        let requested = workflow::request_signature(document)?;
        let next = workflow::replace_document(current, requested.clone())?;
        let next = self.commit_mediation(next)?;

        let task = spawn_signature(
            Arc::clone(&self.deps.signature_provider),
            mediation_id,
            requested,
            Duration::from_secs(self.deps.config.office.signature_timeout_secs),
            self.events_tx.clone(),
        );
        self.signature_tasks.insert(document_id, task);
        tracing::info!("signature requested");
        Ok(next)
    }

    pub fn pending_signatures(&self) -> usize {
        self.signature_tasks.len()
    }

    /// Apply a provider result. Only the result of the request currently in
    /// flight for the document is applied. Results of earlier requests
    /// (cancelled by closing or deleting the file) are discarded and
    /// `Ok(None)` is returned.
    #[tracing::instrument(skip(self, event), fields(document_id = %event.document_id()))]
    pub fn apply_signature_event(&mut self, event: SignatureEvent) -> Result<Option<Mediation>, AppError> {
        let in_flight = self
            .signature_tasks
            .get(&event.document_id())
            .map(|t| t.request_id());
        if in_flight != Some(event.request_id()) {
            tracing::warn!(
                request_id = %event.request_id(),
                "stale signature result: request is no longer in flight"
            );
            return Ok(None);
        }

        let applied = self.settle_signature(&event)?;
        self.signature_tasks.remove(&event.document_id());
        Ok(applied)
    }

    fn settle_signature(&mut self, event: &SignatureEvent) -> Result<Option<Mediation>, AppError> {
        let Some(current) = self.mediations.iter().find(|m| m.id == event.mediation_id()) else {
            tracing::warn!("stale signature result: mediation no longer exists");
            return Ok(None);
        };
        let Some(document) = current.document(event.document_id()) else {
            tracing::warn!("stale signature result: document no longer exists");
            return Ok(None);
        };
        if document.status != DocumentStatus::AwaitingSignature {
            tracing::warn!(
                status = document.status.as_str(),
                "stale signature result: document is not awaiting signature"
            );
            return Ok(None);
        }

        let (updated, notification) = match event {
            SignatureEvent::Completed { signed_by, .. } => (
                workflow::complete_signature(document, signed_by)?,
                NotificationEvent::new(
                    NotificationType::SignatureCompleted,
                    format!("Signed: {}", document.name),
                    format!("{} was signed by {}.", document.name, signed_by.join(", ")),
                ),
            ),
            SignatureEvent::Failed { reason, .. } => (
                workflow::fail_signature(document)?,
                NotificationEvent::new(
                    NotificationType::SignatureFailed,
                    format!("Signature failed: {}", document.name),
                    reason.clone(),
                ),
            ),
        };
        let next = workflow::replace_document(current, updated)?;
        let next = self.commit_mediation(next)?;
        tracing::info!("signature result applied");
        self.notify(notification);
        Ok(Some(next))
    }

    fn mark_delivered(&mut self, event: &SignatureEvent) {
        if let Some(task) = self.signature_tasks.get_mut(&event.document_id()) {
            if task.request_id() == event.request_id() {
                task.mark_delivered();
            }
        }
    }

    /// A result that is ready now: one queued on the channel, or a failure
    /// for a request whose task ended without sending anything.
    fn take_ready_signature_event(&mut self) -> Option<SignatureEvent> {
        // Checked before the channel: a task that finished by now has
        // already queued its result if it sent one.
        let abandoned = self
            .signature_tasks
            .values()
            .find(|t| !t.is_delivered() && t.is_finished())
            .map(|t| t.document_id());

        if let Ok(event) = self.events_rx.try_recv() {
            self.mark_delivered(&event);
            return Some(event);
        }

        let task = self.signature_tasks.get_mut(&abandoned?)?;
        task.mark_delivered();
        tracing::warn!(document_id = %task.document_id(), "signature request ended without a result");
        Some(task.abandoned_event())
    }

    /// Wait for the next signature result. Returns `None` once nothing is
    /// queued and every request has already handed out its result.
    pub async fn next_signature_event(&mut self) -> Option<SignatureEvent> {
        loop {
            let waiting = self.signature_tasks.values().any(|t| !t.is_delivered());
            if let Some(event) = self.take_ready_signature_event() {
                return Some(event);
            }
            if !waiting {
                return None;
            }
            let received = tokio::time::timeout(SIGNATURE_POLL, self.events_rx.recv()).await;
            if let Ok(Some(event)) = received {
                self.mark_delivered(&event);
                return Some(event);
            }
        }
    }

    /// Apply every signature result that has already arrived. Returns the
    /// files that changed.
    pub fn drain_signature_events(&mut self) -> Result<Vec<Mediation>, AppError> {
        let mut updated = Vec::new();
        while let Some(event) = self.take_ready_signature_event() {
            if let Some(mediation) = self.apply_signature_event(event)? {
                updated.push(mediation);
            }
        }
        Ok(updated)
    }

    fn cancel_signature_tasks(&mut self, mediation_id: Uuid) -> Vec<Uuid> {
        let ids: Vec<Uuid> = self
            .signature_tasks
            .values()
            .filter(|t| t.mediation_id() == mediation_id)
            .map(|t| t.document_id())
            .collect();
        for id in &ids {
            if let Some(task) = self.signature_tasks.remove(id) {
                task.cancel();
            }
        }
        ids
    }

    /// The file's view was closed: cancel its in-flight signature requests
    /// and return those documents to their previous status. Late results of
    /// the cancelled requests are ignored.
    #[tracing::instrument(skip(self))]
    pub fn close_mediation(&mut self, mediation_id: Uuid) -> Result<usize, AppError> {
        let cancelled = self.cancel_signature_tasks(mediation_id);
        if cancelled.is_empty() {
            return Ok(0);
        }

        let mut next = self.mediation(mediation_id)?.clone();
        for document in next
            .documents
            .iter_mut()
            .filter(|d| cancelled.contains(&d.id) && d.status == DocumentStatus::AwaitingSignature)
        {
            *document = workflow::fail_signature(document)?;
        }
        self.commit_mediation(next)?;
        tracing::info!(cancelled = cancelled.len(), "pending signatures cancelled");
        Ok(cancelled.len())
    }
}
