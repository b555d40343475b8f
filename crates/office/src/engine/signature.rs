//! E-signature requests as cancellable background tasks.
//!
//! A request runs on the tokio runtime and reports back over a channel as
//! a [`SignatureEvent`]. The owning [`SignatureTask`] aborts the request
//! when cancelled or dropped, so closing a file cannot deliver an update
//! into a record that has moved on.

use async_trait::async_trait;
use shared_types::{AppError, Document};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// External e-signature provider.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Resolve once the document is signed, returning the signer names.
    async fn sign(&self, document: &Document) -> Result<Vec<String>, AppError>;
}

/// Provider that signs after a fixed delay. Stands in for a real provider in
/// demos and local setups.
#[derive(Debug, Clone)]
pub struct SimulatedSignatureProvider {
    delay: Duration,
    signer: String,
}

impl SimulatedSignatureProvider {
    pub fn new(delay: Duration, signer: impl Into<String>) -> Self {
        Self {
            delay,
            signer: signer.into(),
        }
    }
}

#[async_trait]
impl SignatureProvider for SimulatedSignatureProvider {
    async fn sign(&self, document: &Document) -> Result<Vec<String>, AppError> {
        tracing::debug!(document = %document.id, delay_ms = self.delay.as_millis() as u64, "simulating signature");
        tokio::time::sleep(self.delay).await;
        Ok(vec![self.signer.clone()])
    }
}

/// Outcome of a signature request. `request_id` ties the result to the
/// request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum SignatureEvent {
    Completed {
        request_id: Uuid,
        mediation_id: Uuid,
        document_id: Uuid,
        signed_by: Vec<String>,
    },
    Failed {
        request_id: Uuid,
        mediation_id: Uuid,
        document_id: Uuid,
        reason: String,
    },
}

impl SignatureEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }

    pub fn mediation_id(&self) -> Uuid {
        match self {
            Self::Completed { mediation_id, .. } | Self::Failed { mediation_id, .. } => *mediation_id,
        }
    }

    pub fn document_id(&self) -> Uuid {
        match self {
            Self::Completed { document_id, .. } | Self::Failed { document_id, .. } => *document_id,
        }
    }
}

/// Handle to an in-flight signature request. Aborts the request on drop.
#[derive(Debug)]
pub struct SignatureTask {
    request_id: Uuid,
    mediation_id: Uuid,
    document_id: Uuid,
    delivered: bool,
    handle: JoinHandle<()>,
}

impl SignatureTask {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn mediation_id(&self) -> Uuid {
        self.mediation_id
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// Whether the result of this request has been handed out already.
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    pub fn mark_delivered(&mut self) {
        self.delivered = true;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Failure reported for a request whose task ended without sending a
    /// result (the provider panicked).
    pub fn abandoned_event(&self) -> SignatureEvent {
        SignatureEvent::Failed {
            request_id: self.request_id,
            mediation_id: self.mediation_id,
            document_id: self.document_id,
            reason: "Signature request ended without a result".to_string(),
        }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for SignatureTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a signature request. Must be called from within a tokio runtime.
///
/// The provider call is bounded by `timeout`; a timeout is reported as a
/// failure so the document falls back to its previous status.
pub fn spawn_signature(
    provider: Arc<dyn SignatureProvider>,
    mediation_id: Uuid,
    document: Document,
    timeout: Duration,
    events: mpsc::UnboundedSender<SignatureEvent>,
) -> SignatureTask {
    let request_id = Uuid::new_v4();
    let document_id = document.id;
    let handle = tokio::spawn(async move {
        let event = match tokio::time::timeout(timeout, provider.sign(&document)).await {
            Ok(Ok(signed_by)) => SignatureEvent::Completed {
                request_id,
                mediation_id,
                document_id,
                signed_by,
            },
            Ok(Err(e)) => SignatureEvent::Failed {
                request_id,
                mediation_id,
                document_id,
                reason: e.message,
            },
            Err(_) => SignatureEvent::Failed {
                request_id,
                mediation_id,
                document_id,
                reason: format!("Signature request timed out after {}s", timeout.as_secs()),
            },
        };
        if events.send(event).is_err() {
            tracing::debug!(%document_id, "signature receiver dropped; result discarded");
        }
    });

    SignatureTask {
        request_id,
        mediation_id,
        document_id,
        delivered: false,
        handle,
    }
}
