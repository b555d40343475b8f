use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Document kind
// ---------------------------------------------------------------------------

/// Kind of document produced for a mediation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Invitation letter to the parties.
    Davet,
    /// Fee contract.
    Ucret,
    /// Session minutes.
    Tutanak,
}

impl DocumentKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DocumentKind::Davet => "Davet Mektubu",
            DocumentKind::Ucret => "Ücret Sözleşmesi",
            DocumentKind::Tutanak => "Tutanak",
        }
    }
}

// ---------------------------------------------------------------------------
// Document status
// ---------------------------------------------------------------------------

/// Document lifecycle status.
///
/// - `Draft` (Taslak): generated, not yet sent.
/// - `Sent` (Gönderildi): delivered to the parties.
/// - `AwaitingSignature` (İmzada): with the e-signature provider.
/// - `Signed` (İmzalandı): final; never regresses.
///
/// A failed signature returns the document to the status it held before
/// the request, so a sent document never drops back to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DocumentStatus {
    #[default]
    #[serde(rename = "Taslak")]
    Draft,
    #[serde(rename = "Gönderildi")]
    Sent,
    #[serde(rename = "İmzada")]
    AwaitingSignature,
    #[serde(rename = "İmzalandı")]
    Signed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "Taslak",
            DocumentStatus::Sent => "Gönderildi",
            DocumentStatus::AwaitingSignature => "İmzada",
            DocumentStatus::Signed => "İmzalandı",
        }
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document attached to a mediation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub created_date: NaiveDate,
    pub status: DocumentStatus,
    #[serde(default)]
    pub signed_by: Vec<String>,
    /// Rendered body as handed in by the presentation layer.
    #[serde(default)]
    pub content: String,
    /// Status the document held before it went out for signature. A failed
    /// or cancelled request restores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_signature_status: Option<DocumentStatus>,
}

/// A stored template for generating a document of a given kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub kind: DocumentKind,
    pub name: String,
    pub body: String,
}
