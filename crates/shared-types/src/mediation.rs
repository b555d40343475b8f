use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::document::Document;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle of a mediation file.
///
/// `Applied` is initial; `Agreement`, `NoAgreement` and `Cancelled` are
/// terminal and accept no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MediationStatus {
    #[default]
    Applied,
    Process,
    Agreement,
    NoAgreement,
    Cancelled,
}

impl MediationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Agreement | Self::NoAgreement | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::Process => "Process",
            Self::Agreement => "Agreement",
            Self::NoAgreement => "NoAgreement",
            Self::Cancelled => "Cancelled",
        }
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyRole {
    #[serde(rename = "Başvurucu")]
    Applicant,
    #[serde(rename = "Karşı Taraf")]
    Respondent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct Party {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Party name is required"))
    )]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub role: PartyRole,
}

// ---------------------------------------------------------------------------
// Meetings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingType {
    Online,
    #[serde(rename = "Fiziksel")]
    InPerson,
}

/// Outcome of a single meeting. New meetings start as `Postponed`
/// (Ertelendi), which doubles as "pending".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeetingOutcome {
    #[serde(rename = "Olumlu")]
    Positive,
    #[serde(rename = "Olumsuz")]
    Negative,
    #[default]
    #[serde(rename = "Ertelendi")]
    Postponed,
    #[serde(rename = "İptal")]
    Cancelled,
}

/// A mediation session. Append-only: only the outcome and the
/// cancellation reason are ever updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediationMeeting {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    pub outcome: MeetingOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Mediation file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mediation {
    pub id: Uuid,
    pub file_number: String,
    pub application_date: NaiveDate,
    pub parties: Vec<Party>,
    pub subject: String,
    pub mediator_name: String,
    pub status: MediationStatus,
    #[serde(default)]
    pub meetings: Vec<MediationMeeting>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub invitation_sent: bool,
    #[serde(default)]
    pub fee_contract_sent: bool,
}

impl Mediation {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn meeting(&self, meeting_id: Uuid) -> Option<&MediationMeeting> {
        self.meetings.iter().find(|m| m.id == meeting_id)
    }

    pub fn document(&self, document_id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    pub fn party_names(&self) -> Vec<String> {
        self.parties.iter().map(|p| p.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Intake request for a new mediation file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct CreateMediationRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "File number is required"))
    )]
    pub file_number: String,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub application_date: Option<NaiveDate>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "At least one party is required"), nested)
    )]
    pub parties: Vec<Party>,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Subject is required"))
    )]
    pub subject: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Mediator name is required"))
    )]
    pub mediator_name: String,
}

/// Details for scheduling a meeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleMeetingRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub notes: String,
    pub meeting_type: MeetingType,
}

/// Final outcome recorded for a mediation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediationOutcome {
    Agreement,
    NoAgreement,
    Cancelled,
}

impl MediationOutcome {
    pub fn status(&self) -> MediationStatus {
        match self {
            Self::Agreement => MediationStatus::Agreement,
            Self::NoAgreement => MediationStatus::NoAgreement,
            Self::Cancelled => MediationStatus::Cancelled,
        }
    }

    /// Title of the minutes generated when this outcome is recorded.
    pub fn minutes_title(&self) -> &'static str {
        match self {
            Self::Agreement => "Anlaşma Son Tutanağı",
            Self::NoAgreement => "Anlaşamama Son Tutanağı",
            Self::Cancelled => "İptal Tutanağı",
        }
    }
}
