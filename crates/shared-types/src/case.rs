use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

use crate::deadline::LegalDeadline;

/// A case file. Owns its deadlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: Uuid,
    pub case_number: String,
    pub title: String,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    pub opened_on: NaiveDate,
    #[serde(default)]
    pub deadlines: Vec<LegalDeadline>,
}

impl Case {
    pub fn deadline(&self, deadline_id: Uuid) -> Option<&LegalDeadline> {
        self.deadlines.iter().find(|d| d.id == deadline_id)
    }
}

/// Request to open a new case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct CreateCaseRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Case number is required"))
    )]
    pub case_number: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Title is required"))
    )]
    pub title: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Client name is required"))
    )]
    pub client_name: String,
    #[serde(default)]
    pub court: Option<String>,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub opened_on: Option<NaiveDate>,
}
