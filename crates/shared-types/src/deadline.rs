use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "validation")]
use validator::Validate;

/// A statutory deadline attached to a case.
///
/// `due_date` is derived from `trigger_date + duration_days` when the
/// deadline is computed and never edited independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalDeadline {
    pub id: Uuid,
    pub title: String,
    pub trigger_date: NaiveDate,
    pub due_date: NaiveDate,
    pub duration_days: i64,
    pub is_completed: bool,
    #[serde(default)]
    pub description: String,
    /// Catalog entry this deadline was created from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
}

/// Static catalog entry for a named statutory period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineTemplate {
    pub id: String,
    pub name: String,
    pub days: i64,
    /// Display colour for calendar badges (hex).
    pub color: String,
}

impl DeadlineTemplate {
    pub fn new(id: &str, name: &str, days: i64, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            days,
            color: color.to_string(),
        }
    }
}

/// Built-in catalog of common Turkish statutory periods (calendar days).
pub fn default_deadline_templates() -> Vec<DeadlineTemplate> {
    vec![
        DeadlineTemplate::new("cevap-dilekcesi", "Cevap Dilekçesi", 14, "#2563eb"),
        DeadlineTemplate::new("istinaf", "İstinaf Başvurusu", 14, "#dc2626"),
        DeadlineTemplate::new("temyiz", "Temyiz Başvurusu", 30, "#9333ea"),
        DeadlineTemplate::new("icra-itiraz", "İcra Takibine İtiraz", 7, "#ea580c"),
        DeadlineTemplate::new("cevaba-cevap", "Cevaba Cevap Dilekçesi", 14, "#0891b2"),
        DeadlineTemplate::new("bilirkisi-itiraz", "Bilirkişi Raporuna İtiraz", 14, "#65a30d"),
        DeadlineTemplate::new("arabuluculuk-sureci", "Arabuluculuk Süreci", 21, "#0d9488"),
        DeadlineTemplate::new("dava-acma", "Son Tutanaktan Sonra Dava Açma", 14, "#b91c1c"),
    ]
}

/// Input to the deadline computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(Validate))]
pub struct DeadlineComputeRequest {
    pub trigger_date: NaiveDate,
    #[cfg_attr(
        feature = "validation",
        validate(range(
            min = 0,
            max = 36500,
            message = "Duration must be between 0 and 36500 days"
        ))
    )]
    pub duration_days: i64,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Title is required"))
    )]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request to add a deadline to a case from the template catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDeadlineFromTemplateRequest {
    pub template_id: String,
    pub trigger_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

/// Urgency class derived from remaining days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineUrgency {
    /// Completed deadlines carry no urgency.
    None,
    Normal,
    Urgent,
    Overdue,
}

impl DeadlineUrgency {
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Urgent | Self::Overdue)
    }
}

/// An open deadline that needs attention, flattened with its case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineAlert {
    pub case_id: Uuid,
    pub case_number: String,
    pub deadline: LegalDeadline,
    pub remaining_days: i64,
    pub urgency: DeadlineUrgency,
}

/// Aggregate counts across every case deadline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineSummary {
    pub total: usize,
    pub completed: usize,
    pub open: usize,
    pub urgent: usize,
    pub overdue: usize,
}
