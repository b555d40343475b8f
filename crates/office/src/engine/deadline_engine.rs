//! Statutory deadline computation.
//!
//! Periods are counted in calendar days on the proleptic Gregorian
//! calendar: `due = trigger + days`. Weekends and public holidays are not
//! skipped.

use chrono::{Duration, NaiveDate};
use shared_types::{
    AppError, Case, CreateDeadlineFromTemplateRequest, DeadlineAlert, DeadlineComputeRequest,
    DeadlineSummary, DeadlineUrgency, LegalDeadline,
};
use uuid::Uuid;

use crate::templates::TemplateStore;

/// Default urgency window in days.
pub const URGENT_THRESHOLD_DAYS: i64 = 3;

/// Compute a new, open deadline from a trigger date and a period.
pub fn compute_deadline(request: &DeadlineComputeRequest) -> Result<LegalDeadline, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::invalid_field("title", "Title is required"));
    }
    if request.duration_days < 0 {
        return Err(AppError::invalid_field(
            "duration_days",
            "Duration cannot be negative",
        ));
    }

    let due_date = add_calendar_days(request.trigger_date, request.duration_days)?;

    let description = if request.description.trim().is_empty() {
        format!(
            "{} gün ({} → {})",
            request.duration_days, request.trigger_date, due_date
        )
    } else {
        request.description.clone()
    };

    Ok(LegalDeadline {
        id: Uuid::new_v4(),
        title: title.to_string(),
        trigger_date: request.trigger_date,
        due_date,
        duration_days: request.duration_days,
        is_completed: false,
        description,
        template_id: None,
    })
}

/// Compute a deadline from a catalog entry. Fails with NotFound when the
/// template was removed after being selected; nothing is created then.
pub fn deadline_from_template(
    templates: &dyn TemplateStore,
    request: &CreateDeadlineFromTemplateRequest,
) -> Result<LegalDeadline, AppError> {
    let template = templates
        .find_deadline_template(&request.template_id)
        .ok_or_else(|| {
            AppError::not_found(format!("Deadline template {} not found", request.template_id))
        })?;

    let mut deadline = compute_deadline(&DeadlineComputeRequest {
        trigger_date: request.trigger_date,
        duration_days: template.days,
        title: template.name.clone(),
        description: request.description.clone(),
    })?;
    deadline.template_id = Some(template.id);
    Ok(deadline)
}

/// Parse an ISO `YYYY-MM-DD` date as typed into a form.
pub fn parse_trigger_date(input: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::invalid_field("trigger_date", format!("Invalid date: {}", input.trim()))
    })
}

/// Add whole calendar days to a date.
pub fn add_calendar_days(start: NaiveDate, days: i64) -> Result<NaiveDate, AppError> {
    Duration::try_days(days)
        .and_then(|span| start.checked_add_signed(span))
        .ok_or_else(|| AppError::invalid_field("duration_days", "Date overflow during day count"))
}

/// Days left until the due date; zero on the due day, negative once past.
pub fn remaining_days(deadline: &LegalDeadline, as_of: NaiveDate) -> i64 {
    (deadline.due_date - as_of).num_days()
}

/// Classify a deadline. Completed deadlines are never urgent.
pub fn classify_urgency(deadline: &LegalDeadline, as_of: NaiveDate, threshold: i64) -> DeadlineUrgency {
    if deadline.is_completed {
        return DeadlineUrgency::None;
    }
    let remaining = remaining_days(deadline, as_of);
    if remaining <= 0 {
        DeadlineUrgency::Overdue
    } else if remaining <= threshold {
        DeadlineUrgency::Urgent
    } else {
        DeadlineUrgency::Normal
    }
}

/// Flip the completion flag. Nothing else changes.
pub fn toggle_completion(deadline: &LegalDeadline) -> LegalDeadline {
    LegalDeadline {
        is_completed: !deadline.is_completed,
        ..deadline.clone()
    }
}

/// Open deadlines across all cases that are urgent or overdue, earliest first.
pub fn deadline_digest(cases: &[Case], as_of: NaiveDate, threshold: i64) -> Vec<DeadlineAlert> {
    let mut alerts: Vec<DeadlineAlert> = cases
        .iter()
        .flat_map(|case| {
            case.deadlines.iter().filter_map(move |deadline| {
                let urgency = classify_urgency(deadline, as_of, threshold);
                urgency.needs_attention().then(|| DeadlineAlert {
                    case_id: case.id,
                    case_number: case.case_number.clone(),
                    deadline: deadline.clone(),
                    remaining_days: remaining_days(deadline, as_of),
                    urgency,
                })
            })
        })
        .collect();
    alerts.sort_by_key(|a| (a.deadline.due_date, a.case_number.clone()));
    alerts
}

/// Count deadlines by state.
pub fn summarize(cases: &[Case], as_of: NaiveDate, threshold: i64) -> DeadlineSummary {
    let mut summary = DeadlineSummary::default();
    for deadline in cases.iter().flat_map(|c| c.deadlines.iter()) {
        summary.total += 1;
        if deadline.is_completed {
            summary.completed += 1;
            continue;
        }
        summary.open += 1;
        match classify_urgency(deadline, as_of, threshold) {
            DeadlineUrgency::Urgent => summary.urgent += 1,
            DeadlineUrgency::Overdue => summary.overdue += 1,
            _ => {}
        }
    }
    summary
}
