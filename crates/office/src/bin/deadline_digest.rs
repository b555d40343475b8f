use office::config::load_config;
use office::telemetry::init_tracing;
use office::{Office, OfficeDeps};
use shared_types::AppError;

fn main() -> Result<(), AppError> {
    init_tracing();
    let config = load_config().clone();
    let office = Office::open(OfficeDeps::from_config(config)?)?;

    let summary = office.deadline_summary();
    tracing::info!(
        total = summary.total,
        open = summary.open,
        urgent = summary.urgent,
        overdue = summary.overdue,
        "deadline summary"
    );

    let digest = office.deadline_digest();
    let json = serde_json::to_string_pretty(&digest)
        .map_err(|e| AppError::internal(format!("Failed to serialize digest: {e}")))?;
    println!("{json}");
    Ok(())
}
