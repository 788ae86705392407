//! Alert wording for detected conflicts

use clinisync_domain::constants::DATE_FORMAT;
use clinisync_domain::{Conflict, Severity};

/// Title and body of one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
}

/// Alert for a single conflict.
pub fn conflict_alert(conflict: &Conflict) -> AlertMessage {
    let client = client_label(conflict);
    let title = match conflict.severity() {
        Severity::High => format!("Schedule conflict: {client}"),
        Severity::Medium | Severity::Low => format!("Calendar conflict: {client}"),
    };
    let body = format!(
        "The session on {} no longer matches your calendar ({}).",
        conflict.local().date.format(DATE_FORMAT),
        describe_differences(conflict)
    );
    AlertMessage { title, body }
}

/// One alert summarising several non-urgent conflicts.
pub fn summary_alert(conflicts: &[&Conflict]) -> AlertMessage {
    let clients: Vec<&str> = conflicts.iter().map(|c| client_label(c)).collect();
    AlertMessage {
        title: format!("{} calendar conflicts detected", conflicts.len()),
        body: format!("Review sessions for: {}.", clients.join(", ")),
    }
}

fn client_label(conflict: &Conflict) -> &str {
    let name = conflict.local().client_name.trim();
    if name.is_empty() {
        "unnamed client"
    } else {
        name
    }
}

fn describe_differences(conflict: &Conflict) -> String {
    conflict
        .differences()
        .iter()
        .map(|d| {
            let local = if d.local_value.is_empty() { "(empty)" } else { d.local_value.as_str() };
            let remote = if d.remote_value.is_empty() { "(empty)" } else { d.remote_value.as_str() };
            format!("{}: {local} vs {remote}", d.field)
        })
        .collect::<Vec<_>>()
        .join("; ")
}
