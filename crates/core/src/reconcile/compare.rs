//! Field comparators
//!
//! Pure functions comparing one attribute class between a session and its
//! linked event. Each returns zero or one difference per field it covers.

use clinisync_domain::constants::{DATE_FORMAT, TIME_FORMAT};
use clinisync_domain::{ConflictField, Difference, RemoteEvent, SessionRecord};

/// Signature shared by every comparator.
pub type FieldComparator = fn(&SessionRecord, &RemoteEvent) -> Vec<Difference>;

/// Comparators run by the classifier, in reporting order.
pub const COMPARATORS: [FieldComparator; 3] =
    [compare_schedule, compare_description, compare_location];

/// Compare calendar date and wall-clock time independently.
///
/// A date shift and a time shift on the same pair are reported as two
/// separate differences.
pub fn compare_schedule(local: &SessionRecord, remote: &RemoteEvent) -> Vec<Difference> {
    let mut differences = Vec::with_capacity(2);

    let remote_date = remote.start.date();
    if local.date != remote_date {
        differences.push(Difference::new(
            ConflictField::Date,
            local.date.format(DATE_FORMAT).to_string(),
            remote_date.format(DATE_FORMAT).to_string(),
        ));
    }

    let local_time = local.normalized_time();
    let remote_time = remote.start.time();
    if local_time != remote_time {
        differences.push(Difference::new(
            ConflictField::Time,
            local_time.format(TIME_FORMAT).to_string(),
            remote_time.format(TIME_FORMAT).to_string(),
        ));
    }

    differences
}

/// Compare session notes with the event description.
pub fn compare_description(local: &SessionRecord, remote: &RemoteEvent) -> Vec<Difference> {
    compare_text(ConflictField::Description, &local.notes, remote.description_text())
        .into_iter()
        .collect()
}

/// Compare the dedicated location fields.
pub fn compare_location(local: &SessionRecord, remote: &RemoteEvent) -> Vec<Difference> {
    compare_text(ConflictField::Location, local.location_text(), remote.location_text())
        .into_iter()
        .collect()
}

fn compare_text(field: ConflictField, local: &str, remote: &str) -> Option<Difference> {
    let (local, remote) = (local.trim(), remote.trim());
    (local != remote).then(|| Difference::new(field, local, remote))
}
