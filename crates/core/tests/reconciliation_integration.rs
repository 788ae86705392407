//! Integration tests for the reconciliation engine
//!
//! **Coverage:**
//! - Detection: no false positives, severity tiers, dangling links, resync
//! - Alerting: dedup across passes, batching, best-effort failures
//! - Resolution: keep-local, keep-remote, merge, dismiss, bulk resolution
//! - Failure paths: missing credential, transport errors, merge partial write

mod support;

use clinisync_domain::{
    ConflictField, ConflictId, ConflictStats, Difference, EventStart, MergedFields, MirrorMode,
    ReconcileConfig, ResolutionStrategy, Severity,
};
use support::fixtures::{at, date, event_for, session, time, Harness, ALERT_USER, TOKEN};

// ============================================================================
// Detection
// ============================================================================

#[tokio::test]
async fn identical_pair_produces_no_conflict() {
    let records = vec![session("a")];
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event_for("a")]).await;

    assert!(conflicts.is_empty());
    assert!(h.service.list().is_empty());
    assert_eq!(h.alerts.attempts(), 0);
}

#[tokio::test]
async fn whitespace_only_text_changes_are_not_conflicts() {
    let mut record = session("a");
    record.notes = "  bring insurance card".into();
    record.location = Some("Room 3 ".into());
    let mut event = event_for("a");
    event.description = Some("bring insurance card  ".into());
    event.location = Some(" Room 3".into());
    let records = vec![record];
    let mut h = Harness::new(&records);

    assert!(h.service.detect_all(&records, &[event]).await.is_empty());
}

#[tokio::test]
async fn time_shift_is_a_high_severity_conflict() {
    let records = vec![session("a")];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event]).await;

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].severity(), Severity::High);
    assert_eq!(
        conflicts[0].differences(),
        &[Difference::new(ConflictField::Time, "14:00:00", "15:00:00")]
    );
}

#[tokio::test]
async fn single_notes_difference_is_low() {
    let mut record = session("a");
    record.notes = "bring insurance card".into();
    let records = vec![record];
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event_for("a")]).await;

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].severity(), Severity::Low);
}

#[tokio::test]
async fn temporal_difference_outranks_count() {
    let mut record = session("a");
    record.notes = "intake".into();
    let records = vec![record];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event]).await;

    assert_eq!(conflicts[0].differences().len(), 2);
    assert_eq!(conflicts[0].severity(), Severity::High);
}

#[tokio::test]
async fn two_text_differences_are_medium() {
    let mut record = session("a");
    record.notes = "intake".into();
    record.location = Some("Room 2".into());
    let records = vec![record];
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event_for("a")]).await;

    assert_eq!(conflicts[0].severity(), Severity::Medium);
}

#[tokio::test]
async fn all_day_event_compares_as_nine_am() {
    let mut record = session("a");
    record.time = time("09:00:00");
    let records = vec![record];
    let mut event = event_for("a");
    event.start = EventStart::AllDay(date("2024-03-01"));
    let mut h = Harness::new(&records);

    assert!(h.service.detect_all(&records, &[event]).await.is_empty());
}

#[tokio::test]
async fn unlinked_and_dangling_records_are_skipped() {
    let mut unmirrored = session("a");
    unmirrored.mirror_mode = MirrorMode::None;
    unmirrored.notes = "differs".into();
    let mut no_event_id = session("b");
    no_event_id.mirror_event_id = None;
    no_event_id.notes = "differs".into();
    let mut dangling = session("c");
    dangling.notes = "differs".into();
    let records = vec![unmirrored, no_event_id, dangling];
    let mut h = Harness::new(&records);

    let report = h.service.detect(&records, &[event_for("a"), event_for("b")]).await;

    assert!(report.conflicts.is_empty());
    assert_eq!(report.stats.evaluated, 0);
    assert_eq!(report.stats.dangling, 1);
}

#[tokio::test]
async fn detection_replaces_registry_wholesale() {
    let mut a = session("a");
    a.notes = "x".into();
    let mut b = session("b");
    b.notes = "y".into();
    let mut h = Harness::new(&[a.clone(), b.clone()]);

    h.service.detect_all(&[a.clone(), b.clone()], &[event_for("a"), event_for("b")]).await;
    assert_eq!(h.service.list().len(), 2);

    // "a" converged on its own; only "b" remains after the next pass.
    a.notes = String::new();
    h.service.detect_all(&[a, b], &[event_for("a"), event_for("b")]).await;

    let ids: Vec<_> = h.service.list().iter().map(|c| c.local().id.clone()).collect();
    assert_eq!(ids, vec!["b"]);
}

#[tokio::test]
async fn repeated_record_ids_yield_one_conflict_per_pass() {
    let first = session("a");
    let mut second = session("a");
    second.notes = "later copy".into();
    let records = vec![first, second];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let mut h = Harness::new(&records[..1]);

    let report = h.service.detect(&records, &[event]).await;

    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(report.stats.evaluated, 1);
    assert_eq!(report.conflicts[0].local().notes, "");
    assert_eq!(h.alerts.delivered().len(), 1);

    let id = report.conflicts[0].id().clone();
    assert!(h.service.resolve(&id, ResolutionStrategy::Dismiss).await);
    assert!(h.service.list().is_empty());
    assert!(h.service.get(&id).is_none());
}

// ============================================================================
// Alerting
// ============================================================================

#[tokio::test]
async fn repeated_detection_alerts_only_once() {
    let records = vec![session("a")];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let events = vec![event];
    let mut h = Harness::new(&records);

    let first = h.service.detect(&records, &events).await;
    let second = h.service.detect(&records, &events).await;

    let summarize = |conflicts: &[clinisync_domain::Conflict]| {
        conflicts
            .iter()
            .map(|c| (c.local().id.clone(), c.severity(), c.differences().to_vec()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summarize(first.conflicts.as_slice()), summarize(second.conflicts.as_slice()));
    assert_eq!(first.stats.newly_alerted, 1);
    assert_eq!(second.stats.newly_alerted, 0);
    assert_eq!(second.stats.already_known, 1);
    assert_eq!(h.alerts.delivered().len(), 1);
    assert_eq!(h.alerts.delivered()[0].user_id, ALERT_USER);
}

#[tokio::test]
async fn high_conflicts_alert_individually_and_others_are_batched() {
    let mut records = Vec::new();
    let mut events = Vec::new();
    for id in ["h1", "h2"] {
        records.push(session(id));
        let mut event = event_for(id);
        event.start = EventStart::DateTime(at("2024-03-02", "14:00:00"));
        events.push(event);
    }
    for id in ["l1", "l2"] {
        let mut record = session(id);
        record.notes = "changed".into();
        records.push(record);
        events.push(event_for(id));
    }
    let mut h = Harness::new(&records);

    h.service.detect_all(&records, &events).await;

    let titles: Vec<_> = h.alerts.delivered().into_iter().map(|a| a.title).collect();
    assert_eq!(
        titles,
        vec![
            "Schedule conflict: Client h1".to_string(),
            "Schedule conflict: Client h2".to_string(),
            "2 calendar conflicts detected".to_string(),
        ]
    );
    assert_eq!(h.service.notified_count(), 4);
}

#[tokio::test]
async fn single_non_urgent_conflict_alerts_individually() {
    let mut record = session("a");
    record.location = Some("Room 9".into());
    let records = vec![record];
    let mut h = Harness::new(&records);

    h.service.detect_all(&records, &[event_for("a")]).await;

    let delivered = h.alerts.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].title, "Calendar conflict: Client a");
    assert!(delivered[0].body.contains("location: Room 9 vs (empty)"));
}

#[tokio::test]
async fn alert_failures_do_not_block_detection_and_are_not_retried() {
    let mut record = session("a");
    record.notes = "changed".into();
    let records = vec![record];
    let mut h = Harness::new(&records);
    h.alerts.fail_alerts(true);

    let conflicts = h.service.detect_all(&records, &[event_for("a")]).await;
    assert_eq!(conflicts.len(), 1);
    assert_eq!(h.service.list().len(), 1);
    assert_eq!(h.alerts.attempts(), 1);

    h.alerts.fail_alerts(false);
    h.service.detect_all(&records, &[event_for("a")]).await;
    assert_eq!(h.alerts.attempts(), 1);
}

#[tokio::test]
async fn severity_change_counts_as_a_new_alert() {
    let mut record = session("a");
    record.notes = "changed".into();
    let mut h = Harness::new(&[record.clone()]);

    h.service.detect_all(&[record.clone()], &[event_for("a")]).await;
    record.location = Some("Room 1".into());
    h.service.detect_all(&[record], &[event_for("a")]).await;

    assert_eq!(h.alerts.delivered().len(), 2);
}

// ============================================================================
// Resolution
// ============================================================================

fn time_conflict_setup() -> (Harness, Vec<clinisync_domain::SessionRecord>, Vec<clinisync_domain::RemoteEvent>) {
    let records = vec![session("a")];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let h = Harness::new(&records);
    (h, records, vec![event])
}

#[tokio::test]
async fn keep_remote_overwrites_local_session() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;
    let conflict = &conflicts[0];

    assert!(h.service.resolve(conflict.id(), ResolutionStrategy::KeepRemote).await);

    assert_eq!(h.store.record("a").time, time("15:00:00"));
    assert!(h.service.list().is_empty());
    assert!(!h.service.is_notified(conflict));
    assert!(h.calendar.calls().is_empty());
}

#[tokio::test]
async fn keep_remote_uses_nine_am_for_all_day_events() {
    let mut record = session("a");
    record.notes = "old".into();
    let records = vec![record];
    let mut event = event_for("a");
    event.start = EventStart::AllDay(date("2024-03-05"));
    event.description = Some("new".into());
    event.location = Some("Telehealth".into());
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event]).await;
    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepRemote).await);

    let stored = h.store.record("a");
    assert_eq!(stored.date, date("2024-03-05"));
    assert_eq!(stored.time, time("09:00:00"));
    assert_eq!(stored.notes, "new");
    assert_eq!(stored.location.as_deref(), Some("Telehealth"));
}

#[tokio::test]
async fn keep_local_overwrites_remote_event_and_stamps_sync() {
    let mut record = session("a");
    record.notes = "bring card".into();
    let records = vec![record];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    event.location = Some("Old room".into());
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &[event]).await;
    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepLocal).await);

    let calls = h.calendar.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].event_id, "evt-a");
    assert_eq!(calls[0].access_token, TOKEN);
    let body = &calls[0].body;
    assert_eq!(body.summary, "Session with Client a");
    assert_eq!(body.description, "bring card");
    assert_eq!(body.location, "");
    assert_eq!(body.start, at("2024-03-01", "14:00:00"));
    assert_eq!(body.end, at("2024-03-01", "14:50:00"));
    assert_eq!(body.time_zone, "America/Chicago");

    assert!(h.store.record("a").last_synced_at.is_some());
    assert!(h.service.list().is_empty());
}

#[tokio::test]
async fn merge_applies_explicit_fields_to_both_sides() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;

    let fields = MergedFields { time: Some(time("16:00:00")), ..MergedFields::default() };
    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::Merge(fields)).await);

    assert_eq!(h.store.record("a").time, time("16:00:00"));
    let calls = h.calendar.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].body.start, at("2024-03-01", "16:00:00"));
    assert!(h.service.list().is_empty());
}

#[tokio::test]
async fn empty_merge_behaves_like_keep_local() {
    let (mut merge_h, records, events) = time_conflict_setup();
    let (mut local_h, _, _) = time_conflict_setup();

    let merged = merge_h.service.detect_all(&records, &events).await;
    let kept = local_h.service.detect_all(&records, &events).await;

    assert!(
        merge_h
            .service
            .resolve(merged[0].id(), ResolutionStrategy::Merge(MergedFields::default()))
            .await
    );
    assert!(local_h.service.resolve(kept[0].id(), ResolutionStrategy::KeepLocal).await);

    assert_eq!(merge_h.calendar.calls(), local_h.calendar.calls());
    let merged_record = merge_h.store.record("a");
    let kept_record = local_h.store.record("a");
    assert_eq!(
        (merged_record.date, merged_record.time, &merged_record.notes, &merged_record.location),
        (kept_record.date, kept_record.time, &kept_record.notes, &kept_record.location)
    );
    assert!(merged_record.last_synced_at.is_some());
}

#[tokio::test]
async fn empty_merge_leaves_local_fields_untouched() {
    let mut record = session("a");
    record.notes = "  bring insurance card ".into();
    record.location = Some(String::new());
    let records = vec![record];
    let mut event = event_for("a");
    event.start = EventStart::DateTime(at("2024-03-01", "15:00:00"));
    let events = vec![event];

    let mut merge_h = Harness::new(&records);
    let mut local_h = Harness::new(&records);
    let merged = merge_h.service.detect_all(&records, &events).await;
    let kept = local_h.service.detect_all(&records, &events).await;

    assert!(
        merge_h
            .service
            .resolve(merged[0].id(), ResolutionStrategy::Merge(MergedFields::default()))
            .await
    );
    assert!(local_h.service.resolve(kept[0].id(), ResolutionStrategy::KeepLocal).await);

    // Both only stamp the last-synced marker locally.
    for h in [&merge_h, &local_h] {
        let updates = h.store.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].1.last_synced_at.is_some());
        assert_eq!(updates[0].1.notes, None);
        assert_eq!(updates[0].1.location, None);

        let stored = h.store.record("a");
        assert_eq!(stored.notes, "  bring insurance card ");
        assert_eq!(stored.location.as_deref(), Some(""));
    }
    assert_eq!(merge_h.calendar.calls(), local_h.calendar.calls());
}

#[tokio::test]
async fn dismiss_removes_conflict_without_writes() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;

    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::Dismiss).await);

    assert!(h.service.list().is_empty());
    assert_eq!(h.service.notified_count(), 0);
    assert!(h.store.updates().is_empty());
    assert!(h.calendar.calls().is_empty());
}

#[tokio::test]
async fn resolved_conflict_alerts_again_when_it_recurs() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;
    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::Dismiss).await);

    h.service.detect_all(&records, &events).await;

    assert_eq!(h.alerts.delivered().len(), 2);
}

#[tokio::test]
async fn dismiss_and_clear_all_drop_conflicts() {
    let mut a = session("a");
    a.notes = "x".into();
    let mut b = session("b");
    b.notes = "y".into();
    let records = vec![a, b];
    let events = vec![event_for("a"), event_for("b")];
    let mut h = Harness::new(&records);

    let conflicts = h.service.detect_all(&records, &events).await;
    h.service.dismiss(conflicts[0].id());
    assert_eq!(h.service.list().len(), 1);
    assert_eq!(h.service.notified_count(), 1);

    h.service.dismiss(&ConflictId::from("unknown"));
    assert_eq!(h.service.list().len(), 1);

    h.service.clear_all();
    assert!(h.service.list().is_empty());
    assert_eq!(h.service.notified_count(), 0);
}

#[tokio::test]
async fn unknown_conflict_cannot_be_resolved() {
    let (mut h, _, _) = time_conflict_setup();
    assert!(!h.service.resolve(&ConflictId::from("missing-1"), ResolutionStrategy::Dismiss).await);
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn missing_credential_fails_before_any_write() {
    let (mut h, records, events) = time_conflict_setup();
    h.service.set_access_token(None);
    let conflicts = h.service.detect_all(&records, &events).await;

    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepLocal).await);
    let fields = MergedFields { time: Some(time("16:00:00")), ..MergedFields::default() };
    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::Merge(fields)).await);

    assert!(h.calendar.calls().is_empty());
    assert!(h.store.updates().is_empty());
    assert_eq!(h.service.list().len(), 1);
    assert!(h.service.is_notified(&conflicts[0]));
}

#[tokio::test]
async fn blank_token_counts_as_missing() {
    let (mut h, records, events) = time_conflict_setup();
    h.service.set_access_token(Some("   ".into()));
    let conflicts = h.service.detect_all(&records, &events).await;

    assert!(!h.service.has_access_token());
    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepLocal).await);
}

#[tokio::test]
async fn transport_failure_keeps_conflict_open() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;
    h.calendar.fail_writes(true);

    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepLocal).await);
    assert_eq!(h.service.list().len(), 1);
    assert!(h.store.record("a").last_synced_at.is_none());

    h.calendar.fail_writes(false);
    assert!(h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepLocal).await);
}

#[tokio::test]
async fn local_store_failure_fails_keep_remote() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;
    h.store.fail_updates(true);

    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::KeepRemote).await);
    assert_eq!(h.store.record("a").time, time("14:00:00"));
    assert_eq!(h.service.list().len(), 1);
}

#[tokio::test]
async fn merge_keeps_local_write_when_calendar_write_fails() {
    let (mut h, records, events) = time_conflict_setup();
    let conflicts = h.service.detect_all(&records, &events).await;
    h.calendar.fail_writes(true);

    let fields = MergedFields { time: Some(time("16:00:00")), ..MergedFields::default() };
    assert!(!h.service.resolve(conflicts[0].id(), ResolutionStrategy::Merge(fields)).await);

    // No rollback: the local session already carries the merged time.
    let stored = h.store.record("a");
    assert_eq!(stored.time, time("16:00:00"));
    assert!(stored.last_synced_at.is_none());
    assert_eq!(h.service.list().len(), 1);

    // The next pass still sees the remote side diverging.
    let again = h.service.detect_all(&h.store.records(), &events).await;
    assert_eq!(again.len(), 1);
    assert_eq!(
        again[0].differences(),
        &[Difference::new(ConflictField::Time, "16:00:00", "15:00:00")]
    );
}

// ============================================================================
// Bulk operations and stats
// ============================================================================

#[tokio::test]
async fn resolve_all_counts_successes() {
    let mut records = Vec::new();
    let mut events = Vec::new();
    for id in ["a", "b", "c"] {
        let mut record = session(id);
        record.notes = format!("notes {id}");
        records.push(record);
        events.push(event_for(id));
    }
    let mut h = Harness::new(&records);
    h.service.detect_all(&records, &events).await;

    assert_eq!(h.service.resolve_all(ResolutionStrategy::KeepRemote).await, 3);
    assert!(h.service.list().is_empty());
    assert!(h.store.records().iter().all(|r| r.notes.is_empty()));
}

#[tokio::test]
async fn resolve_all_without_token_resolves_nothing_remote() {
    let (mut h, records, events) = time_conflict_setup();
    h.service.set_access_token(None);
    h.service.detect_all(&records, &events).await;

    assert_eq!(h.service.resolve_all(ResolutionStrategy::KeepLocal).await, 0);
    assert_eq!(h.service.list().len(), 1);
}

#[tokio::test]
async fn stats_reflect_open_conflicts() {
    let mut high = session("h");
    high.date = date("2024-03-02");
    let mut medium = session("m");
    medium.notes = "x".into();
    medium.location = Some("y".into());
    let mut low = session("l");
    low.notes = "z".into();
    let records = vec![high, medium, low];
    let events = vec![event_for("h"), event_for("m"), event_for("l")];
    let mut h = Harness::new(&records);

    h.service.detect_all(&records, &events).await;

    assert_eq!(h.service.stats(), ConflictStats { total: 3, high: 1, medium: 1, low: 1 });
}

#[tokio::test]
async fn service_rejects_unknown_time_zone() {
    let config = ReconcileConfig { time_zone: "Not/AZone".into(), ..ReconcileConfig::default() };
    let result = clinisync_core::ReconciliationService::new(
        std::sync::Arc::new(support::ports::MockSessionStore::default()),
        std::sync::Arc::new(support::ports::MockCalendarWriter::default()),
        std::sync::Arc::new(support::ports::MockAlertSink::default()),
        &config,
    );
    assert!(result.is_err());
}
