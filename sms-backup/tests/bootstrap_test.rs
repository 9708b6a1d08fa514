//! Integration tests for the bootstrap/sync controller.

use sms_backup::bootstrap::{
    TOAST_ALREADY_GRANTED, TOAST_DENIED, TOAST_GRANTED, TOAST_SYNC_DONE, TOAST_SYNC_ERROR,
};
use sms_backup::{InitOutcome, ServiceConfig, ServiceState, SyncReport, BACKUP_CHANNEL_ID, HISTORY_SYNC_LIMIT};
use sms_core::{Permission, PresetPermissions, ToastDuration};
use storage::{derived_key, InboxRow};

use fakes::{inbox_rows, FakeInbox, HarnessBuilder, RecordingStore};

fn all_permissions() -> [Permission; 4] {
    [
        Permission::ReadSms,
        Permission::ReceiveSms,
        Permission::ReadPhoneState,
        Permission::PostNotifications,
    ]
}

/// **Test:** A refused permission stops the bootstrap before anything starts.
///
/// **Setup:** Gate refuses READ_SMS; inbox has messages.
///
/// **Action:** initialize().
///
/// **Expected:** Denied with READ_SMS; no writes; host stopped; long "requirement" toast.
#[tokio::test]
async fn test_denied_permission_starts_nothing() {
    let h = HarnessBuilder::new()
        .permissions(PresetPermissions::new([Permission::ReadSms]))
        .inbox(FakeInbox::with_rows(inbox_rows(3)))
        .build();

    match h.components.controller.initialize().await {
        InitOutcome::Denied { denied } => assert_eq!(denied, vec![Permission::ReadSms]),
        InitOutcome::Started { .. } => panic!("host must not start without permissions"),
    }

    assert_eq!(h.store.write_count(), 0);
    assert_eq!(h.components.service.state().await, ServiceState::Stopped);
    assert!(h.inbox.requested_limit().is_none());
    assert_eq!(h.power.exemption_requests(), 0);
    assert_eq!(
        h.notifier.toasts_with_duration(),
        vec![(TOAST_DENIED.to_string(), ToastDuration::Long)]
    );
}

/// **Test:** A full grant starts the host, syncs history and asks for the battery exemption.
///
/// **Setup:** Nothing granted yet (request path), three inbox messages, not exempt.
///
/// **Action:** initialize() and await the sync task.
///
/// **Expected:** Host running; three writes newest first; "granted" then "All SMS synced!" toasts;
/// backup channel created; one exemption request.
#[tokio::test]
async fn test_initialize_starts_host_and_syncs() {
    let h = HarnessBuilder::new()
        .inbox(FakeInbox::with_rows(inbox_rows(3)))
        .build();

    let sync = match h.components.controller.initialize().await {
        InitOutcome::Started { sync } => sync,
        InitOutcome::Denied { denied } => panic!("unexpected denial: {:?}", denied),
    };
    let report = sync.await.unwrap();

    assert_eq!(
        report,
        SyncReport {
            scanned: 3,
            saved: 3,
            failed: 0,
            error: None
        }
    );
    assert_eq!(h.components.service.state().await, ServiceState::Running);
    assert_eq!(h.inbox.requested_limit(), Some(HISTORY_SYNC_LIMIT));

    let rows = inbox_rows(3);
    let keys: Vec<String> = h.store.writes().into_iter().map(|(_, k, _)| k).collect();
    let expected: Vec<String> = rows
        .iter()
        .map(|r| derived_key(r.date, r.address.as_deref().unwrap()))
        .collect();
    assert_eq!(keys, expected);

    assert_eq!(h.notifier.toasts(), vec![TOAST_GRANTED, TOAST_SYNC_DONE]);
    assert!(h
        .notifier
        .channels()
        .iter()
        .any(|c| c.id == BACKUP_CHANNEL_ID));
    assert_eq!(h.power.exemption_requests(), 1);

    h.components.service.stop().await;
}

/// **Test:** Already granted permissions skip the prompt; an exempt host is not asked again.
#[tokio::test]
async fn test_already_granted_and_exempt() {
    let h = HarnessBuilder::new()
        .permissions(PresetPermissions::granted(all_permissions()))
        .battery_exempt(true)
        .build();

    let sync = match h.components.controller.initialize().await {
        InitOutcome::Started { sync } => sync,
        InitOutcome::Denied { denied } => panic!("unexpected denial: {:?}", denied),
    };
    let report = sync.await.unwrap();

    assert_eq!(report.scanned, 0);
    // empty inbox: no sync toast
    assert_eq!(h.notifier.toasts(), vec![TOAST_ALREADY_GRANTED]);
    assert_eq!(h.power.exemption_requests(), 0);

    h.components.service.stop().await;
}

/// **Test:** The notification permission is only required when configured so.
#[tokio::test]
async fn test_notification_permission_optional() {
    let config = ServiceConfig {
        notification_permission_required: false,
        ..ServiceConfig::default()
    };
    let h = HarnessBuilder::new()
        .config(config)
        .permissions(PresetPermissions::new([Permission::PostNotifications]))
        .build();

    assert_eq!(
        h.components.controller.required_permissions(),
        vec![
            Permission::ReadSms,
            Permission::ReceiveSms,
            Permission::ReadPhoneState
        ]
    );
    assert!(h.components.controller.authorize().await.is_ok());
}

/// **Test:** History sync never writes more than 10 messages.
///
/// **Setup:** Inbox that ignores the limit and returns 15 rows.
///
/// **Action:** sync_existing().
///
/// **Expected:** Exactly the 10 newest rows written, in order.
#[tokio::test]
async fn test_sync_is_bounded() {
    let h = HarnessBuilder::new()
        .inbox(FakeInbox::with_rows(inbox_rows(15)))
        .build();

    let report = h.components.controller.sync_existing().await;

    assert_eq!(report.scanned, 10);
    assert_eq!(report.saved, 10);
    let writes = h.store.writes();
    assert_eq!(writes.len(), 10);
    assert_eq!(writes[0].2.message, "message 0");
    assert_eq!(writes[9].2.message, "message 9");
}

/// **Test:** Partial failures are counted and reported in one toast.
#[tokio::test]
async fn test_sync_reports_partial_failure() {
    let store = RecordingStore::new();
    let rows = inbox_rows(4);
    store.fail_for(rows[1].address.as_deref().unwrap());
    let h = HarnessBuilder::new()
        .store(store)
        .inbox(FakeInbox::with_rows(rows))
        .build();

    let report = h.components.controller.sync_existing().await;

    assert_eq!(report.saved, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(h.store.write_count(), 4);
    assert_eq!(h.notifier.toasts(), vec!["Synced 3 of 4 SMS, 1 failed"]);
}

/// **Test:** An unreadable inbox yields the error toast and no writes.
#[tokio::test]
async fn test_sync_inbox_error() {
    let h = HarnessBuilder::new().inbox(FakeInbox::failing()).build();

    let report = h.components.controller.sync_existing().await;

    assert!(report.error.is_some());
    assert_eq!(report.scanned, 0);
    assert_eq!(h.store.write_count(), 0);
    assert_eq!(h.notifier.toasts(), vec![TOAST_SYNC_ERROR]);
}

/// **Test:** Null inbox columns fall back to "Unknown" and an empty body.
#[tokio::test]
async fn test_sync_null_columns() {
    let row = InboxRow {
        address: None,
        body: None,
        date: 1_000,
    };
    let h = HarnessBuilder::new()
        .inbox(FakeInbox::with_rows(vec![row]))
        .build();

    let report = h.components.controller.sync_existing().await;

    assert_eq!(report.saved, 1);
    let writes = h.store.writes();
    assert_eq!(writes[0].1, derived_key(1_000, "Unknown"));
    assert_eq!(writes[0].2.sender, "Unknown");
    assert_eq!(writes[0].2.message, "");
}
