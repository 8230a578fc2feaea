use chrono::Utc;
use crate::common::fixtures::{bag, custody, local_ref, photo, remote_ref};
use crate::common::mocks::RemoteCall;
use crate::common::{setup_sync, setup_sync_with};
use evidence_offline::application::ports::{OfflineQueue, RemoteError};
use evidence_offline::domain::entities::offline::PendingDraft;
use evidence_offline::domain::value_objects::{PendingRecordId, RecordKind, RemoteBagId};
use evidence_offline::shared::config::SyncConfig;

#[tokio::test]
async fn second_sync_finds_nothing_new() {
    let ctx = setup_sync().await;
    let bag_id = ctx.queue.enqueue(bag("EB-20260102-IDEMP0")).await.unwrap();
    ctx.queue
        .enqueue(custody(local_ref(&bag_id), "officer-1"))
        .await
        .unwrap();
    ctx.queue
        .enqueue(photo(local_ref(&bag_id), "scene.jpg", b"scene"))
        .await
        .unwrap();

    let first = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(first.success, 3);
    let calls_after_first = ctx.remote.calls().len();

    let second = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(second.success, 0);
    assert_eq!(second.failed, 0);
    assert_eq!(ctx.remote.calls().len(), calls_after_first);
}

#[tokio::test]
async fn resolved_bag_is_never_created_twice() {
    let ctx = setup_sync().await;
    let bag_id = ctx.queue.enqueue(bag("EB-20260102-CRASH0")).await.unwrap();

    // A previous cycle reached the server but never flipped the synced flag.
    ctx.queue
        .record_bag_resolution(&bag_id, &RemoteBagId::new("srv-9".into()).unwrap())
        .await
        .unwrap();
    ctx.queue
        .enqueue(custody(local_ref(&bag_id), "officer-2"))
        .await
        .unwrap();

    let report = ctx.service.sync_offline_data().await.unwrap();

    assert_eq!(report.success, 2);
    assert_eq!(ctx.remote.create_calls(), 0);
    assert!(ctx.remote.calls().contains(&RemoteCall::AppendCustody {
        bag_id: "srv-9".into(),
        performed_by: "officer-2".into(),
    }));
}

#[tokio::test]
async fn partitions_drain_in_dependency_order() {
    let ctx = setup_sync().await;
    // Enqueued in reverse order on purpose.
    ctx.queue
        .enqueue(photo(remote_ref("srv-1"), "early.jpg", b"early"))
        .await
        .unwrap();
    ctx.queue
        .enqueue(custody(remote_ref("srv-1"), "officer-3"))
        .await
        .unwrap();
    ctx.queue.enqueue(bag("EB-20260102-ORDER0")).await.unwrap();

    ctx.service.sync_offline_data().await.unwrap();

    let calls = ctx.remote.calls();
    let position = |pred: fn(&RemoteCall) -> bool| calls.iter().position(|c| pred(c)).unwrap();
    let create = position(|c| matches!(c, RemoteCall::CreateBag { .. }));
    let append = position(|c| matches!(c, RemoteCall::AppendCustody { .. }));
    let upload = position(|c| matches!(c, RemoteCall::UploadPhoto { .. }));
    assert!(create < append);
    assert!(append < upload);
}

#[tokio::test]
async fn failures_do_not_stop_later_records_or_kinds() {
    let ctx = setup_sync().await;
    ctx.queue.enqueue(bag("EB-A")).await.unwrap();
    ctx.queue.enqueue(bag("EB-B")).await.unwrap();
    ctx.queue.enqueue(bag("EB-C")).await.unwrap();
    ctx.queue
        .enqueue(custody(remote_ref("srv-5"), "officer-4"))
        .await
        .unwrap();
    ctx.remote
        .fail("EB-A", RemoteError::Rejected("duplicate display id".into()));

    let report = ctx.service.sync_offline_data().await.unwrap();

    assert_eq!(report.success, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(ctx.remote.create_calls(), 3);
}

#[tokio::test]
async fn cleanup_keeps_unsynced_payloads_intact() {
    let ctx = setup_sync().await;
    ctx.queue.enqueue(bag("EB-KEEP")).await.unwrap();
    ctx.queue.enqueue(bag("EB-GONE")).await.unwrap();
    let before = ctx.queue.list_unsynced(RecordKind::EvidenceBag).await.unwrap();
    ctx.remote
        .fail("EB-KEEP", RemoteError::Network("timeout".into()));

    let report = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(report.success, 1);

    let after = ctx.queue.list_unsynced(RecordKind::EvidenceBag).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[0].payload, before[0].payload);
    assert_eq!(after[0].timestamp, before[0].timestamp);

    let (synced_rows,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM pending_evidence_bags WHERE synced = 1")
            .fetch_one(ctx.queue.pool())
            .await
            .unwrap();
    assert_eq!(synced_rows, 0);
}

#[tokio::test]
async fn pending_count_matches_live_unsynced_rows() {
    let ctx = setup_sync().await;
    let bag_id = ctx.queue.enqueue(bag("EB-COUNT")).await.unwrap();
    ctx.queue
        .enqueue(custody(local_ref(&bag_id), "officer-5"))
        .await
        .unwrap();
    ctx.queue
        .enqueue(photo(remote_ref("srv-2"), "count.jpg", b"count"))
        .await
        .unwrap();
    assert_eq!(ctx.queue.status().await.unwrap().pending_count, 3);

    ctx.remote
        .fail("count.jpg", RemoteError::Storage("bucket full".into()));
    ctx.service.sync_offline_data().await.unwrap();

    let status = ctx.queue.status().await.unwrap();
    let (live,): (i64,) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM pending_evidence_bags WHERE synced = 0) \
         + (SELECT COUNT(*) FROM pending_custody_logs WHERE synced = 0) \
         + (SELECT COUNT(*) FROM pending_photos WHERE synced = 0)",
    )
    .fetch_one(ctx.queue.pool())
    .await
    .unwrap();
    assert_eq!(i64::from(status.pending_count), live);
    assert_eq!(status.pending_count, 1);
    assert!(status.last_sync.is_some());
}

#[tokio::test]
async fn poison_record_is_dead_lettered_after_retry_budget() {
    let ctx = setup_sync_with(SyncConfig {
        max_retry: 2,
        ..SyncConfig::default()
    })
    .await;
    let id = ctx
        .queue
        .enqueue(custody(remote_ref("srv-deleted"), "officer-6"))
        .await
        .unwrap();
    ctx.remote
        .fail("officer-6", RemoteError::Rejected("bag does not exist".into()));

    let first = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(first.dead_lettered, 0);
    let second = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(second.dead_lettered, 1);

    let third = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(third.attempted(), 0);

    let status = ctx.queue.status().await.unwrap();
    assert_eq!(status.pending_count, 1);
    assert_eq!(status.dead_letter_count, 1);
    assert!(status.has_stuck_items());

    let dead = ctx
        .queue
        .list_dead_letters(RecordKind::CustodyLog)
        .await
        .unwrap();
    assert_eq!(dead[0].id, id);
    assert_eq!(dead[0].retry_count, 2);
    assert_eq!(
        dead[0].last_error.as_deref(),
        Some("Rejected by remote: bag does not exist")
    );

    ctx.remote.heal("officer-6");
    assert!(
        ctx.queue
            .requeue_dead_letter(RecordKind::CustodyLog, &id)
            .await
            .unwrap()
    );
    let retried = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(retried.success, 1);
    assert_eq!(retried.pending_count, 0);
}

#[tokio::test]
async fn dependents_wait_for_their_bag_without_spending_retries() {
    let ctx = setup_sync_with(SyncConfig {
        max_retry: 1,
        ..SyncConfig::default()
    })
    .await;
    let bag_id = ctx.queue.enqueue(bag("EB-BLOCKED")).await.unwrap();
    ctx.queue
        .enqueue(photo(local_ref(&bag_id), "blocked.jpg", b"blocked"))
        .await
        .unwrap();
    ctx.remote.set_offline(true);

    let report = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(report.failed, 2);
    assert_eq!(report.dead_lettered, 1);

    // Only the bag reached the remote; the photo was deferred locally.
    assert_eq!(ctx.remote.calls().len(), 1);
    let photos = ctx.queue.list_unsynced(RecordKind::Photo).await.unwrap();
    assert_eq!(photos[0].retry_count, 0);
    assert!(!photos[0].dead_lettered);
}

#[tokio::test]
async fn dependents_resolve_through_earlier_cycles() {
    let ctx = setup_sync().await;
    let bag_id = ctx.queue.enqueue(bag("EB-LATER")).await.unwrap();
    ctx.queue
        .enqueue(custody(local_ref(&bag_id), "officer-8"))
        .await
        .unwrap();
    ctx.remote
        .fail("officer-8", RemoteError::Network("reset".into()));

    // The bag goes up and leaves the queue; its custody entry stays behind.
    let first = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!((first.success, first.failed), (1, 1));
    assert!(!ctx.queue.has_queued_bag(&local_ref(&bag_id)).await.unwrap());

    ctx.remote.heal("officer-8");
    ctx.remote.clear_calls();
    let report = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(report.success, 1);
    assert_eq!(
        ctx.remote.calls(),
        vec![RemoteCall::AppendCustody {
            bag_id: "srv-42".into(),
            performed_by: "officer-8".into(),
        }]
    );

    // Nothing refers to the local id any more, so its resolution is dropped.
    let resolved = ctx.queue.resolve_bag(&local_ref(&bag_id)).await.unwrap();
    assert!(resolved.is_none());
}

#[tokio::test]
async fn dependent_of_unknown_bag_is_dead_lettered() {
    let ctx = setup_sync_with(SyncConfig {
        max_retry: 2,
        ..SyncConfig::default()
    })
    .await;
    let ghost = PendingRecordId::generate(RecordKind::EvidenceBag, Utc::now());
    let id = ctx
        .queue
        .enqueue(custody(local_ref(&ghost), "officer-13"))
        .await
        .unwrap();

    let first = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!((first.failed, first.dead_lettered), (1, 0));
    let second = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!((second.failed, second.dead_lettered), (1, 1));
    let third = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(third.attempted(), 0);

    assert!(ctx.remote.calls().is_empty());
    let dead = ctx
        .queue
        .list_dead_letters(RecordKind::CustodyLog)
        .await
        .unwrap();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].id, id);
    assert_eq!(dead[0].retry_count, 2);
    assert_eq!(
        dead[0].last_error.as_deref(),
        Some(format!("bag {ghost} is no longer queued").as_str())
    );
}

#[tokio::test]
async fn dependent_of_removed_bag_spends_its_retries() {
    let ctx = setup_sync_with(SyncConfig {
        max_retry: 1,
        ..SyncConfig::default()
    })
    .await;
    let bag_id = ctx.queue.enqueue(bag("EB-DROPPED")).await.unwrap();
    ctx.queue
        .enqueue(photo(local_ref(&bag_id), "orphan.jpg", b"orphan"))
        .await
        .unwrap();
    assert!(
        ctx.queue
            .remove(RecordKind::EvidenceBag, &bag_id)
            .await
            .unwrap()
    );

    let report = ctx.service.sync_offline_data().await.unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.dead_lettered, 1);
    assert!(ctx.remote.calls().is_empty());
    assert_eq!(ctx.queue.status().await.unwrap().dead_letter_count, 1);
}

#[tokio::test]
async fn queued_payload_keeps_its_local_bag_reference() {
    let ctx = setup_sync().await;
    let bag_id = ctx.queue.enqueue(bag("EB-REF")).await.unwrap();
    ctx.queue
        .enqueue(custody(local_ref(&bag_id), "officer-10"))
        .await
        .unwrap();
    ctx.remote
        .fail("officer-10", RemoteError::Network("reset".into()));

    ctx.service.sync_offline_data().await.unwrap();

    let custody = ctx.queue.list_unsynced(RecordKind::CustodyLog).await.unwrap();
    let PendingDraft::CustodyLog(draft) = &custody[0].payload else {
        panic!("expected custody payload");
    };
    assert_eq!(draft.bag_id, local_ref(&bag_id));
}
