use crate::common::fixtures::{bag, local_ref, photo};
use crate::common::open_file_queue;
use bytes::Bytes;
use evidence_offline::application::ports::OfflineQueue;
use evidence_offline::domain::entities::offline::PendingDraft;
use evidence_offline::domain::value_objects::{RecordKind, RemoteBagId};

#[tokio::test]
async fn queue_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.db");

    let (bag_id, photo_id) = {
        let queue = open_file_queue(&path).await;
        let bag_id = queue.enqueue(bag("EB-20260103-DURAB1")).await.unwrap();
        let photo_id = queue
            .enqueue(photo(local_ref(&bag_id), "seal.jpg", b"\xff\xd8jpeg-bytes"))
            .await
            .unwrap();
        queue
            .record_bag_resolution(&bag_id, &RemoteBagId::new("srv-100".into()).unwrap())
            .await
            .unwrap();
        queue.pool().close().await;
        (bag_id, photo_id)
    };

    let queue = open_file_queue(&path).await;
    let bags = queue.list_unsynced(RecordKind::EvidenceBag).await.unwrap();
    assert_eq!(bags.len(), 1);
    assert_eq!(bags[0].id, bag_id);

    let photos = queue.list_unsynced(RecordKind::Photo).await.unwrap();
    assert_eq!(photos[0].id, photo_id);
    let PendingDraft::Photo(draft) = &photos[0].payload else {
        panic!("expected photo payload");
    };
    assert_eq!(draft.content, Bytes::from_static(b"\xff\xd8jpeg-bytes"));

    let status = queue.status().await.unwrap();
    assert_eq!(status.pending_count, 2);
    assert!(status.last_sync.is_some());

    let resolved = queue.resolve_bag(&local_ref(&bag_id)).await.unwrap();
    assert_eq!(resolved.unwrap().as_str(), "srv-100");
}
