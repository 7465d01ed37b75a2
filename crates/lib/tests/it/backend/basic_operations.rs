use binder::{GroupId, MultipleIdentity};

use crate::helpers::{identity, test_store};

#[tokio::test]
async fn test_empty_store() {
    let store = test_store().await;

    assert!(store.find_all().await.unwrap().is_empty());
    assert!(store.list_singles().await.unwrap().is_empty());
    assert!(
        store
            .find_by_subject_and_issuer("user1", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        store
            .find_group_by_member("user1", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_save_assigns_id_and_echoes_members() {
    let store = test_store().await;
    let group = MultipleIdentity::with_identities([
        identity("user1", "www.example.com"),
        identity("user2", "www.example.com"),
    ]);

    let saved = store.save(group.clone()).await.unwrap();
    let id = saved.id().expect("store should assign an id");
    assert_eq!(saved.identities(), group.identities());

    let fetched = store.get_group(id).await.unwrap();
    assert_eq!(fetched, saved);

    // Members are recorded as single identities too
    assert_eq!(
        store
            .find_by_subject_and_issuer("user2", "www.example.com")
            .await
            .unwrap(),
        Some(identity("user2", "www.example.com"))
    );
}

#[tokio::test]
async fn test_save_existing_group_keeps_id() {
    let store = test_store().await;
    let mut group = store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user2", "www.example.com"),
        ]))
        .await
        .unwrap();
    let id = group.id().unwrap();

    group.insert(identity("user1", "accounts.other.org"));
    let resaved = store.save(group).await.unwrap();
    assert_eq!(resaved.id(), Some(id));
    assert_eq!(resaved.len(), 3);
    assert_eq!(store.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_save_rejects_member_of_other_group() {
    let store = test_store().await;
    let first = store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user2", "www.example.com"),
        ]))
        .await
        .unwrap();

    let err = store
        .save(MultipleIdentity::with_identities([
            identity("user2", "www.example.com"),
            identity("user3", "www.example.com"),
        ]))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    // The first group is untouched and no second group exists
    let all = store.find_all().await.unwrap();
    assert_eq!(all, vec![first]);
}

#[tokio::test]
async fn test_save_unknown_id_is_not_found() {
    let store = test_store().await;
    let mut group = MultipleIdentity::with_identities([identity("user1", "www.example.com")]);
    group.set_id(GroupId::new(999));

    let err = store.save(group).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_find_group_by_member() {
    let store = test_store().await;
    let saved = store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user2", "www.example.com"),
        ]))
        .await
        .unwrap();
    store
        .save_single(identity("loner", "www.example.com"))
        .await
        .unwrap();

    assert_eq!(
        store
            .find_group_by_member("user2", "www.example.com")
            .await
            .unwrap(),
        Some(saved)
    );
    assert!(
        store
            .find_group_by_member("loner", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
    // Same subject from another issuer is a different identity
    assert!(
        store
            .find_group_by_member("user2", "www.example.net")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_delete_group_unbinds_members() {
    let store = test_store().await;
    let saved = store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user2", "www.example.com"),
        ]))
        .await
        .unwrap();
    let id = saved.id().unwrap();

    store.delete_group(id).await.unwrap();

    assert!(store.get_group(id).await.unwrap_err().is_not_found());
    assert!(store.delete_group(id).await.unwrap_err().is_not_found());
    assert!(
        store
            .find_group_by_member("user1", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
    // Single identity records survive
    assert_eq!(store.list_singles().await.unwrap().len(), 2);

    // Freed members can join a new group
    store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user3", "www.example.com"),
        ]))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deleted_group_id_is_not_reused() {
    let store = test_store().await;
    store
        .save(MultipleIdentity::with_identities([
            identity("user1", "www.example.com"),
            identity("user2", "www.example.com"),
        ]))
        .await
        .unwrap();
    let stale = store
        .save(MultipleIdentity::with_identities([
            identity("user3", "www.example.com"),
            identity("user4", "www.example.com"),
        ]))
        .await
        .unwrap();
    store.delete_group(stale.id().unwrap()).await.unwrap();

    let fresh = store
        .save(MultipleIdentity::with_identities([
            identity("x", "www.example.com"),
            identity("y", "www.example.com"),
        ]))
        .await
        .unwrap();
    assert!(fresh.id() > stale.id());

    // Writing back a copy of the deleted group must not touch the new one
    let err = store.save(stale).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        store.find_group_by_member("x", "www.example.com").await.unwrap(),
        Some(fresh)
    );
}

#[tokio::test]
async fn test_save_single_is_idempotent() {
    let store = test_store().await;
    let loner = identity("loner", "www.example.com");

    assert_eq!(store.save_single(loner.clone()).await.unwrap(), loner);
    store.save_single(loner.clone()).await.unwrap();

    assert_eq!(store.list_singles().await.unwrap(), vec![loner]);
}
