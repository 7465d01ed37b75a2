use binder::{IdentityService, MultipleIdentity};

use crate::helpers::{fixture, identity, test_store};

#[tokio::test]
async fn test_get_single() {
    let f = fixture().await;

    assert_eq!(
        f.ids
            .get_single_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap(),
        Some(f.identity1.clone())
    );
    assert_eq!(
        f.ids
            .get_single_by_subject_issuer("bind me", "www.bindme.com")
            .await
            .unwrap(),
        Some(f.identity3.clone())
    );
    assert!(
        f.ids
            .get_single_by_subject_issuer("mr. shouldn't exist", "www.somewhereelse.net")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_get_multiple() {
    let f = fixture().await;

    // A second, unrelated group must not be returned for multi1's members
    f.ids
        .save_multiple_identity(MultipleIdentity::with_identities([
            identity("user9", "www.example.org"),
        ]))
        .await
        .unwrap();

    // success case
    assert_eq!(
        f.ids
            .get_multiple_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap(),
        Some(f.multi1.clone())
    );
    assert_eq!(
        f.ids
            .get_multiple_by_subject_issuer("user2", "www.example.com")
            .await
            .unwrap(),
        Some(f.multi1.clone())
    );

    // failure case
    assert!(
        f.ids
            .get_multiple_by_subject_issuer("mr. shouldn't exist", "www.somewhereelse.net")
            .await
            .unwrap()
            .is_none()
    );
    // Registered but never bound
    assert!(
        f.ids
            .get_multiple_by_subject_issuer("bind me", "www.bindme.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_get_multiple_with_no_groups() {
    let ids = IdentityService::new(test_store().await);
    assert!(
        ids.get_multiple_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_convert_token_identity() {
    let f = fixture().await;

    assert_eq!(
        f.ids.convert_token_identity(&f.token1).await.unwrap(),
        f.identity1
    );

    // First sight of token3 registers it without binding it
    let identity3 = f.ids.convert_token_identity(&f.token3).await.unwrap();
    assert_eq!(identity3, identity("user3", "www.somewhereelse.com"));
    assert_eq!(
        f.ids
            .get_single_by_subject_issuer("user3", "www.somewhereelse.com")
            .await
            .unwrap(),
        Some(identity3)
    );
    assert!(
        f.ids
            .get_multiple_by_subject_issuer("user3", "www.somewhereelse.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_save_round_trip() {
    let f = fixture().await;

    // Saving an already identified group echoes it field for field
    let saved = f.ids.save_multiple_identity(f.multi1.clone()).await.unwrap();
    assert_eq!(saved, f.multi1);

    // A new group gets an id and keeps its members
    let fresh = MultipleIdentity::with_identities([
        f.identity3.clone(),
        identity("user3", "www.somewhereelse.com"),
    ]);
    let saved = f.ids.save_multiple_identity(fresh.clone()).await.unwrap();
    assert!(saved.id().is_some());
    assert_ne!(saved.id(), f.multi1.id());
    assert_eq!(saved.identities(), fresh.identities());
}

#[tokio::test]
async fn test_unbind() {
    let f = fixture().await;
    let mut multi1 = f.multi1.clone();

    assert!(multi1.identities().contains(&f.identity1));
    assert!(multi1.identities().contains(&f.identity2));

    assert!(
        f.ids
            .unbind_by_subject_issuer(&mut multi1, "user1", "www.example.com")
    );
    assert!(!multi1.identities().contains(&f.identity1));
    assert_eq!(multi1.len(), f.multi1.len() - 1);

    // Second call is a no-op
    let before = multi1.clone();
    assert!(
        !f.ids
            .unbind_by_subject_issuer(&mut multi1, "user1", "www.example.com")
    );
    assert_eq!(multi1, before);

    // Nothing is persisted until the caller saves
    assert_eq!(
        f.ids
            .get_multiple_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap(),
        Some(f.multi1.clone())
    );
    f.ids.save_multiple_identity(multi1).await.unwrap();
    assert!(
        f.ids
            .get_multiple_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap()
            .is_none()
    );
    // The single identity record itself is kept
    assert_eq!(
        f.ids
            .get_single_by_subject_issuer("user1", "www.example.com")
            .await
            .unwrap(),
        Some(f.identity1)
    );
}
