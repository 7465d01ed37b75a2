use binder::MultipleIdentity;

use crate::helpers::{fixture, identity, token};

#[tokio::test]
async fn test_consistency() {
    let f = fixture().await;

    // single token consistency
    assert!(
        f.consistency
            .is_consistent(std::slice::from_ref(&f.token1))
            .await
            .unwrap()
    );

    // multi (bound) token consistency
    assert!(
        f.consistency
            .is_consistent(&[f.token1.clone(), f.token2.clone()])
            .await
            .unwrap()
    );

    // multi (unbound) token consistency (failure case)
    assert!(
        !f.consistency
            .is_consistent(&[f.token1.clone(), f.token3.clone()])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_single_token_is_always_consistent() {
    let f = fixture().await;
    for t in [&f.token1, &f.token2, &f.token3] {
        assert!(f.consistency.is_consistent(&[t]).await.unwrap());
    }
    let none: [binder::AuthenticationToken; 0] = [];
    assert!(f.consistency.is_consistent(&none).await.unwrap());
}

#[tokio::test]
async fn test_two_unbound_tokens_are_inconsistent() {
    let f = fixture().await;
    let bind_me = token("bind me", "www.bindme.com");

    assert!(
        !f.consistency
            .is_consistent(&[bind_me, f.token3.clone()])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_three_tokens() {
    let f = fixture().await;

    // Two bound plus one unbound
    assert!(
        !f.consistency
            .is_consistent(&[f.token1.clone(), f.token2.clone(), f.token3.clone()])
            .await
            .unwrap()
    );

    // A repeated token does not change the outcome
    assert!(
        f.consistency
            .is_consistent(&[f.token1.clone(), f.token2.clone(), f.token1.clone()])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_tokens_across_groups() {
    let f = fixture().await;
    f.ids
        .save_multiple_identity(MultipleIdentity::with_identities([
            identity("user3", "www.somewhereelse.com"),
            identity("bind me", "www.bindme.com"),
        ]))
        .await
        .unwrap();

    assert!(
        f.consistency
            .is_consistent(&[f.token3.clone(), token("bind me", "www.bindme.com")])
            .await
            .unwrap()
    );
    assert!(
        !f.consistency
            .is_consistent(&[f.token1.clone(), f.token3.clone()])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_check_does_not_mutate_store() {
    let f = fixture().await;
    let groups_before = f.store.find_all().await.unwrap();
    let singles_before = f.store.list_singles().await.unwrap();

    f.consistency
        .is_consistent(&[f.token1.clone(), f.token3.clone()])
        .await
        .unwrap();

    assert_eq!(f.store.find_all().await.unwrap(), groups_before);
    assert_eq!(f.store.list_singles().await.unwrap(), singles_before);
}
