use tempfile::TempDir;

use binder::{
    MultipleIdentity,
    backend::{IdentityStore, database::InMemory},
};

use crate::helpers::identity;

#[tokio::test]
async fn test_in_memory_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("binder.json");

    let saved = {
        let store = InMemory::new();
        let saved = store
            .save(MultipleIdentity::with_identities([
                identity("user1", "www.example.com"),
                identity("user2", "www.example.com"),
            ]))
            .await
            .unwrap();
        store
            .save_single(identity("bind me", "www.bindme.com"))
            .await
            .unwrap();
        store.save_to_file(&file_path).await.unwrap();
        saved
    };

    assert!(file_path.exists());

    let loaded = InMemory::load_from_file(&file_path).await.unwrap();
    assert_eq!(loaded.find_all().await.unwrap(), vec![saved.clone()]);
    assert_eq!(loaded.list_singles().await.unwrap().len(), 3);
    assert_eq!(
        loaded
            .find_group_by_member("user1", "www.example.com")
            .await
            .unwrap(),
        Some(saved)
    );

    // Id allocation continues after the persisted groups
    let next = loaded
        .save(MultipleIdentity::with_identities([
            identity("user3", "www.example.com"),
            identity("bind me", "www.bindme.com"),
        ]))
        .await
        .unwrap();
    assert_eq!(next.id().unwrap().get(), 2);
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("non_existent_file.json");

    let store = InMemory::load_from_file(&path).await.unwrap();

    assert!(store.find_all().await.unwrap().is_empty());
    assert!(store.list_singles().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("invalid.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}

#[tokio::test]
async fn test_load_rejects_shared_membership() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.json");
    std::fs::write(
        &path,
        r#"{
            "singles": [],
            "groups": [
                {"id": 1, "identities": [{"subject": "user1", "issuer": "www.example.com"}]},
                {"id": 2, "identities": [{"subject": "user1", "issuer": "www.example.com"}]}
            ],
            "next_id": 2
        }"#,
    )
    .unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_integrity_error());
}
