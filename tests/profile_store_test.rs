use dialogsm::{MemoryProfileStore, ProfileStore};

#[tokio::test]
async fn test_memory_store_registers_once() {
    let store = MemoryProfileStore::new();
    assert!(store.get("u-1").await.unwrap().is_none());

    store.register("u-1").await.unwrap();
    let first = store.get("u-1").await.unwrap().unwrap();
    store.register("u-1").await.unwrap();
    let again = store.get("u-1").await.unwrap().unwrap();

    assert_eq!(first, again);
    assert_eq!(store.len(), 1);
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use dialogsm::{ProfileStore, SqliteProfileStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sqlite_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profiles.db");

        {
            let store = SqliteProfileStore::new(&path).unwrap();
            assert!(store.get("u-9").await.unwrap().is_none());
            store.register("u-9").await.unwrap();
        }

        let store = SqliteProfileStore::new(&path).unwrap();
        let profile = store.get("u-9").await.unwrap().expect("registered user");
        assert_eq!(profile.user_id, "u-9");
        assert!(profile.data.is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_register_keeps_first_timestamp() {
        let dir = TempDir::new().unwrap();
        let store = SqliteProfileStore::new(dir.path().join("profiles.db")).unwrap();

        store.register("u-1").await.unwrap();
        let first = store.get("u-1").await.unwrap().unwrap();
        store.register("u-1").await.unwrap();
        let again = store.get("u-1").await.unwrap().unwrap();

        assert_eq!(first.registered_at, again.registered_at);
    }
}
