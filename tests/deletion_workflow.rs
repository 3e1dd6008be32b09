use devregd::assets::{AssetNamespace, SimulatedAssetStore};
use devregd::core::{ApprovalState, Device, DeviceRepository, RegistryError, delete_device};
use devregd::db::MemoryDeviceRepository;

fn namespace() -> AssetNamespace {
    AssetNamespace::new("devphotos", "us-east-1", "device-photos")
}

fn device(id: &str, photo: Option<&str>) -> Device {
    Device {
        id: id.into(),
        name: "Edge Router".into(),
        manufacturer: "Acme".into(),
        model: "ER-100".into(),
        eos_date: Some("2026-01-01".into()),
        eol_date: Some("2028-01-01".into()),
        life_status: Some("active".into()),
        notes: String::new(),
        photo: photo.map(String::from),
        approval_state: ApprovalState::Published,
        created_by: "ops".into(),
    }
}

#[tokio::test]
async fn deletes_record_without_photo() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());
    repo.insert_batch(vec![device("d1", None)]).await.unwrap();

    delete_device(&repo, &store, "d1").await.unwrap();

    assert!(repo.is_empty());
    assert!(store.deleted_keys().is_empty());
}

#[tokio::test]
async fn foreign_photo_url_is_never_deleted() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());
    repo.insert_batch(vec![device("d1", Some("https://other.cdn.example/x.jpg"))])
        .await
        .unwrap();

    delete_device(&repo, &store, "d1").await.unwrap();

    assert!(repo.is_empty());
    assert!(store.deleted_keys().is_empty());
}

#[tokio::test]
async fn owned_photo_is_deleted_with_derived_key() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());
    repo.insert_batch(vec![device(
        "d1",
        Some("https://devphotos.s3.us-east-1.amazonaws.com/device-photos/abc.jpg"),
    )])
    .await
    .unwrap();

    delete_device(&repo, &store, "d1").await.unwrap();

    assert_eq!(store.deleted_keys(), vec!["device-photos/abc.jpg"]);
    assert!(repo.is_empty());
}

#[tokio::test]
async fn failed_asset_deletion_leaves_record_in_place() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());
    store.set_fail_deletes(true);
    repo.insert_batch(vec![device(
        "d1",
        Some("https://devphotos.s3.us-east-1.amazonaws.com/device-photos/abc.jpg"),
    )])
    .await
    .unwrap();

    let err = delete_device(&repo, &store, "d1").await.unwrap_err();

    assert!(matches!(err, RegistryError::AssetDeletionFailure(_)));
    assert!(store.deleted_keys().is_empty());
    // The record must survive a failed asset cleanup.
    assert!(repo.get("d1").await.unwrap().is_some());
}

#[tokio::test]
async fn unknown_id_is_not_found_and_touches_nothing() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());

    let err = delete_device(&repo, &store, "missing").await.unwrap_err();

    assert!(matches!(err, RegistryError::NotFound));
    assert_eq!(repo.write_calls(), 0);
    assert!(store.deleted_keys().is_empty());
}

#[tokio::test]
async fn second_deletion_of_same_id_is_not_found() {
    let repo = MemoryDeviceRepository::new();
    let store = SimulatedAssetStore::new(namespace());
    repo.insert_batch(vec![device("d1", None)]).await.unwrap();

    delete_device(&repo, &store, "d1").await.unwrap();
    let err = delete_device(&repo, &store, "d1").await.unwrap_err();

    assert!(matches!(err, RegistryError::NotFound));
}
