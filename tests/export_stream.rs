use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

use devregd::core::{
    ApprovalState, Device, DeviceRepository, Identity, PAGE_SIZE, RegistryError, export_csv,
    import_csv,
};
use devregd::db::MemoryDeviceRepository;

fn device(id: &str, name: &str) -> Device {
    Device {
        id: id.into(),
        name: name.into(),
        manufacturer: "Acme".into(),
        model: "ER-100".into(),
        eos_date: Some("2026-01-01".into()),
        eol_date: None,
        life_status: Some("active".into()),
        notes: String::new(),
        photo: None,
        approval_state: ApprovalState::Published,
        created_by: "ops".into(),
    }
}

async fn collect_ok(repo: Arc<MemoryDeviceRepository>) -> String {
    let mut stream = Box::pin(export_csv(repo));
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.expect("stream chunk"));
    }
    String::from_utf8(out).expect("export is utf-8")
}

#[tokio::test]
async fn empty_collection_exports_header_only() {
    let repo = Arc::new(MemoryDeviceRepository::new());
    let body = collect_ok(repo).await;

    assert_eq!(
        body,
        "id,name,manufacturer,model,eos_date,eol_date,life_status,approval_state,created_by,notes,photo\n"
    );
}

#[tokio::test]
async fn one_chunk_per_record_after_header() {
    let repo = Arc::new(MemoryDeviceRepository::new());
    repo.insert_batch(vec![device("d1", "Edge"), device("d2", "Core")])
        .await
        .unwrap();

    let chunks: Vec<Bytes> = Box::pin(export_csv(repo.clone()))
        .map(|c| c.unwrap())
        .collect()
        .await;

    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].starts_with(b"id,name,"));
    assert!(chunks[1].starts_with(b"d1,Edge,"));
    assert!(chunks[2].starts_with(b"d2,Core,"));
}

#[tokio::test]
async fn absent_fields_render_as_empty_strings() {
    let repo = Arc::new(MemoryDeviceRepository::new());
    let mut d = device("d1", "Edge");
    d.eos_date = None;
    d.life_status = None;
    repo.insert_batch(vec![d]).await.unwrap();

    let body = collect_ok(repo).await;
    let row = body.lines().nth(1).unwrap();
    assert_eq!(row, "d1,Edge,Acme,ER-100,,,,published,ops,,");
}

#[tokio::test]
async fn export_reimport_round_trips_device_fields() {
    let source = Arc::new(MemoryDeviceRepository::new());
    let mut with_extras = device("d1", "Edge Router");
    with_extras.notes = "has, a comma".into();
    with_extras.photo = Some("https://img.example/x.jpg".into());
    let mut sparse = device("d2", "Core Switch");
    sparse.eos_date = None;
    sparse.life_status = None;
    source
        .insert_batch(vec![with_extras.clone(), sparse.clone()])
        .await
        .unwrap();

    let exported = collect_ok(source).await;

    let target = Arc::new(MemoryDeviceRepository::new());
    let reimporter = Identity {
        username: "reimporter".into(),
        is_admin: true,
    };
    let summary = import_csv(&*target, exported.as_bytes(), &reimporter)
        .await
        .unwrap();
    assert_eq!(summary.imported, 2);

    let page = target.scan_page(None, 10).await.unwrap();
    for (original, (_, copy)) in [with_extras, sparse].iter().zip(page.iter()) {
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.manufacturer, original.manufacturer);
        assert_eq!(copy.model, original.model);
        assert_eq!(copy.eos_date, original.eos_date);
        assert_eq!(copy.eol_date, original.eol_date);
        assert_eq!(copy.life_status, original.life_status);
        assert_eq!(copy.notes, original.notes);
        assert_eq!(copy.photo, original.photo);
        // Forced on import regardless of the exported values.
        assert_eq!(copy.approval_state, ApprovalState::Published);
        assert_eq!(copy.created_by, "reimporter");
        assert_ne!(copy.id, original.id);
    }
}

#[tokio::test]
async fn mid_stream_read_failure_surfaces_after_emitted_chunks() {
    let repo = Arc::new(MemoryDeviceRepository::new());
    let devices: Vec<Device> = (0..PAGE_SIZE + 10)
        .map(|i| device(&format!("d{i}"), "Edge"))
        .collect();
    repo.insert_batch(devices).await.unwrap();

    let mut stream = Box::pin(export_csv(repo.clone()));

    // Header plus the first full page arrive intact.
    let mut emitted = 0usize;
    for _ in 0..(PAGE_SIZE as usize + 1) {
        let chunk = stream.next().await.expect("chunk").expect("ok chunk");
        assert!(!chunk.is_empty());
        emitted += 1;
    }
    assert_eq!(emitted, PAGE_SIZE as usize + 1);

    // The next page hits a failing repository.
    repo.set_fail_reads(true);
    let err = stream.next().await.expect("error item").unwrap_err();
    assert!(matches!(err, RegistryError::StorageReadFailure(_)));
}
