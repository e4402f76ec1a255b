use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use drawing_vault::client::process::apply_job;
use drawing_vault::client::rows::build_rows;
use drawing_vault::client::state::{FileListAction, FileListState};
use drawing_vault::client::{ApiClient, ClientError, FileStatus, Selection, StatusBoard};
use drawing_vault::config::Config;
use drawing_vault::models::{DocumentKind, NewProject};
use drawing_vault::services::library::Upload;
use drawing_vault::services::worker::SimulatedProcessor;
use drawing_vault::{create_routes, AppState};

async fn serve() -> (ApiClient, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = Config::local(dir.path());
    config.public_base_url = format!("http://{}", addr);
    let processor = Arc::new(SimulatedProcessor::seeded(Duration::ZERO, 1));
    let (state, worker) = AppState::build_with(config, processor).await.unwrap();
    tokio::spawn(worker.run());
    tokio::spawn(async move {
        axum::serve(listener, create_routes(state)).await.unwrap();
    });

    (ApiClient::new(&format!("http://{}", addr)).unwrap(), dir)
}

#[tokio::test]
async fn upload_list_and_delete_through_the_client() {
    let (client, _dir) = serve().await;
    let scratch = tempfile::tempdir().unwrap();
    let pdf = scratch.path().join("A-101.pdf");
    let png = scratch.path().join("A-102.png");
    std::fs::write(&pdf, vec![1u8; 500_000]).unwrap();
    std::fs::write(&png, vec![2u8; 2000]).unwrap();

    let mut state = FileListState::default();
    state.apply(FileListAction::UploadPending);
    let uploaded = client.upload_paths(&[&pdf, &png], Some("p1")).await.unwrap();
    state.apply(FileListAction::UploadFulfilled(uploaded.clone()));
    assert_eq!(state.files.len(), 2);

    let listed = client.list_files(Some("p1")).await.unwrap();
    assert_eq!(listed, uploaded);

    let rows = build_rows(&listed, &StatusBoard::default());
    assert_eq!(rows[0].kind, DocumentKind::Pdf);
    assert_eq!(rows[0].size, "488.3 KB");
    assert_eq!(rows[1].kind, DocumentKind::Image);
    assert_eq!(rows[1].status, "Not processed");

    let fetched = client.get_file(&uploaded[0].id).await.unwrap();
    assert_eq!(fetched.name, "A-101.pdf");
    assert!(fetched.url.ends_with(&format!("/uploads/{}", fetched.id)));

    let ids = vec![uploaded[0].id.clone()];
    assert_eq!(client.delete_files(&ids).await.unwrap(), 1);
    let remaining = client.list_files(Some("p1")).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "A-102.png");
}

#[tokio::test]
async fn server_errors_surface_as_status_errors() {
    let (client, _dir) = serve().await;

    match client.delete_file("missing.pdf").await {
        Err(ClientError::Status { code, message }) => {
            assert_eq!(code, 404);
            assert_eq!(message, "File not found");
        }
        other => panic!("expected a 404, got {:?}", other),
    }

    match client.upload(Vec::new(), Some("p1")).await {
        Err(ClientError::Status { code, message }) => {
            assert_eq!(code, 400);
            assert_eq!(message, "No files uploaded");
        }
        other => panic!("expected a 400, got {:?}", other),
    }
}

#[tokio::test]
async fn processing_round_updates_statuses() {
    let (client, _dir) = serve().await;
    let uploaded = client
        .upload(
            vec![
                Upload::new("a.pdf", Some("application/pdf"), b"a".to_vec()),
                Upload::new("b.pdf", Some("application/pdf"), b"b".to_vec()),
                Upload::new("c.png", Some("image/png"), b"c".to_vec()),
            ],
            None,
        )
        .await
        .unwrap();
    let ids: Vec<String> = uploaded.iter().map(|f| f.id.clone()).collect();

    let job = client.submit_job(&ids).await.unwrap();
    let done = client
        .wait_for_job(job.id, Duration::from_millis(20), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(done.results.len(), 3);

    let mut board = StatusBoard::default();
    let mut selection = Selection::default();
    let notice = apply_job(&done, &mut board, &mut selection);

    assert!(ids
        .iter()
        .all(|id| matches!(board.status(id), FileStatus::Success | FileStatus::Failure)));
    let succeeded = ids.iter().filter(|id| board.status(id) == FileStatus::Success).count();
    let expected = if succeeded == 3 {
        "Processing complete for 3 file(s).".to_string()
    } else {
        format!("Processing completed: {} succeeded, {} failed.", succeeded, 3 - succeeded)
    };
    assert_eq!(notice.message, expected);
}

#[tokio::test]
async fn projects_round_trip() {
    let (client, _dir) = serve().await;
    let created = client
        .create_project(&NewProject {
            project_name: "Compressor station".into(),
            user_id: Some("u1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let projects = client.list_projects().await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].id, created.id);
    assert_eq!(projects[0].user_id.as_deref(), Some("u1"));
}
