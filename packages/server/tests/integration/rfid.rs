use futures::future::join_all;
use kiosk_common::storage::filesystem::staging_dir_for;
use reqwest::Method;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_then_lookup_by_code_and_id() {
    let app = TestApp::spawn().await;

    let created = app.create_rfid("A123", b"first video").await;
    let id = created.id();
    let video_url = created.body["video_url"].as_str().unwrap().to_string();
    assert_eq!(created.body["rfid_code"], "A123");
    assert!(video_url.starts_with("/uploads/"));
    assert!(video_url.ends_with(".mp4"));

    let by_code = app.get(&routes::rfid_by_code("A123")).await;
    assert_eq!(by_code.status, 200);
    assert_eq!(by_code.id(), id);

    let by_id = app.get(&routes::rfid(&id)).await;
    assert_eq!(by_id.status, 200);
    assert_eq!(by_id.body["video_url"], video_url.as_str());

    let (status, bytes) = app.fetch_upload(&video_url).await;
    assert_eq!(status, 200);
    assert_eq!(bytes, b"first video");
}

#[tokio::test]
async fn duplicate_code_conflicts_and_leaves_no_orphan() {
    let app = TestApp::spawn().await;
    app.create_rfid("A123", b"one").await;

    let res = app
        .send_rfid_form(
            Method::POST,
            routes::RFID,
            Some("A123"),
            Some(("other.mp4", b"two".to_vec())),
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");

    assert_eq!(app.stored_file_count(), 1);
    let list = app.get(routes::RFID).await;
    assert_eq!(list.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn code_lookup_is_case_sensitive() {
    let app = TestApp::spawn().await;
    app.create_rfid("AbC", b"v").await;

    assert_eq!(app.get(&routes::rfid_by_code("abc")).await.status, 404);
    assert_eq!(app.get(&routes::rfid_by_code("AbC")).await.status, 200);
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = TestApp::spawn().await;

    let no_video = app
        .send_rfid_form(Method::POST, routes::RFID, Some("A1"), None)
        .await;
    assert_eq!(no_video.status, 400);
    assert_eq!(no_video.code(), "VALIDATION_ERROR");

    let no_code = app
        .send_rfid_form(
            Method::POST,
            routes::RFID,
            None,
            Some(("clip.mp4", b"orphan".to_vec())),
        )
        .await;
    assert_eq!(no_code.status, 400);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn updating_code_to_itself_succeeds() {
    let app = TestApp::spawn().await;
    let created = app.create_rfid("B1", b"v").await;
    let id = created.id();

    let res = app
        .send_rfid_form(Method::PUT, &routes::rfid(&id), Some("B1"), None)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.id(), id);
    assert_eq!(res.body["rfid_code"], "B1");
    assert_eq!(res.body["video_url"], created.body["video_url"]);
}

#[tokio::test]
async fn renaming_onto_taken_code_conflicts_and_keeps_files() {
    let app = TestApp::spawn().await;
    app.create_rfid("Taken", b"a").await;
    let mine = app.create_rfid("Mine", b"b").await;

    let res = app
        .send_rfid_form(
            Method::PUT,
            &routes::rfid(&mine.id()),
            Some("Taken"),
            Some(("new.mp4", b"c".to_vec())),
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(app.stored_file_count(), 2);

    let current = app.get(&routes::rfid(&mine.id())).await;
    assert_eq!(current.body["rfid_code"], "Mine");
    assert_eq!(current.body["video_url"], mine.body["video_url"]);
}

#[tokio::test]
async fn replacing_video_removes_old_file() {
    let app = TestApp::spawn().await;
    let created = app.create_rfid("C1", b"old").await;
    let id = created.id();
    let old_url = created.body["video_url"].as_str().unwrap().to_string();

    let res = app
        .send_rfid_form(
            Method::PUT,
            &routes::rfid(&id),
            None,
            Some(("f2.mp4", b"new".to_vec())),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    let new_url = res.body["video_url"].as_str().unwrap().to_string();
    assert_ne!(new_url, old_url);
    assert_eq!(res.body["rfid_code"], "C1");

    let fetched = app.get(&routes::rfid(&id)).await;
    assert_eq!(fetched.body["video_url"], new_url.as_str());

    assert_eq!(app.fetch_upload(&old_url).await.0, 404);
    assert_eq!(app.fetch_upload(&new_url).await, (200, b"new".to_vec()));
    assert_eq!(app.stored_file_count(), 1);
}

#[tokio::test]
async fn delete_removes_entry_and_video() {
    let app = TestApp::spawn().await;
    let created = app.create_rfid("D1", b"bye").await;
    let id = created.id();
    let url = created.body["video_url"].as_str().unwrap().to_string();

    let res = app.delete(&routes::rfid(&id)).await;
    assert_eq!(res.status, 204);

    assert_eq!(app.get(&routes::rfid(&id)).await.status, 404);
    assert_eq!(app.fetch_upload(&url).await.0, 404);
    assert_eq!(app.stored_file_count(), 0);

    let again = app.delete(&routes::rfid(&id)).await;
    assert_eq!(again.status, 404);
    assert_eq!(again.code(), "NOT_FOUND");
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let app = TestApp::spawn().await;
    let res = app.get(&routes::rfid("not-a-uuid")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.code(), "NOT_FOUND");
}

#[tokio::test]
async fn oversized_video_is_rejected_without_leftovers() {
    let app = TestApp::spawn_with(Default::default(), |c| {
        c.storage.max_upload_size = 16;
    })
    .await;

    let res = app
        .send_rfid_form(
            Method::POST,
            routes::RFID,
            Some("Big"),
            Some(("big.mp4", vec![7u8; 64])),
        )
        .await;
    assert_eq!(res.status, 413);
    assert_eq!(res.code(), "PAYLOAD_TOO_LARGE");
    assert_eq!(app.stored_file_count(), 0);
    assert_eq!(app.get(&routes::rfid_by_code("Big")).await.status, 404);
}

#[tokio::test]
async fn concurrent_creates_on_one_code_store_one_video() {
    let app = TestApp::spawn().await;

    let attempts = (0..8).map(|i| {
        app.send_rfid_form(
            Method::POST,
            routes::RFID,
            Some("Race"),
            Some(("clip.mp4", format!("video {i}").into_bytes())),
        )
    });
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.status == 201).count();
    let conflicts = results.iter().filter(|r| r.status == 409).count();
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(app.stored_file_count(), 1);
}

#[tokio::test]
async fn sql_backend_round_trip() {
    let app = TestApp::spawn_sql().await;

    let created = app.create_rfid("S1", b"sql").await;
    let id = created.id();

    let dup = app
        .send_rfid_form(
            Method::POST,
            routes::RFID,
            Some("S1"),
            Some(("dup.mp4", b"dup".to_vec())),
        )
        .await;
    assert_eq!(dup.status, 409);
    assert_eq!(app.stored_file_count(), 1);

    assert_eq!(app.get(&routes::rfid_by_code("S1")).await.id(), id);
    assert_eq!(app.delete(&routes::rfid(&id)).await.status, 204);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn staged_uploads_are_not_served() {
    let app = TestApp::spawn().await;
    let staging = staging_dir_for(&app.upload_dir);
    std::fs::write(staging.join("inflight"), b"partial").unwrap();

    let (status, _) = app.fetch_upload("/uploads/.tmp/inflight").await;
    assert_eq!(status, 404);
    let (status, _) = app.fetch_upload("/uploads/inflight").await;
    assert_eq!(status, 404);
    assert_eq!(app.stored_file_count(), 0);
}
