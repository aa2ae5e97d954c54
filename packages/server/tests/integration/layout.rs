use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn default_screens_are_seeded() {
    let app = TestApp::spawn().await;

    let list = app.get(routes::LAYOUTS).await;
    assert_eq!(list.status, 200);
    let screens: Vec<_> = list.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["screen_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(screens, vec!["WaveScreen", "customerTestimonials"]);

    let wave = app.get(&routes::layout_by_screen("WaveScreen")).await;
    assert_eq!(wave.body["active_layout"], "Default");
}

#[tokio::test]
async fn listed_screen_can_switch_layout() {
    let app = TestApp::spawn().await;

    let res = app
        .patch(
            &routes::layout_by_screen("WaveScreen"),
            &json!({ "active_layout": "Carousel" }),
        )
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["active_layout"], "Carousel");

    let by_id = app
        .patch(
            &routes::layout(&res.id()),
            &json!({ "active_layout": "Grid" }),
        )
        .await;
    assert_eq!(by_id.status, 200);
    assert_eq!(by_id.body["active_layout"], "Grid");
    assert_eq!(by_id.id(), res.id());
}

#[tokio::test]
async fn unlisted_existing_screen_is_locked() {
    let app = TestApp::spawn().await;
    let created = app
        .post(
            routes::LAYOUTS,
            &json!({ "screen_name": "OtherScreen", "active_layout": "Default" }),
        )
        .await;
    assert_eq!(created.status, 201);
    let id = created.id();

    let update = app
        .patch(&routes::layout(&id), &json!({ "active_layout": "Carousel" }))
        .await;
    assert_eq!(update.status, 403);
    assert_eq!(update.code(), "KEY_LOCKED");

    let delete = app.delete(&routes::layout_by_screen("OtherScreen")).await;
    assert_eq!(delete.status, 403);

    let unchanged = app.get(&routes::layout(&id)).await;
    assert_eq!(unchanged.body["active_layout"], "Default");
}

#[tokio::test]
async fn unlisted_missing_screen_is_locked_not_missing() {
    let app = TestApp::spawn().await;

    let res = app
        .patch(
            &routes::layout_by_screen("Nowhere"),
            &json!({ "active_layout": "Carousel" }),
        )
        .await;
    assert_eq!(res.status, 403);
    assert_eq!(res.code(), "KEY_LOCKED");

    assert_eq!(
        app.get(&routes::layout_by_screen("Nowhere")).await.status,
        404
    );
}

#[tokio::test]
async fn cannot_rename_listed_screen_to_unlisted_name() {
    let app = TestApp::spawn().await;
    let res = app
        .patch(
            &routes::layout_by_screen("WaveScreen"),
            &json!({ "screen_name": "Lobby" }),
        )
        .await;
    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn duplicate_screen_conflicts() {
    let app = TestApp::spawn().await;
    let res = app
        .post(
            routes::LAYOUTS,
            &json!({ "screen_name": "WaveScreen", "active_layout": "Other" }),
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");
}

#[tokio::test]
async fn blank_layout_is_rejected() {
    let app = TestApp::spawn().await;
    let res = app
        .patch(
            &routes::layout_by_screen("WaveScreen"),
            &json!({ "active_layout": "   " }),
        )
        .await;
    assert_eq!(res.status, 400);
    assert_eq!(res.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn listed_screen_can_be_deleted_and_recreated() {
    let app = TestApp::spawn().await;
    let before = app.get(&routes::layout_by_screen("customerTestimonials")).await;

    assert_eq!(
        app.delete(&routes::layout_by_screen("customerTestimonials"))
            .await
            .status,
        204
    );
    assert_eq!(app.get(&routes::layout(&before.id())).await.status, 404);

    let again = app
        .post(
            routes::LAYOUTS,
            &json!({ "screen_name": "customerTestimonials", "active_layout": "Default" }),
        )
        .await;
    assert_eq!(again.status, 201);
    assert_ne!(again.id(), before.id());
}

#[tokio::test]
async fn mutable_screens_come_from_config() {
    let app = TestApp::spawn_with(Default::default(), |c| {
        c.layout.mutable_screens = vec!["Lobby".into()];
        c.layout.default_screens = vec!["Lobby".into()];
    })
    .await;

    let lobby = app
        .patch(
            &routes::layout_by_screen("Lobby"),
            &json!({ "active_layout": "Carousel" }),
        )
        .await;
    assert_eq!(lobby.status, 200);

    let wave = app
        .patch(
            &routes::layout_by_screen("WaveScreen"),
            &json!({ "active_layout": "Carousel" }),
        )
        .await;
    assert_eq!(wave.status, 403);
}

#[tokio::test]
async fn sql_backend_enforces_policy() {
    let app = TestApp::spawn_sql().await;

    let wave = app
        .patch(
            &routes::layout_by_screen("WaveScreen"),
            &json!({ "active_layout": "Carousel" }),
        )
        .await;
    assert_eq!(wave.status, 200, "{}", wave.text);

    let created = app
        .post(
            routes::LAYOUTS,
            &json!({ "screen_name": "OtherScreen", "active_layout": "Default" }),
        )
        .await;
    let res = app.delete(&routes::layout(&created.id())).await;
    assert_eq!(res.status, 403);
}
