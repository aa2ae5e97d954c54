use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_and_fetch_user() {
    let app = TestApp::spawn().await;
    let id = app.create_user("ada@example.com", "Ada", 36).await;

    let by_id = app.get(&routes::user(&id)).await;
    assert_eq!(by_id.status, 200);
    assert_eq!(by_id.body["email"], "ada@example.com");
    assert_eq!(by_id.body["name"], "Ada");
    assert_eq!(by_id.body["age"], 36);

    let by_email = app.get(&routes::user_by_email("ada@example.com")).await;
    assert_eq!(by_email.id(), id);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = TestApp::spawn().await;
    app.create_user("ada@example.com", "Ada", 36).await;

    let res = app
        .post(
            routes::USERS,
            &json!({ "email": "ada@example.com", "name": "Other", "age": 20 }),
        )
        .await;
    assert_eq!(res.status, 409);
    assert_eq!(res.code(), "CONFLICT");
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({ "email": "", "name": "Ada", "age": 1 }),
        json!({ "email": "a@b.c", "name": " ", "age": 1 }),
        json!({ "email": "a@b.c", "name": "Ada", "age": -1 }),
        json!({ "email": "a@b.c", "name": "Ada" }),
    ];
    for body in cases {
        let res = app.post(routes::USERS, &body).await;
        assert_eq!(res.status, 400, "{body} -> {}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn partial_update_keeps_id_and_other_fields() {
    let app = TestApp::spawn().await;
    let id = app.create_user("ada@example.com", "Ada", 36).await;

    let res = app.patch(&routes::user(&id), &json!({ "age": 37 })).await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.id(), id);
    assert_eq!(res.body["name"], "Ada");
    assert_eq!(res.body["age"], 37);

    let same_email = app
        .patch(&routes::user(&id), &json!({ "email": "ada@example.com" }))
        .await;
    assert_eq!(same_email.status, 200);
}

#[tokio::test]
async fn changing_email_to_taken_one_conflicts() {
    let app = TestApp::spawn().await;
    app.create_user("taken@example.com", "Taken", 1).await;
    let id = app.create_user("mine@example.com", "Mine", 2).await;

    let res = app
        .patch(&routes::user(&id), &json!({ "email": "taken@example.com" }))
        .await;
    assert_eq!(res.status, 409);

    let moved = app
        .patch(&routes::user(&id), &json!({ "email": "new@example.com" }))
        .await;
    assert_eq!(moved.status, 200);
    assert_eq!(
        app.get(&routes::user_by_email("mine@example.com"))
            .await
            .status,
        404
    );
}

#[tokio::test]
async fn delete_user() {
    let app = TestApp::spawn().await;
    let id = app.create_user("ada@example.com", "Ada", 36).await;

    assert_eq!(app.delete(&routes::user(&id)).await.status, 204);
    assert_eq!(app.get(&routes::user(&id)).await.status, 404);
    assert_eq!(app.delete(&routes::user(&id)).await.status, 404);

    let list = app.get(routes::USERS).await;
    assert!(list.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sql_backend_user_crud() {
    let app = TestApp::spawn_sql().await;
    let id = app.create_user("ada@example.com", "Ada", 36).await;

    let dup = app
        .post(
            routes::USERS,
            &json!({ "email": "ada@example.com", "name": "Other", "age": 20 }),
        )
        .await;
    assert_eq!(dup.status, 409);

    let res = app.patch(&routes::user(&id), &json!({ "name": "Lovelace" })).await;
    assert_eq!(res.body["name"], "Lovelace");
    assert_eq!(app.delete(&routes::user(&id)).await.status, 204);
}
