use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;

use server::config::{AppConfig, DatabaseConfig, StoreBackend};
use server::state::AppState;

pub mod routes {
    pub const RFID: &str = "/api/v1/rfid";
    pub const LAYOUTS: &str = "/api/v1/layouts";
    pub const USERS: &str = "/api/v1/users";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn rfid(id: &str) -> String {
        format!("/api/v1/rfid/{id}")
    }

    pub fn rfid_by_code(code: &str) -> String {
        format!("/api/v1/rfid/code/{code}")
    }

    pub fn layout(id: &str) -> String {
        format!("/api/v1/layouts/{id}")
    }

    pub fn layout_by_screen(screen: &str) -> String {
        format!("/api/v1/layouts/screen/{screen}")
    }

    pub fn user(id: &str) -> String {
        format!("/api/v1/users/{id}")
    }

    pub fn user_by_email(email: &str) -> String {
        format!("/api/v1/users/email/{email}")
    }
}

/// A running test server with its own scratch directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub upload_dir: PathBuf,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    /// Server over JSON documents, with default layouts seeded.
    pub async fn spawn() -> Self {
        Self::spawn_with(StoreBackend::Json, |_| {}).await
    }

    /// Server over a SQLite database file, with default layouts seeded.
    pub async fn spawn_sql() -> Self {
        Self::spawn_with(StoreBackend::Sql, |_| {}).await
    }

    pub async fn spawn_with(backend: StoreBackend, tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let upload_dir = dir.path().join("uploads");

        let mut config = AppConfig {
            database: DatabaseConfig {
                backend,
                url: format!(
                    "sqlite://{}?mode=rwc",
                    dir.path().join("kiosk.db").display()
                ),
                data_dir: dir.path().join("data"),
            },
            ..Default::default()
        };
        config.storage.upload_dir = upload_dir.clone();
        config.storage.max_upload_size = 1024 * 1024;
        tweak(&mut config);

        let state = AppState::init(config)
            .await
            .expect("Failed to initialize app state");
        server::seed::seed_layouts(&state.layouts, &state.config.layout)
            .await
            .expect("Failed to seed layouts");

        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            upload_dir,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send PATCH request");

        TestResponse::from_response(res).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// Send a multipart RFID form. `video` is `(file name, bytes)`.
    pub async fn send_rfid_form(
        &self,
        method: reqwest::Method,
        path: &str,
        rfid_code: Option<&str>,
        video: Option<(&str, Vec<u8>)>,
    ) -> TestResponse {
        let mut form = reqwest::multipart::Form::new();
        if let Some(code) = rfid_code {
            form = form.text("rfid_code", code.to_string());
        }
        if let Some((name, bytes)) = video {
            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(name.to_string())
                .mime_str("video/mp4")
                .expect("Failed to set MIME type");
            form = form.part("video", part);
        }

        let res = self
            .client
            .request(method, self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart request");

        TestResponse::from_response(res).await
    }

    /// Create an RFID entry via the API and return the response.
    pub async fn create_rfid(&self, code: &str, video: &[u8]) -> TestResponse {
        let res = self
            .send_rfid_form(
                reqwest::Method::POST,
                routes::RFID,
                Some(code),
                Some(("clip.mp4", video.to_vec())),
            )
            .await;
        assert_eq!(res.status, 201, "create_rfid failed: {}", res.text);
        res
    }

    /// Create a user via the API and return its `id`.
    pub async fn create_user(&self, email: &str, name: &str, age: i32) -> String {
        let res = self
            .post(
                routes::USERS,
                &serde_json::json!({ "email": email, "name": name, "age": age }),
            )
            .await;
        assert_eq!(res.status, 201, "create_user failed: {}", res.text);
        res.id()
    }

    /// Fetch a static upload by its public reference.
    pub async fn fetch_upload(&self, reference: &str) -> (u16, Vec<u8>) {
        let res = self
            .client
            .get(self.url(reference))
            .send()
            .await
            .expect("Failed to send GET request");
        let status = res.status().as_u16();
        let bytes = res.bytes().await.unwrap_or_default().to_vec();
        (status, bytes)
    }

    /// Number of files currently in the upload directory (temp dir excluded).
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .expect("upload dir should exist")
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
            .count()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain 'id'")
            .to_string()
    }

    pub fn code(&self) -> &str {
        self.body["code"].as_str().unwrap_or_default()
    }
}
