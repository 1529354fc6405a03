#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use petora_api::{build_router, startup, AppConfig, AppState};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

/// One-pixel JPEG stand-in; the server only looks at the content type
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9];

fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("petora-test-{}", Uuid::new_v4()))
}

// ---------------------------------------------------------------------------
// In-process app driven through tower::ServiceExt::oneshot
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let upload_dir = temp_upload_dir();

        let mut config = AppConfig::development();
        config.database.url = "memory://".into();
        config.security.jwt_secret = TEST_SECRET.into();
        config.security.hash_memory_kib = 8;
        config.security.hash_iterations = 1;
        config.media.upload_dir = upload_dir.clone();

        let state = startup::build_state(config).await?;
        let router = build_router(state.clone());
        Ok(Self {
            router,
            state,
            upload_dir,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    pub async fn send_for_json(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let (status, bytes) = self.send(request).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send_for_json(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn get_with_token(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())?;
        self.send_for_json(request).await
    }

    pub async fn json(&self, method: Method, uri: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.send_for_json(request).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> Result<(StatusCode, Value)> {
        self.json(Method::POST, uri, body).await
    }

    pub async fn delete(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send_for_json(Request::delete(uri).body(Body::empty())?).await
    }

    pub async fn post_multipart(&self, uri: &str, form: MultipartForm) -> Result<(StatusCode, Value)> {
        let (content_type, body) = form.finish();
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))?;
        self.send_for_json(request).await
    }

    pub async fn create_shelter(&self, name: &str) -> Result<Value> {
        let (status, body) = self
            .post_json(
                "/api/shelters",
                &serde_json::json!({ "name": name, "location": "Springfield" }),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "shelter create failed: {}", body);
        Ok(body)
    }

    /// Creates a pet with a JPEG image and the given extra text fields
    pub async fn create_pet(&self, fields: &[(&str, &str)]) -> Result<Value> {
        let mut form = MultipartForm::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        let form = form.file("image", "pet.jpg", "image/jpeg", JPEG_BYTES);
        let (status, body) = self.post_multipart("/api/pets", form).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "pet create failed: {}", body);
        Ok(body)
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Minimal multipart/form-data encoder
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: format!("petora-boundary-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

// ---------------------------------------------------------------------------
// Spawned server binary, killed and cleaned up when the test drops it
// ---------------------------------------------------------------------------

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    child: Child,
}

impl TestServer {
    /// Spawns the binary on a free port and waits for `/health`
    pub async fn start() -> Result<Self> {
        let server = Self::spawn()?;
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let upload_dir = temp_upload_dir();

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_petora-api"));
        cmd.env("HOST", "127.0.0.1")
            .env("PORT", port.to_string())
            .env("DATABASE_URL", "memory://")
            .env("JWT_SECRET", TEST_SECRET)
            .env("PASSWORD_HASH_MEMORY_KIB", "8")
            .env("PASSWORD_HASH_ITERATIONS", "1")
            .env("UPLOAD_DIR", &upload_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            upload_dir,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4().simple())
}
