use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tempfile::TempDir;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Credentials the stub CKAN accepts for Basic-auth credential checks.
pub const STUB_USER: &str = "alice";
pub const STUB_PASSWORD: &str = "letmein";
// base64("alice:letmein")
const STUB_BASIC_AUTH: &str = "Basic YWxpY2U6bGV0bWVpbg==";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
    // Held so the story root outlives the suite
    #[allow(dead_code)]
    stories_dir: TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick unused ports for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let ckan_port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        spawn_stub_ckan(ckan_port);

        let stories_dir = TempDir::new().context("failed to create stories dir")?;

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_portal-admin-api"));
        cmd.env("PORTAL_ADMIN_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("CKAN_API_URL", format!("http://127.0.0.1:{}", ckan_port))
            .env("CKAN_API_KEY", "test-service-key")
            .env("SESSION_SECRET", "integration-test-secret")
            .env("PORTALJS_STORIES_PATH", stories_dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child, stories_dir })
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
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Stub CKAN action API, run on its own runtime so the sync spawn path can
/// start it before the server binary comes up.
fn spawn_stub_ckan(port: u16) {
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("stub runtime");
        rt.block_on(async move {
            let app = stub_router();
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
                .await
                .expect("bind stub ckan");
            axum::serve(listener, app).await.expect("stub ckan");
        });
    });
}

fn stub_router() -> Router {
    Router::new()
        .route("/api/3/action/user_show", get(stub_user_show))
        .route("/api/3/action/user_list", get(stub_user_list))
        .route("/api/3/action/user_create", post(stub_user_create))
        .route("/api/3/action/user_patch", post(stub_user_patch))
        .route("/api/3/action/user_delete", post(stub_echo_success))
        .route("/api/3/action/organization_list", get(stub_entity_list))
        .route("/api/3/action/organization_show", get(stub_entity_show))
        .route("/api/3/action/organization_create", post(stub_entity_create))
        .route("/api/3/action/organization_patch", post(stub_echo_success))
        .route("/api/3/action/organization_delete", post(stub_echo_success))
        .route("/api/3/action/group_list", get(stub_entity_list))
        .route("/api/3/action/group_show", get(stub_entity_show))
        .route("/api/3/action/group_create", post(stub_entity_create))
        .route("/api/3/action/group_patch", post(stub_echo_success))
        .route("/api/3/action/group_delete", post(stub_echo_success))
}

#[derive(Deserialize)]
struct IdQuery {
    id: Option<String>,
}

fn success(result: Value) -> Json<Value> {
    Json(json!({ "success": true, "result": result }))
}

fn failure(message: &str) -> Json<Value> {
    Json(json!({ "success": false, "error": { "message": message } }))
}

fn user_record(name: &str) -> Value {
    json!({
        "id": format!("id-{}", name),
        "name": name,
        "fullname": format!("{} Example", name),
        "email": format!("{}@example.org", name),
        "sysadmin": false,
        "state": "active",
    })
}

async fn stub_user_show(headers: HeaderMap, Query(query): Query<IdQuery>) -> Json<Value> {
    let id = query.id.unwrap_or_default();
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    // Basic auth = credential check; only alice:letmein passes
    if auth.starts_with("Basic ") {
        return if auth == STUB_BASIC_AUTH && id == STUB_USER {
            success(user_record(&id))
        } else {
            failure("Access denied")
        };
    }

    match id.as_str() {
        "alice" | "bob" => success(user_record(&id)),
        _ => failure("User not found"),
    }
}

async fn stub_user_list() -> Json<Value> {
    // "ghost" has no detail record, which exercises the summary fallback
    success(json!([{ "name": "alice" }, { "name": "ghost" }]))
}

async fn stub_user_create(Json(body): Json<Value>) -> Json<Value> {
    if body.get("name").and_then(Value::as_str) == Some("taken") {
        return failure("That login name is not available.");
    }
    success(body)
}

async fn stub_user_patch(Json(body): Json<Value>) -> Json<Value> {
    success(body)
}

async fn stub_echo_success(Json(body): Json<Value>) -> Json<Value> {
    success(body)
}

async fn stub_entity_list() -> Json<Value> {
    success(json!([{ "name": "civic-data", "title": "Civic Data", "package_count": 3 }]))
}

async fn stub_entity_show(Query(query): Query<IdQuery>) -> Json<Value> {
    match query.id.as_deref() {
        Some("civic-data") => {
            success(json!({ "name": "civic-data", "title": "Civic Data", "package_count": 3 }))
        }
        _ => failure("Not found"),
    }
}

async fn stub_entity_create(Json(body): Json<Value>) -> Json<Value> {
    if body.get("name").and_then(Value::as_str) == Some("taken") {
        return failure("Group name already exists in database");
    }
    success(body)
}
