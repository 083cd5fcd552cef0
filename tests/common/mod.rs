use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use inventory_tracker::{build_router, config::AppConfig, db, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper harness for spinning up the application on a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Empty catalog; schema only.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Catalog holding the 20 starter products.
    pub async fn seeded() -> Self {
        Self::build(true).await
    }

    async fn build(seed: bool) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("inventory_test.db");
        let public_dir = dir.path().join("public");
        std::fs::create_dir_all(&public_dir).expect("create public dir");
        std::fs::write(public_dir.join("hello.txt"), "static asset").expect("write asset");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            3000,
            "test".to_string(),
        );
        cfg.public_dir = public_dir.display().to_string();
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::connect(&db::DbConfig::from(&cfg))
            .await
            .expect("failed to create test database");
        let state = AppState::new(Arc::new(pool), cfg);

        if seed {
            state.products.initialize().await.expect("initialize store");
        } else {
            db::run_migrations(&state.db)
                .await
                .expect("failed to run migrations in tests");
        }

        let router = build_router(state.clone());
        Self { router, state, dir }
    }

    pub fn dir(&self) -> &TempDir {
        &self.dir
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// POST a urlencoded form body, the way the dashboard's HTML forms submit.
    pub async fn form(&self, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .expect("failed to build form request");
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Serves the router on an ephemeral port and returns its base URL.
    pub async fn spawn_server(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            let _ = axum::serve(listener, router.into_make_service()).await;
        });
        format!("http://{}", addr)
    }
}

#[allow(dead_code)]
pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

#[allow(dead_code)]
pub async fn response_text(response: Response) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response")
}
