// tests/common/mod.rs
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use forum::{config::Config, db, routes, state::AppState};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

pub const ADMIN_EMAIL: &str = "admin@forum.test";
pub const ADMIN_PASSWORD: &str = "Admin12345";
pub const PASSWORD: &str = "Secret123";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
    pub upload_dir: PathBuf,
}

/// A logged-in account: its id and the `Cookie` header value to send.
pub struct Session {
    pub id: i64,
    pub email: String,
    pub cookie: String,
}

fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
        session_ttl_hours: 3,
        cookie_secure: false,
        // High enough that only the dedicated test hits it
        rate_limit_per_minute: 10_000,
        trust_proxy_headers: false,
        upload_dir,
        max_image_bytes: 64 * 1024,
        admin_username: Some("admin".to_string()),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
        public_base_url: "http://localhost:8081".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        google: None,
        github: None,
    }
}

/// Helper function to spawn the app on a random port for testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    // One long-lived connection keeps the in-memory database alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    serve(pool, customize).await
}

/// Same app over a database file, with the production pool of several connections.
pub async fn spawn_app_on_disk() -> TestApp {
    let path = std::env::temp_dir().join(format!("forum-test-{}.db", uuid::Uuid::new_v4()));
    let pool = db::connect(&format!("sqlite://{}", path.display()))
        .await
        .expect("Failed to open SQLite file");

    serve(pool, |_| {}).await
}

async fn serve(pool: SqlitePool, customize: impl FnOnce(&mut Config)) -> TestApp {
    // 1. Config with a private upload directory
    let upload_dir = std::env::temp_dir().join(format!("forum-test-{}", uuid::Uuid::new_v4()));
    let mut config = test_config(upload_dir.clone());
    customize(&mut config);

    // 2. Run migrations and seed the admin
    db::migrate(&pool).await.expect("Failed to migrate database");
    db::seed_admin_user(&pool, &config)
        .await
        .expect("Failed to seed admin");

    // 3. Router
    let state = AppState::new(pool.clone(), config);
    let app = routes::create_router(state);

    // 4. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 5. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        address,
        client,
        pool,
        upload_dir,
    }
}

pub fn unique_name() -> String {
    // Truncate UUID to ensure username length < 20
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// `name=value` of the named cookie in the response's `Set-Cookie` headers.
pub fn cookie_from(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, username: &str, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": PASSWORD
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> Session {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200, "login failed for {email}");

        let cookie = cookie_from(&response, "session").expect("no session cookie");
        let body: Value = response.json().await.unwrap();
        Session {
            id: body["id"].as_i64().unwrap(),
            email: email.to_string(),
            cookie,
        }
    }

    /// Registers a fresh user and logs them in.
    pub async fn new_user(&self) -> Session {
        let name = unique_name();
        let email = format!("{}@forum.test", name);
        let response = self.register(&name, &email).await;
        assert_eq!(response.status().as_u16(), 201);
        self.login(&email, PASSWORD).await
    }

    pub async fn admin(&self) -> Session {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    pub fn post_form(title: &str, content: &str, categories: &[&str]) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new()
            .text("title", title.to_string())
            .text("content", content.to_string());
        for category in categories {
            form = form.text("categories", category.to_string());
        }
        form
    }

    pub async fn create_post(&self, session: &Session, title: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/posts"))
            .header(COOKIE, &session.cookie)
            .multipart(Self::post_form(title, "Some post body", &["IT"]))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.unwrap()
    }

    pub async fn get_json(&self, path: &str, session: Option<&Session>) -> (u16, Value) {
        let mut request = self.client.get(self.url(path));
        if let Some(session) = session {
            request = request.header(COOKIE, &session.cookie);
        }
        let response = request.send().await.expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_json(&self, path: &str, session: &Session, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .header(COOKIE, &session.cookie)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    pub async fn post_empty(&self, path: &str, session: &Session) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .header(COOKIE, &session.cookie)
            .send()
            .await
            .expect("Failed to execute request");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}
