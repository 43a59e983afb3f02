//! Integration tests for API endpoints.
//!
//! The router runs against the real `UserManager` backed by an in-memory
//! repository, so no database is required.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use common::{AppError, AppResult, ServiceConfig};
use domain::{CredentialHasher, HashParams, NewUser, PasswordPolicy, User};
use gateway_lib::routes::create_router;
use gateway_lib::state::{AppState, HealthProbe};
use user_service_lib::repository::UserRepository;
use user_service_lib::service::UserManager;

const STRONG: &str = "Str0ng!Pass";

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<User>> {
        let mut found: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.name.contains(fragment))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let mut all: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|u| u.created_at);
        Ok(all)
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let user = User::new(
            Uuid::new_v4(),
            new_user.name,
            new_user.email,
            new_user.password_hash,
        );
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        user.password_hash = password_hash;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(AppError::NotFound)
    }

    async fn delete_many(&self, ids: Vec<Uuid>) -> AppResult<u64> {
        let mut users = self.users.lock().unwrap();
        if !ids.iter().all(|id| users.contains_key(id)) {
            return Err(AppError::NotFound);
        }
        for id in &ids {
            users.remove(id);
        }
        Ok(ids.len() as u64)
    }
}

struct StubProbe {
    healthy: bool,
}

#[async_trait]
impl HealthProbe for StubProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        if self.healthy {
            Ok(())
        } else {
            Err("connection refused".to_string())
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app_with_probe(healthy: bool) -> Router {
    let hasher = CredentialHasher::new(HashParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();
    let service = UserManager::new(
        Arc::new(InMemoryUsers::default()),
        hasher,
        PasswordPolicy::default(),
    );

    create_router(AppState::new(
        Arc::new(service),
        Arc::new(StubProbe { healthy }),
        ServiceConfig::default(),
    ))
}

fn app() -> Router {
    app_with_probe(true)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn register(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/users",
        Some(json!({ "name": name, "email": email, "password": STRONG })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_returns_projection_without_credential() {
    let app = app();

    let body = register(&app, "Jane Doe", "Jane@Example.com").await;

    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["email"], "jane@example.com");
    assert!(body["id"].is_string());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_create_user_duplicate_email_is_bad_request() {
    let app = app();
    register(&app, "Jane Doe", "jane@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Other", "email": "JANE@example.com", "password": STRONG })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_create_user_weak_password_is_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Jane", "email": "jane@example.com", "password": "password" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_user_name_measured_after_trim() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": " a", "email": "jane@example.com", "password": STRONG })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_user_invalid_email_is_rejected() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/users",
        Some(json!({ "name": "Jane", "email": "not-an-email", "password": STRONG })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid email format");
}

#[tokio::test]
async fn test_get_and_list_users() {
    let app = app();
    let created = register(&app, "Jane Doe", "jane@example.com").await;
    register(&app, "John Roe", "john@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@example.com");

    let (status, body) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_get_unknown_user_is_not_found() {
    let app = app();

    let (status, body) = send(&app, "GET", &format!("/users/{}", Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = app();

    let (status, body) = send(&app, "GET", "/users/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_update_user_changes_name() {
    let app = app();
    let created = register(&app, "Jane Doe", "jane@example.com").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", id),
        Some(json!({ "name": "Jane Smith" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Smith");
    assert_eq!(body["email"], "jane@example.com");
}

#[tokio::test]
async fn test_update_user_to_taken_email_is_rejected() {
    let app = app();
    let jane = register(&app, "Jane Doe", "jane@example.com").await;
    register(&app, "John Roe", "john@example.com").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/users/{}", jane["id"].as_str().unwrap()),
        Some(json!({ "email": "john@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "DUPLICATE_EMAIL");
}

#[tokio::test]
async fn test_delete_user_then_missing() {
    let app = app();
    let created = register(&app, "Jane Doe", "jane@example.com").await;
    let uri = format!("/users/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_users_by_name_fragment() {
    let app = app();
    register(&app, "Alice", "alice@example.com").await;
    register(&app, "Alicia", "alicia@example.com").await;
    register(&app, "Bob", "bob@example.com").await;

    let (status, body) = send(&app, "GET", "/users/search?name=Ali", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alice", "Alicia"]);
}

#[tokio::test]
async fn test_search_users_treats_underscore_literally() {
    let app = app();
    register(&app, "a_b", "underscore@example.com").await;
    register(&app, "axb", "letter@example.com").await;

    let (status, body) = send(&app, "GET", "/users/search?name=a_b", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["name"].as_str())
        .collect();
    assert_eq!(names, vec!["a_b"]);
}

#[tokio::test]
async fn test_search_users_blank_name_is_rejected() {
    let app = app();

    let (status, body) = send(&app, "GET", "/users/search?name=%20", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bulk_delete_is_all_or_nothing() {
    let app = app();
    let a = register(&app, "Alice", "alice@example.com").await;
    let b = register(&app, "Bob", "bob@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/users/bulk-delete",
        Some(json!({ "ids": [a["id"], Uuid::new_v4()] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, "GET", "/users", None).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let (status, body) = send(
        &app,
        "POST",
        "/users/bulk-delete",
        Some(json!({ "ids": [a["id"], b["id"]] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 2);
}

// =============================================================================
// Credentials
// =============================================================================

#[tokio::test]
async fn test_login_with_correct_password() {
    let app = app();
    register(&app, "Jane Doe", "jane@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/login",
        Some(json!({ "email": "JANE@example.com", "password": STRONG })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "jane@example.com");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let app = app();
    register(&app, "Jane Doe", "jane@example.com").await;

    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/users/login",
        Some(json!({ "email": "jane@example.com", "password": "Wr0ng!Pass" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/users/login",
        Some(json!({ "email": "ghost@example.com", "password": STRONG })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_change_password_flow() {
    let app = app();
    let created = register(&app, "Jane Doe", "jane@example.com").await;
    let uri = format!("/users/{}/change-password", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "current_password": "Wr0ng!Pass", "new_password": "N3w!Secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "INVALID_CREDENTIALS");

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "current_password": STRONG, "new_password": "weak" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "current_password": STRONG, "new_password": "N3w!Secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (old_status, _) = send(
        &app,
        "POST",
        "/users/login",
        Some(json!({ "email": "jane@example.com", "password": STRONG })),
    )
    .await;
    let (new_status, _) = send(
        &app,
        "POST",
        "/users/login",
        Some(json!({ "email": "jane@example.com", "password": "N3w!Secret" })),
    )
    .await;
    assert_eq!(old_status, StatusCode::UNAUTHORIZED);
    assert_eq!(new_status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let (status, body) = send(&app(), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"][0]["name"], "database");
}

#[tokio::test]
async fn test_health_degraded_when_database_down() {
    let (status, body) = send(&app_with_probe(false), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"][0]["error"], "connection refused");
}

#[tokio::test]
async fn test_welcome_lists_endpoints() {
    let (status, body) = send(&app(), "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["application"], "user-api");
    assert_eq!(body["status"], "running");
    assert!(body["endpoints"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(&app(), "GET", "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/users/login"].is_object());
}
