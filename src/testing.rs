//! In-memory stand-ins for the database and blob store, used by handler tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    config::{AppConfig, JwtConfig, StorageConfig},
    db::StoreError,
    state::AppState,
    storage::StorageClient,
    tattoos::{
        repo::TattooRepo,
        repo_types::{Tattoo, TattooFields},
    },
};

#[derive(Default)]
pub struct MemUsers {
    rows: Mutex<Vec<User>>,
}

impl MemUsers {
    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Overwrites a stored hash, for exercising corrupt records.
    pub fn set_hash(&self, email: &str, hash: &str) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(u) = rows.iter_mut().find(|u| u.email == email) {
            u.password_hash = hash.to_string();
        }
    }
}

#[async_trait]
impl UserRepo for MemUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn full_name_taken(&self, full_name: &str) -> Result<bool, StoreError> {
        Ok(self.rows.lock().unwrap().iter().any(|u| u.full_name == full_name))
    }

    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate("email"));
        }
        if rows.iter().any(|u| u.full_name == new.full_name) {
            return Err(StoreError::Duplicate("fullName"));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email.to_string(),
            full_name: new.full_name.to_string(),
            password_hash: new.password_hash.to_string(),
            avatar_url: new.avatar_url.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }
}

/// Tattoo table in a `Vec`, counting every write call.
#[derive(Default)]
pub struct MemTattoos {
    rows: Mutex<Vec<Tattoo>>,
    writes: AtomicUsize,
}

impl MemTattoos {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TattooRepo for MemTattoos {
    async fn list(&self, limit: Option<i64>, offset: i64) -> Result<Vec<Tattoo>, StoreError> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        let rows = rows.into_iter().skip(offset as usize);
        Ok(match limit {
            Some(n) => rows.take(n as usize).collect(),
            None => rows.collect(),
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Tattoo>, StoreError> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, user_id: Uuid, fields: &TattooFields) -> Result<Tattoo, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let now = OffsetDateTime::now_utc();
        let tattoo = Tattoo {
            id: Uuid::new_v4(),
            user_id,
            title: fields.title.clone(),
            description: fields.description.clone(),
            style: fields.style.clone(),
            image_url: fields.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(tattoo.clone());
        Ok(tattoo)
    }

    async fn update(&self, id: Uuid, fields: &TattooFields) -> Result<Option<Tattoo>, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|t| t.id == id).map(|t| {
            t.title = fields.title.clone();
            t.description = fields.description.clone();
            t.style = fields.style.clone();
            t.image_url = fields.image_url.clone();
            t.updated_at = OffsetDateTime::now_utc();
            t.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct MemStorage {
    pub objects: Mutex<HashMap<String, (Bytes, String)>>,
}

#[async_trait]
impl StorageClient for MemStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }

    async fn url_for(&self, key: &str) -> anyhow::Result<String> {
        Ok(format!("https://blobs.test/{key}"))
    }
}

pub struct Harness {
    pub state: AppState,
    pub users: Arc<MemUsers>,
    pub tattoos: Arc<MemTattoos>,
    pub storage: Arc<MemStorage>,
}

pub fn test_config(tattoo_owner_only: bool) -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        db_max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        },
        storage: StorageConfig::Local {
            dir: PathBuf::from("target/test-uploads"),
        },
        tattoo_owner_only,
    }
}

pub fn harness(tattoo_owner_only: bool) -> Harness {
    let users = Arc::new(MemUsers::default());
    let tattoos = Arc::new(MemTattoos::default());
    let storage = Arc::new(MemStorage::default());
    let state = AppState::from_parts(
        Arc::new(test_config(tattoo_owner_only)),
        users.clone(),
        tattoos.clone(),
        storage.clone(),
    );
    Harness {
        state,
        users,
        tattoos,
        storage,
    }
}

/// Sends one request through a fresh router and decodes the JSON reply
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => req
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => req.body(Body::empty()),
    }
    .expect("request");

    let res = crate::app::build_app(state.clone())
        .oneshot(req)
        .await
        .expect("response");
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Registers a user through the API and returns `(user id, token)`.
pub async fn register(state: &AppState, email: &str, name: &str) -> (Uuid, String) {
    let (status, body) = send(
        state,
        "POST",
        "/auth/register",
        None,
        Some(serde_json::json!({"email": email, "password": "secret123", "fullName": name})),
    )
    .await;
    assert_eq!(status, axum::http::StatusCode::OK, "register failed: {body}");
    let id = body["user"]["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("user id");
    let token = body["token"].as_str().expect("token").to_string();
    (id, token)
}
