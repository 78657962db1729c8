//! In-process replica of the Mediative service's wire protocol.
//!
//! # Design
//! `/api/login.json` checks HTTP Basic credentials against the fixed
//! developer key pair and issues the fixed session token. Resource routes
//! (`/{resource}.json`, `/{resource}/{id}.json`) require that token as a
//! query parameter and serve an in-memory store keyed by resource name and
//! integer id. Every resource response is wrapped in the service's
//! `{"response": {"<Model>": ...}}` envelope, where the model name follows
//! the CakePHP convention (`medias` -> `Media`).

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Developer key pair the login endpoint accepts.
pub const PUBLIC_KEY: &str = "pub-key";
pub const SECRET_KEY: &str = "secret-key";

/// The session token issued on a successful login.
pub const SESSION_TOKEN: &str = "mock-session-token";

#[derive(Default)]
pub struct Store {
    resources: HashMap<String, HashMap<u64, Value>>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/login.json", get(login))
        .route("/{resource}", get(index).post(create))
        .route("/{resource}/{id}", get(view).put(update).delete(remove))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

#[derive(Deserialize)]
struct LoginQuery {
    domain: Option<String>,
}

async fn login(headers: HeaderMap, Query(query): Query<LoginQuery>) -> (StatusCode, Json<Value>) {
    let expected = format!(
        "Basic {}",
        BASE64.encode(format!("{PUBLIC_KEY}:{SECRET_KEY}"))
    );
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());
    if !authorized || query.domain.is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid developer login"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"auth": {"token": {"token": SESSION_TOKEN}}})),
    )
}

async fn index(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    check_token(&query)?;
    let resource = parse_resource(&resource)?.to_string();
    let store = db.read().await;
    let items: Vec<Value> = store
        .resources
        .get(&resource)
        .map(|items| items.values().cloned().collect())
        .unwrap_or_default();
    Ok(envelope(&model_name(&resource), Value::Array(items)))
}

async fn create(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(data): Json<Value>,
) -> ApiResult {
    check_token(&query)?;
    let resource = parse_resource(&resource)?.to_string();
    let Value::Object(mut item) = data else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "expected a JSON object"})),
        ));
    };
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    item.insert("id".to_string(), json!(id));
    let value = Value::Object(item);
    store
        .resources
        .entry(resource.clone())
        .or_default()
        .insert(id, value.clone());
    Ok(envelope(&model_name(&resource), value))
}

async fn view(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    check_token(&query)?;
    let id = parse_id(&id)?;
    let store = db.read().await;
    let item = store
        .resources
        .get(&resource)
        .and_then(|items| items.get(&id))
        .cloned();
    match item {
        Some(item) => Ok(envelope(&model_name(&resource), item)),
        None => Ok(Json(json!({"response": {}}))),
    }
}

async fn update(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    Json(data): Json<Value>,
) -> ApiResult {
    check_token(&query)?;
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    let existing = store
        .resources
        .get_mut(&resource)
        .and_then(|items| items.get_mut(&id));
    let Some(existing) = existing else {
        return Ok(Json(json!({"response": {}})));
    };
    if let (Value::Object(target), Value::Object(incoming)) = (existing, data) {
        for (key, value) in incoming {
            target.insert(key, value);
        }
    }
    let item = store
        .resources
        .get(&resource)
        .and_then(|items| items.get(&id))
        .cloned()
        .unwrap_or_default();
    Ok(envelope(&model_name(&resource), item))
}

async fn remove(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult {
    check_token(&query)?;
    let id = parse_id(&id)?;
    let mut store = db.write().await;
    let removed = store
        .resources
        .get_mut(&resource)
        .and_then(|items| items.remove(&id));
    Ok(envelope(&model_name(&resource), json!(removed.is_some())))
}

fn check_token(query: &HashMap<String, String>) -> Result<(), (StatusCode, Json<Value>)> {
    if query.get("token").map(String::as_str) == Some(SESSION_TOKEN) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid session token"})),
        ))
    }
}

fn parse_resource(raw: &str) -> Result<&str, (StatusCode, Json<Value>)> {
    raw.strip_suffix(".json").ok_or((
        StatusCode::NOT_FOUND,
        Json(json!({"error": "unknown extension"})),
    ))
}

fn parse_id(raw: &str) -> Result<u64, (StatusCode, Json<Value>)> {
    raw.strip_suffix(".json")
        .and_then(|id| id.parse().ok())
        .ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({"error": "bad resource id"})),
        ))
}

/// CakePHP-style model name: singularized and capitalized.
pub fn model_name(resource: &str) -> String {
    let singular = resource.strip_suffix('s').unwrap_or(resource);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn envelope(model: &str, payload: Value) -> Json<Value> {
    let mut inner = serde_json::Map::new();
    inner.insert(model.to_string(), payload);
    Json(json!({ "response": inner }))
}
