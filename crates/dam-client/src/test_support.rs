//! Shared fixtures for client tests: a token store seeded with a token and
//! an in-process DAM API that records what it receives.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use common::Secret;
use dam_auth::{AccessToken, AuthConfig, MemorySlot, TokenSlot, TokenStore, now_millis};
use serde_json::json;
use tokio::net::TcpListener;

use crate::config::ApiConfig;

pub(crate) fn auth_config() -> AuthConfig {
    AuthConfig {
        endpoint: "http://127.0.0.1:9".into(),
        authorize_path: "/connect/authorize".into(),
        token_path: "/connect/token".into(),
        client_id: "docarts-client".into(),
        client_secret: Secret::new("docarts-secret".to_string()),
        redirect_uri: "http://localhost:3000".into(),
    }
}

/// Store over a memory slot, holding a one-hour token when `token` is set.
pub(crate) async fn store_with_token(token: Option<&str>) -> (TokenStore, Arc<MemorySlot>) {
    let slot = Arc::new(MemorySlot::new());
    if let Some(token) = token {
        let issued = AccessToken::issue(token.to_string(), 3600, now_millis());
        slot.write(&issued.to_slot().unwrap()).await.unwrap();
    }
    let store = TokenStore::new(auth_config(), slot.clone(), reqwest::Client::new());
    (store, slot)
}

pub(crate) fn api_config(base_url: &str) -> ApiConfig {
    let mut config = ApiConfig::new(base_url);
    config.subscription_key = Some(Secret::new("sub-key".to_string()));
    config
}

#[derive(Debug, Clone)]
pub(crate) struct SeenRequest {
    pub path: String,
    pub query: String,
    pub headers: HashMap<String, String>,
}

#[derive(Clone)]
pub(crate) struct MockDam {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<SeenRequest>>>,
}

impl MockDam {
    pub fn last_request(&self) -> Option<SeenRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

/// Serves a tiny DAM tree:
/// - `assets`: a1, a2, a3
/// - `categories/{id}/assets`: `{id}-1`, `{id}-2`; `empty` has none
/// - `folders/{id}/subfolders`: `{id}-x`, `{id}-y`
/// - `images/{name}`: body is `name`; `broken` answers 500, `slow` stalls
/// - `unauthorized`: 401; `malformed`: asset without media
pub(crate) async fn start_mock_dam() -> MockDam {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let mock = MockDam {
        url,
        hits: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };

    let app = axum::Router::new()
        .fallback(serve_dam)
        .with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    mock
}

async fn serve_dam(State(mock): State<MockDam>, uri: Uri, headers: HeaderMap) -> Response {
    mock.hits.fetch_add(1, Ordering::SeqCst);
    mock.requests.lock().unwrap().push(SeenRequest {
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
    });

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["assets"] => {
            let assets: Vec<_> = ["a1", "a2", "a3"]
                .iter()
                .map(|id| asset(&mock.url, id))
                .collect();
            axum::Json(json!({ "payload": { "assets": assets } })).into_response()
        }
        ["categories", "empty", "assets"] => {
            axum::Json(json!({"payload": {"assets": []}})).into_response()
        }
        ["categories", id, "assets"] => axum::Json(json!({
            "payload": {"assets": [
                asset(&mock.url, &format!("{id}-1")),
                asset(&mock.url, &format!("{id}-2")),
            ]}
        }))
        .into_response(),
        ["folders", id, "subfolders"] => axum::Json(json!({
            "payload": [
                {"id": format!("{id}-x"), "name": format!("{id} X")},
                {"id": format!("{id}-y"), "name": format!("{id} Y")},
            ]
        }))
        .into_response(),
        ["images", "broken"] => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        ["images", name] => {
            if *name == "slow" {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            ([(header::CONTENT_TYPE, "image/jpeg")], name.to_string()).into_response()
        }
        ["unauthorized"] => (StatusCode::UNAUTHORIZED, "token expired").into_response(),
        ["malformed"] => {
            axum::Json(json!({"payload": {"assets": [{"id": "x"}]}})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn asset(base: &str, id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": format!("Title {id}"),
        "description": format!("Description of {id}"),
        "keywords": ["print"],
        "media": {
            "small": format!("{base}/images/{id}"),
            "large": format!("{base}/images/{id}-large"),
        }
    })
}
