//! In-process DAM tree for gallery tests.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use common::Secret;
use dam_auth::{AccessToken, AuthConfig, MemorySlot, TokenSlot, TokenStore, now_millis};
use dam_client::{ApiConfig, DamApi, DamClient};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone)]
pub(crate) struct MockDam {
    pub url: String,
    paths: Arc<Mutex<Vec<String>>>,
}

impl MockDam {
    /// Requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.paths.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total(&self) -> usize {
        self.paths.lock().unwrap().len()
    }
}

/// Tree served:
/// - `assets`: p1..p5
/// - `root` → Hokusai (fuji, waves, birds, bridges, ghosts), Monet (empty, lilies)
/// - `broken-root` → one artist whose only album cover answers 500
/// - `categories/{id}/assets`: `{id}-1`, `{id}-2`; `empty` has none
pub(crate) async fn start_mock_dam() -> MockDam {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockDam {
        url: format!("http://{}", listener.local_addr().unwrap()),
        paths: Arc::new(Mutex::new(Vec::new())),
    };
    let app = axum::Router::new()
        .fallback(serve_tree)
        .with_state(mock.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    mock
}

pub(crate) async fn api_with_token(mock: &MockDam, token: Option<&str>) -> DamApi {
    let slot = Arc::new(MemorySlot::new());
    if let Some(token) = token {
        let issued = AccessToken::issue(token.to_string(), 3600, now_millis());
        slot.write(&issued.to_slot().unwrap()).await.unwrap();
    }
    let auth = AuthConfig {
        endpoint: "http://127.0.0.1:9".into(),
        authorize_path: "/connect/authorize".into(),
        token_path: "/connect/token".into(),
        client_id: "docarts-client".into(),
        client_secret: Secret::new("docarts-secret".to_string()),
        redirect_uri: "http://localhost:3000".into(),
    };
    let store = TokenStore::new(auth, slot, reqwest::Client::new());
    let config = ApiConfig::new(mock.url.as_str());
    DamApi::new(
        DamClient::json(config.clone(), store.clone()).unwrap(),
        DamClient::binary(config, store).unwrap(),
    )
}

async fn serve_tree(State(mock): State<MockDam>, uri: Uri) -> Response {
    mock.paths.lock().unwrap().push(uri.path().to_string());

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["assets"] => {
            let assets: Vec<Value> = (1..=5)
                .map(|i| asset(&mock.url, &format!("p{i}"), None))
                .collect();
            envelope(json!({"assets": assets}))
        }
        ["folders", id, "subfolders"] => envelope(folders(id)),
        ["categories", "empty", "assets"] => envelope(json!({"assets": []})),
        ["categories", "broken-album", "assets"] => envelope(json!({
            "assets": [asset(&mock.url, "b-1", Some("broken"))]
        })),
        ["categories", id, "assets"] => envelope(json!({
            "assets": [
                asset(&mock.url, &format!("{id}-1"), None),
                asset(&mock.url, &format!("{id}-2"), None),
            ]
        })),
        ["images", "broken"] => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        ["images", name] => {
            ([(header::CONTENT_TYPE, "image/jpeg")], name.to_string()).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn folders(parent: &str) -> Value {
    let entries: &[(&str, &str)] = match parent {
        "root" => &[("hokusai", "Hokusai"), ("monet", "Monet")],
        "hokusai" => &[
            ("fuji", "Views of Fuji"),
            ("waves", "Waves"),
            ("birds", "Birds"),
            ("bridges", "Bridges"),
            ("ghosts", "Ghosts"),
        ],
        "monet" => &[("empty", "Sketches"), ("lilies", "Water Lilies")],
        "broken-root" => &[("broken-artist", "Unknown")],
        "broken-artist" => &[("broken-album", "Lost")],
        _ => &[],
    };
    entries
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect()
}

fn asset(base: &str, id: &str, image: Option<&str>) -> Value {
    json!({
        "id": id,
        "title": format!("Title {id}"),
        "description": format!("Description of {id}"),
        "media": {
            "small": format!("{base}/images/{}", image.unwrap_or(id)),
            "large": format!("{base}/images/{id}-large"),
        }
    })
}

fn envelope(payload: Value) -> Response {
    axum::Json(json!({ "payload": payload })).into_response()
}
