//! In-process provider for route tests: token endpoint plus a small DAM tree.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Form, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use common::Secret;
use dam_auth::{AccessToken, AuthConfig, MemorySlot, TokenSlot, TokenStore, now_millis};
use dam_client::{ApiConfig, DamApi, DamClient};
use gallery::ArtWall;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::service::{AppState, ServiceMetrics, Settings};

#[derive(Clone)]
pub(crate) struct MockUpstream {
    pub url: String,
    pub token_forms: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub dam_paths: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn dam_hits(&self) -> usize {
        self.dam_paths.lock().unwrap().len()
    }
}

/// `/connect/token`: code `bad` is rejected, anything else yields
/// `tok-<code>` valid for an hour.
///
/// DAM tree: `assets` p1..p3; `root` → one artist `hokusai` with albums
/// `fuji`, `waves`; `categories/{id}/assets` → `{id}-1`, `{id}-2`;
/// `images/broken` → 500; `unauthorized` categories answer 401.
pub(crate) async fn start_mock_upstream() -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream = MockUpstream {
        url: format!("http://{}", listener.local_addr().unwrap()),
        token_forms: Arc::new(Mutex::new(Vec::new())),
        dam_paths: Arc::new(Mutex::new(Vec::new())),
    };

    let app = axum::Router::new()
        .route("/connect/token", post(token_endpoint))
        .fallback(dam_tree)
        .with_state(upstream.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    upstream
}

/// App state against `upstream`, with a one-hour token stored when `token`
/// is set. The DAM API lives under `/api` on the same server.
pub(crate) async fn test_state(upstream: &MockUpstream, token: Option<&str>) -> AppState {
    let slot = Arc::new(MemorySlot::new());
    if let Some(token) = token {
        let issued = AccessToken::issue(token.to_string(), 3600, now_millis());
        slot.write(&issued.to_slot().unwrap()).await.unwrap();
    }
    let auth = AuthConfig {
        endpoint: upstream.url.clone(),
        authorize_path: "/connect/authorize".into(),
        token_path: "/connect/token".into(),
        client_id: "docarts-client".into(),
        client_secret: Secret::new("docarts-secret".to_string()),
        redirect_uri: "http://localhost:3000".into(),
    };
    let store = TokenStore::new(auth, slot, reqwest::Client::new());

    let mut api_config = ApiConfig::new(format!("{}/api", upstream.url));
    api_config.subscription_key = Some(Secret::new("sub-key".to_string()));
    let api = DamApi::new(
        DamClient::json(api_config.clone(), store.clone()).unwrap(),
        DamClient::binary(api_config, store.clone()).unwrap(),
    );

    AppState {
        store,
        wall: Arc::new(ArtWall::new(api.clone(), 2).unwrap()),
        api,
        settings: Arc::new(Settings {
            home_url: "/".into(),
            featured_root_folder: "root".into(),
            carousel_page_size: 1,
        }),
        metrics: ServiceMetrics::new(),
        prometheus: metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle(),
    }
}

async fn token_endpoint(
    State(upstream): State<MockUpstream>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    upstream.token_forms.lock().unwrap().push(form.clone());
    match form.get("code").map(String::as_str) {
        Some("bad") | None => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({"error": "invalid_grant"})),
        )
            .into_response(),
        Some(code) => axum::Json(json!({
            "access_token": format!("tok-{code}"),
            "expires_in": 3600,
            "token_type": "Bearer",
        }))
        .into_response(),
    }
}

async fn dam_tree(State(upstream): State<MockUpstream>, uri: Uri) -> Response {
    upstream.dam_paths.lock().unwrap().push(uri.path().to_string());
    let base = format!("{}/api", upstream.url);

    let segments: Vec<&str> = uri.path().trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["api", "assets"] => {
            let assets: Vec<Value> = ["p1", "p2", "p3"]
                .iter()
                .map(|id| asset(&base, id))
                .collect();
            envelope(json!({ "assets": assets }))
        }
        ["api", "folders", "root", "subfolders"] => {
            envelope(json!([{"id": "hokusai", "name": "Hokusai"}]))
        }
        ["api", "folders", "hokusai", "subfolders"] => envelope(json!([
            {"id": "fuji", "name": "Views of Fuji"},
            {"id": "waves", "name": "Waves"},
        ])),
        ["api", "folders", _, "subfolders"] => envelope(json!([])),
        ["api", "categories", "unauthorized", "assets"] => {
            (StatusCode::UNAUTHORIZED, "token expired").into_response()
        }
        ["api", "categories", id, "assets"] => envelope(json!({
            "assets": [asset(&base, &format!("{id}-1")), asset(&base, &format!("{id}-2"))]
        })),
        ["api", "images", "broken"] => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        ["api", "images", name] => {
            ([(header::CONTENT_TYPE, "image/png")], name.to_string()).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn asset(base: &str, id: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Title {id}"),
        "description": format!("Description of {id}"),
        "keywords": [if id.starts_with('p') { "print" } else { "painting" }],
        "media": {
            "small": format!("{base}/images/{id}"),
            "large": format!("{base}/images/{id}-large"),
        }
    })
}

fn envelope(payload: Value) -> Response {
    axum::Json(json!({ "payload": payload })).into_response()
}
