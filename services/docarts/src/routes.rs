//! HTTP routes
//!
//! Every data route resolves to JSON or, when the session is gone, to a
//! redirect to the home URL, where the entry route restarts sign-in. Each
//! request gets a `req_<uuid>` id that tags its span and error body.

use std::sync::atomic::Ordering;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use dam_auth::{Entry, InvalidationCause};
use gallery::Load;
use serde::Deserialize;
use serde_json::json;
use tracing::{Instrument, error, info, info_span, warn};

use crate::error::{Error, Result};
use crate::metrics;
use crate::service::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EntryParams {
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CarouselParams {
    /// Artist row to move
    pub album: Option<usize>,
    pub start: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    pub url: Option<String>,
}

fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// JSON error body: {"error":{"type":"...","message":"...","request_id":"req_..."}}
fn error_response(err: &Error, request_id: &str) -> Response {
    let body = json!({
        "error": {
            "type": err.kind(),
            "message": err.to_string(),
            "request_id": request_id,
        }
    });
    (err.status(), axum::Json(body)).into_response()
}

/// Run one route body inside its span and map the outcome.
async fn respond<F>(state: &AppState, route: &'static str, body: F) -> Response
where
    F: Future<Output = Result<Response>>,
{
    let request_id = new_request_id();
    state.metrics.requests_total.fetch_add(1, Ordering::Relaxed);
    let span = info_span!("route", route, request_id = %request_id);

    match body.instrument(span).await {
        Ok(response) => response,
        Err(err) => {
            state.metrics.errors_total.fetch_add(1, Ordering::Relaxed);
            metrics::record_route_error(route, err.kind());
            match err {
                Error::Session(reason) => {
                    info!(route, request_id = %request_id, reason = %reason, "session gone, redirecting home");
                    Redirect::to(&state.settings.home_url).into_response()
                }
                err => {
                    if err.status().is_server_error() {
                        error!(route, request_id = %request_id, error = %err, "route failed");
                    } else {
                        warn!(route, request_id = %request_id, error = %err, "route failed");
                    }
                    error_response(&err, &request_id)
                }
            }
        }
    }
}

/// `GET /`: sign-in entry and the art wall.
///
/// No valid token and no code redirects to the provider; a callback code is
/// exchanged and the browser is sent home; a valid session gets the next
/// batch of wall images.
pub async fn entry(State(state): State<AppState>, Query(params): Query<EntryParams>) -> Response {
    respond(&state, "entry", async {
        match state.store.enter(params.code.as_deref()).await? {
            Entry::RedirectToProvider(url) => Ok(Redirect::to(&url).into_response()),
            Entry::SignedIn => Ok(Redirect::to(&state.settings.home_url).into_response()),
            Entry::Authenticated => match state.wall.load_more().await? {
                Load::Appended(images) => Ok(axum::Json(json!({
                    "status": "loaded",
                    "images": images,
                    "total": state.wall.len().await,
                }))
                .into_response()),
                Load::InProgress => Ok((
                    StatusCode::ACCEPTED,
                    axum::Json(json!({
                        "status": "loading",
                        "total": state.wall.len().await,
                    })),
                )
                    .into_response()),
            },
        }
    })
    .await
}

/// `GET /featured-albums`: artist rows with one carousel page each.
pub async fn featured_albums(
    State(state): State<AppState>,
    Query(params): Query<CarouselParams>,
) -> Response {
    respond(&state, "featured_albums", async {
        let artists =
            gallery::featured_albums(&state.api, &state.settings.featured_root_folder).await?;
        let focus = params.album.map(|row| (row, params.start.unwrap_or(0)));
        let rows = gallery::carousel_rows(&artists, state.settings.carousel_page_size, focus)?;
        Ok(axum::Json(json!({ "artists": rows })).into_response())
    })
    .await
}

/// `GET /albums/{id}`: assets of one album.
pub async fn album(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    respond(&state, "album", async {
        let assets = gallery::album_assets(&state.api, &id).await?;
        Ok(axum::Json(json!({ "album_id": id, "assets": assets })).into_response())
    })
    .await
}

/// `GET /search?q=`: assets whose metadata contains the keyword.
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    respond(&state, "search", async {
        let keyword = params.q.unwrap_or_default();
        let library = state.api.list_assets().await?;
        let found = gallery::filter_assets(&library, &keyword);
        Ok(axum::Json(json!({
            "keyword": keyword.trim(),
            "count": found.len(),
            "assets": found,
        }))
        .into_response())
    })
    .await
}

/// `GET /images?url=`: image bytes through the authenticated binary client.
///
/// The URL must be relative to the API base or point at the API origin or
/// a configured media host; anything else is refused before any request.
pub async fn image(State(state): State<AppState>, Query(params): Query<ImageParams>) -> Response {
    respond(&state, "image", async {
        let target = params
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::InvalidRequest("missing url parameter".into()))?;
        let blob = state.api.fetch_image(&target).await?;
        let content_type = blob
            .content_type
            .unwrap_or_else(|| gallery::image::FALLBACK_CONTENT_TYPE.to_string());
        Ok(([(header::CONTENT_TYPE, content_type)], blob.bytes).into_response())
    })
    .await
}

/// `POST /sign-out`: drop the session and go home.
pub async fn sign_out(State(state): State<AppState>) -> Response {
    respond(&state, "sign_out", async {
        state.store.invalidate(InvalidationCause::SignOut).await;
        state.wall.reset().await;
        Ok(Redirect::to(&state.settings.home_url).into_response())
    })
    .await
}

/// `GET /health`: liveness plus session and wall summary.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let auth_state = format!("{:?}", state.store.state().await);
    axum::Json(json!({
        "status": "healthy",
        "auth_state": auth_state,
        "session_valid": state.store.has_valid_token().await,
        "wall_images": state.wall.len().await,
        "uptime_seconds": state.metrics.started_at.elapsed().as_secs(),
        "requests_served": state.metrics.requests_total.load(Ordering::Relaxed),
        "errors_total": state.metrics.errors_total.load(Ordering::Relaxed),
    }))
}

/// Prometheus metrics in text exposition format.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}
