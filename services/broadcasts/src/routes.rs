//! Broadcasts service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Uri, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use common::UpstreamResult;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::{
    aggregation::build_page,
    csv::to_csv,
    error::{ApiError, ApiResult},
    middleware::cors_middleware,
    models::{
        BroadcastFilter, BroadcastListResponse, BroadcastQuery, ExportFormat, PageRequest,
        UserLookupResponse,
    },
    state::AppState,
};

/// Create the router for the broadcasts service
///
/// Other paths under `/user/` still reach the profile endpoints, and any
/// remaining path serves the broadcast listing.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/user/:username", get(get_user_profile))
        .route("/user/:username/liveInfo", get(get_user_live_info))
        .fallback(list_broadcasts)
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "broadcasts"
    }))
}

/// List live broadcasts sorted by viewers, as JSON or CSV
pub async fn list_broadcasts(
    State(state): State<AppState>,
    uri: Uri,
    pairs: Option<Query<Vec<(String, String)>>>,
) -> ApiResult<Response> {
    match user_path(uri.path()) {
        Some(UserPath::Profile(username)) => return profile_response(&state, username).await,
        Some(UserPath::LiveInfo(username)) => return live_info_response(&state, username).await,
        None => {}
    }

    let query = pairs
        .map(|Query(pairs)| BroadcastQuery::from_pairs(pairs))
        .unwrap_or_default();

    if let Some(user) = query.user.as_deref().filter(|user| !user.is_empty()) {
        return lookup_user(&state, user).await;
    }

    let request = PageRequest::from_query(&query);
    let filter = BroadcastFilter::from_query(&query);
    info!(
        "Listing broadcasts page {} (limit {}, {:?})",
        request.page, request.limit, request.format
    );

    let aggregated = state.aggregator.collect_all().await.map_err(|e| {
        error!("Failed to aggregate broadcasts: {}", e);
        ApiError::Upstream(e)
    })?;

    let page = build_page(aggregated, &request, &filter);

    match request.format {
        ExportFormat::Csv => {
            let csv = to_csv(&page.items).map_err(|e| {
                error!("Failed to export broadcasts as CSV: {}", e);
                ApiError::Serialization(e)
            })?;
            let disposition = format!("attachment; filename=\"broadcasts_page{}.csv\"", page.page);

            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                csv,
            )
                .into_response())
        }
        ExportFormat::Json => pretty_json(&BroadcastListResponse { broadcasts: page }),
    }
}

/// Aggregate the listing entry, stream and profile of one user
async fn lookup_user(state: &AppState, user: &str) -> ApiResult<Response> {
    info!("Looking up broadcast of {}", user);
    let source = state.aggregator.source();

    let batch = source
        .fetch_batch(0, state.aggregator.batch_size())
        .await
        .map_err(|e| {
            error!("Failed to fetch broadcasts for {}: {}", user, e);
            ApiError::Upstream(e)
        })?;

    let graph_data = batch
        .items
        .into_iter()
        .find(|item| item.username == user)
        .ok_or_else(|| ApiError::UserNotFound(user.to_string()))?;

    let (stream_info, profile_info) =
        tokio::join!(source.fetch_stream_info(user), source.fetch_profile(user));

    pretty_json(&UserLookupResponse {
        user: user.to_string(),
        graph_data,
        stream_info: embed_error(stream_info, "Failed to fetch stream info"),
        profile_info: embed_error(profile_info, "Failed to fetch profile"),
    })
}

/// Profile path that no dedicated route matched
#[derive(Debug, PartialEq, Eq)]
enum UserPath<'a> {
    Profile(&'a str),
    LiveInfo(&'a str),
}

/// Resolve `/user/{name}/...`: the first segment names the user and a
/// trailing `/liveInfo` selects the stream details
fn user_path(path: &str) -> Option<UserPath<'_>> {
    let rest = path.strip_prefix("/user/")?;
    let username = rest.split('/').next().filter(|name| !name.is_empty())?;

    if path.ends_with("/liveInfo") {
        Some(UserPath::LiveInfo(username))
    } else {
        Some(UserPath::Profile(username))
    }
}

/// Proxy the public profile of a user
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    profile_response(&state, &username).await
}

/// Proxy the live stream details of a user
pub async fn get_user_live_info(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    live_info_response(&state, &username).await
}

async fn profile_response(state: &AppState, username: &str) -> ApiResult<Response> {
    let profile = state
        .aggregator
        .source()
        .fetch_profile(username)
        .await
        .map_err(|e| {
            error!("Failed to fetch profile of {}: {}", username, e);
            ApiError::Profile(e)
        })?;

    pretty_json(&profile)
}

async fn live_info_response(state: &AppState, username: &str) -> ApiResult<Response> {
    let stream_info = state
        .aggregator
        .source()
        .fetch_stream_info(username)
        .await
        .map_err(|e| {
            error!("Failed to fetch stream info of {}: {}", username, e);
            ApiError::StreamInfo(e)
        })?;

    pretty_json(&stream_info)
}

fn embed_error(result: UpstreamResult<Value>, message: &str) -> Value {
    result.unwrap_or_else(|e| {
        warn!("{}: {}", message, e);
        json!({ "error": message, "details": e.to_string() })
    })
}

fn pretty_json<T: Serialize>(body: &T) -> ApiResult<Response> {
    let body = serde_json::to_string_pretty(body)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
        .into_response())
}
