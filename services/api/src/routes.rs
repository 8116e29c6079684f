//! API service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

use crate::{
    catalog::parse_filter,
    error::ApiError,
    middleware::{AuthUser, auth_middleware, require_admin},
    models::{
        AvatarRequest, FavoriteRequest, FavoritesResponse, LoginRequest, MetadataProxyRequest,
        RegisterRequest, SearchQuery,
        anime::{AnimeDocument, AnimeQuery},
        friendship::FriendRequestPayload,
        watch_status::{WatchStatusRequest, WatchStatusResponse},
    },
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let admin_routes = Router::new()
        .route("/admin/anime", get(list_all_anime).post(create_anime))
        .route(
            "/admin/anime/:external_id",
            put(update_anime).delete(delete_anime),
        )
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/profile", get(get_profile))
        .route("/profile/avatar", put(update_avatar))
        .route("/profile/:username", get(view_profile))
        .route("/favorites", post(add_favorite).delete(remove_favorite))
        .route("/watch-status", put(set_watch_status))
        .route("/watch-status/stats", get(watch_stats))
        .route("/friends", get(list_friends))
        .route("/friends/request", post(send_friend_request))
        .route("/friends/accept/:friendship_id", put(accept_friend_request))
        .route("/users/search", get(search_users))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/anime", get(list_anime))
        .route("/anime/:external_id", get(get_anime))
        .route("/metadata-proxy", post(metadata_proxy))
        .merge(protected_routes)
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Health check endpoint
async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "message": "Method not allowed" })),
    )
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "anime-api"
    }))
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.credentials.register(payload).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state.credentials.login(payload).await?;
    Ok(Json(session))
}

/// Own profile with resolved favorites
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.favorites.get_profile(user.id).await?;
    Ok(Json(profile))
}

/// Profile of another user, for friends only
pub async fn view_profile(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(username), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.favorites.view_profile(user.id, &username).await?;
    Ok(Json(profile))
}

pub async fn update_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<AvatarRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .favorites
        .update_avatar(user.id, &payload.avatar_url)
        .await?;
    Ok(Json(updated))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state
        .favorites
        .add_favorite(user.id, &payload.external_id)
        .await?;
    Ok(Json(FavoritesResponse {
        success: true,
        favorites,
    }))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let favorites = state
        .favorites
        .remove_favorite(user.id, &payload.external_id)
        .await?;
    Ok(Json(FavoritesResponse {
        success: true,
        favorites,
    }))
}

pub async fn set_watch_status(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<WatchStatusRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let watch_status = state.watch_status.set_status(user.id, payload).await?;
    Ok(Json(WatchStatusResponse {
        success: true,
        watch_status,
    }))
}

pub async fn watch_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.watch_status.stats(user.id).await?;
    Ok(Json(stats))
}

/// Public catalog listing
pub async fn list_anime(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<AnimeQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = parse_filter(query)?;
    let anime = state.catalog.list(&filter).await?;
    Ok(Json(anime))
}

pub async fn get_anime(
    State(state): State<AppState>,
    WithRejection(Path(external_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let anime = state.catalog.get(&external_id).await?;
    Ok(Json(anime))
}

/// Relay a GraphQL query, keeping the upstream status
pub async fn metadata_proxy(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<MetadataProxyRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (status, body) = state.metadata.forward(payload).await?;
    Ok((status, Json(body)))
}

pub async fn list_all_anime(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let anime = state.catalog.list_all().await?;
    Ok(Json(anime))
}

pub async fn create_anime(
    State(state): State<AppState>,
    WithRejection(Json(document), _): WithRejection<Json<AnimeDocument>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let anime = state.catalog.create(document).await?;
    Ok((StatusCode::CREATED, Json(anime)))
}

pub async fn update_anime(
    State(state): State<AppState>,
    WithRejection(Path(external_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(document), _): WithRejection<Json<AnimeDocument>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let anime = state.catalog.update(&external_id, document).await?;
    Ok(Json(anime))
}

pub async fn delete_anime(
    State(state): State<AppState>,
    WithRejection(Path(external_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.catalog.delete(&external_id).await?;
    Ok(Json(deleted))
}

pub async fn send_friend_request(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<FriendRequestPayload>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.friendships.send_request(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn accept_friend_request(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(friendship_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let friendship = state
        .friendships
        .accept_request(friendship_id, user.id)
        .await?;
    Ok(Json(json!({
        "message": "Friend request accepted",
        "friendshipId": friendship.id,
    })))
}

pub async fn list_friends(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let overview = state.friendships.list_friends_and_pending(user.id).await?;
    Ok(Json(overview))
}

pub async fn search_users(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<SearchQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .friendships
        .search_user(user.id, query.username.as_deref())
        .await?;
    Ok(Json(found))
}
