use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Bearer token accepted by [`app`] on `/secure` routes.
pub const DEFAULT_TOKEN: &str = "token";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cat {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
pub struct NewCat {
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
pub struct CatPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub color: Option<String>,
    pub limit: Option<usize>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Cat>>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    token: Arc<str>,
}

pub fn app() -> Router {
    app_with_token(DEFAULT_TOKEN)
}

/// Router whose `/secure` routes accept only `Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(HashMap::new())),
        token: Arc::from(token),
    };
    Router::new()
        .route("/cats", get(list_cats).post(create_cat))
        .route(
            "/cats/{id}",
            get(get_cat).put(replace_cat).patch(update_cat).delete(delete_cat),
        )
        .route("/secure/cats", get(secure_list_cats))
        .route("/status/{code}", any(respond_with_status))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Like [`run`], with a custom accepted bearer token.
pub async fn run_with_token(listener: TcpListener, token: String) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(&token)).await
}

async fn list_cats(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Json<Vec<Cat>> {
    let cats = state.db.read().await;
    let mut listed: Vec<Cat> = cats
        .values()
        .filter(|cat| query.color.as_ref().is_none_or(|color| &cat.color == color))
        .cloned()
        .collect();
    listed.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(limit) = query.limit {
        listed.truncate(limit);
    }
    Json(listed)
}

async fn secure_list_cats(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Query<ListQuery>,
) -> Result<Json<Vec<Cat>>, StatusCode> {
    let expected = format!("Bearer {}", state.token);
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected);
    if !authorized {
        tracing::debug!("rejecting request without a valid bearer token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(list_cats(State(state), query).await)
}

async fn create_cat(
    State(state): State<AppState>,
    Json(input): Json<NewCat>,
) -> Result<(StatusCode, Json<Cat>), StatusCode> {
    let mut cats = state.db.write().await;
    if cats.values().any(|cat| cat.name == input.name) {
        return Err(StatusCode::CONFLICT);
    }
    let cat = Cat {
        id: Uuid::new_v4(),
        name: input.name,
        color: input.color,
    };
    cats.insert(cat.id, cat.clone());
    tracing::debug!(id = %cat.id, name = %cat.name, "created cat");
    Ok((StatusCode::CREATED, Json(cat)))
}

async fn get_cat(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Cat>, StatusCode> {
    let cats = state.db.read().await;
    cats.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn replace_cat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewCat>,
) -> Result<Json<Cat>, StatusCode> {
    let mut cats = state.db.write().await;
    let cat = cats.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    cat.name = input.name;
    cat.color = input.color;
    Ok(Json(cat.clone()))
}

async fn update_cat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CatPatch>,
) -> Result<Json<Cat>, StatusCode> {
    let mut cats = state.db.write().await;
    let cat = cats.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        cat.name = name;
    }
    if let Some(color) = input.color {
        cat.color = color;
    }
    Ok(Json(cat.clone()))
}

async fn delete_cat(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, StatusCode> {
    let mut cats = state.db.write().await;
    cats.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

async fn respond_with_status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
