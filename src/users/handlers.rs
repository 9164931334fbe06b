use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::dto::{marshal_all, LoginRequest, SearchParams, UserPayload, UserView};
use crate::{
    auth::Caller,
    errors::{AppError, AppResult},
    state::AppState,
};

pub const PUBLIC_HEADER: &str = "x-public";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create).get(search))
        .route("/users/login", post(login))
        .route(
            "/users/:user_id",
            get(get_user).put(update).patch(update).delete(delete),
        )
}

fn header_is_public(headers: &HeaderMap) -> bool {
    headers.get(PUBLIC_HEADER).and_then(|v| v.to_str().ok()) == Some("true")
}

/// Callers always see their own record in full, whatever the header says.
fn is_public_for(headers: &HeaderMap, caller: Caller, subject_id: i64) -> bool {
    if caller.is(subject_id) {
        return false;
    }
    header_is_public(headers)
}

fn parse_user_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| AppError::InvalidArgument("invalid user id".into()))
}

/// Path segments that fail to decode get the same answer as non-numeric ones.
fn path_user_id(path: Result<Path<String>, PathRejection>) -> AppResult<i64> {
    let Path(raw) = path.map_err(|e| {
        warn!(error = %e, "undecodable user id");
        AppError::InvalidArgument("invalid user id".into())
    })?;
    parse_user_id(&raw)
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> AppResult<T> {
    query.map(|Query(v)| v).map_err(|e| {
        warn!(error = %e, "invalid query string");
        AppError::InvalidArgument("invalid query string".into())
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    body.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "invalid json body");
        AppError::InvalidArgument("invalid json body".into())
    })
}

#[instrument(skip(state, headers))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<UserView>> {
    let user_id = path_user_id(path)?;
    let user = state.users.get_user(user_id).await?;
    Ok(Json(user.marshal(is_public_for(&headers, caller, user.id))))
}

#[instrument(skip(state, headers))]
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> AppResult<Json<Vec<UserView>>> {
    let params = query_params(query)?;
    let status = params.status.as_deref().map(str::trim).unwrap_or_default();
    if status.is_empty() {
        return Err(AppError::InvalidArgument("missing status".into()));
    }
    let users = state.users.search_user(status).await?;
    Ok(Json(marshal_all(&users, header_is_public(&headers))))
}

#[instrument(skip(state, headers, body))]
pub async fn login(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<UserView>> {
    let request = json_body(body)?;
    let user = state.users.login_user(request).await?;
    Ok(Json(user.marshal(is_public_for(&headers, caller, user.id))))
}

#[instrument(skip(state, headers, body))]
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let payload = json_body(body)?;
    let user = state.users.create_user(payload.into_user(0)).await?;
    Ok((
        StatusCode::CREATED,
        Json(user.marshal(is_public_for(&headers, caller, user.id))),
    ))
}

/// PUT replaces, PATCH merges.
#[instrument(skip(state, headers, body))]
pub async fn update(
    State(state): State<AppState>,
    caller: Caller,
    method: Method,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserView>)> {
    let user_id = path_user_id(path)?;
    let payload = json_body(body)?;
    let is_partial = method == Method::PATCH;
    let user = state
        .users
        .update_user(is_partial, payload.into_user(user_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(user.marshal(is_public_for(&headers, caller, user.id))),
    ))
}

#[instrument(skip(state, headers))]
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<Json<UserView>> {
    let user_id = path_user_id(path)?;
    let user = state.users.delete_user(user_id).await?;
    Ok(Json(user.marshal(is_public_for(&headers, caller, user.id))))
}
