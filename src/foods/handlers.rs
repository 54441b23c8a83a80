use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

use super::dto::{FoodListQuery, FoodPayload};
use super::repo::{self, Food};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route(
            "/foods/:id",
            get(get_food).put(update_food).delete(delete_food),
        )
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    Query(q): Query<FoodListQuery>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let limit = q.limit.clamp(1, 1000);
    let skip = q.skip.max(0);
    let foods = repo::list(&state.db, q.search.as_deref(), skip, limit).await?;
    Ok(Json(foods))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, ApiError> {
    let food = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;
    Ok(Json(food))
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    Json(payload): Json<FoodPayload>,
) -> Result<(StatusCode, Json<Food>), ApiError> {
    payload.validate()?;

    if repo::name_exists(&state.db, &payload.name, None).await? {
        warn!(name = %payload.name, "duplicate food name");
        return Err(ApiError::Conflict("Food already exists".into()));
    }

    let food = repo::create(&state.db, &payload).await?;
    info!(food_id = %food.id, name = %food.name, "food created");
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FoodPayload>,
) -> Result<Json<Food>, ApiError> {
    payload.validate()?;

    let current = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;

    // Renaming onto another food's name conflicts; keeping one's own is fine.
    if payload.name != current.name && repo::name_exists(&state.db, &payload.name, Some(id)).await?
    {
        warn!(name = %payload.name, "food rename collides");
        return Err(ApiError::Conflict("Name already taken".into()));
    }

    let food = repo::update(&state.db, id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;
    Ok(Json(food))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let food = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;

    if repo::is_referenced(&state.db, id).await? {
        warn!(food_id = %id, "food still referenced by entries");
        return Err(ApiError::Conflict(
            "Cannot delete food - it's used in meals".into(),
        ));
    }

    repo::delete(&state.db, id).await?;
    info!(food_id = %id, name = %food.name, "food deleted");
    Ok(Json(json!({
        "message": format!("Food '{}' deleted successfully", food.name)
    })))
}
