use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser, error::ApiError, foods, meals, nutrition::scale_per_100g,
    state::AppState,
};

use super::dto::{EntryListQuery, FoodEntryPayload, FoodEntryRead};
use super::repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/food-entries", get(list_entries).post(create_entry))
        .route(
            "/food-entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(q): Query<EntryListQuery>,
) -> Result<Json<Vec<FoodEntryRead>>, ApiError> {
    let limit = q.limit.clamp(1, 1000);
    let skip = q.skip.max(0);
    let entries = repo::list_by_user(
        &state.db,
        principal.user_id,
        q.meal_id,
        q.food_id,
        skip,
        limit,
    )
    .await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FoodEntryRead>, ApiError> {
    let entry = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food entry"))?;
    Ok(Json(entry))
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<FoodEntryPayload>,
) -> Result<(StatusCode, Json<FoodEntryRead>), ApiError> {
    payload.validate()?;

    // The meal must exist and belong to the caller; anything else is 404.
    meals::repo::get_owned(&state.db, principal.user_id, payload.meal_id)
        .await?
        .ok_or_else(|| {
            warn!(meal_id = %payload.meal_id, "entry create against foreign or missing meal");
            ApiError::NotFound("Meal not found or not accessible".into())
        })?;

    let food = foods::repo::get(&state.db, payload.food_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;

    let totals = scale_per_100g(&food, payload.quantity_grams);
    let entry = repo::create(
        &state.db,
        payload.meal_id,
        payload.food_id,
        payload.quantity_grams,
        totals,
    )
    .await?;

    info!(entry_id = %entry.id, meal_id = %entry.meal_id, "food entry created");
    Ok((StatusCode::CREATED, Json(entry.into_read(food))))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FoodEntryPayload>,
) -> Result<Json<FoodEntryRead>, ApiError> {
    payload.validate()?;

    let current = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food entry"))?;

    // Moving the entry to another meal requires owning the target too.
    if payload.meal_id != current.meal_id {
        meals::repo::get_owned(&state.db, principal.user_id, payload.meal_id)
            .await?
            .ok_or_else(|| {
                warn!(meal_id = %payload.meal_id, "entry move to foreign or missing meal");
                ApiError::NotFound("Target meal not found or not accessible".into())
            })?;
    }

    let food = foods::repo::get(&state.db, payload.food_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food"))?;

    // Totals are recomputed on every update, whichever field changed.
    let totals = scale_per_100g(&food, payload.quantity_grams);
    let entry = repo::update(
        &state.db,
        id,
        payload.meal_id,
        payload.food_id,
        payload.quantity_grams,
        totals,
    )
    .await?;

    Ok(Json(entry.into_read(food)))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let entry = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food entry"))?;

    if repo::delete_owned(&state.db, principal.user_id, id).await? == 0 {
        return Err(ApiError::not_found("Food entry"));
    }

    info!(entry_id = %id, "food entry deleted");
    Ok(Json(json!({
        "message": format!(
            "Deleted {}g of {} from meal",
            entry.quantity_grams, entry.food.name
        )
    })))
}
