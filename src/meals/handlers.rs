use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{auth::extractors::AuthUser, entries, error::ApiError, state::AppState};

use super::dto::{MealDetails, MealListQuery, MealPayload};
use super::repo::{self, Meal};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

fn slot_conflict(payload: &MealPayload) -> ApiError {
    ApiError::Conflict(format!(
        "You already have a {} meal on {}",
        payload.meal_type, payload.date
    ))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Query(q): Query<MealListQuery>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let limit = q.limit.clamp(1, 1000);
    let skip = q.skip.max(0);
    let meals = repo::list_by_user(
        &state.db,
        principal.user_id,
        q.meal_date,
        q.meal_type,
        skip,
        limit,
    )
    .await?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, ApiError> {
    let meal = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;
    let entries = entries::repo::list_for_meal(&state.db, meal.id).await?;
    Ok(Json(MealDetails::from_meal(meal, entries)))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<MealPayload>,
) -> Result<(StatusCode, Json<Meal>), ApiError> {
    if repo::slot_taken(
        &state.db,
        principal.user_id,
        payload.date,
        payload.meal_type,
        None,
    )
    .await?
    {
        warn!(user_id = %principal.user_id, date = %payload.date, meal_type = %payload.meal_type,
              "duplicate meal slot");
        return Err(slot_conflict(&payload));
    }

    let meal = match repo::create(&state.db, principal.user_id, payload.date, payload.meal_type)
        .await
    {
        Ok(m) => m,
        // Concurrent creation of the same slot: the unique constraint is
        // the source of truth, answer with the same conflict.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(slot_conflict(&payload));
        }
        Err(e) => return Err(e.into()),
    };

    info!(meal_id = %meal.id, user_id = %principal.user_id, "meal created");
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MealPayload>,
) -> Result<Json<Meal>, ApiError> {
    let current = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;

    let slot_changed =
        payload.date != current.meal_date || payload.meal_type != current.meal_type;
    if slot_changed
        && repo::slot_taken(
            &state.db,
            principal.user_id,
            payload.date,
            payload.meal_type,
            Some(id),
        )
        .await?
    {
        return Err(slot_conflict(&payload));
    }

    let meal = match repo::update(
        &state.db,
        principal.user_id,
        id,
        payload.date,
        payload.meal_type,
    )
    .await
    {
        Ok(m) => m.ok_or_else(|| ApiError::not_found("Meal"))?,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(slot_conflict(&payload));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let meal = repo::get_owned(&state.db, principal.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Meal"))?;

    if !repo::delete_cascading(&state.db, principal.user_id, id).await? {
        return Err(ApiError::not_found("Meal"));
    }

    info!(meal_id = %id, user_id = %principal.user_id, "meal deleted with entries");
    Ok(Json(json!({
        "message": format!(
            "{} meal on {} deleted successfully",
            meal.meal_type.title(),
            meal.meal_date
        )
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo::MealType;

    #[test]
    fn slot_conflict_names_type_and_date() {
        let payload = MealPayload {
            date: time::macros::date!(2026 - 03 - 02),
            meal_type: MealType::Breakfast,
        };
        let err = slot_conflict(&payload);
        assert_eq!(
            err.to_string(),
            "You already have a breakfast meal on 2026-03-02"
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
