use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::dto::FoodPayload;

/// Catalog entry with nutrition facts per 100g.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub fiber_per_100g: f64,
}

const FOOD_COLUMNS: &str =
    "id, name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, fiber_per_100g";

pub async fn list(
    db: &PgPool,
    search: Option<&str>,
    skip: i64,
    limit: i64,
) -> sqlx::Result<Vec<Food>> {
    sqlx::query_as::<_, Food>(&format!(
        r#"
        SELECT {FOOD_COLUMNS}
        FROM foods
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
        ORDER BY name
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(search)
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await
}

pub async fn get(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Food>> {
    sqlx::query_as::<_, Food>(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn name_exists(db: &PgPool, name: &str, exclude: Option<Uuid>) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM foods
            WHERE name = $1 AND ($2::uuid IS NULL OR id <> $2)
        )
        "#,
    )
    .bind(name)
    .bind(exclude)
    .fetch_one(db)
    .await
}

pub async fn create(db: &PgPool, payload: &FoodPayload) -> sqlx::Result<Food> {
    sqlx::query_as::<_, Food>(&format!(
        r#"
        INSERT INTO foods (name, calories_per_100g, protein_per_100g, carbs_per_100g,
                           fat_per_100g, fiber_per_100g)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(&payload.name)
    .bind(payload.calories_per_100g)
    .bind(payload.protein_per_100g)
    .bind(payload.carbs_per_100g)
    .bind(payload.fat_per_100g)
    .bind(payload.fiber_per_100g)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: Uuid, payload: &FoodPayload) -> sqlx::Result<Option<Food>> {
    sqlx::query_as::<_, Food>(&format!(
        r#"
        UPDATE foods
        SET name = $2, calories_per_100g = $3, protein_per_100g = $4,
            carbs_per_100g = $5, fat_per_100g = $6, fiber_per_100g = $7
        WHERE id = $1
        RETURNING {FOOD_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&payload.name)
    .bind(payload.calories_per_100g)
    .bind(payload.protein_per_100g)
    .bind(payload.carbs_per_100g)
    .bind(payload.fat_per_100g)
    .bind(payload.fiber_per_100g)
    .fetch_optional(db)
    .await
}

/// True while any food entry still references this food; deletion is
/// blocked in that case to keep stored totals traceable to their source.
pub async fn is_referenced(db: &PgPool, food_id: Uuid) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM food_entries WHERE food_id = $1)",
    )
    .bind(food_id)
    .fetch_one(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
