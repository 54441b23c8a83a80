use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::dto::FoodEntryRead;
use crate::foods::repo::Food;
use crate::nutrition::NutritionTotals;

/// Bare entry row, without the joined food.
#[derive(Debug, Clone, FromRow)]
pub struct FoodEntry {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_id: Uuid,
    pub quantity_grams: f64,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl FoodEntry {
    pub fn into_read(self, food: Food) -> FoodEntryRead {
        FoodEntryRead {
            id: self.id,
            meal_id: self.meal_id,
            food_id: self.food_id,
            quantity_grams: self.quantity_grams,
            total_calories: self.total_calories,
            total_protein: self.total_protein,
            total_carbs: self.total_carbs,
            total_fat: self.total_fat,
            food,
        }
    }
}

/// Flat row for entry-with-food joins; food columns are aliased.
#[derive(Debug, FromRow)]
struct EntryFoodRow {
    id: Uuid,
    meal_id: Uuid,
    food_id: Uuid,
    quantity_grams: f64,
    total_calories: f64,
    total_protein: f64,
    total_carbs: f64,
    total_fat: f64,
    food_name: String,
    food_calories_per_100g: f64,
    food_protein_per_100g: f64,
    food_carbs_per_100g: f64,
    food_fat_per_100g: f64,
    food_fiber_per_100g: f64,
}

impl From<EntryFoodRow> for FoodEntryRead {
    fn from(r: EntryFoodRow) -> Self {
        FoodEntryRead {
            id: r.id,
            meal_id: r.meal_id,
            food_id: r.food_id,
            quantity_grams: r.quantity_grams,
            total_calories: r.total_calories,
            total_protein: r.total_protein,
            total_carbs: r.total_carbs,
            total_fat: r.total_fat,
            food: Food {
                id: r.food_id,
                name: r.food_name,
                calories_per_100g: r.food_calories_per_100g,
                protein_per_100g: r.food_protein_per_100g,
                carbs_per_100g: r.food_carbs_per_100g,
                fat_per_100g: r.food_fat_per_100g,
                fiber_per_100g: r.food_fiber_per_100g,
            },
        }
    }
}

const ENTRY_FOOD_SELECT: &str = r#"
    SELECT fe.id, fe.meal_id, fe.food_id, fe.quantity_grams,
           fe.total_calories, fe.total_protein, fe.total_carbs, fe.total_fat,
           f.name              AS food_name,
           f.calories_per_100g AS food_calories_per_100g,
           f.protein_per_100g  AS food_protein_per_100g,
           f.carbs_per_100g    AS food_carbs_per_100g,
           f.fat_per_100g      AS food_fat_per_100g,
           f.fiber_per_100g    AS food_fiber_per_100g
    FROM food_entries fe
    JOIN foods f ON f.id = fe.food_id
"#;

/// List the caller's entries; ownership comes from joining through the
/// parent meal, never from a field on the entry itself.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Option<Uuid>,
    food_id: Option<Uuid>,
    skip: i64,
    limit: i64,
) -> sqlx::Result<Vec<FoodEntryRead>> {
    let rows = sqlx::query_as::<_, EntryFoodRow>(&format!(
        r#"
        {ENTRY_FOOD_SELECT}
        JOIN meals m ON m.id = fe.meal_id
        WHERE m.user_id = $1
          AND ($2::uuid IS NULL OR fe.meal_id = $2)
          AND ($3::uuid IS NULL OR fe.food_id = $3)
        ORDER BY m.meal_date DESC, fe.created_at DESC
        LIMIT $4 OFFSET $5
        "#
    ))
    .bind(user_id)
    .bind(meal_id)
    .bind(food_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Entries of a single meal; the caller has already checked meal ownership.
pub async fn list_for_meal(db: &PgPool, meal_id: Uuid) -> sqlx::Result<Vec<FoodEntryRead>> {
    let rows = sqlx::query_as::<_, EntryFoodRow>(&format!(
        r#"
        {ENTRY_FOOD_SELECT}
        WHERE fe.meal_id = $1
        ORDER BY fe.created_at
        "#
    ))
    .bind(meal_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn get_owned(
    db: &PgPool,
    user_id: Uuid,
    entry_id: Uuid,
) -> sqlx::Result<Option<FoodEntryRead>> {
    let row = sqlx::query_as::<_, EntryFoodRow>(&format!(
        r#"
        {ENTRY_FOOD_SELECT}
        JOIN meals m ON m.id = fe.meal_id
        WHERE fe.id = $1 AND m.user_id = $2
        "#
    ))
    .bind(entry_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Into::into))
}

const ENTRY_COLUMNS: &str = "id, meal_id, food_id, quantity_grams, \
     total_calories, total_protein, total_carbs, total_fat";

pub async fn create(
    db: &PgPool,
    meal_id: Uuid,
    food_id: Uuid,
    quantity_grams: f64,
    totals: NutritionTotals,
) -> sqlx::Result<FoodEntry> {
    sqlx::query_as::<_, FoodEntry>(&format!(
        r#"
        INSERT INTO food_entries (meal_id, food_id, quantity_grams,
                                  total_calories, total_protein, total_carbs, total_fat)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(meal_id)
    .bind(food_id)
    .bind(quantity_grams)
    .bind(totals.calories)
    .bind(totals.protein)
    .bind(totals.carbs)
    .bind(totals.fat)
    .fetch_one(db)
    .await
}

/// References and totals are written together; there is no path that
/// updates one without the other.
pub async fn update(
    db: &PgPool,
    entry_id: Uuid,
    meal_id: Uuid,
    food_id: Uuid,
    quantity_grams: f64,
    totals: NutritionTotals,
) -> sqlx::Result<FoodEntry> {
    sqlx::query_as::<_, FoodEntry>(&format!(
        r#"
        UPDATE food_entries
        SET meal_id = $2, food_id = $3, quantity_grams = $4,
            total_calories = $5, total_protein = $6, total_carbs = $7, total_fat = $8
        WHERE id = $1
        RETURNING {ENTRY_COLUMNS}
        "#
    ))
    .bind(entry_id)
    .bind(meal_id)
    .bind(food_id)
    .bind(quantity_grams)
    .bind(totals.calories)
    .bind(totals.protein)
    .bind(totals.carbs)
    .bind(totals.fat)
    .fetch_one(db)
    .await
}

pub async fn delete_owned(db: &PgPool, user_id: Uuid, entry_id: Uuid) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM food_entries fe
        USING meals m
        WHERE fe.id = $1 AND fe.meal_id = m.id AND m.user_id = $2
        "#,
    )
    .bind(entry_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
