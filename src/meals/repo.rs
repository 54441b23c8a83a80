use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Closed set of meal slots; one of each per user and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "date")]
    pub meal_date: Date,
    pub meal_type: MealType,
    pub created_at: OffsetDateTime,
}

const MEAL_COLUMNS: &str = "id, user_id, meal_date, meal_type, created_at";

/// List the caller's meals, newest day first. Both filters are optional.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    meal_date: Option<Date>,
    meal_type: Option<MealType>,
    skip: i64,
    limit: i64,
) -> sqlx::Result<Vec<Meal>> {
    sqlx::query_as::<_, Meal>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        WHERE user_id = $1
          AND ($2::date IS NULL OR meal_date = $2)
          AND ($3::meal_type IS NULL OR meal_type = $3)
        ORDER BY meal_date DESC, meal_type
        LIMIT $4 OFFSET $5
        "#
    ))
    .bind(user_id)
    .bind(meal_date)
    .bind(meal_type)
    .bind(limit)
    .bind(skip)
    .fetch_all(db)
    .await
}

/// Ownership-scoped lookup; another user's meal comes back as `None`.
pub async fn get_owned(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> sqlx::Result<Option<Meal>> {
    sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1 AND user_id = $2"
    ))
    .bind(meal_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Pre-check for the (user, date, type) slot; `exclude` skips the meal
/// being updated so self-updates pass.
pub async fn slot_taken(
    db: &PgPool,
    user_id: Uuid,
    meal_date: Date,
    meal_type: MealType,
    exclude: Option<Uuid>,
) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM meals
            WHERE user_id = $1 AND meal_date = $2 AND meal_type = $3
              AND ($4::uuid IS NULL OR id <> $4)
        )
        "#,
    )
    .bind(user_id)
    .bind(meal_date)
    .bind(meal_type)
    .bind(exclude)
    .fetch_one(db)
    .await
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    meal_date: Date,
    meal_type: MealType,
) -> sqlx::Result<Meal> {
    sqlx::query_as::<_, Meal>(&format!(
        r#"
        INSERT INTO meals (user_id, meal_date, meal_type)
        VALUES ($1, $2, $3)
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(meal_date)
    .bind(meal_type)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    meal_id: Uuid,
    meal_date: Date,
    meal_type: MealType,
) -> sqlx::Result<Option<Meal>> {
    sqlx::query_as::<_, Meal>(&format!(
        r#"
        UPDATE meals
        SET meal_date = $3, meal_type = $4
        WHERE id = $1 AND user_id = $2
        RETURNING {MEAL_COLUMNS}
        "#
    ))
    .bind(meal_id)
    .bind(user_id)
    .bind(meal_date)
    .bind(meal_type)
    .fetch_optional(db)
    .await
}

/// Remove a meal and its entries as one unit; rolls back on any failure.
pub async fn delete_cascading(db: &PgPool, user_id: Uuid, meal_id: Uuid) -> sqlx::Result<bool> {
    let mut tx: Transaction<'_, Postgres> = db.begin().await?;

    sqlx::query("DELETE FROM food_entries WHERE meal_id = $1")
        .bind(meal_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
        .bind(meal_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&MealType::Breakfast).unwrap(), "\"breakfast\"");
        let parsed: MealType = serde_json::from_str("\"snack\"").unwrap();
        assert_eq!(parsed, MealType::Snack);
    }

    #[test]
    fn meal_type_rejects_unknown_values() {
        assert!(serde_json::from_str::<MealType>("\"brunch\"").is_err());
    }

    #[test]
    fn meal_type_display_and_title() {
        assert_eq!(MealType::Dinner.to_string(), "dinner");
        assert_eq!(MealType::Dinner.title(), "Dinner");
    }

    #[test]
    fn meal_serializes_date_field() {
        let meal = Meal {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            meal_date: time::macros::date!(2026 - 01 - 15),
            meal_type: MealType::Lunch,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["date"], "2026-01-15");
        assert_eq!(json["meal_type"], "lunch");
    }
}
