use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::repo::{Meal, MealType};
use crate::entries::dto::FoodEntryRead;

/// Body for meal create and update.
#[derive(Debug, Deserialize)]
pub struct MealPayload {
    pub date: Date,
    pub meal_type: MealType,
}

#[derive(Debug, Deserialize)]
pub struct MealListQuery {
    pub meal_date: Option<Date>,
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "crate::foods::dto::default_limit")]
    pub limit: i64,
}

/// Meal with its entries embedded, returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct MealDetails {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub created_at: OffsetDateTime,
    pub food_entries: Vec<FoodEntryRead>,
}

impl MealDetails {
    pub fn from_meal(meal: Meal, food_entries: Vec<FoodEntryRead>) -> Self {
        Self {
            id: meal.id,
            user_id: meal.user_id,
            date: meal.meal_date,
            meal_type: meal.meal_type,
            created_at: meal.created_at,
            food_entries,
        }
    }
}
