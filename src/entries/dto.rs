use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::foods::repo::Food;

/// Body for entry create and update. Totals are never accepted from the
/// client; they are always derived from the food and quantity.
#[derive(Debug, Deserialize)]
pub struct FoodEntryPayload {
    pub meal_id: Uuid,
    pub food_id: Uuid,
    pub quantity_grams: f64,
}

impl FoodEntryPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.quantity_grams <= 0.0 || !self.quantity_grams.is_finite() {
            return Err(ApiError::Validation("Quantity must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryListQuery {
    pub meal_id: Option<Uuid>,
    pub food_id: Option<Uuid>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "crate::foods::dto::default_limit")]
    pub limit: i64,
}

/// Entry as returned to the client, with the referenced food embedded.
#[derive(Debug, Serialize)]
pub struct FoodEntryRead {
    pub id: Uuid,
    pub meal_id: Uuid,
    pub food_id: Uuid,
    pub quantity_grams: f64,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub food: Food,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(quantity: f64) -> FoodEntryPayload {
        FoodEntryPayload {
            meal_id: Uuid::new_v4(),
            food_id: Uuid::new_v4(),
            quantity_grams: quantity,
        }
    }

    #[test]
    fn positive_quantity_passes() {
        assert!(payload(150.0).validate().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        assert!(payload(0.0).validate().is_err());
    }

    #[test]
    fn negative_quantity_is_rejected() {
        assert!(payload(-10.0).validate().is_err());
    }

    #[test]
    fn non_finite_quantity_is_rejected() {
        assert!(payload(f64::INFINITY).validate().is_err());
        assert!(payload(f64::NAN).validate().is_err());
    }
}
