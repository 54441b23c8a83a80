use serde::Deserialize;

use crate::error::ApiError;

/// Body for food create and update; all nutrition facts are per 100g.
#[derive(Debug, Deserialize)]
pub struct FoodPayload {
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    #[serde(default)]
    pub fiber_per_100g: f64,
}

impl FoodPayload {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Food name must not be empty".into()));
        }
        let macros = [
            self.calories_per_100g,
            self.protein_per_100g,
            self.carbs_per_100g,
            self.fat_per_100g,
            self.fiber_per_100g,
        ];
        if macros.iter().any(|v| *v < 0.0 || !v.is_finite()) {
            return Err(ApiError::Validation(
                "Nutritional values must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct FoodListQuery {
    pub search: Option<String>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> FoodPayload {
        FoodPayload {
            name: "Oats".into(),
            calories_per_100g: 389.0,
            protein_per_100g: 16.9,
            carbs_per_100g: 66.3,
            fat_per_100g: 6.9,
            fiber_per_100g: 10.6,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn negative_macro_is_rejected() {
        let mut p = payload();
        p.protein_per_100g = -1.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn nan_macro_is_rejected() {
        let mut p = payload();
        p.fat_per_100g = f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut p = payload();
        p.name = "   ".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn fiber_defaults_to_zero() {
        let p: FoodPayload = serde_json::from_str(
            r#"{"name":"Rice","calories_per_100g":130,"protein_per_100g":2.7,
                "carbs_per_100g":28.2,"fat_per_100g":0.3}"#,
        )
        .unwrap();
        assert_eq!(p.fiber_per_100g, 0.0);
        assert!(p.validate().is_ok());
    }
}
