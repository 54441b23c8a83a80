use crate::foods::repo::Food;

/// Absolute macro totals for a single entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Scale a food's per-100g facts to an actual quantity.
///
/// Pure linear scaling, no rounding. Every write path that touches an
/// entry's food or quantity goes through this, so the stored totals can
/// never drift from their source values. Callers validate
/// `quantity_grams > 0` before getting here.
pub fn scale_per_100g(food: &Food, quantity_grams: f64) -> NutritionTotals {
    let multiplier = quantity_grams / 100.0;
    NutritionTotals {
        calories: food.calories_per_100g * multiplier,
        protein: food.protein_per_100g * multiplier,
        carbs: food.carbs_per_100g * multiplier,
        fat: food.fat_per_100g * multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_food() -> Food {
        Food {
            id: Uuid::new_v4(),
            name: "Oats".into(),
            calories_per_100g: 200.0,
            protein_per_100g: 10.0,
            carbs_per_100g: 30.0,
            fat_per_100g: 5.0,
            fiber_per_100g: 0.0,
        }
    }

    #[test]
    fn scales_linearly_for_150g() {
        let totals = scale_per_100g(&sample_food(), 150.0);
        assert_eq!(totals.calories, 300.0);
        assert_eq!(totals.protein, 15.0);
        assert_eq!(totals.carbs, 45.0);
        assert_eq!(totals.fat, 7.5);
    }

    #[test]
    fn quantity_of_100g_is_identity() {
        let food = sample_food();
        let totals = scale_per_100g(&food, 100.0);
        assert_eq!(totals.calories, food.calories_per_100g);
        assert_eq!(totals.protein, food.protein_per_100g);
        assert_eq!(totals.carbs, food.carbs_per_100g);
        assert_eq!(totals.fat, food.fat_per_100g);
    }

    #[test]
    fn recomputing_with_same_inputs_is_stable() {
        let food = sample_food();
        let first = scale_per_100g(&food, 73.5);
        let second = scale_per_100g(&food, 73.5);
        assert_eq!(first, second);
    }

    #[test]
    fn small_quantities_scale_down() {
        let totals = scale_per_100g(&sample_food(), 25.0);
        assert_eq!(totals.calories, 50.0);
        assert_eq!(totals.fat, 1.25);
    }
}
