use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::meal_option::MealOption;
use super::meal_type::MealType;

/// A logged meal. Rows cached from the backend keep their flat shape:
/// the chosen option's id/name/description are denormalized onto the log
/// so history reads need no catalog lookup. Custom foods carry id -1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealLog {
    pub id: i64,
    pub user_id: i64,
    pub meal_type: MealType,
    pub meal_option_id: i64,
    pub meal_option_name: String,
    pub meal_option_description: Option<String>,
    pub portion_size: f64,
    pub calories: i64,
    pub is_custom: bool,
    pub logged_at: DateTime<Utc>,
}

impl MealLog {
    /// Log a catalog option. Calories scale with the portion multiplier
    /// and round to the nearest whole number.
    pub fn predefined(user_id: i64, meal_type: MealType, option: &MealOption, portion: f64) -> Self {
        Self {
            id: 0,
            user_id,
            meal_type,
            meal_option_id: option.id,
            meal_option_name: option.name.clone(),
            meal_option_description: option.description.clone(),
            portion_size: portion,
            calories: (option.calories as f64 * portion).round() as i64,
            is_custom: false,
            logged_at: Utc::now(),
        }
    }

    pub fn custom(
        user_id: i64,
        meal_type: MealType,
        name: impl Into<String>,
        description: Option<String>,
        portion: f64,
        calories: i64,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            meal_type,
            meal_option_id: -1,
            meal_option_name: name.into(),
            meal_option_description: description,
            portion_size: portion,
            calories,
            is_custom: true,
            logged_at: Utc::now(),
        }
    }
}

impl fmt::Display for MealLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({} cal, portion {})",
            self.meal_type, self.meal_option_name, self.calories, self.portion_size
        )?;
        if self.is_custom {
            write!(f, " [custom]")?;
        }
        Ok(())
    }
}
