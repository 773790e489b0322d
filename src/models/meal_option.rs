use serde::{Deserialize, Serialize};
use std::fmt;

/// A predefined food entry from the backend catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealOption {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub calories: i64,
}

impl fmt::Display for MealOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({} cal)", self.id, self.name, self.calories)?;
        if let Some(description) = &self.description {
            write!(f, " - {}", description)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_option_display() {
        let option = MealOption {
            id: 7,
            name: "Oatmeal".to_string(),
            description: Some("Steel-cut oats with berries".to_string()),
            calories: 320,
        };

        let output = format!("{}", option);
        assert!(output.contains("Oatmeal"));
        assert!(output.contains("320 cal"));
        assert!(output.contains("berries"));
    }

    #[test]
    fn test_meal_option_deserializes_without_description() {
        let option: MealOption =
            serde_json::from_str(r#"{"id": 3, "name": "Banana", "calories": 105}"#).unwrap();

        assert_eq!(option.id, 3);
        assert_eq!(option.description, None);
        assert_eq!(option.calories, 105);
    }
}
