use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cached account profile. `id` is always the server-assigned id so
/// session rows join against the same identity the backend issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub blood_pressure_systolic: Option<i64>,
    pub blood_pressure_diastolic: Option<i64>,
    pub diabetes_type: Option<String>,
    pub treatment_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} (@{})", self.full_name(), self.username)?;
        writeln!(f, "  email: {}", self.email)?;
        if !self.phone.is_empty() {
            writeln!(f, "  phone: {}", self.phone)?;
        }
        if !self.date_of_birth.is_empty() {
            writeln!(f, "  date of birth: {}", self.date_of_birth)?;
        }
        if !self.gender.is_empty() {
            writeln!(f, "  gender: {}", self.gender)?;
        }
        if let Some(height) = &self.height {
            writeln!(f, "  height: {}", height)?;
        }
        if let Some(weight) = &self.weight {
            writeln!(f, "  weight: {}", weight)?;
        }
        if let (Some(sys), Some(dia)) = (self.blood_pressure_systolic, self.blood_pressure_diastolic)
        {
            writeln!(f, "  blood pressure: {}/{}", sys, dia)?;
        }
        if let Some(diabetes) = &self.diabetes_type {
            writeln!(f, "  diabetes type: {}", diabetes)?;
        }
        if let Some(treatment) = &self.treatment_type {
            writeln!(f, "  treatment: {}", treatment)?;
        }
        Ok(())
    }
}

/// Registration input as the user typed it; the password stays plain here
/// and is only hashed when a row is cached locally.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
}

/// Partial profile edit. `None` fields are left untouched locally and
/// dropped from the wire payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diabetes_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_type: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.blood_pressure_systolic.is_none()
            && self.blood_pressure_diastolic.is_none()
            && self.diabetes_type.is_none()
            && self.treatment_type.is_none()
    }
}
