mod meal_log;
mod meal_option;
mod meal_type;
mod session;
mod user;
mod water_intake;

pub use meal_log::MealLog;
pub use meal_option::MealOption;
pub use meal_type::MealType;
pub use session::Session;
pub use user::{NewUser, ProfileUpdate, User};
pub use water_intake::WaterIntake;
