mod auth;
mod calendar;
mod config_cmd;
mod dashboard;
mod meal;
mod profile;
mod water;

pub use auth::AuthCommand;
pub use calendar::CalendarCommand;
pub use config_cmd::ConfigCommand;
pub use dashboard::DashboardCommand;
pub use meal::MealCommand;
pub use profile::ProfileCommand;
pub use water::WaterCommand;
