//! Daily progress overview.

use clap::Args;

use vitalog::sync::SyncCoordinator;

/// Show today's progress against goals
#[derive(Args)]
pub struct DashboardCommand {}

impl DashboardCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dash = coordinator.dashboard().await?;

        println!("Dashboard for {} ({})", dash.user.first_name, dash.date);
        println!("==============================");
        println!();
        println!("Meals");
        println!("  breakfast: {}", check(dash.meal_status.breakfast));
        println!("  lunch:     {}", check(dash.meal_status.lunch));
        println!("  dinner:    {}", check(dash.meal_status.dinner));
        println!();
        println!(
            "Calories: {} / {}",
            dash.progress.calories_consumed, dash.progress.calories_goal
        );
        println!(
            "Water:    {} / {} glasses",
            dash.progress.water_intake, dash.progress.water_goal
        );
        println!(
            "Meals:    {} / {}",
            dash.progress.meals_completed, dash.progress.meals_total
        );

        Ok(())
    }
}

fn check(done: bool) -> &'static str {
    if done {
        "✓"
    } else {
        "✗"
    }
}
