//! Water intake commands.

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use vitalog::sync::SyncCoordinator;

#[derive(Args)]
pub struct WaterCommand {
    #[command(subcommand)]
    pub command: WaterSubcommand,
}

#[derive(Subcommand)]
pub enum WaterSubcommand {
    /// Set today's water intake
    Set {
        /// Glasses of water drunk today
        glasses: i64,
    },

    /// Show water intake for a date
    Show {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl WaterCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WaterSubcommand::Set { glasses } => {
                let saved = coordinator.save_water(*glasses).await?;
                println!("Water intake for {}: {} glass(es)", saved.date, saved.glasses);
                Ok(())
            }

            WaterSubcommand::Show { date } => {
                let date = match date {
                    Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
                        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d))?,
                    None => Local::now().date_naive(),
                };
                let level = coordinator.water_for_date(date).await?;
                println!("Water intake for {}: {} glass(es)", level.date, level.glasses);
                Ok(())
            }
        }
    }
}
