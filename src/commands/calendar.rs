//! Calendar views of logged meals.

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Subcommand};

use vitalog::sync::{CalendarEntry, SyncCoordinator};

#[derive(Args)]
pub struct CalendarCommand {
    #[command(subcommand)]
    pub command: CalendarSubcommand,
}

#[derive(Subcommand)]
pub enum CalendarSubcommand {
    /// Meals logged in a month, grouped by day
    Month {
        /// Year, defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Month (1-12), defaults to the current month
        #[arg(long, short)]
        month: Option<u32>,
    },

    /// Meals logged on one date
    Day {
        /// Date (YYYY-MM-DD)
        date: String,
    },
}

impl CalendarCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            CalendarSubcommand::Month { year, month } => {
                let now = Local::now();
                let year = year.unwrap_or_else(|| now.year());
                let month = month.unwrap_or_else(|| now.month());

                let entries = coordinator.meals_for_month(year, month).await?;
                if entries.is_empty() {
                    println!("No meals logged in {:04}-{:02}.", year, month);
                    return Ok(());
                }

                let mut current: Option<NaiveDate> = None;
                for entry in &entries {
                    let day = entry.date.unwrap_or_else(|| entry.logged_at.date_naive());
                    if current != Some(day) {
                        if current.is_some() {
                            println!();
                        }
                        println!("{}", day);
                        println!("{}", "-".repeat(40));
                        current = Some(day);
                    }
                    print_entry(entry);
                }

                println!();
                println!("Total: {} meal(s)", entries.len());
                Ok(())
            }

            CalendarSubcommand::Day { date } => {
                let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", date))?;

                let entries = coordinator.meals_for_date(parsed).await?;
                if entries.is_empty() {
                    println!("No meals logged on {}.", parsed);
                    return Ok(());
                }

                for entry in &entries {
                    print_entry(entry);
                }
                let total: i64 = entries.iter().map(|e| e.calories).sum();
                println!();
                println!("Total: {} cal", total);
                Ok(())
            }
        }
    }
}

fn print_entry(entry: &CalendarEntry) {
    let marker = if entry.is_custom { " (custom)" } else { "" };
    println!(
        "  {:10} {}{} ({} cal)",
        entry.meal_type.as_str(),
        entry.name,
        marker,
        entry.calories
    );
}
