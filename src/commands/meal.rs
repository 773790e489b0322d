//! Meal logging and browsing commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use vitalog::models::{MealLog, MealType};
use vitalog::sync::SyncCoordinator;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Browse the predefined food catalog
    Options {
        /// Filter by meal type (breakfast, lunch, dinner)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: Option<String>,
    },

    /// Log a meal from the catalog
    Log {
        /// Meal type (breakfast, lunch, dinner)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// Catalog option id (see 'meal options')
        #[arg(long, short)]
        option: i64,

        /// Portion multiplier
        #[arg(long, short, default_value_t = 1.0)]
        portion: f64,
    },

    /// Log a food that is not in the catalog
    Custom {
        /// Food name
        name: String,

        /// Meal type (breakfast, lunch, dinner)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        meal_type: String,

        /// Calories for one portion
        #[arg(long, short)]
        calories: i64,

        /// Optional description
        #[arg(long, short)]
        description: Option<String>,

        /// Portion multiplier
        #[arg(long, short, default_value_t = 1.0)]
        portion: f64,
    },

    /// Show today's meals and calorie total
    Today,

    /// View meal history
    History {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Page size
        #[arg(long, default_value_t = 20)]
        limit: i64,

        /// Page offset
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
}

impl MealCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Options { meal_type } => {
                let filter = match meal_type {
                    Some(t) => Some(t.parse::<MealType>().map_err(|e: String| e)?),
                    None => None,
                };
                let options = coordinator.meal_options(filter).await?;

                if options.is_empty() {
                    println!("No catalog options found.");
                    return Ok(());
                }
                for option in &options {
                    println!("  [{}] {} ({} cal)", option.id, option.name, option.calories);
                    if let Some(desc) = &option.description {
                        println!("      {}", desc);
                    }
                }
                Ok(())
            }

            MealSubcommand::Log {
                meal_type,
                option,
                portion,
            } => {
                let parsed: MealType = meal_type.parse().map_err(|e: String| e)?;
                let options = coordinator.meal_options(Some(parsed)).await?;
                let chosen = options.iter().find(|o| o.id == *option).ok_or_else(|| {
                    format!("No catalog option with id {} for {}", option, parsed)
                })?;

                let log = coordinator.save_meal(parsed, chosen, *portion).await?;
                println!("Logged {}:", log.meal_type);
                print_meal(&log);
                Ok(())
            }

            MealSubcommand::Custom {
                name,
                meal_type,
                calories,
                description,
                portion,
            } => {
                let parsed: MealType = meal_type.parse().map_err(|e: String| e)?;
                let log = coordinator
                    .save_custom_food(parsed, name, description.clone(), *portion, *calories)
                    .await?;
                println!("Saved custom food for {}:", log.meal_type);
                print_meal(&log);
                Ok(())
            }

            MealSubcommand::Today => {
                let today = coordinator.meals_today().await?;

                if today.meals.is_empty() {
                    println!("No meals logged today.");
                } else {
                    for log in &today.meals {
                        let marker = if log.is_custom { " (custom)" } else { "" };
                        println!(
                            "  {:10} {}{} ({} cal)",
                            log.meal_type.as_str(),
                            log.meal_option_name,
                            marker,
                            log.calories
                        );
                    }
                    println!();
                    println!("Total: {} cal", today.total_calories);
                }
                if today.source.is_offline() {
                    println!("(served from the local cache; server unreachable)");
                }
                Ok(())
            }

            MealSubcommand::History {
                format,
                limit,
                offset,
            } => {
                let page = coordinator.meal_history(*limit, *offset).await?;

                if page.entries.is_empty() {
                    println!("No meal history found.");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&page.entries)?);
                    }
                    OutputFormat::Text => {
                        let mut current_date: Option<NaiveDate> = None;
                        for entry in &page.entries {
                            let date = entry.logged_at.date_naive();
                            if current_date != Some(date) {
                                if current_date.is_some() {
                                    println!();
                                }
                                println!("{}", date);
                                println!("{}", "-".repeat(40));
                                current_date = Some(date);
                            }

                            let marker = if entry.is_custom { " (custom)" } else { "" };
                            println!(
                                "  {:10} {}{} ({} cal)",
                                entry.meal_type.as_str(),
                                entry.name,
                                marker,
                                entry.calories
                            );
                            if let Some(desc) = &entry.description {
                                println!("             {}", desc);
                            }
                        }

                        println!();
                        match page.total {
                            Some(total) => {
                                println!("Showing {} of {} meal(s)", page.entries.len(), total)
                            }
                            None => println!("Showing {} meal(s)", page.entries.len()),
                        }
                        if page.has_more == Some(true) {
                            println!("More available; use --offset {}", offset + limit);
                        }
                    }
                }
                if page.source.is_offline() {
                    println!("(served from the local cache; server unreachable)");
                }
                Ok(())
            }
        }
    }
}

fn print_meal(log: &MealLog) {
    let marker = if log.is_custom { " (custom)" } else { "" };
    println!("  {}{}", log.meal_option_name, marker);
    if let Some(desc) = &log.meal_option_description {
        println!("  {}", desc);
    }
    println!("  Portion:  {}", log.portion_size);
    println!("  Calories: {}", log.calories);
}
