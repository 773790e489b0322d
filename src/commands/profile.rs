//! Profile viewing and editing.

use clap::{Args, Subcommand};

use vitalog::models::{ProfileUpdate, User};
use vitalog::sync::{DataSource, SyncCoordinator};

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the profile as the server has it
    Show,

    /// Update profile fields
    Update {
        /// First name
        #[arg(long)]
        first_name: Option<String>,

        /// Last name
        #[arg(long)]
        last_name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        date_of_birth: Option<String>,

        /// Gender
        #[arg(long)]
        gender: Option<String>,

        /// Height in centimeters
        #[arg(long)]
        height: Option<f64>,

        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        /// Systolic blood pressure
        #[arg(long)]
        bp_systolic: Option<i64>,

        /// Diastolic blood pressure
        #[arg(long)]
        bp_diastolic: Option<i64>,

        /// Diabetes type (e.g. none, type1, type2)
        #[arg(long)]
        diabetes_type: Option<String>,

        /// Treatment type
        #[arg(long)]
        treatment_type: Option<String>,
    },
}

impl ProfileCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ProfileSubcommand::Show => {
                let user = coordinator.profile().await?;
                print_profile(&user);
                Ok(())
            }

            ProfileSubcommand::Update {
                first_name,
                last_name,
                phone,
                date_of_birth,
                gender,
                height,
                weight,
                bp_systolic,
                bp_diastolic,
                diabetes_type,
                treatment_type,
            } => {
                let update = ProfileUpdate {
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    phone: phone.clone(),
                    date_of_birth: date_of_birth.clone(),
                    gender: gender.clone(),
                    height: *height,
                    weight: *weight,
                    blood_pressure_systolic: *bp_systolic,
                    blood_pressure_diastolic: *bp_diastolic,
                    diabetes_type: diabetes_type.clone(),
                    treatment_type: treatment_type.clone(),
                };

                let outcome = coordinator.update_profile(&update).await?;
                if outcome.source == DataSource::LocalCache {
                    println!("Server unreachable; the change is saved locally only.");
                    println!();
                }
                print_profile(&outcome.user);
                Ok(())
            }
        }
    }
}

fn print_profile(user: &User) {
    println!("Profile");
    println!("=======");
    println!();
    println!("  Username: {}", user.username);
    println!("  Name:     {}", user.full_name());
    println!("  Email:    {}", user.email);
    if !user.phone.is_empty() {
        println!("  Phone:    {}", user.phone);
    }
    if !user.date_of_birth.is_empty() {
        println!("  Born:     {}", user.date_of_birth);
    }
    if !user.gender.is_empty() {
        println!("  Gender:   {}", user.gender);
    }
    if let Some(height) = user.height {
        println!("  Height:   {} cm", height);
    }
    if let Some(weight) = user.weight {
        println!("  Weight:   {} kg", weight);
    }
    if let (Some(systolic), Some(diastolic)) =
        (user.blood_pressure_systolic, user.blood_pressure_diastolic)
    {
        println!("  Blood pressure: {}/{}", systolic, diastolic);
    }
    if let Some(diabetes) = &user.diabetes_type {
        println!("  Diabetes: {}", diabetes);
        if let Some(treatment) = &user.treatment_type {
            println!("  Treatment: {}", treatment);
        }
    }
}
