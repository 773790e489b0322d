//! Account and session commands.

use clap::{Args, Subcommand};
use std::io::{self, Write};

use vitalog::models::NewUser;
use vitalog::sync::{DataSource, SyncCoordinator};

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand)]
pub enum AuthSubcommand {
    /// Create a new account
    Register {
        /// Username (3-50 characters; letters, digits and underscores)
        username: String,

        /// Email address
        #[arg(long, short)]
        email: String,

        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long, default_value = "")]
        date_of_birth: String,

        /// Gender
        #[arg(long, default_value = "")]
        gender: String,
    },

    /// Sign in with a username or email address
    Login {
        /// Username or email address
        identifier: String,
    },

    /// Sign out on this device and invalidate the server session
    Logout,

    /// Show who is signed in
    Status,
}

impl AuthCommand {
    pub async fn run(
        &self,
        coordinator: &SyncCoordinator,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            AuthSubcommand::Register {
                username,
                email,
                first_name,
                last_name,
                phone,
                date_of_birth,
                gender,
            } => {
                let password = prompt("Password: ")?;
                let confirm_password = prompt("Confirm password: ")?;

                let new_user = NewUser {
                    username: username.clone(),
                    email: email.clone(),
                    password,
                    confirm_password,
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    phone: phone.clone(),
                    date_of_birth: date_of_birth.clone(),
                    gender: gender.clone(),
                };

                let user = coordinator.register(&new_user).await?;
                println!("Welcome, {}! Your account is ready.", user.full_name());
                Ok(())
            }

            AuthSubcommand::Login { identifier } => {
                let password = prompt("Password: ")?;
                let user = coordinator.login(identifier, &password).await?;
                println!("Logged in as {} ({})", user.username, user.full_name());
                Ok(())
            }

            AuthSubcommand::Logout => {
                let outcome = coordinator.logout().await;
                if outcome.remote_invalidated {
                    println!("Logged out.");
                } else {
                    println!("Logged out on this device.");
                    println!("The server could not be reached; the session there expires on its own.");
                }
                Ok(())
            }

            AuthSubcommand::Status => {
                if !coordinator.context().is_logged_in() {
                    println!("Not logged in. Run 'vitalog auth login' to sign in.");
                    return Ok(());
                }
                match coordinator.verify_session().await {
                    Ok(verified) => {
                        println!(
                            "Logged in as {} ({})",
                            verified.user.username, verified.user.email
                        );
                        if verified.source == DataSource::LocalCache {
                            println!("Server unreachable; session validated from the local cache.");
                        }
                    }
                    Err(e) => {
                        println!("Session is no longer valid: {}", e);
                        println!("Run 'vitalog auth login' to sign in again.");
                    }
                }
                Ok(())
            }
        }
    }
}

fn prompt(label: &str) -> Result<String, io::Error> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
