//! CLI commands

use anyhow::{Context, Result};
use careerpath_http::types::{RegisterRequest, ResetMethod, UserUpdate};
use careerpath_http::{ApiClient, ClientConfig};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config;
use crate::state_dir::StateDir;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        email: String,

        #[arg(long, env = "CAREERPATH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign in with a Google ID token
    GoogleLogin {
        /// ID token issued to the configured Google client
        id_token: String,
    },

    /// Create an account
    Register {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "CAREERPATH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored tokens
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Update profile fields
    Profile {
        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email_notifications: Option<bool>,

        #[arg(long)]
        privacy_mode: Option<bool>,
    },

    /// Password management
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },

    /// Predict a career role
    Predict {
        #[command(subcommand)]
        command: PredictCommands,
    },

    /// List past predictions
    History {
        /// Include every user's predictions (admin only)
        #[arg(long)]
        all: bool,
    },

    /// Prediction analytics
    Analytics {
        #[command(subcommand)]
        command: AnalyticsCommands,
    },

    /// In-app notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Client configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PasswordCommands {
    /// Change the password of the signed-in user
    Change {
        #[arg(long)]
        old: String,

        #[arg(long)]
        new: String,
    },

    /// Ask for a reset link or one-time password by email
    RequestReset {
        email: String,

        #[arg(long, value_enum, default_value = "token")]
        method: ResetVia,
    },

    /// Set a new password with the token from a reset link
    Reset {
        token: String,

        #[arg(long)]
        new: String,
    },

    /// Set a new password with an emailed one-time password
    ResetOtp {
        email: String,

        #[arg(long)]
        otp: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResetVia {
    Token,
    Otp,
}

impl From<ResetVia> for ResetMethod {
    fn from(via: ResetVia) -> Self {
        match via {
            ResetVia::Token => Self::Token,
            ResetVia::Otp => Self::Otp,
        }
    }
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict from a list of skills
    Skills {
        /// Skills, comma separated or as separate arguments
        #[arg(required = true, value_delimiter = ',')]
        skills: Vec<String>,
    },

    /// Predict from a resume file (PDF, DOC, DOCX or TXT)
    Resume { path: PathBuf },
}

#[derive(Subcommand)]
pub enum AnalyticsCommands {
    /// User and prediction totals
    Overview,

    /// Predictions per role
    Roles,

    /// Predictions per month
    Monthly {
        #[arg(long, default_value_t = careerpath_http::client::analytics::DEFAULT_MONTHS)]
        months: u32,
    },

    /// Most active users
    Users,
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications
    List,

    /// Mark a notification as read
    Read { id: i64 },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Output file path (defaults to the state directory's config.json)
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub async fn execute(
        self,
        client: &ApiClient,
        config: &ClientConfig,
        state_dir: &StateDir,
    ) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                client.login(&email, &password).await?;
                let user = client.me().await?;
                println!("Signed in as {} ({})", user.username, user.email);
                Ok(())
            }
            Self::GoogleLogin { id_token } => {
                if let Some(client_id) = &config.google_client_id {
                    debug!("Exchanging ID token issued to {client_id}");
                }
                client.google_login(&id_token).await?;
                let user = client.me().await?;
                println!("Signed in as {} ({})", user.username, user.email);
                Ok(())
            }
            Self::Register {
                username,
                email,
                password,
            } => {
                let user = client
                    .register(&RegisterRequest {
                        username,
                        email,
                        password,
                    })
                    .await?;
                print_json(&user)
            }
            Self::Logout => {
                client.logout().await?;
                println!("Signed out");
                Ok(())
            }
            Self::Whoami => print_json(&client.me().await?),
            Self::Profile {
                username,
                email,
                first_name,
                last_name,
                email_notifications,
                privacy_mode,
            } => {
                let update = UserUpdate {
                    username,
                    email,
                    first_name,
                    last_name,
                    email_notifications_enabled: email_notifications,
                    privacy_mode_enabled: privacy_mode,
                };
                print_json(&client.update_me(&update).await?)
            }
            Self::Password { command } => command.execute(client).await,
            Self::Predict { command } => command.execute(client).await,
            Self::History { all } => {
                let predictions = if all {
                    client.all_history().await?
                } else {
                    client.history().await?
                };
                print_json(&predictions)
            }
            Self::Analytics { command } => command.execute(client).await,
            Self::Notifications { command } => command.execute(client).await,
            Self::Config { command } => command.execute(config, state_dir),
        }
    }
}

impl PasswordCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Change { old, new } => {
                client.change_password(&old, &new).await?;
                println!("Password changed");
            }
            Self::RequestReset { email, method } => {
                client.request_password_reset(&email, method.into()).await?;
                println!("Reset instructions sent to {email}");
            }
            Self::Reset { token, new } => {
                client.reset_password_with_token(&token, &new).await?;
                println!("Password reset");
            }
            Self::ResetOtp { email, otp, new } => {
                client.reset_password_with_otp(&email, &otp, &new).await?;
                println!("Password reset");
            }
        }
        Ok(())
    }
}

impl PredictCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        let prediction = match self {
            Self::Skills { skills } => client.predict_from_skills(&skills).await?,
            Self::Resume { path } => client
                .predict_from_resume_file(&path)
                .await
                .with_context(|| format!("Failed to predict from {}", path.display()))?,
        };
        info!(
            role = %prediction.predicted_role,
            confidence = ?prediction.confidence,
            "Prediction complete"
        );
        print_json(&prediction)
    }
}

impl AnalyticsCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::Overview => print_json(&client.overview().await?),
            Self::Roles => print_json(&client.roles().await?),
            Self::Monthly { months } => print_json(&client.monthly(months).await?),
            Self::Users => print_json(&client.users().await?),
        }
    }
}

impl NotificationCommands {
    pub async fn execute(self, client: &ApiClient) -> Result<()> {
        match self {
            Self::List => print_json(&client.notifications().await?),
            Self::Read { id } => print_json(&client.mark_notification_read(id).await?),
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, config: &ClientConfig, state_dir: &StateDir) -> Result<()> {
        match self {
            Self::Show => print_json(config),
            Self::Init { output } => {
                let config_path = output.unwrap_or_else(|| state_dir.config_path());

                // Create parent directory if it doesn't exist
                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                config::generate_default_config(&config_path)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_skills_accept_commas_and_arguments() {
        let cli = TestCli::parse_from(["careerpath", "predict", "skills", "rust,sql", "docker"]);
        match cli.command {
            Commands::Predict {
                command: PredictCommands::Skills { skills },
            } => assert_eq!(skills, vec!["rust", "sql", "docker"]),
            _ => panic!("expected predict skills"),
        }
    }

    #[test]
    fn test_monthly_defaults_to_six_months() {
        let cli = TestCli::parse_from(["careerpath", "analytics", "monthly"]);
        assert!(matches!(
            cli.command,
            Commands::Analytics {
                command: AnalyticsCommands::Monthly { months: 6 }
            }
        ));
    }

    #[test]
    fn test_login_reads_password_flag() {
        let cli = TestCli::parse_from([
            "careerpath",
            "login",
            "ada@example.com",
            "--password",
            "secret",
        ]);
        assert!(matches!(
            cli.command,
            Commands::Login { ref email, ref password }
                if email == "ada@example.com" && password == "secret"
        ));
    }

    #[test]
    fn test_config_init_writes_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let state_dir = StateDir::with_override(temp_dir.path());

        ConfigCommands::Init { output: None }
            .execute(&ClientConfig::default(), &state_dir)
            .unwrap();

        assert!(state_dir.config_path().exists());
    }
}
