//! CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;
use tracing::info;

use liftlog_lib::models::{LoginCredentials, OneRmCalculateRequest, RegisterData, VolumePeriod};
use liftlog_lib::{ApiClient, ExerciseStore, UserStore, WorkoutStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,

        /// Password (prefer the environment variable over the flag)
        #[arg(long, env = "LIFTLOG_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(long, env = "LIFTLOG_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        nickname: Option<String>,
    },

    /// End the session and forget stored credentials
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List exercises
    Exercises {
        /// Coarse muscle group (chest, back, legs, ...)
        #[arg(long)]
        muscle_group: Option<String>,

        /// Equipment family (barbell, dumbbell, machine, bodyweight, cardio)
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        equipment: Option<String>,

        #[arg(long)]
        search: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,
    },

    /// List workout sessions, newest first
    Workouts {
        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        page_size: Option<u32>,

        /// Only the five most recent sessions
        #[arg(long)]
        recent: bool,
    },

    /// List workout templates
    Templates,

    /// Estimate a one-rep max from a single set
    OneRm {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: i32,

        #[arg(long)]
        rpe: Option<i32>,
    },

    /// Training volume for a week or month
    Volume {
        /// week or month
        #[arg(long, default_value = "week")]
        period: VolumePeriod,

        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Progress report
    Progress {
        /// Days to cover (30 to 365)
        #[arg(long)]
        days: Option<u32>,
    },
}

impl Commands {
    pub async fn execute(self, client: ApiClient, users: &UserStore) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                users.login(&LoginCredentials { email, password }).await?;
                info!("Login succeeded");
                println!("Signed in as {}", users.display_name().await);
            }
            Commands::Register {
                email,
                password,
                nickname,
            } => {
                users
                    .register(&RegisterData {
                        email,
                        password,
                        nickname,
                    })
                    .await?;
                println!("Registered and signed in as {}", users.display_name().await);
            }
            Commands::Logout => {
                if let Err(e) = client.logout().await {
                    // Local sign-out still happens
                    tracing::warn!(error = %e, "Server logout failed");
                }
                users.logout().await?;
                println!("Signed out");
            }
            Commands::Whoami => print_json(&users.fetch_profile().await?)?,
            Commands::Exercises {
                muscle_group,
                category,
                equipment,
                search,
                page,
                page_size,
            } => {
                let exercises = ExerciseStore::new(client);
                exercises
                    .set_filters(|f| {
                        f.muscle_group = muscle_group;
                        f.category = category;
                        f.equipment = equipment;
                        f.search = search;
                        f.page = page.unwrap_or(f.page);
                        f.page_size = page_size.unwrap_or(f.page_size);
                    })
                    .await;
                exercises.fetch_exercises().await?;
                print_json(&exercises.filtered_exercises().await)?
            }
            Commands::Workouts {
                start_date,
                end_date,
                page,
                page_size,
                recent,
            } => {
                let workouts = WorkoutStore::new(client);
                workouts
                    .set_filters(|f| {
                        f.start_date = start_date;
                        f.end_date = end_date;
                        f.page = page.unwrap_or(f.page);
                        f.page_size = page_size.unwrap_or(f.page_size);
                    })
                    .await;
                let listed = workouts.fetch_workouts().await?;
                if recent {
                    print_json(&workouts.recent_workouts().await)?
                } else {
                    print_json(&listed)?
                }
            }
            Commands::Templates => print_json(&client.list_templates().await?)?,
            Commands::OneRm { weight, reps, rpe } => {
                let input = OneRmCalculateRequest { weight, reps, rpe };
                print_json(&client.calculate_one_rm(&input).await?)?
            }
            Commands::Volume { period, start_date } => {
                print_json(&client.volume_stats(period, start_date).await?)?
            }
            Commands::Progress { days } => print_json(&client.progress_report(days).await?)?,
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
