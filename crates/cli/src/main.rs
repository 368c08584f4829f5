//! `booking` CLI entry-point.
//!
//! Thin operator front-end over the `db` repositories:
//! - `reservations` — list, look up and create reservations.
//! - `users`        — list, look up, check credentials and create users.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use db::repository::users;
use db::{DbConfig, Gateway, PgGateway, ReservationRepository};

#[derive(Parser)]
#[command(
    name = "booking",
    about = "Reservation and user data access for the booking backend",
    version
)]
struct Cli {
    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DbArgs {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    /// Seconds to wait for a free pooled connection.
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    acquire_timeout_secs: u64,
}

impl DbArgs {
    fn to_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: std::time::Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Reservation operations.
    #[command(subcommand)]
    Reservations(ReservationCommand),
    /// User operations.
    #[command(subcommand)]
    Users(UserCommand),
}

#[derive(Subcommand)]
enum ReservationCommand {
    /// List every reservation, newest first.
    List,
    /// Show one reservation.
    Get { id: Uuid },
    /// Show the reservation held by a user.
    ByUser { user_id: Uuid },
    /// Create a reservation and print its id.
    Create {
        #[arg(long)]
        user_id: String,
        /// RFC 3339 timestamp, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
        #[arg(long)]
        people: i32,
        #[arg(long)]
        special_request: String,
        #[arg(long, default_value = "pending")]
        status: String,
    },
}

#[derive(Subcommand)]
enum UserCommand {
    /// List every user, newest first.
    List,
    /// Show one user.
    Get { id: Uuid },
    /// Show the user registered under an email address.
    ByEmail { email: String },
    /// Check an email/password pair and show the matching user.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a user.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_reservations<G: Gateway>(
    repo: &ReservationRepository<G>,
    cmd: ReservationCommand,
) -> Result<()> {
    match cmd {
        ReservationCommand::List => print_json(&repo.fetch_reservations().await?),
        ReservationCommand::Get { id } => print_json(
            &repo
                .fetch_reservation_by_id(id)
                .await
                .with_context(|| format!("reservation {id}"))?,
        ),
        ReservationCommand::ByUser { user_id } => print_json(
            &repo
                .fetch_reservation_by_user_id(user_id)
                .await
                .with_context(|| format!("reservation for user {user_id}"))?,
        ),
        ReservationCommand::Create {
            user_id,
            date,
            people,
            special_request,
            status,
        } => {
            let id = repo
                .create_reservation(&user_id, &date, people, &special_request, &status)
                .await
                .context("failed to create reservation")?;
            print_json(&json!({ "id": id }))
        }
    }
}

async fn run_users<G: Gateway>(gateway: &G, cmd: UserCommand) -> Result<()> {
    match cmd {
        UserCommand::List => print_json(&users::fetch_users(gateway).await?),
        UserCommand::Get { id } => print_json(
            &users::fetch_user_by_id(gateway, id)
                .await
                .with_context(|| format!("user {id}"))?,
        ),
        UserCommand::ByEmail { email } => print_json(
            &users::fetch_user_by_email(gateway, &email)
                .await
                .with_context(|| format!("user {email}"))?,
        ),
        UserCommand::Login { email, password } => print_json(
            &users::fetch_user_by_email_and_password(gateway, &email, &password)
                .await
                .context("invalid email or password")?,
        ),
        UserCommand::Create {
            name,
            email,
            password,
        } => {
            users::create_user(gateway, &name, &email, &password)
                .await
                .context("failed to create user")?;
            print_json(&json!({ "created": true, "email": email }))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let pool = db::pool::create_pool(&cli.db.to_config())
        .await
        .context("failed to connect to database")?;
    let gateway = PgGateway::new(pool);
    info!("Connected to database");

    match cli.command {
        Command::Reservations(cmd) => run_reservations(&ReservationRepository::new(gateway), cmd).await,
        Command::Users(cmd) => run_users(&gateway, cmd).await,
    }
}
