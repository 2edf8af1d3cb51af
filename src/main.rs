use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use wayfarer::backend::{MockAuthBackend, MockTripBackend};
use wayfarer::core::config::{self, ResolvedConfig};
use wayfarer::core::storage::FileTokenStorage;
use wayfarer::core::trips::{Trip, TripStatus};
use wayfarer::store::{SessionStore, TripStore};

#[derive(Parser)]
#[command(name = "wayfarer", about = "Trip planner session and trip tools")]
struct Args {
    /// Directory holding the session token (default ~/.wayfarer)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip the simulated backend latency
    #[arg(long, global = true)]
    instant: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List trips
    Trips {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show one trip in detail
    Show { id: String },
    /// Per-status counts and total budget
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Planning,
    Booked,
    Ongoing,
    Completed,
}

impl From<StatusArg> for TripStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Planning => TripStatus::Planning,
            StatusArg::Booked => TripStatus::Booked,
            StatusArg::Ongoing => TripStatus::Ongoing,
            StatusArg::Completed => TripStatus::Completed,
        }
    }
}

fn session_store(config: &ResolvedConfig) -> SessionStore {
    SessionStore::new(
        Arc::new(MockAuthBackend::new(config.auth_latency)),
        Arc::new(FileTokenStorage::new(&config.data_dir)),
    )
}

fn trip_store(config: &ResolvedConfig) -> TripStore {
    TripStore::new(Arc::new(MockTripBackend::new(config.trip_latency)))
}

fn print_trip_line(trip: &Trip) {
    println!(
        "{:>36}  {:<18} {:<18} {} → {}  ${:>6}  {}",
        trip.id, trip.title, trip.destination, trip.start_date, trip.end_date, trip.budget, trip.status
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to wayfarer.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("wayfarer.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config()?;
    let resolved = config::resolve(&file_config, args.data_dir.as_deref(), args.instant);
    log::info!("Wayfarer starting up, data dir {}", resolved.data_dir.display());

    match args.command {
        Command::Login { email, password } => {
            let user = session_store(&resolved).login(&email, &password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let user = session_store(&resolved)
                .register(&name, &email, &password)
                .await?;
            println!("Welcome, {}", user.name);
        }
        Command::Logout => {
            session_store(&resolved).logout();
            println!("Signed out");
        }
        Command::Whoami => match session_store(&resolved).restore().await {
            Ok(Some(user)) => println!("{} <{}> (id {})", user.name, user.email, user.id),
            Ok(None) => println!("Not signed in"),
            Err(e) => println!("Stored session is no longer valid ({e})"),
        },
        Command::Trips { status } => {
            let store = trip_store(&resolved);
            store.fetch_trips().await?;
            let wanted = status.map(TripStatus::from);
            for trip in store
                .snapshot()
                .trips
                .iter()
                .filter(|trip| wanted.is_none_or(|s| trip.status == s))
            {
                print_trip_line(trip);
            }
        }
        Command::Show { id } => {
            let store = trip_store(&resolved);
            store.fetch_trips().await?;
            let trip = store.select_by_id(&id)?;
            let today = Local::now().date_naive();
            println!("{} ({})", trip.title, trip.status);
            println!("  destination  {}", trip.destination);
            println!("  dates        {} → {}", trip.start_date, trip.end_date);
            println!("  duration     {} days", trip.duration_days());
            println!("  budget       ${}", trip.budget);
            if let Some(daily) = trip.daily_budget() {
                println!("  per day      ${daily}");
            }
            println!("  starts in    {} days", trip.days_until_start(today));
        }
        Command::Stats => {
            let store = trip_store(&resolved);
            store.fetch_trips().await?;
            let stats = store.snapshot().stats();
            println!("total      {}", stats.total);
            println!("planning   {}", stats.planning);
            println!("booked     {}", stats.booked);
            println!("ongoing    {}", stats.ongoing);
            println!("completed  {}", stats.completed);
            println!("budget     ${}", stats.total_budget);
        }
    }

    Ok(())
}
