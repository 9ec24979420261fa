use crate::backend::{Clock, ReservationBackend, SystemClock};
use crate::configuration::Configuration;
use crate::configuration_handler::ConfigurationHandler;
use crate::database_interface::DatabaseInterface;
use crate::http::start_server;
use crate::local_reservations::LocalReservations;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod configuration;
mod configuration_handler;
mod database_interface;
mod http;
mod local_reservations;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
pub struct AppState<B: ReservationBackend, C: Clock, F: Configuration> {
    pub backend: B,
    pub clock: C,
    pub config: F,
}

/// Booking backend for a barbershop: slot availability, reservations and
/// the operator workflow.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Port to listen on (overrides PORT from the environment)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "startup failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ConfigurationHandler::from_env(args.port)?;
    tracing::info!(shop = %config.shop_name(), "starting booking backend");

    match config.database_url() {
        Some(database_url) => {
            let backend = DatabaseInterface::new(&database_url)?;
            start_server(AppState {
                backend,
                clock: SystemClock,
                config,
            })
            .await;
        }
        None => {
            tracing::info!("DATABASE_URL not set, using the in-memory reservation store");
            let backend = LocalReservations::default();
            backend.insert_example_barbers();
            start_server(AppState {
                backend,
                clock: SystemClock,
                config,
            })
            .await;
        }
    }
    Ok(())
}
