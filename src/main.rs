#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use config::Config;
use error::StartupError;
use fronius_exporter::{Collector, Fronius};
use rocket::State;
use std::net::SocketAddr;
use std::time::Duration;

mod error;
mod metrics;

const LISTEN_ADDRESS: &str = "0.0.0.0:9109";
const TIMEOUT_SECS: i64 = 15;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct FroniusConfig {
    /// Base URL of the inverter's datamanager, e.g. `http://192.168.1.20`.
    url: String,
    listen_address: String,
    /// Per request timeout towards the inverter, in seconds.
    timeout: u64,
}

impl FroniusConfig {
    fn listen_address(&self) -> Result<SocketAddr, StartupError> {
        self.listen_address
            .parse()
            .map_err(|e| StartupError::ListenAddress(self.listen_address.to_owned(), e))
    }
}

/// Structure containing state for API handlers.
pub struct StateData {
    collector: Collector<Fronius>,
}

fn with_defaults(mut settings: Config) -> Result<Config, config::ConfigError> {
    settings
        .set_default("listen_address", LISTEN_ADDRESS)?
        .set_default("timeout", TIMEOUT_SECS)?;
    Ok(settings)
}

/// Read `FRONIUS_URL`, `FRONIUS_LISTEN_ADDRESS` and `FRONIUS_TIMEOUT`.
pub fn read_settings() -> Result<FroniusConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings.merge(config::Environment::with_prefix("FRONIUS"))?;

    with_defaults(settings)?.try_into()
}

#[get("/metrics")]
async fn metrics_route(state: &State<StateData>) -> Result<String, error::Error> {
    let records = state.collector.collect().await;
    log::debug!("collected {} metric(s)", records.len());
    metrics::encode(&records)
}

async fn run() -> Result<(), StartupError> {
    let settings = read_settings()?;
    let address = settings.listen_address()?;
    let api = Fronius::new(&settings.url, Duration::from_secs(settings.timeout))?;

    log::info!("exporting metrics of inverters at {}", api.endpoint());

    let state = StateData {
        collector: Collector::new(api),
    };

    let figment = rocket::Config::figment()
        .merge(("address", address.ip()))
        .merge(("port", address.port()));

    let _rocket = rocket::custom(figment)
        .manage(state)
        .mount("/", routes![metrics_route])
        .launch()
        .await?;

    Ok(())
}

#[rocket::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("failed: {}", e);
        std::process::exit(1);
    }
}
