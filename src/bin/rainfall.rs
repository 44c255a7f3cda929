// neorsd_rainfall - Rainfall data extraction from the NEORSD rainfall dashboard
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use clap::Parser;
use neorsd_rainfall::client::RainfallClient;
use neorsd_rainfall::report;
use reqwest::Client;
use std::io;
use std::process;
use std::time::Duration;
use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::WARN;
const DEFAULT_LOCATION: &str = "Beachwood";
const DEFAULT_YEAR: i32 = 2012;

/// Fetch daily rainfall totals for an entire year from the NEORSD rainfall dashboard.
///
/// Output is location, year month day, and rainfall in inches (rounded to nearest hundredth).
#[derive(Debug, Parser)]
#[clap(name = "rainfall", version = clap::crate_version!())]
struct RainfallApplication {
    /// Name of the gauge location to fetch data for
    #[clap(long, default_value_t = DEFAULT_LOCATION.into())]
    location: String,

    /// Year of rainfall data to fetch
    #[clap(long, default_value_t = DEFAULT_YEAR, allow_negative_numbers = true)]
    year: i32,

    /// Log each request and response for debugging, same as '--log-level debug'
    #[clap(long)]
    verbose: bool,

    /// Logging verbosity. Allowed values are 'trace', 'debug', 'info', 'warn', and 'error'
    /// (case insensitive)
    #[clap(long, default_value_t = DEFAULT_LOG_LEVEL)]
    log_level: Level,

    /// Base URL of the dashboard table data endpoint
    #[clap(long, default_value_t = RainfallClient::DEFAULT_BASE_URL.into())]
    api_url: String,

    /// Timeout for each request to the dashboard, in milliseconds. No timeout by default.
    #[clap(long)]
    timeout_millis: Option<u64>,
}

#[tokio::main]
async fn main() {
    let opts = RainfallApplication::parse();
    let level = if opts.verbose { Level::DEBUG } else { opts.log_level };
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(io::stderr)
            .finish(),
    )
    .expect("failed to set tracing subscriber");

    let mut builder = Client::builder();
    if let Some(millis) = opts.timeout_millis {
        builder = builder.timeout(Duration::from_millis(millis));
    }

    let http_client = builder.build().unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize HTTP client", error = %e);
        process::exit(1)
    });

    let client = RainfallClient::new(http_client, &opts.api_url).unwrap_or_else(|e| {
        tracing::error!(message = "unable to initialize rainfall client", error = %e);
        process::exit(1)
    });

    tracing::debug!(message = "fetching daily totals for year", location = %opts.location, year = opts.year);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match report::write_year(&client, &opts.location, opts.year, &mut out).await {
        Ok(lines) => {
            tracing::info!(message = "finished", location = %opts.location, year = opts.year, lines = lines);
        }
        Err(e) => {
            tracing::error!(message = "failed to fetch rainfall", location = %opts.location, year = opts.year, error = %e);
            process::exit(1)
        }
    }
}
