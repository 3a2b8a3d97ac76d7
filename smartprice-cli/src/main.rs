//! SmartPrice CLI
//!
//! Command-line interface for the SmartPrice API.

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use smartprice_client::SmartPriceClient;
use smartprice_hex::{ExchangeRateProvider, LocationResolver, SmartPrice, SmartPriceConfig};
use smartprice_providers::StaticPermission;
use smartprice_types::{ConvertQuery, Coordinates, RoundingMode, RoundingPolicy};

#[derive(Parser)]
#[command(name = "smartprice")]
#[command(author, version, about = "SmartPrice API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the SmartPrice API
    #[arg(
        long,
        env = "SMARTPRICE_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    /// Locate this IP instead of the caller (sent as X-Forwarded-For)
    #[arg(long, env = "SMARTPRICE_CLIENT_IP")]
    ip: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect location from IP
    Location,
    /// Resolve coordinates to a location
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Look up an exchange rate
    Rate {
        /// Target currency
        target: String,
        /// Base currency (server default when omitted)
        #[arg(long)]
        base: Option<String>,
    },
    /// Convert an amount on the server
    Convert {
        amount: f64,
        /// Target currency
        currency: String,
        #[arg(long)]
        base: Option<String>,
        /// up, down or nearest
        #[arg(long, default_value = "nearest")]
        mode: RoundingMode,
        /// Round to a multiple of this many units
        #[arg(long)]
        granularity: Option<u32>,
    },
    /// Localize a price end to end: detect, fetch rate, convert
    Price {
        /// Amount in the base currency
        amount: f64,
        #[arg(long, default_value = "USD")]
        base: String,
        /// Skip detection and show the price in this currency
        #[arg(long)]
        currency: Option<String>,
        /// Browser-style coordinates; enables the browser strategy
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Fail instead of falling back to IP detection
        #[arg(long)]
        no_ip_fallback: bool,
        #[arg(long, default_value = "nearest")]
        mode: RoundingMode,
        #[arg(long)]
        granularity: Option<u32>,
        /// Print the full adapter state as JSON
        #[arg(long)]
        json: bool,
    },
    /// List supported currencies
    Currencies,
    /// Check API health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut client = SmartPriceClient::new(&cli.api_url);
    if let Some(ip) = &cli.ip {
        client = client.with_forwarded_for(ip);
    }

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Location => {
            let location = client.detect_location().await?;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }

        Commands::Reverse { lat, lon } => {
            let location = client.reverse_geocode(lat, lon).await?;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }

        Commands::Rate { target, base } => {
            let quote = client.exchange_rate(base.as_deref(), &target).await?;
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }

        Commands::Convert {
            amount,
            currency,
            base,
            mode,
            granularity,
        } => {
            let query = ConvertQuery {
                amount,
                currency,
                base,
                mode,
                granularity,
            };
            let converted = client.convert(&query).await?;
            println!("{}", serde_json::to_string_pretty(&converted)?);
        }

        Commands::Price {
            amount,
            base,
            currency,
            lat,
            lon,
            no_ip_fallback,
            mode,
            granularity,
            json,
        } => {
            let coordinates = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
            let config = SmartPriceConfig {
                base_currency: base,
                prefer_browser_geolocation: coordinates.is_some(),
                fallback_to_ip: !no_ip_fallback,
                client_ip: cli.ip.clone(),
                rounding: RoundingPolicy::with_mode(mode)
                    .granularity(granularity.and_then(NonZeroU32::new)),
                ..Default::default()
            };

            let smart = SmartPrice::new(
                Arc::new(LocationResolver::new(client.clone(), client.clone())),
                Arc::new(ExchangeRateProvider::new(client)),
                StaticPermission::from(coordinates),
                config,
            );

            let snapshot = match currency {
                Some(code) => smart.change_currency(&code).await,
                None => smart.resolve_location().await,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            if let Some(error) = &snapshot.error {
                eprintln!("warning: {}", error);
            }
            println!("{}", smart.formatted_amount(amount));
            smart.dispose();
        }

        Commands::Currencies => {
            for currency in client.currencies().await? {
                println!(
                    "{:<4} {:<4} {} ({} decimals)",
                    currency.code, currency.symbol, currency.name, currency.decimal_places
                );
            }
        }
    }

    Ok(())
}
