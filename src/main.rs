// Copyright 2026 eTRV Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `etrvctl` command line for eTRV radiator thermostats.

mod config;

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Weekday;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etrv::{Address, DeviceIdentity, DeviceSession, SecretKey};

use config::Config;

#[derive(Parser)]
#[command(name = "etrvctl", version, about = "Control eTRV radiator thermostats over BLE")]
struct Cli {
    /// 4-character device PIN; overrides the stored one.
    #[arg(long, global = true)]
    pin: Option<String>,

    /// Secret key as 32 hex characters; overrides the stored one.
    #[arg(long, global = true)]
    secret: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan for eTRV devices in range.
    Scan {
        /// Scan window in seconds.
        #[arg(long, default_value_t = 10.0)]
        timeout: f64,
    },

    /// Retrieve the secret key from a device in pairing mode and store it.
    Pair {
        /// Device address, e.g. 00:04:2F:AA:BB:CC.
        address: String,
    },

    /// Read or command temperatures.
    #[command(subcommand)]
    Temperature(TemperatureCommand),

    /// Show frost protection, schedule mode and vacation settings.
    Settings { address: String },

    /// Show the battery level.
    Battery { address: String },

    /// Show the device clock.
    Clock { address: String },

    /// Show the device name.
    Name { address: String },

    /// Show the weekly set-point program.
    Schedule { address: String },
}

#[derive(Subcommand)]
enum TemperatureCommand {
    /// Read room and set-point temperature.
    Get { address: String },

    /// Command a new set-point in °C, half-degree resolution.
    Set { address: String, value: f32 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("etrv=info".parse()?),
        )
        .init();

    let Cli {
        pin,
        secret,
        command,
    } = Cli::parse();
    let mut config = Config::load()?;

    match command {
        Command::Scan { timeout } => {
            println!("Detected eTRV devices:");
            for device in etrv::scan(Duration::from_secs_f64(timeout)).await? {
                match device.rssi {
                    Some(rssi) => println!("{}, RSSI={rssi}dB", device.address),
                    None => println!("{}", device.address),
                }
            }
        }

        Command::Pair { address } => {
            let identity = identity_for(&config, &address, pin.as_deref(), None)?;
            println!(
                "In 5 seconds the secret key will be read from {address}. \
                 Put the device in pairing mode first by pressing its button; \
                 the key is stored for later commands."
            );
            tokio::time::sleep(Duration::from_secs(5)).await;

            let mut session = DeviceSession::new(identity);
            let secret = session.retrieve_secret_key().await?;
            session.disconnect().await?;

            println!("Secret key: {secret}");
            config.set_secret(&address, secret.to_string());
            config.save()?;
        }

        Command::Temperature(TemperatureCommand::Get { address }) => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let reading = session.temperature().await?;
            session.disconnect().await?;
            println!("room temperature: {} °C", reading.room);
            println!("set-point:        {} °C", reading.set_point);
        }

        Command::Temperature(TemperatureCommand::Set { address, value }) => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            session.set_temperature(value).await?;
            let reading = session.temperature().await?;
            session.disconnect().await?;
            println!("set-point is now {} °C", reading.set_point);
        }

        Command::Settings { address } => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let settings = session.settings().await?;
            session.disconnect().await?;
            println!("frost protection:     {} °C", settings.frost_protection_temperature);
            println!("schedule mode:        {}", settings.schedule_mode);
            println!("vacation temperature: {} °C", settings.vacation_temperature);
            println!("vacation from:        {}", settings.vacation_from.to_rfc3339());
            println!("vacation to:          {}", settings.vacation_to.to_rfc3339());
        }

        Command::Battery { address } => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let battery = session.battery().await?;
            session.disconnect().await?;
            println!("{battery}%");
        }

        Command::Clock { address } => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let clock = session.clock().await?;
            session.disconnect().await?;
            println!("{}", clock.to_rfc3339());
        }

        Command::Name { address } => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let name = session.device_name().await?;
            session.disconnect().await?;
            println!("{name}");
        }

        Command::Schedule { address } => {
            let mut session = open(&config, &address, pin.as_deref(), secret.as_deref())?;
            let schedule = session.schedule().await?;
            session.disconnect().await?;
            for day in [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ] {
                let entries = schedule.entries(day);
                if entries.is_empty() {
                    println!("{day}: -");
                    continue;
                }
                let line: Vec<String> = entries
                    .iter()
                    .map(|e| format!("{} {} °C", e.time.format("%H:%M"), e.temperature))
                    .collect();
                println!("{day}: {}", line.join(", "));
            }
        }
    }

    Ok(())
}

/// Session for a device, with the secret key required.
fn open(
    config: &Config,
    address: &str,
    pin: Option<&str>,
    secret: Option<&str>,
) -> Result<DeviceSession> {
    let identity = identity_for(config, address, pin, Some(secret))?;
    Ok(DeviceSession::new(identity))
}

/// Resolve address, PIN and (optionally) secret from arguments and the
/// stored configuration. `secret` of `None` skips the key entirely, as
/// the pairing flow must.
fn identity_for(
    config: &Config,
    address: &str,
    pin: Option<&str>,
    secret: Option<Option<&str>>,
) -> Result<DeviceIdentity> {
    let parsed: Address = address.parse().context("invalid device address")?;
    let stored = config.device(address);

    let mut identity = DeviceIdentity::new(parsed);
    if let Some(pin) = pin.or(stored.pin.as_deref()) {
        identity = identity.with_pin(parse_pin(pin)?);
    }
    if let Some(secret) = secret {
        let secret = secret
            .or(stored.secret.as_deref())
            .context("no secret key known for this device; run `etrvctl pair` first")?;
        identity = identity.with_secret(secret.parse::<SecretKey>()?);
    }
    Ok(identity)
}

fn parse_pin(pin: &str) -> Result<[u8; 4]> {
    <[u8; 4]>::try_from(pin.as_bytes()).context("PIN must be exactly 4 characters")
}
