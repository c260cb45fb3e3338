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

//! BLE client for eTRV radiator thermostats.
//!
//! The crate drives one valve per [`DeviceSession`]: it establishes and
//! authenticates the link, wraps protected characteristic slots with the
//! device cipher, and translates the fixed binary records into °C,
//! timestamps and percent.
//!
//! # Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use etrv::{scan, DeviceIdentity, DeviceSession, SecretKey};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Find valves in range.
//!     for device in scan(Duration::from_secs(10)).await? {
//!         println!("{} ({:?} dB)", device.address, device.rssi);
//!     }
//!
//!     // Talk to a known valve.
//!     let secret: SecretKey = "000102030405060708090a0b0c0d0e0f".parse()?;
//!     let identity = DeviceIdentity::new("00:04:2F:AA:BB:CC".parse()?)
//!         .with_pin(*b"0000")
//!         .with_secret(secret);
//!     let mut session = DeviceSession::new(identity);
//!
//!     let reading = session.temperature().await?;
//!     println!("room {} °C, set {} °C", reading.room, reading.set_point);
//!     session.set_temperature(21.5).await?;
//!     session.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod bluetooth;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod session;

pub use bluetooth::connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use bluetooth::mock::MockTransport;
pub use bluetooth::scan::{scan, DiscoveredDevice, PRODUCT_MARKER};
pub use bluetooth::transport::{BleTransport, Transport};
pub use crypto::{InvalidSecretKey, SecretKey, SecureChannel};
pub use error::{
    AuthenticationError, DecodeError, EncodingError, Error, Result, TransportError,
};
pub use protocol::schedule::{Schedule, ScheduleEntry};
pub use protocol::structs::{ScheduleMode, Settings, TemperatureReading};
pub use session::{DeviceIdentity, DeviceSession};

// Device addresses come from the underlying Bluetooth stack.
pub use bluer::Address;
