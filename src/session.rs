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

//! Device session façade.
//!
//! One explicit read and, where the device allows it, one write operation
//! per domain object. Handle numbers, encryption and wire layouts stay
//! behind this interface; callers see °C, timestamps and percent.

use bluer::Address;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::bluetooth::connection::{ConnectionConfig, ConnectionManager, ConnectionState};
use crate::bluetooth::transport::{BleTransport, Transport};
use crate::crypto::{SecretKey, SecureChannel};
use crate::error::Result;
use crate::protocol::handles::{self, Slot};
use crate::protocol::schedule::Schedule;
use crate::protocol::structs::{
    Settings, SettingsStruct, TemperatureReading, TemperatureStruct, WireStruct,
};

/// Identity of one physical device: address, PIN and optional secret.
///
/// Caller-owned and immutable for the life of a session. The PIN defaults
/// to ASCII `0000`, the factory value.
#[derive(Debug, Clone, Copy)]
pub struct DeviceIdentity {
    pub address: Address,
    pub pin: [u8; 4],
    pub secret: Option<SecretKey>,
}

impl DeviceIdentity {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            pin: *b"0000",
            secret: None,
        }
    }

    pub fn with_pin(mut self, pin: [u8; 4]) -> Self {
        self.pin = pin;
        self
    }

    pub fn with_secret(mut self, secret: SecretKey) -> Self {
        self.secret = Some(secret);
        self
    }
}

/// Session with one eTRV device.
pub struct DeviceSession<T: Transport = BleTransport> {
    identity: DeviceIdentity,
    connection: ConnectionManager<T>,
    channel: SecureChannel,
}

impl DeviceSession<BleTransport> {
    /// Session over the system Bluetooth stack with default connection
    /// policy.
    pub fn new(identity: DeviceIdentity) -> Self {
        Self::with_config(identity, ConnectionConfig::default())
    }

    /// Session over the system Bluetooth stack with an explicit
    /// connection policy.
    pub fn with_config(identity: DeviceIdentity, config: ConnectionConfig) -> Self {
        Self::with_transport(identity, BleTransport::new(identity.address), config)
    }
}

impl<T: Transport> DeviceSession<T> {
    /// Session over an arbitrary transport; the seam the test suite uses
    /// to run against a simulated device.
    pub fn with_transport(identity: DeviceIdentity, transport: T, config: ConnectionConfig) -> Self {
        Self {
            identity,
            connection: ConnectionManager::new(transport, identity.pin, config),
            channel: SecureChannel::new(identity.address, identity.secret),
        }
    }

    /// Address of the device this session talks to.
    pub fn address(&self) -> Address {
        self.identity.address
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// Whether the session is authenticated and ready.
    pub fn is_connected(&self) -> bool {
        self.connection.is_ready()
    }

    /// Connect and authenticate eagerly. Every read/write connects on
    /// demand, so calling this first is optional.
    pub async fn connect(&mut self) -> Result<()> {
        self.connection.connect(true).await
    }

    /// Tear down the link. Idempotent.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.connection.disconnect().await
    }

    /// Direct access to the underlying transport. Intended for tooling
    /// and the test suite.
    pub fn transport_mut(&mut self) -> &mut T {
        self.connection.transport_mut()
    }

    /// Battery level, percent.
    pub async fn battery(&mut self) -> Result<u8> {
        Ok(self.read_slot(handles::BATTERY).await?.battery)
    }

    /// Room and set-point temperature.
    pub async fn temperature(&mut self) -> Result<TemperatureReading> {
        Ok(self.read_slot(handles::TEMPERATURE).await?.reading())
    }

    /// Temperature measured at the valve.
    pub async fn room_temperature(&mut self) -> Result<f32> {
        Ok(self.temperature().await?.room)
    }

    /// Currently commanded set-point.
    pub async fn set_point_temperature(&mut self) -> Result<f32> {
        Ok(self.temperature().await?.set_point)
    }

    /// Command a new set-point, rounded to the nearest half-degree.
    pub async fn set_temperature(&mut self, celsius: f32) -> Result<()> {
        let record = TemperatureStruct::from_set_point(celsius)?;
        debug!("writing set-point {celsius} °C");
        self.write_slot(handles::TEMPERATURE, &record).await
    }

    /// Device settings.
    pub async fn settings(&mut self) -> Result<Settings> {
        Ok(self.read_slot(handles::SETTINGS).await?.settings())
    }

    /// Replace the device settings.
    pub async fn set_settings(&mut self, settings: &Settings) -> Result<()> {
        let record = SettingsStruct::from_settings(settings)?;
        debug!("writing settings, mode {}", settings.schedule_mode);
        self.write_slot(handles::SETTINGS, &record).await
    }

    /// Device name.
    pub async fn device_name(&mut self) -> Result<String> {
        Ok(self.read_slot(handles::DEVICE_NAME).await?.name)
    }

    /// Device clock in UTC.
    pub async fn clock(&mut self) -> Result<DateTime<Utc>> {
        Ok(self.read_slot(handles::CLOCK).await?.utc())
    }

    /// Weekly set-point program.
    pub async fn schedule(&mut self) -> Result<Schedule> {
        self.connection.ensure_ready().await?;
        let mut slots = Vec::with_capacity(handles::SCHEDULE.len());
        for handle in handles::SCHEDULE {
            slots.push(
                self.channel
                    .read(self.connection.transport_mut(), handle)
                    .await?,
            );
        }
        Ok(Schedule::decode_slots(&slots)?)
    }

    /// Read the device secret while the device is in pairing mode.
    ///
    /// The device answers this slot in the clear only after its pairing
    /// button is pressed; persistence of the key is the caller's job.
    pub async fn retrieve_secret_key(&mut self) -> Result<SecretKey> {
        self.connection.ensure_ready().await?;
        let data = self
            .channel
            .read(self.connection.transport_mut(), handles::SECRET)
            .await?;
        let secret = SecretKey::try_from(data.as_slice())?;
        info!("retrieved secret key from {}", self.identity.address);
        Ok(secret)
    }

    async fn read_slot<S: WireStruct>(&mut self, slot: Slot<S>) -> Result<S> {
        self.connection.ensure_ready().await?;
        let data = self
            .channel
            .read(self.connection.transport_mut(), slot.handle)
            .await?;
        Ok(S::decode(&data)?)
    }

    async fn write_slot<S: WireStruct>(&mut self, slot: Slot<S>, record: &S) -> Result<()> {
        // Encode before touching the link; an unrepresentable value must
        // not trigger a connect.
        let payload = record.encode()?;
        self.connection.ensure_ready().await?;
        self.channel
            .write(self.connection.transport_mut(), slot.handle, payload)
            .await
    }
}
