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

//! Handle-addressed transport over a single BLE link.

use std::collections::HashMap;

use async_trait::async_trait;
use bluer::gatt::remote::Characteristic;
use bluer::Address;
use tracing::{debug, warn};

use crate::error::{Error, TransportError};
use crate::protocol::handles::SERVICE_UUID;

impl From<bluer::Error> for TransportError {
    fn from(err: bluer::Error) -> Self {
        TransportError::Link(err.to_string())
    }
}

impl From<bluer::Error> for Error {
    fn from(err: bluer::Error) -> Self {
        Error::Transport(TransportError::from(err))
    }
}

/// Raw read/write access to the device's data slots.
///
/// One implementation talks to BlueZ; the mock implementation backs the
/// test suite. A link carries exactly one in-flight request at a time, so
/// all methods take `&mut self`.
#[async_trait]
pub trait Transport: Send {
    /// Open the link. A single attempt; retry policy lives in the
    /// connection manager.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// Tear the link down. No-op when already closed.
    async fn close(&mut self) -> Result<(), TransportError>;

    /// Whether the link is currently open.
    fn is_open(&self) -> bool;

    /// Read the raw payload of a slot.
    async fn read(&mut self, handle: u16) -> Result<Vec<u8>, TransportError>;

    /// Write the raw payload of a slot.
    async fn write(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError>;
}

/// BLE transport backed by BlueZ.
pub struct BleTransport {
    address: Address,
    link: Option<Link>,
}

struct Link {
    // The session owns the D-Bus connection; dropping it drops the link.
    _session: bluer::Session,
    device: bluer::Device,
    characteristics: HashMap<u16, Characteristic>,
}

impl BleTransport {
    /// Transport for the device at `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address,
            link: None,
        }
    }

    /// Address of the target device.
    pub fn address(&self) -> Address {
        self.address
    }

    fn link(&self) -> Result<&Link, TransportError> {
        self.link.as_ref().ok_or(TransportError::NotConnected)
    }
}

#[async_trait]
impl Transport for BleTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        if self.link.is_some() {
            return Ok(());
        }

        let session = bluer::Session::new().await?;
        let adapter = session.default_adapter().await?;
        adapter.set_powered(true).await?;

        let device = adapter.device(self.address)?;
        device.connect().await?;

        // BlueZ exposes each characteristic under an object numbered by
        // its attribute handle; resolve them once per link.
        let mut characteristics = HashMap::new();
        let mut vendor_service = false;
        for service in device.services().await? {
            if service.uuid().await? == SERVICE_UUID {
                vendor_service = true;
            }
            for characteristic in service.characteristics().await? {
                characteristics.insert(characteristic.id(), characteristic);
            }
        }
        if !vendor_service {
            warn!("device {} does not expose the eTRV service", self.address);
        }
        debug!(
            "link to {} established, {} characteristics resolved",
            self.address,
            characteristics.len()
        );

        self.link = Some(Link {
            _session: session,
            device,
            characteristics,
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(link) = self.link.take() {
            link.device.disconnect().await?;
            debug!("link to {} closed", self.address);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.link.is_some()
    }

    async fn read(&mut self, handle: u16) -> Result<Vec<u8>, TransportError> {
        let link = self.link()?;
        let characteristic = link
            .characteristics
            .get(&handle)
            .ok_or(TransportError::UnknownHandle { handle })?;
        Ok(characteristic.read().await?)
    }

    async fn write(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError> {
        let link = self.link()?;
        let characteristic = link
            .characteristics
            .get(&handle)
            .ok_or(TransportError::UnknownHandle { handle })?;
        characteristic.write(payload).await?;
        Ok(())
    }
}
