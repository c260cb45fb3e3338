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

//! Device discovery.
//!
//! Scanning is a standalone operation, not tied to a session: it watches
//! advertisements for a fixed window and yields every device whose
//! advertised name carries the product marker.

use std::time::Duration;

use futures::StreamExt;
use tracing::debug;

use crate::error::Result;

/// Suffix of the advertised local name that marks an eTRV device.
pub const PRODUCT_MARKER: &str = ";eTRV";

/// A device seen during a scan window.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub address: bluer::Address,
    pub name: String,
    /// Signal strength as reported by the adapter, dB.
    pub rssi: Option<i16>,
}

/// Whether an advertised local name identifies an eTRV device.
pub fn matches_product(name: &str) -> bool {
    name.ends_with(PRODUCT_MARKER)
}

/// Scan for eTRV devices for the given window.
pub async fn scan(timeout: Duration) -> Result<Vec<DiscoveredDevice>> {
    let session = bluer::Session::new().await?;
    let adapter = session.default_adapter().await?;
    adapter.set_powered(true).await?;

    debug!("scanning for {:?} on {}", timeout, adapter.name());
    let discover = adapter.discover_devices().await?;
    futures::pin_mut!(discover);

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let mut found = Vec::new();
    loop {
        tokio::select! {
            () = &mut deadline => break,
            event = discover.next() => {
                let Some(event) = event else { break };
                if let bluer::AdapterEvent::DeviceAdded(address) = event {
                    let device = adapter.device(address)?;
                    let Some(name) = device.name().await? else { continue };
                    if !matches_product(&name) {
                        continue;
                    }
                    let rssi = device.rssi().await?;
                    debug!("found {name} at {address}, rssi {rssi:?}");
                    found.push(DiscoveredDevice { address, name, rssi });
                }
            }
        }
    }
    Ok(found)
}
