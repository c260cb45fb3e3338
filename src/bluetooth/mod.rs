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

//! Bluetooth layer: discovery, the handle-addressed transport and the
//! session state machine.

pub mod connection;
pub mod mock;
pub mod scan;
pub mod transport;

pub use connection::{ConnectionConfig, ConnectionManager, ConnectionState};
pub use mock::MockTransport;
pub use scan::{matches_product, scan, DiscoveredDevice, PRODUCT_MARKER};
pub use transport::{BleTransport, Transport};
