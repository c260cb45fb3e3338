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

//! In-memory transport used by the test suite to simulate a device.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::transport::Transport;
use crate::error::TransportError;

/// Simulated device: a set of slot payloads plus programmable failures.
#[derive(Debug, Default)]
pub struct MockTransport {
    slots: HashMap<u16, Vec<u8>>,
    rejected_writes: HashSet<u16>,
    open_failures: u32,
    open: bool,
    /// Number of `open` calls made, including failed ones.
    pub open_attempts: u32,
    /// Every accepted write, in order.
    pub writes: Vec<(u16, Vec<u8>)>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a slot with a payload.
    pub fn with_slot(mut self, handle: u16, data: Vec<u8>) -> Self {
        self.slots.insert(handle, data);
        self
    }

    /// Fail the next `attempts` link-open calls with a transient error.
    pub fn fail_open_times(mut self, attempts: u32) -> Self {
        self.open_failures = attempts;
        self
    }

    /// Reject every write to `handle`, as a device refusing a PIN does.
    pub fn reject_writes_to(mut self, handle: u16) -> Self {
        self.rejected_writes.insert(handle);
        self
    }

    /// Current payload of a slot.
    pub fn slot(&self, handle: u16) -> Option<&[u8]> {
        self.slots.get(&handle).map(Vec::as_slice)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&mut self) -> Result<(), TransportError> {
        self.open_attempts += 1;
        if self.open_failures > 0 {
            self.open_failures -= 1;
            return Err(TransportError::Link("simulated link failure".into()));
        }
        self.open = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn read(&mut self, handle: u16) -> Result<Vec<u8>, TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        self.slots
            .get(&handle)
            .cloned()
            .ok_or(TransportError::UnknownHandle { handle })
    }

    async fn write(&mut self, handle: u16, payload: &[u8]) -> Result<(), TransportError> {
        if !self.open {
            return Err(TransportError::NotConnected);
        }
        if self.rejected_writes.contains(&handle) {
            return Err(TransportError::Link("write rejected by device".into()));
        }
        self.writes.push((handle, payload.to_vec()));
        self.slots.insert(handle, payload.to_vec());
        Ok(())
    }
}
