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

//! Session lifecycle for one physical device.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::transport::Transport;
use crate::error::{AuthenticationError, Error, TransportError};
use crate::protocol::handles;

/// State of a device session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link.
    Disconnected,
    /// Link establishment in progress, transient failures retried.
    Connecting,
    /// Link up, PIN being presented.
    Authenticating,
    /// Authenticated and ready for slot operations.
    Ready,
}

/// Link establishment policy.
///
/// Transient link failures are retried with a fixed delay up to
/// `max_attempts`; after that the connect surfaces
/// [`TransportError::RetriesExhausted`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            retry_delay: Duration::from_millis(100),
        }
    }
}

/// Owns the transport link and drives the session state machine.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    pin: [u8; 4],
    config: ConnectionConfig,
    state: ConnectionState,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, pin: [u8; 4], config: ConnectionConfig) -> Self {
        Self {
            transport,
            pin,
            config,
            state: ConnectionState::Disconnected,
        }
    }

    /// Current session state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the session is authenticated and ready.
    pub fn is_ready(&self) -> bool {
        self.state == ConnectionState::Ready
    }

    /// Exclusive access to the transport for slot operations. Callers go
    /// through [`Self::ensure_ready`] first.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Establish the link and optionally authenticate with the PIN.
    ///
    /// No-op when already ready. Transient link failures are retried per
    /// the config; a rejected PIN is fatal and never retried.
    pub async fn connect(&mut self, send_pin: bool) -> Result<(), Error> {
        if self.state == ConnectionState::Ready {
            debug!("already connected");
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.open().await {
                Ok(()) => break,
                Err(err) => {
                    if attempt >= self.config.max_attempts {
                        self.state = ConnectionState::Disconnected;
                        return Err(TransportError::RetriesExhausted { attempts: attempt }.into());
                    }
                    warn!(
                        "link attempt {attempt} failed: {err}; retrying in {:?}",
                        self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }

        if send_pin {
            self.state = ConnectionState::Authenticating;
            debug!("writing PIN");
            if let Err(err) = self.transport.write(handles::PIN.value, &self.pin).await {
                warn!("PIN rejected: {err}");
                let _ = self.transport.close().await;
                self.state = ConnectionState::Disconnected;
                return Err(AuthenticationError::PinRejected.into());
            }
        }

        self.state = ConnectionState::Ready;
        info!("session ready");
        Ok(())
    }

    /// Tear the link down. Idempotent.
    pub async fn disconnect(&mut self) -> Result<(), Error> {
        if self.transport.is_open() {
            debug!("disconnecting");
            self.transport.close().await?;
        }
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    /// Connect with PIN authentication unless already ready. Called at
    /// the start of every session operation.
    pub async fn ensure_ready(&mut self) -> Result<(), Error> {
        if self.state != ConnectionState::Ready {
            self.connect(true).await?;
        }
        Ok(())
    }
}
