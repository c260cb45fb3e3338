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

//! Error types for session, transport and codec failures.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by session operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Link-level failure (drop, timeout, missing characteristic).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// PIN rejected or secret key missing for an encrypted slot.
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    /// Received payload does not form a valid record.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Domain value cannot be represented in the wire format.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Transient transport failures.
///
/// Only link establishment retries these internally; mid-session read and
/// write failures are surfaced to the caller, which owns reconnection.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying Bluetooth stack reported a failure.
    #[error("bluetooth link error: {0}")]
    Link(String),

    /// Link establishment gave up after the configured attempt bound.
    #[error("link establishment failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// Operation issued while the transport link is down.
    #[error("transport is not connected")]
    NotConnected,

    /// The device exposes no characteristic for the requested handle.
    #[error("no characteristic for handle {handle:#06x}")]
    UnknownHandle { handle: u16 },
}

/// Fatal authentication failures. Never retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationError {
    /// The device rejected the 4-byte PIN.
    #[error("device rejected the PIN")]
    PinRejected,

    /// An encrypted slot was accessed without a configured secret key.
    #[error("no secret key configured for encrypted characteristic")]
    SecretRequired,
}

/// A received payload does not match the expected record shape.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload length differs from the record's fixed size.
    #[error("payload length {actual} does not match expected {expected}")]
    Length { expected: usize, actual: usize },

    /// A field holds a value outside its defined wire range.
    #[error("invalid value {value:#x} for field `{field}`")]
    InvalidField { field: &'static str, value: u32 },

    /// The schedule spans a fixed number of slots.
    #[error("expected {expected} schedule slots, got {actual}")]
    SlotCount { expected: usize, actual: usize },
}

/// A domain value cannot be represented in the wire format.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodingError {
    /// Numeric field outside the representable wire range.
    #[error("`{field}` value {value} is outside the representable range")]
    OutOfRange { field: &'static str, value: f64 },

    /// Device name exceeds the fixed slot width.
    #[error("device name longer than {max} bytes")]
    NameTooLong { max: usize },

    /// Device name must be plain ASCII.
    #[error("device name contains non-ASCII characters")]
    NameNotAscii,

    /// A weekday holds more transitions than the slot can carry.
    #[error("day {day} has more than {max} schedule entries")]
    TooManyEntries { day: usize, max: usize },

    /// Schedule times are restricted to 30-minute boundaries.
    #[error("schedule time {time} is not on a 30-minute boundary")]
    UnalignedTime { time: chrono::NaiveTime },

    /// Schedule entries must be strictly ascending within a day.
    #[error("schedule entries for day {day} are not in ascending order")]
    UnorderedEntries { day: usize },
}
