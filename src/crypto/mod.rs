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

//! Payload encryption for protected characteristic slots.
//!
//! Protected slots are wrapped with AES-128-CTR keyed by the per-device
//! secret. The IV is the 6-byte device address followed by ten zero bytes,
//! a fixed constant of the device protocol that must be reproduced
//! bit-exact for interoperability. CTR mode keeps encryption and
//! decryption the same transformation, so payloads of any length
//! round-trip.

use std::fmt;
use std::str::FromStr;

use aes::Aes128;
use bluer::Address;
use ctr::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;

use crate::bluetooth::transport::Transport;
use crate::error::{AuthenticationError, DecodeError, Error};
use crate::protocol::handles::CharacteristicHandle;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// Per-device symmetric key for protected slots.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey([u8; 16]);

/// Secret key string was not 32 hex characters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("secret key must be 32 hex characters")]
pub struct InvalidSecretKey;

impl SecretKey {
    /// Key width in bytes.
    pub const LEN: usize = 16;

    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = DecodeError;

    fn try_from(data: &[u8]) -> Result<Self, DecodeError> {
        let bytes: [u8; 16] = data.try_into().map_err(|_| DecodeError::Length {
            expected: Self::LEN,
            actual: data.len(),
        })?;
        Ok(Self(bytes))
    }
}

impl FromStr for SecretKey {
    type Err = InvalidSecretKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|_| InvalidSecretKey)?;
        let bytes: [u8; 16] = decoded.try_into().map_err(|_| InvalidSecretKey)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for SecretKey {
    // Keep key material out of logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Encrypts and decrypts slot payloads for one device session.
#[derive(Debug, Clone)]
pub struct SecureChannel {
    secret: Option<SecretKey>,
    iv: [u8; 16],
}

impl SecureChannel {
    /// Create a channel for the given device. Without a secret, only
    /// plaintext slots are accessible.
    pub fn new(address: Address, secret: Option<SecretKey>) -> Self {
        let mut iv = [0u8; 16];
        iv[..6].copy_from_slice(&address.0);
        Self { secret, iv }
    }

    /// Whether a secret key is configured.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Fetch and, for protected slots, decrypt the payload of a handle.
    pub async fn read<T: Transport>(
        &self,
        transport: &mut T,
        handle: CharacteristicHandle,
    ) -> Result<Vec<u8>, Error> {
        if handle.encrypted && self.secret.is_none() {
            return Err(AuthenticationError::SecretRequired.into());
        }
        let mut data = transport.read(handle.value).await?;
        if handle.encrypted {
            self.transform(&mut data)?;
        }
        Ok(data)
    }

    /// Encrypt (for protected slots) and store the payload of a handle.
    /// Plaintext is never sent to a protected slot.
    pub async fn write<T: Transport>(
        &self,
        transport: &mut T,
        handle: CharacteristicHandle,
        mut payload: Vec<u8>,
    ) -> Result<(), Error> {
        if handle.encrypted {
            self.transform(&mut payload)?;
        }
        transport.write(handle.value, &payload).await?;
        Ok(())
    }

    /// Apply the slot cipher in place. Symmetric: applying twice yields
    /// the original bytes.
    pub fn transform(&self, data: &mut [u8]) -> Result<(), AuthenticationError> {
        let secret = self.secret.ok_or(AuthenticationError::SecretRequired)?;
        let mut cipher = Aes128Ctr::new(&secret.0.into(), &self.iv.into());
        cipher.apply_keystream(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: Address = Address::new([0x00, 0x04, 0x2f, 0xaa, 0xbb, 0xcc]);

    fn key(byte: u8) -> SecretKey {
        SecretKey::new([byte; 16])
    }

    #[test]
    fn test_transform_round_trip() {
        let channel = SecureChannel::new(ADDRESS, Some(key(0x11)));
        let plaintext = b"\x2a\x00\x2d\x00".to_vec();

        let mut data = plaintext.clone();
        channel.transform(&mut data).unwrap();
        assert_ne!(data, plaintext);

        channel.transform(&mut data).unwrap();
        assert_eq!(data, plaintext);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let channel = SecureChannel::new(ADDRESS, Some(key(0x11)));
        let mut a = vec![1, 2, 3, 4, 5];
        let mut b = a.clone();
        channel.transform(&mut a).unwrap();
        channel.transform(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_key_does_not_round_trip() {
        let channel = SecureChannel::new(ADDRESS, Some(key(0x11)));
        let other = SecureChannel::new(ADDRESS, Some(key(0x22)));

        let mut data = vec![10, 20, 30, 40];
        channel.transform(&mut data).unwrap();
        other.transform(&mut data).unwrap();
        assert_ne!(data, vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_iv_depends_on_address() {
        let here = SecureChannel::new(ADDRESS, Some(key(0x11)));
        let there = SecureChannel::new(Address::new([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]), Some(key(0x11)));

        let mut a = vec![7u8; 8];
        let mut b = vec![7u8; 8];
        here.transform(&mut a).unwrap();
        there.transform(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_transform_without_secret_fails() {
        let channel = SecureChannel::new(ADDRESS, None);
        let mut data = vec![1, 2, 3];
        assert_eq!(
            channel.transform(&mut data),
            Err(AuthenticationError::SecretRequired)
        );
        // Payload untouched on failure.
        assert_eq!(data, vec![1, 2, 3]);
    }

    #[test]
    fn test_secret_key_hex_round_trip() {
        let parsed: SecretKey = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
        assert_eq!(parsed.to_string(), "000102030405060708090a0b0c0d0e0f");

        assert!("deadbeef".parse::<SecretKey>().is_err());
        assert!("zz0102030405060708090a0b0c0d0e0f".parse::<SecretKey>().is_err());
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        assert_eq!(format!("{:?}", key(0x55)), "SecretKey(..)");
    }
}
