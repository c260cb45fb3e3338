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

//! Characteristic handle table for the eTRV protocol.
//!
//! Every data slot the device exposes is addressed by a fixed numeric
//! handle. Slots that carry a structured record are typed via [`Slot`],
//! which binds exactly one wire struct to each handle.

use std::marker::PhantomData;

use uuid::Uuid;

use super::structs::{BatteryStruct, DeviceName, SettingsStruct, TemperatureStruct, TimeStruct};

/// Vendor GATT service holding all eTRV data slots.
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x10020000_2749_0001_0000_00805f9b042f);

/// An addressable data slot on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacteristicHandle {
    /// Numeric slot identifier.
    pub value: u16,
    /// Payload is wrapped by the secure channel.
    pub encrypted: bool,
}

impl CharacteristicHandle {
    /// Slot exchanged in plaintext.
    pub const fn plain(value: u16) -> Self {
        Self {
            value,
            encrypted: false,
        }
    }

    /// Slot whose payload is encrypted with the device secret.
    pub const fn encrypted(value: u16) -> Self {
        Self {
            value,
            encrypted: true,
        }
    }
}

/// A handle paired with the wire struct that decodes it.
///
/// The marker type keeps the handle-to-struct mapping total: each typed
/// slot has exactly one codec, checked at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<S> {
    pub handle: CharacteristicHandle,
    marker: PhantomData<S>,
}

impl<S> Slot<S> {
    const fn new(handle: CharacteristicHandle) -> Self {
        Self {
            handle,
            marker: PhantomData,
        }
    }
}

/// Battery level, percent. Read-only.
pub const BATTERY: Slot<BatteryStruct> = Slot::new(CharacteristicHandle::encrypted(0x0010));

/// PIN slot, raw 4 bytes, written once per session during authentication.
pub const PIN: CharacteristicHandle = CharacteristicHandle::plain(0x0024);

/// Device settings record.
pub const SETTINGS: Slot<SettingsStruct> = Slot::new(CharacteristicHandle::encrypted(0x002a));

/// Room and set-point temperature record.
pub const TEMPERATURE: Slot<TemperatureStruct> = Slot::new(CharacteristicHandle::encrypted(0x002d));

/// Device name, raw ASCII padded with NULs.
pub const DEVICE_NAME: Slot<DeviceName> = Slot::new(CharacteristicHandle::encrypted(0x0030));

/// Device clock record.
pub const CLOCK: Slot<TimeStruct> = Slot::new(CharacteristicHandle::encrypted(0x0036));

/// Secret key slot. The device answers this read in the clear only while
/// in pairing mode, so the slot sits outside the encrypted path.
pub const SECRET: CharacteristicHandle = CharacteristicHandle::plain(0x003f);

/// Schedule slots, in weekday order. Slot layout is defined in
/// [`super::schedule`].
pub const SCHEDULE: [CharacteristicHandle; 3] = [
    CharacteristicHandle::encrypted(0x0039),
    CharacteristicHandle::encrypted(0x003b),
    CharacteristicHandle::encrypted(0x003d),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_values() {
        assert_eq!(BATTERY.handle.value, 0x0010);
        assert_eq!(PIN.value, 0x0024);
        assert_eq!(SETTINGS.handle.value, 0x002a);
        assert_eq!(TEMPERATURE.handle.value, 0x002d);
        assert_eq!(DEVICE_NAME.handle.value, 0x0030);
        assert_eq!(CLOCK.handle.value, 0x0036);
        assert_eq!(SECRET.value, 0x003f);
        assert_eq!(SCHEDULE.map(|h| h.value), [0x0039, 0x003b, 0x003d]);
    }

    #[test]
    fn test_encryption_flags() {
        assert!(BATTERY.handle.encrypted);
        assert!(SETTINGS.handle.encrypted);
        assert!(TEMPERATURE.handle.encrypted);
        assert!(DEVICE_NAME.handle.encrypted);
        assert!(CLOCK.handle.encrypted);
        assert!(SCHEDULE.iter().all(|h| h.encrypted));

        // PIN and pairing-mode secret retrieval are plaintext slots.
        assert!(!PIN.encrypted);
        assert!(!SECRET.encrypted);
    }
}
