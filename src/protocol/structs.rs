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

//! Fixed-layout wire records and their unit conversions.
//!
//! All integer fields are little-endian. Temperatures travel as signed
//! 16-bit half-degree counts, timestamps as u32 UTC epoch seconds. Callers
//! only ever see °C, [`DateTime<Utc>`] and percent; the raw representation
//! does not leave this module.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::{DecodeError, EncodingError};

/// A fixed-size binary record exchanged over one characteristic.
pub trait WireStruct: Sized {
    /// Fixed record size in bytes.
    const SIZE: usize;

    /// Parse a record. Fails with [`DecodeError`] on any length or field
    /// mismatch; never returns a partial record.
    fn decode(data: &[u8]) -> Result<Self, DecodeError>;

    /// Serialize the record. Fails with [`EncodingError`] when a field
    /// cannot be represented in the wire format.
    fn encode(&self) -> Result<Vec<u8>, EncodingError>;
}

/// Convert °C to the wire's half-degree count, rounding half away from
/// zero.
pub(crate) fn temp_to_wire(field: &'static str, celsius: f32) -> Result<i16, EncodingError> {
    let doubled = (celsius * 2.0).round();
    if doubled < f32::from(i16::MIN) || doubled > f32::from(i16::MAX) || !doubled.is_finite() {
        return Err(EncodingError::OutOfRange {
            field,
            value: f64::from(celsius),
        });
    }
    Ok(doubled as i16)
}

/// Convert a wire half-degree count to °C.
pub(crate) fn temp_from_wire(raw: i16) -> f32 {
    f32::from(raw) * 0.5
}

/// Convert a UTC timestamp to wire epoch seconds.
pub(crate) fn timestamp_to_wire(
    field: &'static str,
    value: DateTime<Utc>,
) -> Result<u32, EncodingError> {
    u32::try_from(value.timestamp()).map_err(|_| EncodingError::OutOfRange {
        field,
        value: value.timestamp() as f64,
    })
}

/// Convert wire epoch seconds to a UTC timestamp.
pub(crate) fn timestamp_from_wire(secs: i64) -> DateTime<Utc> {
    // Any u32 second count (even shifted by an i32 offset) is inside
    // chrono's representable range.
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Temperature program selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScheduleMode {
    /// Set-point is commanded manually.
    Manual = 0,
    /// The weekly schedule governs the set-point.
    Scheduled = 1,
    /// Vacation override is active between the configured timestamps.
    Vacation = 2,
}

impl ScheduleMode {
    fn from_wire(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(Self::Manual),
            1 => Ok(Self::Scheduled),
            2 => Ok(Self::Vacation),
            other => Err(DecodeError::InvalidField {
                field: "schedule_mode",
                value: u32::from(other),
            }),
        }
    }
}

impl fmt::Display for ScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Vacation => "vacation",
        };
        f.write_str(name)
    }
}

/// Room and set-point temperature, half-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureStruct {
    pub room_temperature: i16,
    pub set_point_temperature: i16,
}

impl TemperatureStruct {
    /// Build a set-point write record. The room temperature field is
    /// reported by the device and ignored on write.
    pub fn from_set_point(celsius: f32) -> Result<Self, EncodingError> {
        Ok(Self {
            room_temperature: 0,
            set_point_temperature: temp_to_wire("set_point_temperature", celsius)?,
        })
    }

    /// Convert to human units.
    pub fn reading(&self) -> TemperatureReading {
        TemperatureReading {
            room: temp_from_wire(self.room_temperature),
            set_point: temp_from_wire(self.set_point_temperature),
        }
    }
}

impl WireStruct for TemperatureStruct {
    const SIZE: usize = 4;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let data = check_len::<Self>(data)?;
        Ok(Self {
            room_temperature: i16::from_le_bytes([data[0], data[1]]),
            set_point_temperature: i16::from_le_bytes([data[2], data[3]]),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&self.room_temperature.to_le_bytes());
        out.extend_from_slice(&self.set_point_temperature.to_le_bytes());
        Ok(out)
    }
}

/// Room and set-point temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub room: f32,
    pub set_point: f32,
}

/// Device settings in human units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub frost_protection_temperature: f32,
    pub schedule_mode: ScheduleMode,
    pub vacation_temperature: f32,
    pub vacation_from: DateTime<Utc>,
    pub vacation_to: DateTime<Utc>,
}

/// Settings record as stored on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsStruct {
    pub frost_protection_temperature: i16,
    pub schedule_mode: ScheduleMode,
    pub vacation_temperature: i16,
    pub vacation_from: u32,
    pub vacation_to: u32,
}

impl SettingsStruct {
    /// Convert to human units in a single construction step.
    pub fn settings(&self) -> Settings {
        Settings {
            frost_protection_temperature: temp_from_wire(self.frost_protection_temperature),
            schedule_mode: self.schedule_mode,
            vacation_temperature: temp_from_wire(self.vacation_temperature),
            vacation_from: timestamp_from_wire(i64::from(self.vacation_from)),
            vacation_to: timestamp_from_wire(i64::from(self.vacation_to)),
        }
    }

    /// Build a record from human units.
    pub fn from_settings(settings: &Settings) -> Result<Self, EncodingError> {
        Ok(Self {
            frost_protection_temperature: temp_to_wire(
                "frost_protection_temperature",
                settings.frost_protection_temperature,
            )?,
            schedule_mode: settings.schedule_mode,
            vacation_temperature: temp_to_wire(
                "vacation_temperature",
                settings.vacation_temperature,
            )?,
            vacation_from: timestamp_to_wire("vacation_from", settings.vacation_from)?,
            vacation_to: timestamp_to_wire("vacation_to", settings.vacation_to)?,
        })
    }
}

impl WireStruct for SettingsStruct {
    const SIZE: usize = 13;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let data = check_len::<Self>(data)?;
        Ok(Self {
            frost_protection_temperature: i16::from_le_bytes([data[0], data[1]]),
            schedule_mode: ScheduleMode::from_wire(data[2])?,
            vacation_temperature: i16::from_le_bytes([data[3], data[4]]),
            vacation_from: u32::from_le_bytes([data[5], data[6], data[7], data[8]]),
            vacation_to: u32::from_le_bytes([data[9], data[10], data[11], data[12]]),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&self.frost_protection_temperature.to_le_bytes());
        out.push(self.schedule_mode as u8);
        out.extend_from_slice(&self.vacation_temperature.to_le_bytes());
        out.extend_from_slice(&self.vacation_from.to_le_bytes());
        out.extend_from_slice(&self.vacation_to.to_le_bytes());
        Ok(out)
    }
}

/// Battery level, percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStruct {
    pub battery: u8,
}

impl WireStruct for BatteryStruct {
    const SIZE: usize = 1;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let data = check_len::<Self>(data)?;
        Ok(Self { battery: data[0] })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        Ok(vec![self.battery])
    }
}

/// Device clock record. The device stores local time plus its offset from
/// UTC; the UTC clock is `time_local - time_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeStruct {
    pub time_local: u32,
    pub time_offset: i32,
}

impl TimeStruct {
    /// The device clock in UTC.
    pub fn utc(&self) -> DateTime<Utc> {
        timestamp_from_wire(i64::from(self.time_local) - i64::from(self.time_offset))
    }
}

impl WireStruct for TimeStruct {
    const SIZE: usize = 8;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let data = check_len::<Self>(data)?;
        Ok(Self {
            time_local: u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
            time_offset: i32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.extend_from_slice(&self.time_local.to_le_bytes());
        out.extend_from_slice(&self.time_offset.to_le_bytes());
        Ok(out)
    }
}

/// Device name, ASCII, NUL-padded to the slot width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceName {
    pub name: String,
}

impl WireStruct for DeviceName {
    const SIZE: usize = 16;

    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let data = check_len::<Self>(data)?;
        let trimmed: &[u8] = match data.iter().position(|&b| b == 0) {
            Some(end) => &data[..end],
            None => data,
        };
        if let Some(&bad) = trimmed.iter().find(|b| !b.is_ascii()) {
            return Err(DecodeError::InvalidField {
                field: "device_name",
                value: u32::from(bad),
            });
        }
        Ok(Self {
            name: String::from_utf8_lossy(trimmed).into_owned(),
        })
    }

    fn encode(&self) -> Result<Vec<u8>, EncodingError> {
        if !self.name.is_ascii() {
            return Err(EncodingError::NameNotAscii);
        }
        if self.name.len() > Self::SIZE {
            return Err(EncodingError::NameTooLong { max: Self::SIZE });
        }
        let mut out = vec![0u8; Self::SIZE];
        out[..self.name.len()].copy_from_slice(self.name.as_bytes());
        Ok(out)
    }
}

fn check_len<S: WireStruct>(data: &[u8]) -> Result<&[u8], DecodeError> {
    if data.len() == S::SIZE {
        Ok(data)
    } else {
        Err(DecodeError::Length {
            expected: S::SIZE,
            actual: data.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_temperature_decode() {
        // room 21.0 °C (raw 42), set-point 22.5 °C (raw 45)
        let record = TemperatureStruct::decode(&hex!("2a00 2d00")).unwrap();
        let reading = record.reading();
        assert_eq!(reading.room, 21.0);
        assert_eq!(reading.set_point, 22.5);
    }

    #[test]
    fn test_temperature_unit_conversion() {
        // Encoding 21.0 °C produces raw 42; decoding raw 42 yields 21.0 °C.
        assert_eq!(temp_to_wire("t", 21.0).unwrap(), 42);
        assert_eq!(temp_from_wire(42), 21.0);

        // Negative temperatures are signed on the wire.
        assert_eq!(temp_to_wire("t", -4.5).unwrap(), -9);
        assert_eq!(temp_from_wire(-9), -4.5);
    }

    #[test]
    fn test_temperature_rounds_to_nearest_half_degree() {
        // 21.3 doubles to 42.6, which rounds up to 43 (21.5 °C), not the
        // original implementation's truncation to 42.
        assert_eq!(temp_to_wire("t", 21.3).unwrap(), 43);
        assert_eq!(temp_to_wire("t", 21.2).unwrap(), 42);
        assert_eq!(temp_to_wire("t", 21.25).unwrap(), 43);
        assert_eq!(temp_to_wire("t", -21.3).unwrap(), -43);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let err = temp_to_wire("set_point_temperature", 20000.0).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::OutOfRange {
                field: "set_point_temperature",
                ..
            }
        ));
        assert!(temp_to_wire("t", f32::NAN).is_err());
    }

    #[test]
    fn test_temperature_round_trip() {
        let mut celsius = -50.0f32;
        while celsius <= 50.0 {
            let record = TemperatureStruct::from_set_point(celsius).unwrap();
            let decoded = TemperatureStruct::decode(&record.encode().unwrap()).unwrap();
            assert_eq!(decoded.reading().set_point, celsius);
            celsius += 0.5;
        }
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert_eq!(
            TemperatureStruct::decode(&[0x2a, 0x00, 0x2d]),
            Err(DecodeError::Length {
                expected: 4,
                actual: 3
            })
        );
        assert!(SettingsStruct::decode(&[0u8; 12]).is_err());
        assert!(BatteryStruct::decode(&[]).is_err());
        assert!(TimeStruct::decode(&[0u8; 9]).is_err());
    }

    #[test]
    fn test_settings_decode() {
        // frost 8.0 °C, scheduled mode, vacation 15.0 °C,
        // from 1700000000, to 1700086400
        let data = hex!("1000 01 1e00 00f15365 80425565");
        let settings = SettingsStruct::decode(&data).unwrap().settings();

        assert_eq!(settings.frost_protection_temperature, 8.0);
        assert_eq!(settings.schedule_mode, ScheduleMode::Scheduled);
        assert_eq!(settings.vacation_temperature, 15.0);
        assert_eq!(
            settings.vacation_from,
            DateTime::from_timestamp(1_700_000_000, 0).unwrap()
        );
        assert_eq!(
            settings.vacation_to,
            DateTime::from_timestamp(1_700_086_400, 0).unwrap()
        );
    }

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            frost_protection_temperature: 7.5,
            schedule_mode: ScheduleMode::Vacation,
            vacation_temperature: 16.0,
            vacation_from: DateTime::from_timestamp(1_699_999_000, 0).unwrap(),
            vacation_to: DateTime::from_timestamp(1_700_500_000, 0).unwrap(),
        };
        let record = SettingsStruct::from_settings(&settings).unwrap();
        let decoded = SettingsStruct::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded.settings(), settings);
    }

    #[test]
    fn test_settings_rejects_unknown_mode() {
        let mut data = hex!("1000 01 1e00 00f15365 80425565");
        data[2] = 7;
        assert_eq!(
            SettingsStruct::decode(&data),
            Err(DecodeError::InvalidField {
                field: "schedule_mode",
                value: 7
            })
        );
    }

    #[test]
    fn test_settings_rejects_unrepresentable_timestamp() {
        let settings = Settings {
            frost_protection_temperature: 8.0,
            schedule_mode: ScheduleMode::Manual,
            vacation_temperature: 15.0,
            // Before the epoch: not representable as u32 seconds.
            vacation_from: DateTime::from_timestamp(-1, 0).unwrap(),
            vacation_to: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        assert!(matches!(
            SettingsStruct::from_settings(&settings),
            Err(EncodingError::OutOfRange {
                field: "vacation_from",
                ..
            })
        ));
    }

    #[test]
    fn test_battery_round_trip() {
        assert_eq!(BatteryStruct::decode(&[87]).unwrap().battery, 87);
        for battery in [0u8, 1, 50, 100] {
            let record = BatteryStruct { battery };
            assert_eq!(BatteryStruct::decode(&record.encode().unwrap()).unwrap(), record);
        }
    }

    #[test]
    fn test_clock_is_local_minus_offset() {
        // local 1700003600, offset +3600 → 1700000000 UTC
        let data = hex!("10ff5365 100e0000");
        let record = TimeStruct::decode(&data).unwrap();
        assert_eq!(record.time_local, 1_700_003_600);
        assert_eq!(record.time_offset, 3600);
        assert_eq!(
            record.utc(),
            DateTime::from_timestamp(1_700_000_000, 0).unwrap()
        );

        // Negative offsets shift the other way.
        let west = TimeStruct {
            time_local: 1_700_000_000,
            time_offset: -7200,
        };
        assert_eq!(
            west.utc(),
            DateTime::from_timestamp(1_700_007_200, 0).unwrap()
        );
    }

    #[test]
    fn test_time_round_trip() {
        let record = TimeStruct {
            time_local: 1_700_003_600,
            time_offset: 3600,
        };
        let decoded = TimeStruct::decode(&record.encode().unwrap()).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_device_name_trims_padding() {
        let mut data = [0u8; 16];
        data[..7].copy_from_slice(b"Bedroom");
        let decoded = DeviceName::decode(&data).unwrap();
        assert_eq!(decoded.name, "Bedroom");
    }

    #[test]
    fn test_device_name_round_trip() {
        let name = DeviceName {
            name: "Living room".into(),
        };
        let encoded = name.encode().unwrap();
        assert_eq!(encoded.len(), 16);
        assert_eq!(DeviceName::decode(&encoded).unwrap(), name);
    }

    #[test]
    fn test_device_name_limits() {
        let too_long = DeviceName {
            name: "a name that is far too long".into(),
        };
        assert_eq!(
            too_long.encode(),
            Err(EncodingError::NameTooLong { max: 16 })
        );

        let non_ascii = DeviceName {
            name: "Küche".into(),
        };
        assert_eq!(non_ascii.encode(), Err(EncodingError::NameNotAscii));

        let mut data = [0u8; 16];
        data[0] = 0xc3;
        assert!(DeviceName::decode(&data).is_err());
    }
}
