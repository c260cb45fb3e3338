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

//! Weekly schedule codec.
//!
//! The schedule spans three consecutive slots: Monday–Wednesday,
//! Thursday–Saturday, Sunday. Each weekday is a fixed 19-byte block: an
//! entry count followed by six 3-byte `(time, temperature)` entries, where
//! `time` counts 30-minute steps since midnight and `temperature` is the
//! usual half-degree i16. Entries past the count are zero; decode enforces
//! the padding so every accepted payload re-encodes byte-identically.

use chrono::{NaiveTime, Timelike, Weekday};

use super::structs::{temp_from_wire, temp_to_wire};
use crate::error::{DecodeError, EncodingError};

/// Weekdays carried by each schedule slot, in slot order.
const SLOT_DAYS: [usize; 3] = [3, 3, 1];

/// Maximum set-point transitions per weekday.
pub const MAX_ENTRIES_PER_DAY: usize = 6;

const ENTRY_SIZE: usize = 3;
const DAY_BLOCK_SIZE: usize = 1 + MAX_ENTRIES_PER_DAY * ENTRY_SIZE;

/// One set-point transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    /// Time of day the transition takes effect, on a 30-minute boundary.
    pub time: NaiveTime,
    /// Target temperature in °C.
    pub temperature: f32,
}

/// Weekly set-point program, Monday first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub days: [Vec<ScheduleEntry>; 7],
}

impl Schedule {
    /// Transitions for one weekday.
    pub fn entries(&self, weekday: Weekday) -> &[ScheduleEntry] {
        &self.days[weekday.num_days_from_monday() as usize]
    }

    /// Parse the ordered slot payloads read from the device.
    pub fn decode_slots(slots: &[Vec<u8>]) -> Result<Self, DecodeError> {
        if slots.len() != SLOT_DAYS.len() {
            return Err(DecodeError::SlotCount {
                expected: SLOT_DAYS.len(),
                actual: slots.len(),
            });
        }

        let mut schedule = Schedule::default();
        let mut day = 0;
        for (slot, &day_count) in slots.iter().zip(&SLOT_DAYS) {
            let expected = day_count * DAY_BLOCK_SIZE;
            if slot.len() != expected {
                return Err(DecodeError::Length {
                    expected,
                    actual: slot.len(),
                });
            }
            for block in slot.chunks_exact(DAY_BLOCK_SIZE) {
                schedule.days[day] = decode_day(block)?;
                day += 1;
            }
        }
        Ok(schedule)
    }

    /// Serialize into the ordered slot payloads expected by the device.
    pub fn encode_slots(&self) -> Result<Vec<Vec<u8>>, EncodingError> {
        let mut slots = Vec::with_capacity(SLOT_DAYS.len());
        let mut day = 0;
        for &day_count in &SLOT_DAYS {
            let mut slot = Vec::with_capacity(day_count * DAY_BLOCK_SIZE);
            for _ in 0..day_count {
                encode_day(day, &self.days[day], &mut slot)?;
                day += 1;
            }
            slots.push(slot);
        }
        Ok(slots)
    }
}

fn decode_day(block: &[u8]) -> Result<Vec<ScheduleEntry>, DecodeError> {
    let count = usize::from(block[0]);
    if count > MAX_ENTRIES_PER_DAY {
        return Err(DecodeError::InvalidField {
            field: "entry_count",
            value: count as u32,
        });
    }

    let mut entries = Vec::with_capacity(count);
    for (index, raw) in block[1..].chunks_exact(ENTRY_SIZE).enumerate() {
        if index < count {
            entries.push(ScheduleEntry {
                time: decode_time(raw[0])?,
                temperature: temp_from_wire(i16::from_le_bytes([raw[1], raw[2]])),
            });
        } else if raw.iter().any(|&b| b != 0) {
            // Unused entries must stay zero, otherwise re-encoding the
            // payload would not reproduce it.
            return Err(DecodeError::InvalidField {
                field: "entry_padding",
                value: u32::from(raw[0]),
            });
        }
    }
    Ok(entries)
}

fn decode_time(steps: u8) -> Result<NaiveTime, DecodeError> {
    if steps >= 48 {
        return Err(DecodeError::InvalidField {
            field: "time",
            value: u32::from(steps),
        });
    }
    NaiveTime::from_hms_opt(u32::from(steps) / 2, u32::from(steps) % 2 * 30, 0).ok_or(
        DecodeError::InvalidField {
            field: "time",
            value: u32::from(steps),
        },
    )
}

fn encode_day(day: usize, entries: &[ScheduleEntry], out: &mut Vec<u8>) -> Result<(), EncodingError> {
    if entries.len() > MAX_ENTRIES_PER_DAY {
        return Err(EncodingError::TooManyEntries {
            day,
            max: MAX_ENTRIES_PER_DAY,
        });
    }
    for pair in entries.windows(2) {
        if pair[1].time <= pair[0].time {
            return Err(EncodingError::UnorderedEntries { day });
        }
    }

    out.push(entries.len() as u8);
    for entry in entries {
        out.push(encode_time(entry.time)?);
        out.extend_from_slice(&temp_to_wire("schedule_temperature", entry.temperature)?.to_le_bytes());
    }
    for _ in entries.len()..MAX_ENTRIES_PER_DAY {
        out.extend_from_slice(&[0, 0, 0]);
    }
    Ok(())
}

fn encode_time(time: NaiveTime) -> Result<u8, EncodingError> {
    if time.minute() % 30 != 0 || time.second() != 0 || time.nanosecond() != 0 {
        return Err(EncodingError::UnalignedTime { time });
    }
    Ok((time.hour() * 2 + time.minute() / 30) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn day_block(entries: &[(u8, i16)]) -> Vec<u8> {
        let mut block = vec![entries.len() as u8];
        for &(time, temp) in entries {
            block.push(time);
            block.extend_from_slice(&temp.to_le_bytes());
        }
        block.resize(DAY_BLOCK_SIZE, 0);
        block
    }

    fn synthetic_slots() -> Vec<Vec<u8>> {
        // Monday: 06:00 → 21.0 °C, 22:30 → 17.0 °C. Thursday: 07:00 → 20.5.
        // All other days empty.
        let mut slot0 = day_block(&[(12, 42), (45, 34)]);
        slot0.extend_from_slice(&day_block(&[]));
        slot0.extend_from_slice(&day_block(&[]));

        let mut slot1 = day_block(&[(14, 41)]);
        slot1.extend_from_slice(&day_block(&[]));
        slot1.extend_from_slice(&day_block(&[]));

        let slot2 = day_block(&[]);
        vec![slot0, slot1, slot2]
    }

    #[test]
    fn test_decode_synthetic_schedule() {
        let schedule = Schedule::decode_slots(&synthetic_slots()).unwrap();

        assert_eq!(
            schedule.entries(Weekday::Mon),
            &[
                ScheduleEntry {
                    time: at(6, 0),
                    temperature: 21.0
                },
                ScheduleEntry {
                    time: at(22, 30),
                    temperature: 17.0
                },
            ]
        );
        assert_eq!(
            schedule.entries(Weekday::Thu),
            &[ScheduleEntry {
                time: at(7, 0),
                temperature: 20.5
            }]
        );
        for day in [Weekday::Tue, Weekday::Wed, Weekday::Fri, Weekday::Sat, Weekday::Sun] {
            assert!(schedule.entries(day).is_empty());
        }
    }

    #[test]
    fn test_reencode_is_byte_identical() {
        let slots = synthetic_slots();
        let schedule = Schedule::decode_slots(&slots).unwrap();
        assert_eq!(schedule.encode_slots().unwrap(), slots);
    }

    #[test]
    fn test_slot_shape_is_enforced() {
        assert_eq!(
            Schedule::decode_slots(&synthetic_slots()[..2]),
            Err(DecodeError::SlotCount {
                expected: 3,
                actual: 2
            })
        );

        let mut slots = synthetic_slots();
        slots[2].push(0);
        assert_eq!(
            Schedule::decode_slots(&slots),
            Err(DecodeError::Length {
                expected: DAY_BLOCK_SIZE,
                actual: DAY_BLOCK_SIZE + 1
            })
        );
    }

    #[test]
    fn test_decode_rejects_bad_fields() {
        let mut slots = synthetic_slots();
        slots[0][0] = 7; // count beyond the entry capacity
        assert!(matches!(
            Schedule::decode_slots(&slots),
            Err(DecodeError::InvalidField {
                field: "entry_count",
                ..
            })
        ));

        let mut slots = synthetic_slots();
        slots[0][1] = 48; // 24:00 does not exist
        assert!(matches!(
            Schedule::decode_slots(&slots),
            Err(DecodeError::InvalidField { field: "time", .. })
        ));

        let mut slots = synthetic_slots();
        slots[0][10] = 1; // padding past the entry count must stay zero
        assert!(matches!(
            Schedule::decode_slots(&slots),
            Err(DecodeError::InvalidField {
                field: "entry_padding",
                ..
            })
        ));
    }

    #[test]
    fn test_encode_rejects_invalid_days() {
        let mut schedule = Schedule::default();
        schedule.days[0] = vec![
            ScheduleEntry {
                time: at(6, 0),
                temperature: 21.0
            };
            7
        ];
        assert_eq!(
            schedule.encode_slots(),
            Err(EncodingError::TooManyEntries { day: 0, max: 6 })
        );

        let mut schedule = Schedule::default();
        schedule.days[1] = vec![ScheduleEntry {
            time: at(6, 15),
            temperature: 21.0,
        }];
        assert_eq!(
            schedule.encode_slots(),
            Err(EncodingError::UnalignedTime { time: at(6, 15) })
        );

        let mut schedule = Schedule::default();
        schedule.days[2] = vec![
            ScheduleEntry {
                time: at(8, 0),
                temperature: 21.0,
            },
            ScheduleEntry {
                time: at(6, 0),
                temperature: 17.0,
            },
        ];
        assert_eq!(
            schedule.encode_slots(),
            Err(EncodingError::UnorderedEntries { day: 2 })
        );
    }

    #[test]
    fn test_full_week_round_trip() {
        let mut schedule = Schedule::default();
        for day in 0..7 {
            schedule.days[day] = vec![
                ScheduleEntry {
                    time: at(5 + day as u32, 30),
                    temperature: 20.0 + day as f32 * 0.5,
                },
                ScheduleEntry {
                    time: at(21, 0),
                    temperature: 16.5,
                },
            ];
        }
        let slots = schedule.encode_slots().unwrap();
        assert_eq!(slots[0].len(), 3 * DAY_BLOCK_SIZE);
        assert_eq!(slots[2].len(), DAY_BLOCK_SIZE);
        assert_eq!(Schedule::decode_slots(&slots).unwrap(), schedule);
    }
}
