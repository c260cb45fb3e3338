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

//! Wire protocol: the characteristic handle table and the binary codecs
//! that translate slot payloads into domain values and back.

pub mod handles;
pub mod schedule;
pub mod structs;

pub use handles::{CharacteristicHandle, Slot};
pub use schedule::{Schedule, ScheduleEntry, MAX_ENTRIES_PER_DAY};
pub use structs::{
    BatteryStruct, DeviceName, ScheduleMode, Settings, SettingsStruct, TemperatureReading,
    TemperatureStruct, TimeStruct, WireStruct,
};
