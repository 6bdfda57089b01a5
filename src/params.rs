// econetctl - CLI for the ecoNET24 boiler controller service
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::command::BoilerStatus;
use serde::{Deserialize, Deserializer, Serialize};

/// Snapshot of the controller's current readings and setpoints.
///
/// Fields absent from the service response, or sent as `null`, decode to
/// zero/false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceParameters {
    #[serde(rename = "pumpCOWorks", deserialize_with = "null_as_default")]
    pub pump_co_works: bool,
    #[serde(rename = "boilerPower", deserialize_with = "null_as_default")]
    pub boiler_power: i32,
    #[serde(rename = "boilerPowerKW", deserialize_with = "null_as_default")]
    pub boiler_power_kw: f32,
    #[serde(rename = "tempCOSet", deserialize_with = "null_as_default")]
    pub temp_co_set: f32,
    #[serde(rename = "tempCO", deserialize_with = "null_as_default")]
    pub temp_co: f32,
    #[serde(rename = "tempCWUSet", deserialize_with = "null_as_default")]
    pub temp_cwu_set: f32,
    #[serde(rename = "tempCWU", deserialize_with = "null_as_default")]
    pub temp_cwu: f32,
    #[serde(rename = "tempFeeder", deserialize_with = "null_as_default")]
    pub temp_feeder: f32,
    #[serde(rename = "fanWorks", deserialize_with = "null_as_default")]
    pub fan_works: bool,
    #[serde(rename = "fuelStream", deserialize_with = "null_as_default")]
    pub fuel_stream: f32,
    #[serde(rename = "fuelLevel", deserialize_with = "null_as_default")]
    pub fuel_level: i32,
    #[serde(rename = "mode", deserialize_with = "null_as_default")]
    pub operation_mode: i32,
}

impl DeviceParameters {
    /// The reported mode as a boiler state, if it is one of the known codes.
    pub fn boiler_status(&self) -> Option<BoilerStatus> {
        BoilerStatus::try_from(self.operation_mode).ok()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// `getDeviceParams` wraps the current values in `curr`.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceParamsEnvelope {
    pub curr: DeviceParameters,
}
