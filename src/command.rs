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

//! Parameter addressing and the boiler state machine values.

use std::fmt;
use thiserror::Error;

/// Register index of the hot water (HUW) heater switch.
pub const HUW_HEATER_INDEX: u32 = 59;
/// Parameter key of the central heating (CO) target temperature.
pub const CO_TEMP_KEY: u32 = 1280;
/// Parameter key of the hot water (HUW) target temperature.
pub const HUW_TEMP_KEY: u32 = 1281;
/// Named setting holding the boiler state.
pub const BOILER_STATUS_NAME: &str = "BOILER_STATUS";

/// Identifies the remote parameter a write targets.
///
/// Each mode is served by its own endpoint:
///
/// | mode      | endpoint         | query parameter |
/// |-----------|------------------|-----------------|
/// | `ByKey`   | `rmCurrNewParam` | `newParamKey`   |
/// | `ByIndex` | `rmNewParam`     | `newParamIndex` |
/// | `ByName`  | `newParam`       | `newParamName`  |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterAddress {
    ByKey(String),
    ByIndex(u32),
    ByName(String),
}

impl ParameterAddress {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ParameterAddress::ByKey(_) => "rmCurrNewParam",
            ParameterAddress::ByIndex(_) => "rmNewParam",
            ParameterAddress::ByName(_) => "newParam",
        }
    }

    pub fn query_key(&self) -> &'static str {
        match self {
            ParameterAddress::ByKey(_) => "newParamKey",
            ParameterAddress::ByIndex(_) => "newParamIndex",
            ParameterAddress::ByName(_) => "newParamName",
        }
    }

    pub fn query_value(&self) -> String {
        match self {
            ParameterAddress::ByKey(key) => key.clone(),
            ParameterAddress::ByIndex(index) => index.to_string(),
            ParameterAddress::ByName(name) => name.clone(),
        }
    }
}

impl fmt::Display for ParameterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.query_key(), self.query_value())
    }
}

/// Operating state of the boiler controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BoilerStatus {
    TurnedOff = 0,
    FireUp1 = 1,
    FireUp2 = 2,
    Work = 3,
    Supervision = 4,
    Halted = 5,
    Stop = 6,
    BurningOff = 7,
    Manual = 8,
    Alarm = 9,
    Unsealing = 10,
    Chimney = 11,
    Stabilization = 12,
    NoTransmission = 13,
}

impl BoilerStatus {
    pub const ALL: [BoilerStatus; 14] = [
        BoilerStatus::TurnedOff,
        BoilerStatus::FireUp1,
        BoilerStatus::FireUp2,
        BoilerStatus::Work,
        BoilerStatus::Supervision,
        BoilerStatus::Halted,
        BoilerStatus::Stop,
        BoilerStatus::BurningOff,
        BoilerStatus::Manual,
        BoilerStatus::Alarm,
        BoilerStatus::Unsealing,
        BoilerStatus::Chimney,
        BoilerStatus::Stabilization,
        BoilerStatus::NoTransmission,
    ];

    /// Wire value sent as `newParamValue`.
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            BoilerStatus::TurnedOff => "turned off",
            BoilerStatus::FireUp1 => "fire up (phase 1)",
            BoilerStatus::FireUp2 => "fire up (phase 2)",
            BoilerStatus::Work => "work",
            BoilerStatus::Supervision => "supervision",
            BoilerStatus::Halted => "halted",
            BoilerStatus::Stop => "stop",
            BoilerStatus::BurningOff => "burning off",
            BoilerStatus::Manual => "manual",
            BoilerStatus::Alarm => "alarm",
            BoilerStatus::Unsealing => "unsealing",
            BoilerStatus::Chimney => "chimney sweep",
            BoilerStatus::Stabilization => "stabilization",
            BoilerStatus::NoTransmission => "no transmission",
        }
    }
}

impl fmt::Display for BoilerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown boiler status code {0}")]
pub struct UnknownBoilerStatus(pub i64);

impl TryFrom<u32> for BoilerStatus {
    type Error = UnknownBoilerStatus;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BoilerStatus::ALL
            .get(value as usize)
            .copied()
            .ok_or(UnknownBoilerStatus(i64::from(value)))
    }
}

impl TryFrom<i32> for BoilerStatus {
    type Error = UnknownBoilerStatus;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| UnknownBoilerStatus(i64::from(value)))
            .and_then(BoilerStatus::try_from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn each_mode_has_its_own_endpoint_and_key() {
        let addresses = [
            ParameterAddress::ByKey("1280".into()),
            ParameterAddress::ByIndex(59),
            ParameterAddress::ByName("BOILER_STATUS".into()),
        ];
        let endpoints: HashSet<_> = addresses.iter().map(|a| a.endpoint()).collect();
        let keys: HashSet<_> = addresses.iter().map(|a| a.query_key()).collect();
        assert_eq!(endpoints.len(), 3);
        assert_eq!(keys.len(), 3);

        assert_eq!(addresses[0].endpoint(), "rmCurrNewParam");
        assert_eq!(addresses[0].query_key(), "newParamKey");
        assert_eq!(addresses[1].endpoint(), "rmNewParam");
        assert_eq!(addresses[1].query_key(), "newParamIndex");
        assert_eq!(addresses[2].endpoint(), "newParam");
        assert_eq!(addresses[2].query_key(), "newParamName");
    }

    #[test]
    fn address_display_shows_query_pair() {
        assert_eq!(ParameterAddress::ByIndex(59).to_string(), "newParamIndex=59");
        assert_eq!(
            ParameterAddress::ByName(BOILER_STATUS_NAME.into()).to_string(),
            "newParamName=BOILER_STATUS"
        );
    }

    #[test]
    fn boiler_status_codes_follow_declaration_order() {
        for (code, status) in BoilerStatus::ALL.iter().enumerate() {
            assert_eq!(status.code() as usize, code);
            assert_eq!(BoilerStatus::try_from(code as u32), Ok(*status));
        }
        assert_eq!(BoilerStatus::Work.code(), 3);
        assert_eq!(BoilerStatus::NoTransmission.code(), 13);
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(BoilerStatus::try_from(14u32), Err(UnknownBoilerStatus(14)));
        assert_eq!(BoilerStatus::try_from(-1i32), Err(UnknownBoilerStatus(-1)));
    }
}
