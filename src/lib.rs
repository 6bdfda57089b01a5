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

//! Blocking client for the ecoNET24 boiler controller web service.
//!
//! ```no_run
//! use econetctl::{BoilerStatus, Econet24};
//!
//! let client = Econet24::connect("https://www.econet24.com", "user", "secret", "DEVICE-UID")?;
//! let params = client.read_parameters()?;
//! println!("boiler at {}%", params.boiler_power);
//! client.set_boiler_status(BoilerStatus::Work)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod config;
pub mod econet;
pub mod error;
pub mod html;
pub mod params;
pub mod session;

pub use command::{BoilerStatus, ParameterAddress};
pub use econet::Econet24;
pub use error::{AuthError, RequestError};
pub use params::DeviceParameters;
pub use session::Session;
