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

use reqwest::StatusCode;
use thiserror::Error;

/// Any failure while establishing a session.
///
/// Callers should treat every variant as "login failed"; the variants only
/// exist so the message says which step of the handshake went wrong.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid service URL `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("building HTTP client failed")]
    Client(#[source] reqwest::Error),
    #[error("login page unreachable at {url}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("login page at {url} returned HTTP {status}")]
    LandingStatus { url: String, status: StatusCode },
    #[error("login page has no `csrfmiddlewaretoken` field; the login form may have changed")]
    MissingToken,
    #[error("sending credentials to {url} failed")]
    Submit {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("login rejected with HTTP {status}; check username and password")]
    Rejected { status: StatusCode },
}

/// Failure of a command sent over an established session.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{operation}: building request URL failed")]
    InvalidUrl {
        operation: &'static str,
        #[source]
        source: url::ParseError,
    },
    #[error("{operation}: request failed")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{operation}: service returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
    },
    #[error("{operation}: unexpected response body")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    pub fn operation(&self) -> &'static str {
        match self {
            RequestError::InvalidUrl { operation, .. }
            | RequestError::Transport { operation, .. }
            | RequestError::Status { operation, .. }
            | RequestError::Decode { operation, .. } => operation,
        }
    }

    /// HTTP status of a rejected request, if the service answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
