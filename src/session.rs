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

use crate::error::{AuthError, RequestError};
use crate::html::form_field_value;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{StatusCode, Url};
use tracing::{debug, info, instrument};

pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
pub const LOGIN_PATH: &str = "login/?next=main";
const SERVICE_PATH: &str = "service/";
const USER_AGENT: &str = "econetctl/0.1";

/// An authenticated ecoNET24 web session.
///
/// Holds the cookie jar filled during login together with the anti-forgery
/// token scraped from the login form. A session is never refreshed; when the
/// remote side expires it, log in again with [`Session::establish`].
#[derive(Debug)]
pub struct Session {
    base_url: Url,
    http: Client,
    token: String,
}

impl Session {
    /// Runs the login handshake against `base_url`.
    ///
    /// Fetches the landing page, scrapes `csrfmiddlewaretoken` from it and
    /// posts the credentials as a urlencoded form. Both requests share one
    /// cookie store, which the returned session keeps.
    #[instrument(skip(password))]
    pub fn establish(base_url: &str, username: &str, password: &str) -> Result<Self, AuthError> {
        let base_url = normalize_base(base_url)?;
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(HeaderValue::from_static(USER_AGENT))
            .build()
            .map_err(AuthError::Client)?;

        let token = fetch_token(&http, &base_url)?;

        let login_url = base_url
            .join(LOGIN_PATH)
            .map_err(|err| AuthError::InvalidUrl {
                url: base_url.to_string(),
                reason: err.to_string(),
            })?;
        debug!(url = %login_url, "submitting credentials");
        let response = http
            .post(login_url.clone())
            .form(&[
                (CSRF_FIELD, token.as_str()),
                ("username", username),
                ("password", password),
            ])
            .send()
            .map_err(|source| AuthError::Submit {
                url: login_url.to_string(),
                source,
            })?;

        let status = response.status();
        drop(response);
        if status != StatusCode::OK {
            return Err(AuthError::Rejected { status });
        }

        info!(user = username, "logged in");
        Ok(Self {
            base_url,
            http,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Anti-forgery token captured from the login form.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Sends `GET <base>/service/<endpoint>` and returns the body of a 200
    /// response. Query pairs are sent in the given order.
    pub(crate) fn service_get(
        &self,
        operation: &'static str,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<String, RequestError> {
        let url = self
            .base_url
            .join(SERVICE_PATH)
            .and_then(|service| service.join(endpoint))
            .map_err(|source| RequestError::InvalidUrl { operation, source })?;

        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if !query.is_empty() {
            request = request.query(query);
        }
        let request = request
            .build()
            .map_err(|source| RequestError::Transport { operation, source })?;
        debug!(operation, url = %request.url(), "sending request");

        let response = self
            .http
            .execute(request)
            .map_err(|source| RequestError::Transport { operation, source })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RequestError::Status { operation, status });
        }

        response
            .text()
            .map_err(|source| RequestError::Transport { operation, source })
    }
}

fn normalize_base(raw: &str) -> Result<Url, AuthError> {
    let invalid = |reason: String| AuthError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http(s) URL".into()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn fetch_token(http: &Client, base_url: &Url) -> Result<String, AuthError> {
    debug!(url = %base_url, "fetching login page");
    let unreachable_at = |source| AuthError::Unreachable {
        url: base_url.to_string(),
        source,
    };
    let response = http.get(base_url.clone()).send().map_err(unreachable_at)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(AuthError::LandingStatus {
            url: base_url.to_string(),
            status,
        });
    }
    let page = response.text().map_err(unreachable_at)?;

    match form_field_value(&page, CSRF_FIELD) {
        Some(token) if !token.is_empty() => {
            debug!("found csrf token");
            Ok(token)
        }
        _ => Err(AuthError::MissingToken),
    }
}
