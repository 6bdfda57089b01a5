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

use crate::command::{
    BOILER_STATUS_NAME, BoilerStatus, CO_TEMP_KEY, HUW_HEATER_INDEX, HUW_TEMP_KEY,
    ParameterAddress,
};
use crate::error::{AuthError, RequestError};
use crate::params::{DeviceParameters, DeviceParamsEnvelope};
use crate::session::Session;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

const READ_PARAMS: &str = "read_parameters";
const WRITE_PARAM: &str = "write_parameter";

/// Command client for one controller (`uid`) on an ecoNET24 account.
///
/// All calls block until the service answers. The session's cookie jar is
/// shared mutable state: a client is meant to be owned and driven by one
/// caller at a time. Wrap it in a `Mutex` before handing it to several
/// threads.
#[derive(Debug)]
pub struct Econet24 {
    session: Session,
    uid: String,
}

impl Econet24 {
    /// Logs in and returns a client ready to talk to device `uid`.
    pub fn connect(
        base_url: &str,
        username: &str,
        password: &str,
        uid: &str,
    ) -> Result<Self, AuthError> {
        let session = Session::establish(base_url, username, password)?;
        Ok(Self::with_session(session, uid))
    }

    pub fn with_session(session: Session, uid: &str) -> Self {
        Self {
            session,
            uid: uid.to_string(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Fetches the current telemetry snapshot.
    pub fn read_parameters(&self) -> Result<DeviceParameters, RequestError> {
        let query = [("uid", self.uid.clone()), ("_", timestamp())];
        let body = self
            .session
            .service_get(READ_PARAMS, "getDeviceParams", &query)?;
        let envelope: DeviceParamsEnvelope =
            serde_json::from_str(&body).map_err(|source| RequestError::Decode {
                operation: READ_PARAMS,
                source,
            })?;
        Ok(envelope.curr)
    }

    /// Writes `value` to the parameter at `address`.
    ///
    /// The service does not confirm writes beyond the status code, so an
    /// HTTP 200 is taken as success.
    pub fn write_parameter(
        &self,
        address: &ParameterAddress,
        value: i64,
    ) -> Result<(), RequestError> {
        let query = [
            ("uid", self.uid.clone()),
            (address.query_key(), address.query_value()),
            ("newParamValue", value.to_string()),
            ("_", timestamp()),
        ];
        let body = self
            .session
            .service_get(WRITE_PARAM, address.endpoint(), &query)?;
        debug!(%address, value, response = %body, "parameter written");
        Ok(())
    }

    pub fn set_hot_water_heater_status(&self, status: i64) -> Result<(), RequestError> {
        self.write_parameter(&ParameterAddress::ByIndex(HUW_HEATER_INDEX), status)
    }

    pub fn set_boiler_status(&self, status: BoilerStatus) -> Result<(), RequestError> {
        self.write_parameter(
            &ParameterAddress::ByName(BOILER_STATUS_NAME.to_string()),
            i64::from(status.code()),
        )
    }

    /// Central heating target temperature, in whole degrees.
    pub fn set_co_temperature(&self, value: i64) -> Result<(), RequestError> {
        self.write_parameter(&ParameterAddress::ByKey(CO_TEMP_KEY.to_string()), value)
    }

    /// Hot water target temperature, in whole degrees.
    pub fn set_hot_water_temperature(&self, value: i64) -> Result<(), RequestError> {
        self.write_parameter(&ParameterAddress::ByKey(HUW_TEMP_KEY.to_string()), value)
    }
}

fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::StatusCode;
    use serde_json::json;

    const UID: &str = "dev-42";

    fn login(server: &MockServer) -> Econet24 {
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200).body(
                r#"<form><input type="hidden" name="csrfmiddlewaretoken" value="tok"></form>"#,
            );
        });
        server.mock(|when, then| {
            when.method(POST).path("/login/").query_param("next", "main");
            then.status(200)
                .header("Set-Cookie", "sessionid=s1; Path=/")
                .body("ok");
        });
        Econet24::connect(&server.base_url(), "user", "pass", UID).unwrap()
    }

    #[test]
    fn reads_parameters_with_session_cookie() {
        let server = MockServer::start();
        let client = login(&server);
        let params = server.mock(|when, then| {
            when.method(GET)
                .path("/service/getDeviceParams")
                .query_param("uid", UID)
                .query_param_exists("_")
                .header("Cookie", "sessionid=s1");
            then.status(200).json_body(json!({
                "curr": {"pumpCOWorks": true, "boilerPower": 50, "tempCO": 61.5}
            }));
        });

        let result = client.read_parameters().unwrap();

        params.assert();
        assert!(result.pump_co_works);
        assert_eq!(result.boiler_power, 50);
        assert_eq!(result.temp_co, 61.5);
    }

    #[test]
    fn read_rejects_invalid_json() {
        let server = MockServer::start();
        let client = login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/service/getDeviceParams");
            then.status(200).body("<html>session expired</html>");
        });

        let err = client.read_parameters().unwrap_err();
        assert!(matches!(
            err,
            RequestError::Decode {
                operation: "read_parameters",
                ..
            }
        ));
    }

    #[test]
    fn read_rejects_missing_envelope() {
        let server = MockServer::start();
        let client = login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/service/getDeviceParams");
            then.status(200).json_body(json!({"error": "no device"}));
        });

        assert!(matches!(
            client.read_parameters(),
            Err(RequestError::Decode { .. })
        ));
    }

    #[test]
    fn read_reports_status() {
        let server = MockServer::start();
        let client = login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/service/getDeviceParams");
            then.status(500);
        });

        let err = client.read_parameters().unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn write_by_key_uses_rm_curr_new_param() {
        let server = MockServer::start();
        let client = login(&server);
        let write = server.mock(|when, then| {
            when.method(GET)
                .path("/service/rmCurrNewParam")
                .query_param("uid", UID)
                .query_param("newParamKey", "1280")
                .query_param("newParamValue", "65")
                .query_param_exists("_");
            then.status(200).body(r#"{"paramsEdits": {}}"#);
        });

        client
            .write_parameter(&ParameterAddress::ByKey("1280".into()), 65)
            .unwrap();
        write.assert();
    }

    #[test]
    fn write_by_index_uses_rm_new_param() {
        let server = MockServer::start();
        let client = login(&server);
        let write = server.mock(|when, then| {
            when.method(GET)
                .path("/service/rmNewParam")
                .query_param("uid", UID)
                .query_param("newParamIndex", "12")
                .query_param("newParamValue", "7")
                .query_param_exists("_");
            then.status(200);
        });

        client
            .write_parameter(&ParameterAddress::ByIndex(12), 7)
            .unwrap();
        write.assert();
    }

    #[test]
    fn write_by_name_uses_new_param() {
        let server = MockServer::start();
        let client = login(&server);
        let write = server.mock(|when, then| {
            when.method(GET)
                .path("/service/newParam")
                .query_param("uid", UID)
                .query_param("newParamName", "SOME_SETTING")
                .query_param("newParamValue", "1")
                .query_param_exists("_");
            then.status(200);
        });

        client
            .write_parameter(&ParameterAddress::ByName("SOME_SETTING".into()), 1)
            .unwrap();
        write.assert();
    }

    #[test]
    fn hot_water_heater_writes_index_59() {
        let server = MockServer::start();
        let client = login(&server);
        let write = server.mock(|when, then| {
            when.method(GET)
                .path("/service/rmNewParam")
                .query_param("newParamIndex", "59")
                .query_param("newParamValue", "1");
            then.status(200);
        });

        client.set_hot_water_heater_status(1).unwrap();
        client.set_hot_water_heater_status(1).unwrap();
        write.assert_hits(2);
    }

    #[test]
    fn boiler_status_writes_named_setting() {
        let server = MockServer::start();
        let client = login(&server);
        let write = server.mock(|when, then| {
            when.method(GET)
                .path("/service/newParam")
                .query_param("newParamName", "BOILER_STATUS")
                .query_param("newParamValue", "3");
            then.status(200);
        });

        client.set_boiler_status(BoilerStatus::Work).unwrap();
        write.assert();
    }

    #[test]
    fn temperature_helpers_write_by_key() {
        let server = MockServer::start();
        let client = login(&server);
        let co = server.mock(|when, then| {
            when.method(GET)
                .path("/service/rmCurrNewParam")
                .query_param("newParamKey", "1280")
                .query_param("newParamValue", "62");
            then.status(200);
        });
        let huw = server.mock(|when, then| {
            when.method(GET)
                .path("/service/rmCurrNewParam")
                .query_param("newParamKey", "1281")
                .query_param("newParamValue", "50");
            then.status(200);
        });

        client.set_co_temperature(62).unwrap();
        client.set_hot_water_temperature(50).unwrap();
        co.assert();
        huw.assert();
    }

    #[test]
    fn forbidden_write_reports_status_and_keeps_client_usable() {
        let server = MockServer::start();
        let client = login(&server);
        server.mock(|when, then| {
            when.method(GET).path("/service/rmNewParam");
            then.status(403);
        });
        let read = server.mock(|when, then| {
            when.method(GET)
                .path("/service/getDeviceParams")
                .query_param("uid", UID)
                .header("Cookie", "sessionid=s1");
            then.status(200).json_body(json!({"curr": {"boilerPower": 10}}));
        });

        let err = client
            .write_parameter(&ParameterAddress::ByIndex(59), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            RequestError::Status {
                operation: "write_parameter",
                status,
            } if status == StatusCode::FORBIDDEN
        ));
        assert_eq!(client.uid(), UID);
        assert_eq!(client.session().token(), "tok");

        assert_eq!(client.read_parameters().unwrap().boiler_power, 10);
        read.assert();
    }

    #[test]
    fn connect_fails_when_login_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .body(r#"<input name="csrfmiddlewaretoken" value="tok">"#);
        });
        server.mock(|when, then| {
            when.method(POST).path("/login/");
            then.status(401);
        });

        let err = Econet24::connect(&server.base_url(), "user", "bad", UID).unwrap_err();
        assert!(matches!(err, AuthError::Rejected { .. }));
    }

    #[test]
    fn write_transport_failure_has_no_status() {
        let server = MockServer::start();
        let client = login(&server);
        // Port 1 refuses connections, so following the redirect fails below HTTP.
        let write = server.mock(|when, then| {
            when.method(GET).path("/service/rmNewParam");
            then.status(302)
                .header("Location", "http://127.0.0.1:1/service/rmNewParam");
        });

        let err = client
            .write_parameter(&ParameterAddress::ByIndex(HUW_HEATER_INDEX), 1)
            .unwrap_err();

        write.assert();
        assert!(matches!(
            err,
            RequestError::Transport {
                operation: "write_parameter",
                ..
            }
        ));
        assert_eq!(err.status(), None);
    }
}
