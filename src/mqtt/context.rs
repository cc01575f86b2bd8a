// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection configuration for [`MqttClient`](super::client::MqttClient).
//!
//! Plain constructor-passed structs, not a builder: there is exactly one
//! way to assemble a connection and nothing optional enough to warrant
//! a fluent API.

use std::time::Duration;

/// Username/password credentials for an MQTT broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    /// MQTT username.
    pub username: String,
    /// MQTT password.
    pub password: String,
}

impl SecurityContext {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Everything needed to open one MQTT connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttContext {
    /// Broker host.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Client id presented in the `CONNECT` packet.
    pub client_id: String,
    /// Keep-alive interval.
    pub keep_alive: Duration,
    /// How long to wait for the broker's `CONNACK` before giving up.
    pub connection_timeout: Duration,
    /// Credentials, if the broker requires authentication.
    pub security: Option<SecurityContext>,
}

impl MqttContext {
    /// Creates a context for an unauthenticated connection to
    /// `host:port`, with the bridge's standard keep-alive/timeout
    /// defaults.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, client_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: client_id.into(),
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
            security: None,
        }
    }

    /// Attaches broker credentials.
    #[must_use]
    pub fn with_security(mut self, security: SecurityContext) -> Self {
        self.security = Some(security);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_no_security_by_default() {
        let ctx = MqttContext::new("localhost", 1883, "iotbridge");
        assert!(ctx.security.is_none());
        assert_eq!(ctx.port, 1883);
    }

    #[test]
    fn with_security_attaches_credentials() {
        let ctx = MqttContext::new("localhost", 1883, "iotbridge")
            .with_security(SecurityContext::new("user", "pass"));
        assert_eq!(ctx.security.unwrap().username, "user");
    }
}
