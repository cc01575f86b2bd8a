// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Errors are grouped by where they are allowed to surface: [`ConfigError`]
//! is fatal and only ever produced while building the pipeline, before any
//! stage starts running. [`DecodingError`] is produced per-message inside a
//! pipeline stage and is always caught, logged, and dropped by the
//! dispatcher that owns the stage - it must never unwind out of a running
//! pipeline. [`ProtocolError`] and [`TimerError`] can occur at any time and
//! are surfaced to whichever caller is in the best position to react.

use thiserror::Error;

/// The top-level error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A pipeline or registry was misconfigured at start-up.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A message could not be decoded into a typed value.
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodingError),

    /// MQTT transport or connection failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A device timer could not be scheduled or cancelled.
    #[error("timer error: {0}")]
    Timer(#[from] TimerError),

    /// The referenced device has never been seen by the directory.
    #[error("unknown device: {0}")]
    UnknownDevice(String),
}

/// Errors raised while assembling the pipeline, before it starts running.
///
/// These are always fatal: a duplicate registration is a programming
/// error, not a transient condition, so callers should treat them the
/// same way they would a panic during start-up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A topic entry was registered twice for the same protocol/type pair.
    #[error("duplicate topic registration for {0:?}/{1:?}")]
    DuplicateTopic(crate::device::Protocol, crate::message::MessageType),

    /// A command topic base was registered twice for the same protocol.
    #[error("duplicate command topic registration for {0:?}")]
    DuplicateCommandTopic(crate::device::Protocol),

    /// An encoder was registered twice for the same model.
    #[error("duplicate encoder registration for model {0}")]
    DuplicateEncoder(String),
}

/// Errors raised while turning a raw MQTT payload into a typed value.
///
/// A `DecodingError` never stops the pipeline: the stage that produced it
/// logs a warning and drops the offending message, then keeps processing
/// the next one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodingError {
    /// The payload was not valid JSON where JSON was required.
    #[error("invalid JSON payload: {0}")]
    InvalidJson(String),

    /// The payload's JSON shape did not match what the stage expected.
    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),

    /// A field value fell outside its declared valid range.
    #[error("value {actual} for field {field} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Field name that failed validation.
        field: String,
        /// Minimum allowed value (exclusive, per the original device firmware).
        min: f64,
        /// Maximum allowed value (exclusive).
        max: f64,
        /// The actual value that was rejected.
        actual: f64,
    },

    /// A token (availability state, enum variant, ...) was not recognized.
    #[error("unknown token {token:?} for {field}")]
    UnknownToken {
        /// Field or concept the token belongs to (e.g. "availability").
        field: String,
        /// The unrecognized token.
        token: String,
    },

    /// A model has no encoder registered and the operation requires one.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),
}

/// Errors related to MQTT transport.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The underlying MQTT client reported an error.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connecting to the broker failed or timed out.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The broker URL could not be parsed.
    #[error("invalid broker address: {0}")]
    InvalidAddress(String),

    /// An internal channel was closed while a message was in flight.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Errors related to per-device timers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer task could not be spawned.
    #[error("failed to schedule timer for {0}")]
    ScheduleFailed(String),
}

/// A specialized `Result` type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_error_display() {
        let err = DecodingError::OutOfRange {
            field: "away_preset_temperature".to_string(),
            min: -10.0,
            max: 35.0,
            actual: 40.0,
        };
        assert_eq!(
            err.to_string(),
            "value 40 for field away_preset_temperature is out of range [-10, 35]"
        );
    }

    #[test]
    fn error_from_decoding_error() {
        let decoding = DecodingError::UnsupportedModel("UNKNOWN".to_string());
        let err: Error = decoding.into();
        assert!(matches!(err, Error::Decoding(DecodingError::UnsupportedModel(_))));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::DuplicateEncoder("SRTS-A01".to_string());
        assert_eq!(
            err.to_string(),
            "duplicate encoder registration for model SRTS-A01"
        );
    }
}
