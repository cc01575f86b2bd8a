// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encodes a [`DeviceState`]'s wire fields into the payload a specific
//! model accepts for outbound `set` commands.

pub mod builtin;

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{ConfigError, DecodingError};
use crate::model::Model;
use crate::state::DeviceState;

/// A JSON value transform applied to one field before it is sent to the
/// device, e.g. turning a `bool` into the `"ON"`/`"OFF"` strings Tasmota
/// expects.
pub type FieldConverter = fn(Value) -> Value;

/// Describes how to turn [`DeviceState`] fields into the wire shape one
/// model expects for commands, and which of its fields can be read back.
#[derive(Default)]
pub struct Encoder {
    /// Fields accepted in outbound `set` commands.
    pub settable_fields: Vec<&'static str>,
    /// Fields this model reports and that `get` commands may request.
    pub gettable_fields: Vec<&'static str>,
    /// Renames a [`DeviceState`] field name to its wire name, when they
    /// differ (e.g. `power` -> `POWER` for Tasmota).
    pub field_aliases: HashMap<&'static str, &'static str>,
    /// Per-field value transforms, applied before aliasing.
    pub field_converters: HashMap<&'static str, FieldConverter>,
}

impl Encoder {
    /// Builds an encoder with the given settable/gettable fields and no
    /// aliases or converters; use [`Self::with_alias`] /
    /// [`Self::with_converter`] to add them.
    #[must_use]
    pub fn new(settable_fields: Vec<&'static str>, gettable_fields: Vec<&'static str>) -> Self {
        Self {
            settable_fields,
            gettable_fields,
            field_aliases: HashMap::new(),
            field_converters: HashMap::new(),
        }
    }

    /// Registers a wire-name alias for `field`.
    #[must_use]
    pub fn with_alias(mut self, field: &'static str, wire_name: &'static str) -> Self {
        self.field_aliases.insert(field, wire_name);
        self
    }

    /// Registers a value converter for `field`.
    #[must_use]
    pub fn with_converter(mut self, field: &'static str, converter: FieldConverter) -> Self {
        self.field_converters.insert(field, converter);
        self
    }

    /// Turns `state`'s non-null fields into the JSON object to publish for
    /// a `set` command, applying each field's converter (if any) then its
    /// alias (if any), and rejecting any field not in
    /// [`settable_fields`](Self::settable_fields).
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::UnexpectedShape`] if `state` carries a
    /// field this model does not allow setting.
    pub fn transform(&self, state: &DeviceState) -> Result<Value, DecodingError> {
        let Value::Object(fields) = state.to_wire_fields() else {
            return Ok(Value::Object(serde_json::Map::new()));
        };

        let mut out = serde_json::Map::new();
        for (field, mut value) in fields {
            if field == "last_seen" || field == "kind" {
                continue;
            }
            if !self.settable_fields.contains(&field.as_str()) {
                return Err(DecodingError::UnexpectedShape(format!(
                    "field {field} is not settable for this model"
                )));
            }
            if let Some(converter) = self.field_converters.get(field.as_str()) {
                value = converter(value);
            }
            let wire_name = self
                .field_aliases
                .get(field.as_str())
                .map(|alias| (*alias).to_string())
                .unwrap_or(field);
            out.insert(wire_name, value);
        }
        Ok(Value::Object(out))
    }
}

/// Maps a [`Model`] to the [`Encoder`] that knows its settable/gettable
/// fields and wire aliases.
#[derive(Default)]
pub struct EncoderRegistry {
    encoders: HashMap<String, Encoder>,
}

impl EncoderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with [`builtin::register_all`]'s
    /// canonical per-model encoders.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry).expect("built-in encoder table must not contain duplicates");
        registry
    }

    /// Registers `encoder` for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateEncoder`] if `model` already has an
    /// encoder registered.
    pub fn register(&mut self, model: &Model, encoder: Encoder) -> Result<(), ConfigError> {
        let key = model.as_str().to_string();
        if self.encoders.contains_key(&key) {
            return Err(ConfigError::DuplicateEncoder(key));
        }
        self.encoders.insert(key, encoder);
        Ok(())
    }

    /// Looks up the encoder for `model`.
    #[must_use]
    pub fn get(&self, model: &Model) -> Option<&Encoder> {
        self.encoders.get(model.as_str())
    }

    /// Encodes `state` for `model`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodingError::UnsupportedModel`] if `model` has no
    /// registered encoder, or whatever [`Encoder::transform`] returns.
    pub fn encode(&self, model: &Model, state: &DeviceState) -> Result<Value, DecodingError> {
        self.get(model)
            .ok_or_else(|| DecodingError::UnsupportedModel(model.to_string()))?
            .transform(state)
    }
}
