// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The canonical encoder table for the models this bridge knows about.

use crate::error::ConfigError;
use crate::model::{Model, ModelRegistry};

use super::{Encoder, EncoderRegistry};

/// Registers the built-in per-model encoders into `registry`.
///
/// # Errors
///
/// Returns [`ConfigError::DuplicateEncoder`] if called twice on the same
/// registry.
pub fn register_all(registry: &mut EncoderRegistry) -> Result<(), ConfigError> {
    let models = ModelRegistry::with_known_models();

    for tag in ["SN_MINI", "SN_MINI_L2", "SN_SMART_PLUG"] {
        registry.register(
            &models.intern(tag),
            Encoder::new(vec!["power"], vec!["power"]).with_alias("power", "state"),
        )?;
    }
    registry.register(
        &models.intern("SHELLY_PLUGS"),
        Encoder::new(vec!["power"], vec!["power"]).with_alias("power", "Power"),
    )?;
    registry.register(
        &models.intern("SHELLY_UNI"),
        Encoder::new(vec!["power1", "power2"], vec!["power1", "power2"])
            .with_alias("power1", "Power1")
            .with_alias("power2", "Power2"),
    )?;
    registry.register(
        &models.intern("NEO_ALARM"),
        Encoder::new(vec!["alarm", "duration", "melody", "volume"], vec![]),
    )?;
    registry.register(
        &models.intern("SRTS_A01"),
        Encoder::new(
            vec![
                "external_temperature_input",
                "occupied_heating_setpoint",
                "preset",
                "sensor",
                "system_mode",
            ],
            vec![],
        ),
    )?;
    registry.register(
        &Model::none(),
        Encoder::new(vec![], vec![]),
    )?;

    Ok(())
}
