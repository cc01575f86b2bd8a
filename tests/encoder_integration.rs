// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encodes a canonical [`Switch`] power-on through the built-in encoder
//! table for every model that should render it differently on the wire.

use iotbridge::encoder::EncoderRegistry;
use iotbridge::model::ModelRegistry;
use iotbridge::state::{DeviceState, PowerValue, Switch, Switch2Channels};

fn power_on() -> DeviceState {
    DeviceState::Switch(Switch {
        power_on_behavior: None,
        power: PowerValue::On,
        last_seen: None,
    })
}

#[test]
fn sn_smart_plug_encodes_as_state() {
    let registry = EncoderRegistry::with_builtins();
    let models = ModelRegistry::with_known_models();
    let wire = registry.encode(&models.intern("SN_SMART_PLUG"), &power_on()).unwrap();
    assert_eq!(wire, serde_json::json!({"state": "ON"}));
}

#[test]
fn shelly_plugs_encodes_as_capitalized_power() {
    let registry = EncoderRegistry::with_builtins();
    let models = ModelRegistry::with_known_models();
    let wire = registry.encode(&models.intern("SHELLY_PLUGS"), &power_on()).unwrap();
    assert_eq!(wire, serde_json::json!({"Power": "ON"}));
}

#[test]
fn shelly_uni_encodes_each_channel_independently() {
    let registry = EncoderRegistry::with_builtins();
    let models = ModelRegistry::with_known_models();
    let state = DeviceState::Switch2Channels(Switch2Channels {
        power1: Some(PowerValue::On),
        power2: Some(PowerValue::Off),
        last_seen: None,
    });
    let wire = registry.encode(&models.intern("SHELLY_UNI"), &state).unwrap();
    assert_eq!(wire, serde_json::json!({"Power1": "ON", "Power2": "OFF"}));
}

#[test]
fn unsettable_field_for_model_is_rejected() {
    let registry = EncoderRegistry::with_builtins();
    let models = ModelRegistry::with_known_models();
    // NEO_ALARM has no `power` in its settable table.
    let err = registry.encode(&models.intern("NEO_ALARM"), &power_on()).unwrap_err();
    assert!(err.to_string().contains("not settable"));
}
