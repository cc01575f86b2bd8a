// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device model identifiers.
//!
//! A device's model is reported by firmware or a zigbee coordinator as an
//! arbitrary string (`"SRTS_A01"`, `"SN_MINI_L2"`, ...). Rather than close the
//! set with an enum, [`Model`] interns the string the first time it is seen
//! so later comparisons are a pointer check instead of a string compare, and
//! a device whose model nobody anticipated is represented the same way as
//! one the bridge already knows about.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// An interned model identifier.
///
/// Two `Model`s constructed from equal strings via the same
/// [`ModelRegistry`] are guaranteed to share the same backing allocation, so
/// `Arc::ptr_eq` can be used as a fast equality check; [`PartialEq`] falls
/// back to comparing string contents so models produced by different
/// registries (independent tests, mostly) still compare sensibly.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Model(Arc<str>);

impl Model {
    /// Wire tag for "no model applicable", e.g. a bridge/coordinator device.
    pub const NONE_TAG: &'static str = "NONE";
    /// Wire tag for "model not yet resolved".
    pub const UNKNOWN_TAG: &'static str = "UNKNOWN";

    /// Sentinel meaning "not applicable to this device". Not interned
    /// through any particular registry; compares equal to any other `Model`
    /// built from the same tag.
    #[must_use]
    pub fn none() -> Self {
        Self(Arc::from(Self::NONE_TAG))
    }

    /// Sentinel meaning "not yet resolved".
    #[must_use]
    pub fn unknown() -> Self {
        Self(Arc::from(Self::UNKNOWN_TAG))
    }

    /// The raw string tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the [`Model::unknown`] sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        &*self.0 == Self::UNKNOWN_TAG
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for Model {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Known model tags seeded at start-up, carried over from the closed model
/// enum the upstream device registry used before tags were made extensible.
pub const KNOWN_MODELS: &[&str] = &[
    "MIFLORA",
    "NEO_ALARM",
    "RING_CAMERA",
    "SHELLY_PLUGS",
    "SHELLY_UNI",
    "SRTS_A01",
    "TUYA_SOIL",
    "SN_AIRSENSOR",
    "SN_BUTTON",
    "SN_MOTION",
    "SN_MINI",
    "SN_MINI_L2",
    "SN_SMART_PLUG",
    "SN_ZBBRIDGE",
];

/// Maps the vendor-facing model string a Z2M/Tasmota discovery payload
/// actually reports (a Zigbee2MQTT device definition name, a Tasmota
/// signature) to the canonical tag the rest of this crate uses.
const VENDOR_MODEL_ALIASES: &[(&str, &str)] = &[
    ("Miflora", "MIFLORA"),
    ("NAS-AB02B2", "NEO_ALARM"),
    ("RingCamera", "RING_CAMERA"),
    ("Shelly Plug S", "SHELLY_PLUGS"),
    ("Shelly Uni", "SHELLY_UNI"),
    ("SRTS-A01", "SRTS_A01"),
    ("TS0601_soil", "TUYA_SOIL"),
    ("SNZB-02", "SN_AIRSENSOR"),
    ("SNZB-01", "SN_BUTTON"),
    ("SNZB-03", "SN_MOTION"),
    ("ZBMINI-L", "SN_MINI"),
    ("ZBMINIL2", "SN_MINI_L2"),
    ("S26R2ZB", "SN_SMART_PLUG"),
    ("Sonoff ZbBridge", "SN_ZBBRIDGE"),
];

/// Interns model tags so equal strings share one allocation.
///
/// A `ModelRegistry` is typically owned by the pipeline's composition root
/// and shared (via `Arc`) with the model resolver stage; there is
/// intentionally no global/static instance, to keep model identity scoped
/// to one running pipeline.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    seen: RwLock<HashSet<Arc<str>>>,
}

impl Clone for ModelRegistry {
    fn clone(&self) -> Self {
        Self {
            seen: RwLock::new(self.seen.read().clone()),
        }
    }
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-seeded with [`KNOWN_MODELS`].
    #[must_use]
    pub fn with_known_models() -> Self {
        let registry = Self::new();
        for tag in KNOWN_MODELS {
            registry.intern(tag);
        }
        registry
    }

    /// Interns `tag`, returning the shared [`Model`] for it.
    pub fn intern(&self, tag: &str) -> Model {
        if let Some(existing) = self.seen.read().get(tag) {
            return Model(Arc::clone(existing));
        }
        let mut seen = self.seen.write();
        // Another writer may have interned it while we waited for the lock.
        if let Some(existing) = seen.get(tag) {
            return Model(Arc::clone(existing));
        }
        let arc: Arc<str> = Arc::from(tag);
        seen.insert(Arc::clone(&arc));
        Model(arc)
    }

    /// The `NONE` sentinel, interned through this registry.
    #[must_use]
    pub fn none(&self) -> Model {
        self.intern(Model::NONE_TAG)
    }

    /// The `UNKNOWN` sentinel, interned through this registry.
    #[must_use]
    pub fn unknown(&self) -> Model {
        self.intern(Model::UNKNOWN_TAG)
    }

    /// Resolves a vendor-reported model label (a Z2M device definition
    /// name, a Tasmota discovery signature) to its canonical [`Model`],
    /// via [`VENDOR_MODEL_ALIASES`]. `None`/unrecognised labels resolve to
    /// [`ModelRegistry::unknown`] rather than being interned verbatim, so
    /// an unmapped vendor string never silently becomes its own model.
    #[must_use]
    pub fn resolve_wire(&self, label: Option<&str>) -> Model {
        let Some(label) = label else {
            return self.none();
        };
        match VENDOR_MODEL_ALIASES.iter().find(|(wire, _)| *wire == label) {
            Some((_, canonical)) => self.intern(canonical),
            None => {
                tracing::warn!(%label, "unknown model");
                self.unknown()
            }
        }
    }
}
