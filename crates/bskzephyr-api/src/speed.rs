// Fan speed preset <-> raw code table
//
// The cloud speaks raw integer speed codes whose values drift between
// firmware releases. Each client owns one `SpeedTable`; forward lookup is
// total, reverse lookup resolves ties in preset declaration order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::warn;

use crate::error::Error;
use crate::models::FanSpeed;

/// Raw codes used by older firmware.
pub const DEFAULT_NIGHT: u16 = 22;
pub const DEFAULT_LOW: u16 = 30;
pub const DEFAULT_MEDIUM: u16 = 55;
pub const DEFAULT_HIGH: u16 = 80;

/// Bidirectional mapping between [`FanSpeed`] presets and raw codes.
///
/// When two presets share a code, [`preset`](Self::preset) returns the one
/// declared first (`night`, `low`, `medium`, `high`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SpeedCodes", into = "SpeedCodes")]
pub struct SpeedTable {
    codes: [u16; 4],
}

impl Default for SpeedTable {
    fn default() -> Self {
        Self {
            codes: [DEFAULT_NIGHT, DEFAULT_LOW, DEFAULT_MEDIUM, DEFAULT_HIGH],
        }
    }
}

const fn slot(preset: FanSpeed) -> usize {
    match preset {
        FanSpeed::Night => 0,
        FanSpeed::Low => 1,
        FanSpeed::Medium => 2,
        FanSpeed::High => 3,
    }
}

impl SpeedTable {
    /// Build a table, logging a warning for every shared code.
    pub fn from_codes(night: u16, low: u16, medium: u16, high: u16) -> Self {
        let table = Self {
            codes: [night, low, medium, high],
        };
        if let Some((code, first, second)) = table.first_duplicate() {
            warn!(
                code,
                %first,
                %second,
                "speed code shared by two presets; reverse lookup resolves to {first}"
            );
        }
        table
    }

    /// Build a table, rejecting shared codes.
    pub fn try_from_codes(night: u16, low: u16, medium: u16, high: u16) -> Result<Self, Error> {
        let table = Self {
            codes: [night, low, medium, high],
        };
        match table.first_duplicate() {
            Some((code, first, second)) => Err(Error::DuplicateSpeedCode {
                code,
                first,
                second,
            }),
            None => Ok(table),
        }
    }

    /// Raw code sent for `preset`.
    pub fn code(&self, preset: FanSpeed) -> u16 {
        self.codes[slot(preset)]
    }

    /// Preset for a raw code, first-declared preset winning on ties.
    pub fn preset(&self, raw: u16) -> Option<FanSpeed> {
        FanSpeed::iter().find(|p| self.code(*p) == raw)
    }

    /// Override one preset's code.
    pub fn set(&mut self, preset: FanSpeed, code: u16) {
        self.codes[slot(preset)] = code;
        if let Some(other) = FanSpeed::iter().find(|p| *p != preset && self.code(*p) == code) {
            warn!(code, %preset, %other, "speed code now shared by two presets");
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.first_duplicate().is_some()
    }

    /// `(preset, code)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (FanSpeed, u16)> + '_ {
        FanSpeed::iter().map(|p| (p, self.code(p)))
    }

    fn first_duplicate(&self) -> Option<(u16, FanSpeed, FanSpeed)> {
        FanSpeed::iter().find_map(|a| {
            FanSpeed::iter()
                .filter(|b| *b > a)
                .find(|b| self.code(*b) == self.code(a))
                .map(|b| (self.code(a), a, b))
        })
    }

    /// Decode a raw JSON speed value. Non-integer or unknown codes yield `None`.
    pub fn preset_for_value(&self, value: &Value) -> Option<FanSpeed> {
        value
            .as_u64()
            .and_then(|raw| u16::try_from(raw).ok())
            .and_then(|raw| self.preset(raw))
    }

    /// Replace `object.fanSpeed` (raw code) with the preset name, or null if
    /// the code is unknown. Absent or null fields are left untouched.
    pub(crate) fn decode_fan_speed(&self, object: &mut Value) {
        let Some(field) = object.get_mut("fanSpeed") else {
            return;
        };
        if field.is_null() {
            return;
        }
        *field = match self.preset_for_value(field) {
            Some(preset) => Value::String(preset.to_string()),
            None => {
                warn!(raw = %field, "unknown fan speed code");
                Value::Null
            }
        };
    }
}

/// Serde shape of a [`SpeedTable`]; missing presets keep their defaults.
#[derive(Debug, Serialize, Deserialize)]
struct SpeedCodes {
    #[serde(default = "default_night")]
    night: u16,
    #[serde(default = "default_low")]
    low: u16,
    #[serde(default = "default_medium")]
    medium: u16,
    #[serde(default = "default_high")]
    high: u16,
}

fn default_night() -> u16 {
    DEFAULT_NIGHT
}
fn default_low() -> u16 {
    DEFAULT_LOW
}
fn default_medium() -> u16 {
    DEFAULT_MEDIUM
}
fn default_high() -> u16 {
    DEFAULT_HIGH
}

impl From<SpeedCodes> for SpeedTable {
    fn from(c: SpeedCodes) -> Self {
        Self::from_codes(c.night, c.low, c.medium, c.high)
    }
}

impl From<SpeedTable> for SpeedCodes {
    fn from(t: SpeedTable) -> Self {
        let [night, low, medium, high] = t.codes;
        Self {
            night,
            low,
            medium,
            high,
        }
    }
}
