// Zephyr cloud response and request types
//
// Field names follow the wire format (camelCase, with the odd `deviceID` /
// `groupID` / `DeviceUserType` spellings). Identity fields are required;
// everything else is optional because older firmware omits fields freely.
// Undocumented fields land in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::speed::SpeedTable;

// ── Enums ────────────────────────────────────────────────────────────

/// Airflow direction of a Zephyr unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FanMode {
    Cycle,
    Extract,
    Supply,
}

/// Named fan speed preset. Declaration order is the tie-break order used
/// by [`SpeedTable::preset`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FanSpeed {
    Night,
    Low,
    Medium,
    High,
}

// ── Device ───────────────────────────────────────────────────────────

/// A Zephyr ventilation unit as reported by the cloud.
///
/// `fan_speed` holds the decoded preset; it is `None` when the unit reports
/// a raw code the client's [`SpeedTable`] does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(rename = "deviceID")]
    pub device_id: String,
    #[serde(rename = "groupID")]
    pub group_id: String,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Power state as sent by the cloud, e.g. `"on"` / `"off"`.
    #[serde(default)]
    pub device_status: Option<String>,
    #[serde(default)]
    pub fan_mode: Option<FanMode>,
    #[serde(default)]
    pub fan_speed: Option<FanSpeed>,
    #[serde(default)]
    pub humidity_boost: Option<i64>,
    #[serde(default)]
    pub humidity_boost_state: Option<bool>,
    #[serde(default)]
    pub boost_time: Option<i64>,
    #[serde(default)]
    pub buzzer_enable: Option<i64>,
    #[serde(default)]
    pub cycle_direction: Option<String>,
    #[serde(default)]
    pub cycle_time: Option<i64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub filter_timer: Option<i64>,
    #[serde(default)]
    pub hygiene_status: Option<i64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// Whether the unit reports itself as powered on.
    pub fn is_on(&self) -> bool {
        self.device_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("on"))
    }
}

/// A user's binding to one device, with display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUser {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub group_title: Option<String>,
    /// Role of the user on this device (owner, guest, ...).
    #[serde(default, rename = "DeviceUserType")]
    pub role: Option<String>,
    #[serde(default)]
    pub device_model: Option<String>,
    pub device: Device,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// RFC 3339 timestamps; anything else becomes `None` instead of failing
/// the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(text) = raw.as_ref().and_then(Value::as_str) else {
        return Ok(None);
    };
    match DateTime::parse_from_rfc3339(text) {
        Ok(ts) => Ok(Some(ts.with_timezone(&Utc))),
        Err(err) => {
            debug!(timestamp = text, error = %err, "ignoring unparseable timestamp");
            Ok(None)
        }
    }
}

// ── Control ──────────────────────────────────────────────────────────

/// A partial update for one device group.
///
/// Only the fields that are `Some` are sent. An empty `device_status`
/// counts as not supplied; `humidity_boost: Some(0)` is a real value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlRequest {
    pub device_status: Option<String>,
    pub fan_mode: Option<FanMode>,
    pub fan_speed: Option<FanSpeed>,
    pub humidity_boost: Option<i64>,
}

impl ControlRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_status(mut self, status: impl Into<String>) -> Self {
        self.device_status = Some(status.into());
        self
    }

    pub fn fan_mode(mut self, mode: FanMode) -> Self {
        self.fan_mode = Some(mode);
        self
    }

    pub fn fan_speed(mut self, speed: FanSpeed) -> Self {
        self.fan_speed = Some(speed);
        self
    }

    pub fn humidity_boost(mut self, boost: i64) -> Self {
        self.humidity_boost = Some(boost);
        self
    }

    /// `true` when nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.status().is_none()
            && self.fan_mode.is_none()
            && self.fan_speed.is_none()
            && self.humidity_boost.is_none()
    }

    fn status(&self) -> Option<&str> {
        self.device_status.as_deref().filter(|s| !s.is_empty())
    }

    /// Build the wire body, translating the speed preset to its raw code.
    /// Returns `None` if the request is empty.
    pub(crate) fn to_body(&self, speeds: &SpeedTable) -> Option<ControlBody<'_>> {
        if self.is_empty() {
            return None;
        }
        Some(ControlBody {
            device_status: self.status(),
            fan_mode: self.fan_mode,
            fan_speed: self.fan_speed.map(|p| speeds.code(p)),
            humidity_boost: self.humidity_boost,
        })
    }
}

// ── Wire-only types ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ControlBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_status: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_mode: Option<FanMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity_boost: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn fan_enums_use_lowercase_names() {
        assert_eq!(FanSpeed::Medium.to_string(), "medium");
        assert_eq!(FanSpeed::from_str("night").ok(), Some(FanSpeed::Night));
        assert_eq!(FanMode::from_str("extract").ok(), Some(FanMode::Extract));
        assert_eq!(json!(FanMode::Supply), json!("supply"));
        assert!(FanSpeed::from_str("turbo").is_err());
    }

    #[test]
    fn device_parses_wire_names() {
        let device: Device = serde_json::from_value(json!({
            "_id": "65f0",
            "deviceID": "ZP-001",
            "groupID": "g-1",
            "deviceModel": "Zephyr 100",
            "deviceStatus": "on",
            "fanMode": "cycle",
            "fanSpeed": "low",
            "humidity": 48.5,
            "temperature": 21.0,
            "humidityBoostState": false,
            "updatedAt": "2024-03-01T08:15:00.000Z",
            "firmwareChannel": "stable"
        }))
        .expect("valid device");

        assert_eq!(device.device_id, "ZP-001");
        assert_eq!(device.group_id, "g-1");
        assert_eq!(device.fan_mode, Some(FanMode::Cycle));
        assert_eq!(device.fan_speed, Some(FanSpeed::Low));
        assert_eq!(device.humidity, Some(48.5));
        assert!(device.is_on());
        assert!(device.updated_at.is_some());
        assert_eq!(device.extra.get("firmwareChannel"), Some(&json!("stable")));
    }

    #[test]
    fn odd_timestamps_do_not_fail_the_record() {
        let binding: DeviceUser = serde_json::from_value(json!({
            "createdAt": "10/01/2024 12:00",
            "updatedAt": 1_709_280_900,
            "device": { "deviceID": "ZP-001", "groupID": "g-1", "updatedAt": null }
        }))
        .expect("valid binding");

        assert_eq!(binding.created_at, None);
        assert_eq!(binding.updated_at, None);
        assert_eq!(binding.device.updated_at, None);
    }

    #[test]
    fn device_requires_identity() {
        let result = serde_json::from_value::<Device>(json!({ "deviceID": "ZP-001" }));
        assert!(result.is_err());
    }

    #[test]
    fn empty_status_counts_as_absent() {
        let req = ControlRequest::new().device_status("");
        assert!(req.is_empty());
        assert!(req.to_body(&SpeedTable::default()).is_none());
    }

    #[test]
    fn control_body_keeps_zero_boost() {
        let req = ControlRequest::new().humidity_boost(0);
        let body = req.to_body(&SpeedTable::default()).expect("non-empty");
        assert_eq!(
            serde_json::to_value(&body).expect("serializable"),
            json!({ "humidityBoost": 0 })
        );
    }

    #[test]
    fn control_body_maps_speed_to_code() {
        let req = ControlRequest::new()
            .device_status("off")
            .fan_mode(FanMode::Extract)
            .fan_speed(FanSpeed::High);
        let body = req.to_body(&SpeedTable::default()).expect("non-empty");
        assert_eq!(
            serde_json::to_value(&body).expect("serializable"),
            json!({ "deviceStatus": "off", "fanMode": "extract", "fanSpeed": 80 })
        );
    }
}
