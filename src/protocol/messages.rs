use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A single setting as the backend returns it.
///
/// Settings are stored server side as text and coerced on the way out:
/// digits become integers, anything parsing as a float becomes a float and
/// everything else (`"null"`, `"true"`, condition names) stays a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl SettingValue {
    /// Coerces form text with the same rules the backend applies to stored values.
    pub fn coerce(text: &str) -> Self {
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            // Too large for i64: keep the digits as typed.
            return match text.parse::<i64>() {
                Ok(i) => SettingValue::Int(i),
                Err(_) => SettingValue::Text(text.to_string()),
            };
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => SettingValue::Float(f),
            _ => SettingValue::Text(text.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            SettingValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            SettingValue::Float(_) => None,
            SettingValue::Text(s) => s.parse().ok(),
        }
    }
}

impl Display for SettingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingValue::Int(i) => write!(f, "{i}"),
            SettingValue::Float(v) => write!(f, "{v}"),
            SettingValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

/// Editable numeric settings, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingField {
    StartAzm,
    EndAzm,
    StartAlt,
    EndAlt,
    LuxThresh,
    SolarThresh,
    ConditionHistoryLength,
    ChangeBufferDurationSec,
    UpperAlt,
    LowerAlt,
    UpperAltPer,
    LowerAltPer,
    TicktockInterval,
}

impl SettingField {
    pub const ALL: [SettingField; 13] = [
        SettingField::StartAzm,
        SettingField::EndAzm,
        SettingField::StartAlt,
        SettingField::EndAlt,
        SettingField::LuxThresh,
        SettingField::SolarThresh,
        SettingField::ConditionHistoryLength,
        SettingField::ChangeBufferDurationSec,
        SettingField::UpperAlt,
        SettingField::LowerAlt,
        SettingField::UpperAltPer,
        SettingField::LowerAltPer,
        SettingField::TicktockInterval,
    ];

    /// Name of the field on the wire and in the form.
    pub fn key(&self) -> &'static str {
        match self {
            SettingField::StartAzm => "startAzm",
            SettingField::EndAzm => "endAzm",
            SettingField::StartAlt => "startAlt",
            SettingField::EndAlt => "endAlt",
            SettingField::LuxThresh => "luxThresh",
            SettingField::SolarThresh => "solarThresh",
            SettingField::ConditionHistoryLength => "conditionHistoryLength",
            SettingField::ChangeBufferDurationSec => "changeBufferDurationSec",
            SettingField::UpperAlt => "upperAlt",
            SettingField::LowerAlt => "lowerAlt",
            SettingField::UpperAltPer => "upperAltPer",
            SettingField::LowerAltPer => "lowerAltPer",
            SettingField::TicktockInterval => "ticktockInterval",
        }
    }
}

impl FromStr for SettingField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingField::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown setting '{s}'"))
    }
}

impl Display for SettingField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Read-only values the backend reports for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusField {
    LastAzm,
    LastAlt,
    LastCondition,
    ValidateShadeState,
    LastInArea,
    LastChangeDate,
}

impl StatusField {
    pub const ALL: [StatusField; 6] = [
        StatusField::LastAzm,
        StatusField::LastAlt,
        StatusField::LastCondition,
        StatusField::ValidateShadeState,
        StatusField::LastInArea,
        StatusField::LastChangeDate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StatusField::LastAzm => "lastAzm",
            StatusField::LastAlt => "lastAlt",
            StatusField::LastCondition => "lastCondition",
            StatusField::ValidateShadeState => "validateShadeState",
            StatusField::LastInArea => "lastInArea",
            StatusField::LastChangeDate => "lastChangeDate",
        }
    }
}

/// Settings record exchanged with the backend.
///
/// Every field is optional because older backends only return a subset.
/// Read-only status fields are never sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_azm: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_azm: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_alt: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_alt: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lux_thresh: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solar_thresh: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_history_length: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_buffer_duration_sec: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_alt: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_alt: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_alt_per: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_alt_per: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticktock_interval: Option<SettingValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_override: Option<SettingValue>,

    #[serde(default, skip_serializing)]
    pub last_azm: Option<SettingValue>,
    #[serde(default, skip_serializing)]
    pub last_alt: Option<SettingValue>,
    #[serde(default, skip_serializing)]
    pub last_condition: Option<SettingValue>,
    #[serde(default, skip_serializing)]
    pub validate_shade_state: Option<SettingValue>,
    #[serde(default, skip_serializing)]
    pub last_in_area: Option<SettingValue>,
    #[serde(default, skip_serializing)]
    pub last_change_date: Option<SettingValue>,
}

impl Settings {
    pub fn value(&self, field: SettingField) -> Option<&SettingValue> {
        self.slot(field).as_ref()
    }

    pub fn set_value(&mut self, field: SettingField, value: SettingValue) {
        *self.slot_mut(field) = Some(value);
    }

    pub fn status(&self, field: StatusField) -> Option<&SettingValue> {
        match field {
            StatusField::LastAzm => self.last_azm.as_ref(),
            StatusField::LastAlt => self.last_alt.as_ref(),
            StatusField::LastCondition => self.last_condition.as_ref(),
            StatusField::ValidateShadeState => self.validate_shade_state.as_ref(),
            StatusField::LastInArea => self.last_in_area.as_ref(),
            StatusField::LastChangeDate => self.last_change_date.as_ref(),
        }
    }

    /// `None` when the backend did not report the override at all.
    pub fn command_override_enabled(&self) -> Option<bool> {
        self.command_override
            .as_ref()
            .map(|v| v.as_i64() == Some(1))
    }

    /// Values the backend seeds its settings table with.
    pub fn backend_defaults() -> Self {
        Settings {
            start_azm: Some(SettingValue::Int(100)),
            end_azm: Some(SettingValue::Int(260)),
            start_alt: Some(SettingValue::Int(15)),
            end_alt: Some(SettingValue::Int(15)),
            lux_thresh: Some(SettingValue::Int(3000)),
            solar_thresh: Some(SettingValue::Int(20)),
            condition_history_length: Some(SettingValue::Int(5)),
            change_buffer_duration_sec: Some(SettingValue::Int(600)),
            upper_alt: Some(SettingValue::Int(55)),
            lower_alt: Some(SettingValue::Int(15)),
            upper_alt_per: Some(SettingValue::Int(1)),
            lower_alt_per: Some(SettingValue::Float(0.5)),
            ticktock_interval: Some(SettingValue::Int(30)),
            command_override: Some(SettingValue::Int(0)),
            last_azm: Some("null".into()),
            last_alt: Some("null".into()),
            last_condition: Some("null".into()),
            validate_shade_state: Some("null".into()),
            last_in_area: Some("false".into()),
            last_change_date: Some(SettingValue::Int(0)),
        }
    }

    fn slot(&self, field: SettingField) -> &Option<SettingValue> {
        match field {
            SettingField::StartAzm => &self.start_azm,
            SettingField::EndAzm => &self.end_azm,
            SettingField::StartAlt => &self.start_alt,
            SettingField::EndAlt => &self.end_alt,
            SettingField::LuxThresh => &self.lux_thresh,
            SettingField::SolarThresh => &self.solar_thresh,
            SettingField::ConditionHistoryLength => &self.condition_history_length,
            SettingField::ChangeBufferDurationSec => &self.change_buffer_duration_sec,
            SettingField::UpperAlt => &self.upper_alt,
            SettingField::LowerAlt => &self.lower_alt,
            SettingField::UpperAltPer => &self.upper_alt_per,
            SettingField::LowerAltPer => &self.lower_alt_per,
            SettingField::TicktockInterval => &self.ticktock_interval,
        }
    }

    fn slot_mut(&mut self, field: SettingField) -> &mut Option<SettingValue> {
        match field {
            SettingField::StartAzm => &mut self.start_azm,
            SettingField::EndAzm => &mut self.end_azm,
            SettingField::StartAlt => &mut self.start_alt,
            SettingField::EndAlt => &mut self.end_alt,
            SettingField::LuxThresh => &mut self.lux_thresh,
            SettingField::SolarThresh => &mut self.solar_thresh,
            SettingField::ConditionHistoryLength => &mut self.condition_history_length,
            SettingField::ChangeBufferDurationSec => &mut self.change_buffer_duration_sec,
            SettingField::UpperAlt => &mut self.upper_alt,
            SettingField::LowerAlt => &mut self.lower_alt,
            SettingField::UpperAltPer => &mut self.upper_alt_per,
            SettingField::LowerAltPer => &mut self.lower_alt_per,
            SettingField::TicktockInterval => &mut self.ticktock_interval,
        }
    }
}

/// Which group a condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingValue", into = "u8")]
pub enum BucketFlag {
    /// Keep blinds open (0).
    Open,
    /// Close blinds (1).
    Close,
}

impl TryFrom<SettingValue> for BucketFlag {
    type Error = String;

    fn try_from(value: SettingValue) -> Result<Self, Self::Error> {
        match value.as_i64() {
            Some(0) => Ok(BucketFlag::Open),
            Some(1) => Ok(BucketFlag::Close),
            _ => Err(format!("Invalid bucket flag '{value}', expected 0 or 1")),
        }
    }
}

impl From<BucketFlag> for u8 {
    fn from(value: BucketFlag) -> Self {
        match value {
            BucketFlag::Open => 0,
            BucketFlag::Close => 1,
        }
    }
}

/// One row of the condition history, sent as `[condition, timestamp]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, SettingValue)", into = "(String, SettingValue)")]
pub struct HistoryEntry {
    pub condition: String,
    pub timestamp: SettingValue,
}

impl From<(String, SettingValue)> for HistoryEntry {
    fn from((condition, timestamp): (String, SettingValue)) -> Self {
        HistoryEntry {
            condition,
            timestamp,
        }
    }
}

impl From<HistoryEntry> for (String, SettingValue) {
    fn from(value: HistoryEntry) -> Self {
        (value.condition, value.timestamp)
    }
}

/// A known condition and its bucket, sent as `[name, flag]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, BucketFlag)", into = "(String, BucketFlag)")]
pub struct DistinctCondition {
    pub name: String,
    pub flag: BucketFlag,
}

impl From<(String, BucketFlag)> for DistinctCondition {
    fn from((name, flag): (String, BucketFlag)) -> Self {
        DistinctCondition { name, flag }
    }
}

impl From<DistinctCondition> for (String, BucketFlag) {
    fn from(value: DistinctCondition) -> Self {
        (value.name, value.flag)
    }
}

/// Body sent to the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePayload {
    #[serde(flatten)]
    pub settings: Settings,
    pub distinct_conditions: BTreeMap<String, BucketFlag>,
}

impl SavePayload {
    /// Editable settings as query pairs, for backends that save over GET.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = SettingField::ALL
            .iter()
            .filter_map(|f| self.settings.value(*f).map(|v| (f.key(), v.to_string())))
            .collect();
        if let Some(v) = &self.settings.command_override {
            pairs.push(("commandOverride", v.to_string()));
        }
        pairs
    }
}

/// Reply of the ticktock and override endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub const SUCCESS: &'static str = "success";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_settings() {
        let message = r###"
            {"startAzm":80,"endAzm":280,"startAlt":15,"endAlt":15,"luxThresh":3000,
             "solarThresh":20,"conditionHistoryLength":5,"changeBufferDurationSec":600,
             "upperAlt":55,"lowerAlt":15,"upperAltPer":1,"lowerAltPer":0.5,
             "ticktockInterval":30,"commandOverride":1,"lastAzm":212.38,"lastAlt":"null",
             "lastCondition":"close","validateShadeState":"null","lastInArea":"true",
             "lastChangeDate":1690000000}
        "###;
        let settings: Settings = serde_json::from_str(message).unwrap();
        assert_eq!(settings.start_azm, Some(SettingValue::Int(80)));
        assert_eq!(settings.lower_alt_per, Some(SettingValue::Float(0.5)));
        assert_eq!(settings.last_alt, Some(SettingValue::Text("null".into())));
        assert_eq!(settings.command_override_enabled(), Some(true));
        assert_eq!(
            settings.status(StatusField::LastChangeDate),
            Some(&SettingValue::Int(1690000000))
        );
    }

    #[test]
    fn test_decode_partial_settings() {
        let settings: Settings = serde_json::from_str(r#"{"startAzm":100}"#).unwrap();
        assert_eq!(settings.value(SettingField::StartAzm), Some(&SettingValue::Int(100)));
        assert_eq!(settings.value(SettingField::EndAzm), None);
        assert_eq!(settings.command_override_enabled(), None);
    }

    #[test]
    fn test_read_only_fields_not_serialized() {
        let json = serde_json::to_value(Settings::backend_defaults()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 14);
        for field in StatusField::ALL {
            assert!(!object.contains_key(field.key()), "{}", field.key());
        }
        assert_eq!(object["lowerAltPer"], serde_json::json!(0.5));
        assert_eq!(object["commandOverride"], serde_json::json!(0));
    }

    #[test]
    fn test_coerce_matches_backend_rules() {
        assert_eq!(SettingValue::coerce("80"), SettingValue::Int(80));
        assert_eq!(SettingValue::coerce("0.5"), SettingValue::Float(0.5));
        assert_eq!(SettingValue::coerce("-5"), SettingValue::Float(-5.0));
        assert_eq!(SettingValue::coerce("null"), SettingValue::Text("null".into()));
        assert_eq!(SettingValue::coerce(""), SettingValue::Text(String::new()));
        assert_eq!(SettingValue::coerce("inf"), SettingValue::Text("inf".into()));
    }

    #[test]
    fn test_coerce_keeps_oversized_digits_exact() {
        let digits = "123456789012345678901234567890";
        let value = SettingValue::coerce(digits);
        assert_eq!(value, SettingValue::Text(digits.to_string()));
        assert_eq!(value.to_string(), digits);
        assert_eq!(
            SettingValue::coerce("9223372036854775807"),
            SettingValue::Int(i64::MAX)
        );
    }

    #[test]
    fn test_display_matches_form_text() {
        assert_eq!(SettingValue::Int(80).to_string(), "80");
        assert_eq!(SettingValue::Float(0.5).to_string(), "0.5");
        assert_eq!(SettingValue::Float(212.38).to_string(), "212.38");
        assert_eq!(SettingValue::Text("Cloudy".into()).to_string(), "Cloudy");
    }

    #[test]
    fn test_decode_distinct_conditions() {
        let message = r#"[["Clear","1"],["Cloudy",0],["Mostly Clear",1],["Rain","0"]]"#;
        let conditions: Vec<DistinctCondition> = serde_json::from_str(message).unwrap();
        let flags: Vec<_> = conditions.iter().map(|c| c.flag).collect();
        assert_eq!(
            flags,
            vec![
                BucketFlag::Close,
                BucketFlag::Open,
                BucketFlag::Close,
                BucketFlag::Open
            ]
        );
        assert_eq!(conditions[2].name, "Mostly Clear");
    }

    #[test]
    fn test_invalid_bucket_flag() {
        let result = serde_json::from_str::<Vec<DistinctCondition>>(r#"[["Clear","2"]]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_history() {
        let message = r#"[["Clear","2024-06-01 12:00:00"],["Cloudy","2024-06-01 11:59:30"]]"#;
        let history: Vec<HistoryEntry> = serde_json::from_str(message).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].condition, "Clear");
        assert_eq!(history[1].timestamp.to_string(), "2024-06-01 11:59:30");
    }

    #[test]
    fn test_save_payload_encoding() {
        let mut settings = Settings::default();
        settings.set_value(SettingField::StartAzm, SettingValue::Int(90));
        settings.command_override = Some(SettingValue::Int(1));
        settings.last_condition = Some("close".into());
        let payload = SavePayload {
            settings,
            distinct_conditions: BTreeMap::from([
                ("Clear".to_string(), BucketFlag::Close),
                ("Rain".to_string(), BucketFlag::Open),
            ]),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "startAzm": 90,
                "commandOverride": 1,
                "distinctConditions": {"Clear": 1, "Rain": 0}
            })
        );
        assert_eq!(
            payload.query_pairs(),
            vec![("startAzm", "90".to_string()), ("commandOverride", "1".to_string())]
        );
    }

    #[test]
    fn test_setting_field_from_str() {
        assert_eq!("startAzm".parse(), Ok(SettingField::StartAzm));
        assert_eq!("TICKTOCKINTERVAL".parse(), Ok(SettingField::TicktockInterval));
        assert!("lastAzm".parse::<SettingField>().is_err());
    }

    #[test]
    fn test_status_response() {
        let ok: StatusResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(ok.is_success());
        let running: StatusResponse = serde_json::from_str(r#"{"status":"Running"}"#).unwrap();
        assert!(!running.is_success());
    }
}
