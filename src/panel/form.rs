//! In-memory model of the admin form.
//!
//! Inputs hold text exactly as an operator would see it. Nothing is
//! validated here; the backend decides what a value means.

use crate::protocol::messages::{
    BucketFlag, DistinctCondition, HistoryEntry, SavePayload, SettingField, SettingValue,
    Settings, StatusField,
};
use std::collections::BTreeMap;

pub const SAVED_NOTICE: &str = "Saved Successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub name: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        SelectOption {
            name: name.into(),
            selected: false,
        }
    }
}

/// A multi-select list of condition names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectList {
    options: Vec<SelectOption>,
}

impl SelectList {
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name == name)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn push(&mut self, option: SelectOption) {
        self.options.push(option);
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }

    /// Marks `name` as selected. Returns false if the list has no such option.
    pub fn select(&mut self, name: &str) -> bool {
        match self.options.iter_mut().find(|o| o.name == name) {
            Some(option) => {
                option.selected = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.options.iter_mut().for_each(|o| o.selected = false);
    }

    pub fn selected(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.name.as_str())
            .collect()
    }

    /// Removes the selected options, keeping the order of the rest.
    fn take_selected(&mut self) -> Vec<SelectOption> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.options)
            .into_iter()
            .partition(|o| o.selected);
        self.options = kept;
        taken
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub condition: String,
    pub timestamp: String,
}

impl From<HistoryEntry> for HistoryRow {
    fn from(entry: HistoryEntry) -> Self {
        HistoryRow {
            condition: entry.condition,
            timestamp: entry.timestamp.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    fields: BTreeMap<SettingField, String>,
    command_override: bool,
    status: BTreeMap<StatusField, String>,
    history: Vec<HistoryRow>,
    open_conditions: SelectList,
    close_conditions: SelectList,
    ticktock_status: String,
    notice: Option<String>,
}

impl SettingsForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of an input; empty when never populated.
    pub fn field(&self, field: SettingField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, field: SettingField, text: impl Into<String>) {
        self.fields.insert(field, text.into());
    }

    pub fn command_override(&self) -> bool {
        self.command_override
    }

    pub fn set_command_override(&mut self, checked: bool) {
        self.command_override = checked;
    }

    pub fn status(&self, field: StatusField) -> &str {
        self.status.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn history(&self) -> &[HistoryRow] {
        &self.history
    }

    pub fn open_conditions(&self) -> &SelectList {
        &self.open_conditions
    }

    pub fn close_conditions(&self) -> &SelectList {
        &self.close_conditions
    }

    pub fn ticktock_status(&self) -> &str {
        &self.ticktock_status
    }

    pub fn set_ticktock_status(&mut self, status: impl Into<String>) {
        self.ticktock_status = status.into();
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Writes a settings response into inputs and status labels.
    ///
    /// Values missing from the response leave the current text alone.
    pub fn populate(&mut self, settings: &Settings) {
        for field in SettingField::ALL {
            if let Some(value) = settings.value(field) {
                self.fields.insert(field, value.to_string());
            }
        }
        if let Some(enabled) = settings.command_override_enabled() {
            self.command_override = enabled;
        }
        for field in StatusField::ALL {
            if let Some(value) = settings.status(field) {
                self.status.insert(field, value.to_string());
            }
        }
    }

    /// Reads the inputs back into a settings record.
    pub fn read_settings(&self) -> Settings {
        let mut settings = Settings::default();
        for (field, text) in &self.fields {
            settings.set_value(*field, SettingValue::coerce(text));
        }
        settings.command_override = Some(SettingValue::Int(i64::from(self.command_override)));
        settings
    }

    /// Rebuilds the condition buckets from both lists.
    pub fn distinct_conditions(&self) -> BTreeMap<String, BucketFlag> {
        let open = self
            .open_conditions
            .options()
            .iter()
            .map(|o| (o.name.clone(), BucketFlag::Open));
        let close = self
            .close_conditions
            .options()
            .iter()
            .map(|o| (o.name.clone(), BucketFlag::Close));
        open.chain(close).collect()
    }

    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            settings: self.read_settings(),
            distinct_conditions: self.distinct_conditions(),
        }
    }

    /// Appends rows in the order given.
    pub fn append_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history.extend(entries.into_iter().map(HistoryRow::from));
    }

    /// Replaces both lists, splitting conditions by bucket.
    pub fn set_conditions(&mut self, conditions: Vec<DistinctCondition>) {
        self.open_conditions.clear();
        self.close_conditions.clear();
        for condition in conditions {
            let option = SelectOption::new(condition.name);
            match condition.flag {
                BucketFlag::Open => self.open_conditions.push(option),
                BucketFlag::Close => self.close_conditions.push(option),
            }
        }
    }

    /// Marks `name` as selected in whichever list holds it.
    pub fn select_condition(&mut self, name: &str) -> bool {
        self.open_conditions.select(name) || self.close_conditions.select(name)
    }

    pub fn clear_selection(&mut self) {
        self.open_conditions.clear_selection();
        self.close_conditions.clear_selection();
    }

    /// Moves the selected close-list options to the open list.
    pub fn move_to_open(&mut self) -> usize {
        Self::transfer(&mut self.close_conditions, &mut self.open_conditions)
    }

    /// Moves the selected open-list options to the close list.
    pub fn move_to_close(&mut self) -> usize {
        Self::transfer(&mut self.open_conditions, &mut self.close_conditions)
    }

    fn transfer(from: &mut SelectList, to: &mut SelectList) -> usize {
        let moved = from.take_selected();
        let count = moved.len();
        for mut option in moved {
            option.selected = false;
            to.push(option);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(items: &[(&str, BucketFlag)]) -> Vec<DistinctCondition> {
        items
            .iter()
            .map(|(name, flag)| DistinctCondition {
                name: name.to_string(),
                flag: *flag,
            })
            .collect()
    }

    fn loaded_form() -> SettingsForm {
        let mut form = SettingsForm::new();
        form.set_conditions(conditions(&[
            ("Clear", BucketFlag::Close),
            ("Cloudy", BucketFlag::Open),
            ("Mostly Clear", BucketFlag::Close),
            ("Rain", BucketFlag::Open),
            ("Sunny", BucketFlag::Close),
        ]));
        form
    }

    #[test]
    fn test_populate_example_response() {
        let settings: Settings = serde_json::from_str(
            r#"{"startAzm":80,"endAzm":280,"commandOverride":1,"lowerAltPer":0.5,
                "lastAzm":212.38,"lastInArea":"true","lastChangeDate":1690000000}"#,
        )
        .unwrap();
        let mut form = SettingsForm::new();
        form.populate(&settings);
        assert!(form.command_override());
        assert_eq!(form.field(SettingField::StartAzm), "80");
        assert_eq!(form.field(SettingField::EndAzm), "280");
        assert_eq!(form.field(SettingField::LowerAltPer), "0.5");
        assert_eq!(form.status(StatusField::LastAzm), "212.38");
        assert_eq!(form.status(StatusField::LastInArea), "true");
        assert_eq!(form.status(StatusField::LastChangeDate), "1690000000");
        assert_eq!(form.field(SettingField::UpperAlt), "");
    }

    #[test]
    fn test_populate_override_off() {
        let mut form = SettingsForm::new();
        form.set_command_override(true);
        let settings: Settings = serde_json::from_str(r#"{"commandOverride":0}"#).unwrap();
        form.populate(&settings);
        assert!(!form.command_override());
    }

    #[test]
    fn test_populate_every_field() {
        let mut form = SettingsForm::new();
        let defaults = Settings::backend_defaults();
        form.populate(&defaults);
        for field in SettingField::ALL {
            assert_eq!(
                form.field(field),
                defaults.value(field).unwrap().to_string(),
                "{field}"
            );
        }
        for field in StatusField::ALL {
            assert_eq!(form.status(field), defaults.status(field).unwrap().to_string());
        }
    }

    #[test]
    fn test_save_round_trip() {
        let mut form = SettingsForm::new();
        let defaults = Settings::backend_defaults();
        form.populate(&defaults);

        let saved = form.read_settings();
        for field in SettingField::ALL {
            assert_eq!(saved.value(field), defaults.value(field), "{field}");
        }
        assert_eq!(saved.command_override, defaults.command_override);

        let mut reloaded = SettingsForm::new();
        reloaded.populate(&saved);
        for field in SettingField::ALL {
            assert_eq!(reloaded.field(field), form.field(field));
        }
        assert_eq!(reloaded.command_override(), form.command_override());
    }

    #[test]
    fn test_edited_field_is_coerced() {
        let mut form = SettingsForm::new();
        form.set_field(SettingField::StartAzm, "95");
        form.set_field(SettingField::UpperAltPer, "0.75");
        let settings = form.read_settings();
        assert_eq!(settings.start_azm, Some(SettingValue::Int(95)));
        assert_eq!(settings.upper_alt_per, Some(SettingValue::Float(0.75)));
        assert_eq!(settings.command_override, Some(SettingValue::Int(0)));
    }

    #[test]
    fn test_conditions_partitioned() {
        let form = loaded_form();
        assert_eq!(form.open_conditions().names(), vec!["Cloudy", "Rain"]);
        assert_eq!(
            form.close_conditions().names(),
            vec!["Clear", "Mostly Clear", "Sunny"]
        );
    }

    #[test]
    fn test_reload_replaces_lists() {
        let mut form = loaded_form();
        form.set_conditions(conditions(&[("Clear", BucketFlag::Open)]));
        assert_eq!(form.open_conditions().names(), vec!["Clear"]);
        assert!(form.close_conditions().is_empty());
    }

    #[test]
    fn test_move_to_open_transfers_only_selected() {
        let mut form = loaded_form();
        assert!(form.select_condition("Clear"));
        assert!(form.select_condition("Sunny"));
        assert_eq!(form.move_to_open(), 2);
        assert_eq!(
            form.open_conditions().names(),
            vec!["Cloudy", "Rain", "Clear", "Sunny"]
        );
        assert_eq!(form.close_conditions().names(), vec!["Mostly Clear"]);
        assert!(form.open_conditions().selected().is_empty());
    }

    #[test]
    fn test_move_to_close_ignores_selection_in_close_list() {
        let mut form = loaded_form();
        form.select_condition("Rain");
        form.select_condition("Clear");
        assert_eq!(form.move_to_close(), 1);
        assert_eq!(form.open_conditions().names(), vec!["Cloudy"]);
        assert_eq!(
            form.close_conditions().names(),
            vec!["Clear", "Mostly Clear", "Sunny", "Rain"]
        );
        assert_eq!(form.close_conditions().selected(), vec!["Clear"]);
    }

    #[test]
    fn test_move_with_nothing_selected() {
        let mut form = loaded_form();
        let before = form.clone();
        assert_eq!(form.move_to_open(), 0);
        assert_eq!(form.move_to_close(), 0);
        assert_eq!(form, before);
    }

    #[test]
    fn test_select_unknown_condition() {
        let mut form = loaded_form();
        assert!(!form.select_condition("Snow"));
    }

    #[test]
    fn test_distinct_conditions_partition() {
        let mut form = loaded_form();
        form.select_condition("Rain");
        form.move_to_close();
        form.select_condition("Mostly Clear");
        form.move_to_open();

        let buckets = form.distinct_conditions();
        assert_eq!(buckets.len(), 5);
        for name in form.close_conditions().names() {
            assert_eq!(buckets[name], BucketFlag::Close);
            assert!(!form.open_conditions().contains(name));
        }
        for name in form.open_conditions().names() {
            assert_eq!(buckets[name], BucketFlag::Open);
        }
        assert_eq!(buckets["Rain"], BucketFlag::Close);
        assert_eq!(buckets["Mostly Clear"], BucketFlag::Open);
    }

    #[test]
    fn test_history_appended_in_order() {
        let mut form = SettingsForm::new();
        let first: Vec<HistoryEntry> =
            serde_json::from_str(r#"[["Clear","2024-06-01 12:00:00"],["Clear","2024-06-01 11:00:00"]]"#)
                .unwrap();
        let second: Vec<HistoryEntry> =
            serde_json::from_str(r#"[["Cloudy","2024-06-01 13:00:00"]]"#).unwrap();
        form.append_history(first);
        form.append_history(second);
        let rows: Vec<_> = form
            .history()
            .iter()
            .map(|r| (r.condition.as_str(), r.timestamp.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Clear", "2024-06-01 12:00:00"),
                ("Clear", "2024-06-01 11:00:00"),
                ("Cloudy", "2024-06-01 13:00:00"),
            ]
        );
    }
}
