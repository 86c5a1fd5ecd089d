use blinds_admin::{HttpBlindsClient, PanelError, SettingField, Settings, SettingsPanel};

pub async fn set(
    panel: &SettingsPanel<HttpBlindsClient>,
    assignments: &[(String, String)],
    command_override: Option<bool>,
) -> Result<(), PanelError> {
    // The save carries the condition buckets too, so both must be loaded first.
    panel.load_settings().await?;
    panel.load_conditions().await?;

    for (name, value) in assignments {
        panel.set_field_by_name(name, value.as_str())?;
    }
    if let Some(enabled) = command_override {
        panel.set_command_override(enabled);
    }

    panel.save_settings().await?;
    let form = panel.form();
    if let Some(notice) = form.notice() {
        println!("{notice}");
    }
    for (name, _) in assignments {
        if let Ok(field) = name.parse::<SettingField>() {
            println!("  {:<24} {}", field.key(), form.field(field));
        }
    }
    Ok(())
}

pub fn print_defaults() {
    let defaults = Settings::backend_defaults();
    for field in SettingField::ALL {
        if let Some(value) = defaults.value(field) {
            println!("{:<24} {}", field.key(), value);
        }
    }
    if let Some(value) = &defaults.command_override {
        println!("{:<24} {}", "commandOverride", value);
    }
}
