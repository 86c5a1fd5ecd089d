use blinds_admin::{HttpBlindsClient, PanelError, SettingField, SettingsForm, SettingsPanel, StatusField};

use super::conditions::print_conditions;

pub async fn show(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    panel.on_load().await?;
    let form = panel.form();

    println!("Settings");
    for field in SettingField::ALL {
        println!("  {:<24} {}", field.key(), form.field(field));
    }
    println!(
        "  {:<24} {}",
        "commandOverride",
        if form.command_override() { "on" } else { "off" }
    );

    println!("Status");
    for field in StatusField::ALL {
        println!("  {:<24} {}", field.key(), form.status(field));
    }
    println!("  {:<24} {}", "ticktock", form.ticktock_status());

    print_history(&form);
    print_conditions(&form);
    Ok(())
}

pub async fn history(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    panel.load_history().await?;
    print_history(&panel.form());
    Ok(())
}

fn print_history(form: &SettingsForm) {
    println!("History");
    if form.history().is_empty() {
        println!("  (empty)");
    }
    for row in form.history() {
        println!("  {}  {}", row.timestamp, row.condition);
    }
}
