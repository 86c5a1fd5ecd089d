use blinds_admin::{HttpBlindsClient, PanelError, SettingsForm, SettingsPanel};

pub async fn conditions(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    panel.load_conditions().await?;
    print_conditions(&panel.form());
    Ok(())
}

/// Moves the named conditions to their groups and saves.
pub async fn classify(
    panel: &SettingsPanel<HttpBlindsClient>,
    open: &[String],
    close: &[String],
) -> Result<(), PanelError> {
    panel.load_settings().await?;
    panel.load_conditions().await?;

    for name in open {
        panel.select_condition(name)?;
    }
    let opened = panel.move_to_open();
    panel.clear_selection();

    for name in close {
        panel.select_condition(name)?;
    }
    let closed = panel.move_to_close();
    panel.clear_selection();

    if opened + closed == 0 {
        println!("Nothing to move");
        print_conditions(&panel.form());
        return Ok(());
    }

    panel.save_settings().await?;
    if let Some(notice) = panel.form().notice() {
        println!("{notice}");
    }
    print_conditions(&panel.form());
    Ok(())
}

pub(super) fn print_conditions(form: &SettingsForm) {
    println!("Keep blinds open");
    for name in form.open_conditions().names() {
        println!("  {name}");
    }
    println!("Close blinds");
    for name in form.close_conditions().names() {
        println!("  {name}");
    }
}
