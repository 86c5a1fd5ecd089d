use blinds_admin::{HttpBlindsClient, PanelError, SettingsPanel};

pub async fn start_ticktock(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    let status = panel.start_ticktock().await?;
    println!("Ticktock: {status}");
    Ok(())
}

pub async fn stop_ticktock(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    let status = panel.stop_ticktock().await?;
    println!("Ticktock: {status}");
    Ok(())
}

pub async fn ticktock_status(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    let status = panel.load_ticktock_status().await?;
    println!("Ticktock: {status}");
    Ok(())
}

pub async fn sync_override(
    panel: &SettingsPanel<HttpBlindsClient>,
    enabled: bool,
) -> Result<(), PanelError> {
    panel.sync_override(enabled).await?;
    println!("Command override {}", if enabled { "on" } else { "off" });
    Ok(())
}

pub async fn last_check(panel: &SettingsPanel<HttpBlindsClient>) -> Result<(), PanelError> {
    let seconds = panel.time_since_last_check().await?;
    println!("Last condition check {seconds:.0}s ago");
    Ok(())
}
