use app_essentials::{Key, Logger, Registry, Settings, SettingsOptions};

fn main() -> Result<(), app_essentials::Error> {
    // APP_ENVIRONMENT=Development picks up demos/appsettings.Development.toml
    let registry = Registry::with_defaults(SettingsOptions::default().with_base_dir("demos"));

    let logger = registry.resolve::<Logger>()?.for_context("Program");
    let settings = registry.resolve::<Settings>()?;
    logger.info(format!(
        "Application has been started ({} environment)",
        settings.environment()
    ));

    let key = Key::new("PingKey");
    println!("{key}: {}", settings.value(&key).unwrap_or_default());

    let retries = settings.typed_value::<u32>(&Key::new("Worker.retries")).unwrap_or(1);
    logger.for_context("Worker").debug(format!("retrying up to {retries} times"));

    logger.info("Application has been shut down");
    Ok(())
}
