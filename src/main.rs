use anyhow::Result;

use diag_harness::config::Config;
use diag_harness::logging;
use diag_harness::{
    log_debug, log_error, log_info, log_todo, log_warn, to_screen, Harness, SettingsRecord,
};

/// Application-defined setting stored next to the harness settings
const SKIP_WELCOME: &str = "skipWelcomeAtLaunch";

fn main() -> Result<()> {
    logging::init_tracing()?;

    let config = Config::load()?;
    let initial = SettingsRecord::default().with_extension(SKIP_WELCOME, false)?;
    let harness = Harness::from_config(&config, initial);

    tracing::info!(
        "Harness enabled: {}, settings at {}",
        harness.is_enabled(),
        harness.settings().path().display()
    );

    log_info!(harness, "Demo starting");
    log_debug!(harness, filter: "net", "Fetching {} items", 3);
    log_warn!(harness, filter: "ui", "Layout took {}ms", 48);
    log_error!(harness, filter: "net", "Request failed: {}", "timeout");
    log_todo!(harness, "Replace the placeholder welcome text");

    let skip_welcome = harness
        .settings()
        .read(|settings| settings.extension_bool(SKIP_WELCOME))
        .unwrap_or(false);
    if !skip_welcome {
        to_screen!(harness, details: "set skipWelcomeAtLaunch to hide this", "Welcome!");
    }
    to_screen!(harness, "Loaded {} items", 3);

    for message in harness.screen_logs().visible_messages() {
        match &message.details {
            Some(details) => println!("[screen] {} ({})", message.text, details),
            None => println!("[screen] {}", message.text),
        }
    }

    Ok(())
}
