//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::{load_config, to_toml};

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Log level: {}", config.logging.level);
    println!(
        "Data: {} ({} fine series)",
        config.data.dir.display(),
        config.data.fine.len()
    );
    match config.session.window()? {
        Some(window) => println!("Session: {}", window),
        None => println!("Session: disabled"),
    }
    println!(
        "Execution: stop {} / target {} / qty {} / trailing {}",
        config.execution.stop_offset,
        config.execution.target_offset,
        config.execution.default_quantity,
        if config.execution.enable_trailing_stop {
            config.execution.trailing_stop_offset.to_string()
        } else {
            "off".to_string()
        }
    );
    println!();
    println!("{}", to_toml(&config)?);

    Ok(())
}
