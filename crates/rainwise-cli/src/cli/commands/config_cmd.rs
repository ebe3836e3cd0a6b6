//! Configuration display.

use console::style;

use rainwise::config::Config;

/// Print the effective configuration, env overrides included.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => eprintln!("{} Loaded from {}", style("→").dim(), path.display()),
        None => eprintln!("{} No config file found, using defaults", style("→").dim()),
    }
    print!("{}", config.to_toml()?);
    Ok(())
}
