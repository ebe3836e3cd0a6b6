//! One-off address lookup.

use console::style;

use rainwise::config::Settings;
use rainwise::geocode::first_coordinate;

use crate::cli::icons::{info, success, warn};

pub async fn cmd_geocode(settings: &Settings, address: &str) -> anyhow::Result<()> {
    let address = address.trim();
    if address.is_empty() {
        anyhow::bail!("Address is empty");
    }

    let client = settings.http_client()?;
    let lookup = settings.geocode_lookup(&client);

    eprintln!("{} Looking up {}", info(), style(address).bold());
    let candidates = lookup.search(address).await?;

    match first_coordinate(&candidates) {
        Ok(coordinate) => {
            println!("{}", coordinate);
            if let Some(name) = candidates.first().and_then(|c| c.display_name.as_deref()) {
                eprintln!("{} {}", success(), style(name).dim());
            }
        }
        Err(e) => eprintln!("{} {}", warn(), e),
    }
    Ok(())
}
