//! Device position lookup.

use rainwise::config::Settings;
use rainwise::location::LocationError;

use crate::cli::icons::{error, success};

pub async fn cmd_locate(settings: &Settings) -> anyhow::Result<()> {
    let client = settings.http_client()?;
    let geolocation = settings.geolocation(&client);
    let provider = match geolocation.get() {
        Ok(provider) => provider,
        Err(reason) => anyhow::bail!("Geolocation not supported: {}", reason),
    };

    let options = settings.map.position;
    let position = match tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .unwrap_or_else(|_| Err(LocationError::timeout(options.timeout)))
    {
        Ok(position) => position,
        Err(e) => {
            eprintln!("{} {}", error(), e);
            return Ok(());
        }
    };

    println!("{}", position.coordinate);
    if let Some(accuracy) = position.accuracy {
        eprintln!("{} accurate to about {:.0} m", success(), accuracy);
    }
    Ok(())
}
