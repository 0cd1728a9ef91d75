use color_eyre::eyre::eyre;
use color_eyre::Result;
use movie_log_config::Config;

use crate::ConfigCommands;

pub fn run_config(cmd: ConfigCommands, config: &Config) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(config, full),
    }
}

fn show_config(config: &Config, full: bool) -> Result<()> {
    let rendered = if full {
        config.to_toml()
    } else {
        config.masked().to_toml()
    }
    .map_err(|e| eyre!("Failed to render configuration: {}", e))?;

    println!("{}", rendered);

    if let Err(e) = config.validate() {
        eprintln!("warning: {}", e);
    }
    Ok(())
}
