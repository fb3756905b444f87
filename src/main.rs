use anyhow::Result;
use clap::Parser;
use rouilleftp::core_cli::{apply_url, Cli};
use rouilleftp::core_log::logger::init_logger;
use rouilleftp::{client, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, if one was given
    let mut config = if args.config.is_empty() {
        Config::default()
    } else {
        Config::load_from_file(&args.config)?
    };

    // URL values override the configuration file
    let remote_dir = match &args.url {
        Some(url) => apply_url(&mut config.client, url)?,
        None => None,
    };

    client::run(&args, config, remote_dir).await
}
