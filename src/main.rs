use std::path::PathBuf;
use std::process::ExitCode;

use banfetch::{Api, Error, FetchConfig, UpdateStatus};
use clap::Parser;
use env_logger::Env;
use log::error;

#[derive(Parser, Debug)]
#[command(
    name = "ban-fetch",
    version,
    about = "Download the BAN address dataset when it changed and extract it"
)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base data directory (the archive lives in its raw/ subdirectory).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    manifest_url: Option<String>,
    #[arg(long)]
    archive_url: Option<String>,
    /// Extract into this directory instead of the raw-data directory.
    #[arg(long)]
    extract_dir: Option<PathBuf>,
    /// Do not draw progress bars.
    #[arg(long)]
    no_progress: bool,
    /// Stop after downloading.
    #[arg(long)]
    skip_extract: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(UpdateStatus::UpToDate) => ExitCode::SUCCESS,
        Ok(UpdateStatus::Downloaded { bytes }) => {
            println!("downloaded {bytes} bytes");
            ExitCode::SUCCESS
        }
        Ok(UpdateStatus::Updated { bytes, members }) => {
            println!("downloaded {bytes} bytes, extracted {members} files");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<UpdateStatus, Error> {
    let mut config = match &cli.config {
        Some(path) => FetchConfig::from_json_file(path)?,
        None => FetchConfig::default(),
    };
    if config.proxy.is_none() {
        config.proxy = banfetch::config::proxy_from_env();
    }

    let mut api = Api::with_config(config);
    if let Some(dir) = cli.data_dir {
        api = api.set_data_dir(dir);
    }
    if let Some(url) = &cli.manifest_url {
        api = api.set_manifest_url(url);
    }
    if let Some(url) = &cli.archive_url {
        api = api.set_archive_url(url);
    }
    if let Some(dir) = cli.extract_dir {
        api = api.set_extract_dir(dir);
    }
    if cli.no_progress {
        api = api.no_progress();
    }
    if cli.skip_extract {
        api = api.skip_extract();
    }

    api.update()
}
