//! RTM Addons CLI
//!
//! Terminal front-end for the Real Train Mod addon catalog.

mod commands;
mod display;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::Mutex;

use rtm_addon_manager_lib::core::catalog::{Feature, Region};
use rtm_addon_manager_lib::core::error::ManagerResult;
use rtm_addon_manager_lib::core::state::{default_data_dir, AppState};

#[derive(Parser)]
#[command(name = "rtm-addons")]
#[command(version, about = "Browse and download Real Train Mod addons")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory holding settings.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog API base URL
    #[arg(long, global = true, env = "RTM_API_BASE_URL")]
    api_base: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List trains in the catalog
    List {
        /// Text to look for in name or description
        #[arg(short, long)]
        search: Option<String>,

        /// Only trains from one of these regions (tohoku, kanto, kansai, ...)
        #[arg(long = "region", value_name = "REGION")]
        regions: Vec<Region>,

        /// Only trains with all of these features (ats, drivers_cab, ...)
        #[arg(long = "feature", value_name = "FEATURE")]
        features: Vec<Feature>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show details of a train
    Show {
        /// Train id
        id: u64,

        /// Version to resolve the download link for
        #[arg(long)]
        version: Option<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a train addon
    Download {
        /// Train id
        id: u64,

        /// Version to download (default: first listed)
        #[arg(long)]
        version: Option<String>,

        /// Target directory (default: configured download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accept the terms of use without prompting
        #[arg(long)]
        accept_terms: bool,
    },

    /// Manage settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current settings
    Show,

    /// Store the catalog API base URL
    SetApiBase {
        /// e.g. https://example.jp
        url: String,
    },

    /// Store the directory downloads are saved to
    SetDownloadDir {
        /// Target directory
        dir: PathBuf,
    },

    /// Restore default settings
    Reset,
}

#[tokio::main]
async fn main() {
    rtm_addon_manager_lib::init_tracing("warn");
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        display::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> ManagerResult<()> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let state = Arc::new(Mutex::new(AppState::new(data_dir, cli.api_base)?));

    match cli.command {
        Commands::List {
            search,
            regions,
            features,
            json,
        } => commands::list(&state, search, regions, features, json).await,
        Commands::Show { id, version, json } => {
            commands::show(&state, id, version.as_deref(), json).await
        }
        Commands::Download {
            id,
            version,
            output,
            accept_terms,
        } => commands::download(&state, id, version.as_deref(), output, accept_terms).await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config_show(&state).await,
            ConfigCommands::SetApiBase { url } => commands::config_set_api_base(&state, url).await,
            ConfigCommands::SetDownloadDir { dir } => {
                commands::config_set_download_dir(&state, dir).await
            }
            ConfigCommands::Reset => commands::config_reset(&state).await,
        },
    }
}
