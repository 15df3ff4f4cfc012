use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::data::datasette::ParamMode;

use super::constants::{
    ENV_CONFIG, ENV_DATASETTE_DATABASE, ENV_DATASETTE_PARAM_MODE, ENV_DATASETTE_TIMEOUT_SECS,
    ENV_DATASETTE_URL, ENV_HOST, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "entity-search")]
#[command(version, about = "Entity search API over Datasette", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Datasette base URL
    #[arg(long, global = true, env = ENV_DATASETTE_URL)]
    pub datasette_url: Option<String>,

    /// Datasette database name
    #[arg(long, global = true, env = ENV_DATASETTE_DATABASE)]
    pub database: Option<String>,

    /// Datasette request timeout in seconds
    #[arg(long, global = true, env = ENV_DATASETTE_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,

    /// How query values are sent (bound or inline)
    #[arg(long, global = true, env = ENV_DATASETTE_PARAM_MODE, value_parser = parse_param_mode)]
    pub param_mode: Option<ParamMode>,
}

/// Parse parameter mode from CLI/env string
fn parse_param_mode(s: &str) -> Result<ParamMode, String> {
    match s.to_lowercase().as_str() {
        "bound" => Ok(ParamMode::Bound),
        "inline" => Ok(ParamMode::Inline),
        _ => Err(format!(
            "Invalid parameter mode '{}'. Valid options: bound, inline",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub datasette_url: Option<String>,
    pub database: Option<String>,
    pub timeout_secs: Option<u64>,
    pub param_mode: Option<ParamMode>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        datasette_url: cli.datasette_url,
        database: cli.database,
        timeout_secs: cli.timeout_secs,
        param_mode: cli.param_mode,
    };
    (config, cli.command)
}
