//! Startup banner

use super::config::AppConfig;
use super::constants::APP_NAME;

/// Print the startup banner with the API address and the query backend
pub fn print_banner(config: &AppConfig, backend_endpoint: &str) {
    let display_host = match config.server.host.as_str() {
        "0.0.0.0" | "::" => "localhost",
        host => host,
    };
    const W: usize = 11;

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m \x1b[36mhttp://{}:{}/api/v1/entity\x1b[0m",
        "API:", display_host, config.server.port
    );
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m \x1b[36mhttp://{}:{}/api/openapi.json\x1b[0m",
        "OpenAPI:", display_host, config.server.port
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {} \x1b[90m({} params)\x1b[0m",
        "Datasette:", backend_endpoint, config.datasette.param_mode
    );
    println!();
}
