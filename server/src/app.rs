//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::datasette::DatasetteClient;
use crate::data::entity::EntityRepository;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub repository: EntityRepository,
    /// Datasette JSON endpoint queries are sent to
    pub endpoint: String,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let client = DatasetteClient::new(config.datasette.settings())
            .context("Failed to initialize Datasette client")?;
        let endpoint = client.endpoint().to_string();
        let repository = EntityRepository::new(Arc::new(client));

        tracing::debug!(
            backend = repository.backend_name(),
            endpoint = %endpoint,
            "Query backend initialized"
        );

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            repository,
            endpoint,
        })
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        banner::print_banner(&app.config, &app.endpoint);

        let server = ApiServer::new(app);
        let app = server.start().await?;

        tracing::info!(shutdown = app.shutdown.is_triggered(), "Server stopped");
        Ok(())
    }
}
