// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Entity Search";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".entity-search";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "entity-search.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "ENTITY_SEARCH_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "ENTITY_SEARCH_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "ENTITY_SEARCH_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "ENTITY_SEARCH_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5390;

/// Default log filter when neither ENV_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "info,entity_search=info";

// =============================================================================
// Environment Variables - Datasette
// =============================================================================

/// Environment variable for the Datasette base URL
pub const ENV_DATASETTE_URL: &str = "ENTITY_SEARCH_DATASETTE_URL";

/// Environment variable for the Datasette database name
pub const ENV_DATASETTE_DATABASE: &str = "ENTITY_SEARCH_DATASETTE_DATABASE";

/// Environment variable for the Datasette request timeout
pub const ENV_DATASETTE_TIMEOUT_SECS: &str = "ENTITY_SEARCH_DATASETTE_TIMEOUT_SECS";

/// Environment variable for the parameter mode (bound or inline)
pub const ENV_DATASETTE_PARAM_MODE: &str = "ENTITY_SEARCH_DATASETTE_PARAM_MODE";

// =============================================================================
// Datasette Defaults
// =============================================================================

/// Default Datasette base URL (Datasette's own default bind address)
pub const DEFAULT_DATASETTE_URL: &str = "http://127.0.0.1:8001";

/// Default Datasette database name
pub const DEFAULT_DATASETTE_DATABASE: &str = "entity";

/// Default Datasette request timeout in seconds
pub const DEFAULT_DATASETTE_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Query Limits
// =============================================================================

/// Default page size for entity searches
pub const QUERY_DEFAULT_LIMIT: u32 = 10;

/// Maximum page size for entity searches
pub const QUERY_MAX_LIMIT: u32 = 500;
