//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and API defaults so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "presence-picker";

/// Crate version, as reported by `presence-picker version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.presence-picker.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".presence-picker.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "presence-picker";

/// Users listing served by the presence analyzer.
pub const DEFAULT_USERS_ENDPOINT: &str = "http://localhost:5000/api/v1/users";

/// Field carrying the user identifier in the users listing.
pub const DEFAULT_ID_FIELD: &str = "user_id";

/// Option value meaning "all users / no user".
pub const DEFAULT_SENTINEL: &str = "-1";

/// Seconds before the users request is abandoned.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Locale the charts are labelled in.
pub const DEFAULT_CHART_LOCALE: &str = "pl";

/// Chart packages loaded once at startup.
pub const DEFAULT_CHART_PACKAGES: &[&str] = &["corechart", "timeline"];

// ── Environment variable names ──────────────────────────────────────

pub const ENV_USERS_URL: &str = "PRESENCE_USERS_URL";
pub const ENV_ID_FIELD: &str = "PRESENCE_ID_FIELD";
pub const ENV_CHART: &str = "PRESENCE_CHART";
pub const ENV_LOCALE: &str = "PRESENCE_LOCALE";
pub const ENV_API_BASE: &str = "PRESENCE_API_BASE";
