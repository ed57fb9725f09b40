use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4320;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Task server port (default: 4320).
    port: Option<u16>,
    /// Bind address for the server (default: "127.0.0.1"; use "0.0.0.0" for LAN access).
    bind_address: Option<String>,
    /// Base URL the client and TUI talk to (default: http://127.0.0.1:{port}).
    server_url: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskpad=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured).
    log_format: Option<String>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

/// Resolved application configuration, shared by the server, the terminal
/// UI, and the one-shot CLI commands.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Task server port.
    pub port: u16,
    /// Bind address for the task server.
    pub bind_address: String,
    /// Base URL the transport client talks to.
    pub server_url: String,
    /// Data directory for the SQLite database and config.toml.
    pub data_dir: PathBuf,
    /// Log level filter string.
    pub log: String,
    /// Log output format: "pretty" | "json".
    pub log_format: String,
}

/// CLI/env overrides passed down from clap. `Some` beats the TOML file.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub server_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log: Option<String>,
}

impl AppConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn load(overrides: ConfigOverrides) -> Self {
        let data_dir = overrides.data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = overrides.port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let bind_address = overrides
            .bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let server_url = overrides
            .server_url
            .or(toml.server_url)
            .unwrap_or_else(|| format!("http://127.0.0.1:{port}"));
        let log = overrides.log.or(toml.log).unwrap_or_else(|| "info".to_string());
        let log_format = toml.log_format.unwrap_or_else(|| "pretty".to_string());

        Self {
            port,
            bind_address,
            server_url,
            data_dir,
            log,
            log_format,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/taskpad
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskpad");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskpad or ~/.local/share/taskpad
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskpad");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskpad");
        }
    }
    #[cfg(target_os = "windows")]
    {
        // %APPDATA%\taskpad
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskpad");
        }
    }
    // Fallback
    PathBuf::from(".taskpad")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(ConfigOverrides {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.server_url, format!("http://127.0.0.1:{DEFAULT_PORT}"));
        assert_eq!(config.log, "info");
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "port = 9000\nlog = \"debug\"\nlog_format = \"json\"\n",
        )
        .unwrap();

        let config = AppConfig::load(ConfigOverrides {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.log, "debug");
        assert_eq!(config.log_format, "json");
        // server_url default follows the resolved port
        assert_eq!(config.server_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn cli_overrides_beat_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = 9000\n").unwrap();

        let config = AppConfig::load(ConfigOverrides {
            port: Some(4000),
            server_url: Some("http://tasks.example:4000".into()),
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        assert_eq!(config.port, 4000);
        assert_eq!(config.server_url, "http://tasks.example:4000");
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = \"not a number").unwrap();

        let config = AppConfig::load(ConfigOverrides {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
