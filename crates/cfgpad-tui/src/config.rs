//! Settings from the command line, the environment and an optional TOML file.
//!
//! Precedence: command line / environment, then the config file, then built-in defaults.
//!
//! ```toml
//! server = "http://127.0.0.1:8080"
//! document = "config.yaml"
//! timeout_secs = 10
//!
//! [endpoints]
//! get = "/api/v1/cfg/get"
//!
//! [[schemas]]
//! uri = "/api/v1/cfg/schema"
//! fileMatch = ["config.yaml"]
//!
//! [lsp]
//! command = "yaml-language-server"
//! args = ["--stdio"]
//!
//! [log]
//! level = "info,cfgpad_lsp=debug"
//! ```

use cfgpad_core::{DEFAULT_DOCUMENT_NAME, SchemaAssociations, SchemaError, SchemaSettings};
use cfgpad_lsp::DEFAULT_SERVER_COMMAND;
use cfgpad_remote::{DEFAULT_TIMEOUT, Endpoints};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};
use thiserror::Error;

/// Server used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Log filter used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, PartialEq, Clone, Debug, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the config server
    #[arg(long, env = "CFGPAD_SERVER")]
    pub server: Option<String>,
    /// Name of the edited document, matched against schema file patterns
    #[arg(long)]
    pub document: Option<String>,
    /// Config file [default: <config dir>/cfgpad/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// YAML language server command
    #[arg(long = "lsp-cmd", env = "CFGPAD_LSP_CMD")]
    pub lsp_cmd: Option<String>,
    /// Language server arguments, separated by whitespace
    #[arg(long = "lsp-args", env = "CFGPAD_LSP_ARGS", allow_hyphen_values = true)]
    pub lsp_args: Option<String>,
    /// Only use the built-in YAML checks
    #[arg(long = "no-lsp")]
    pub no_lsp: bool,
    /// Log filter, e.g. `info` or `info,cfgpad_lsp=debug`
    #[arg(long = "log-level", env = "CFGPAD_LOG")]
    pub log_level: Option<String>,
    /// Log file [default: <cache dir>/cfgpad/cfgpad.log]
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("invalid log filter `{filter}`: {source}")]
    InvalidLogFilter {
        filter: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub document: Option<String>,
    pub timeout_secs: Option<u64>,
    pub endpoints: Endpoints,
    pub schemas: Option<Vec<SchemaSettings>>,
    pub lsp: LspFileConfig,
    pub log: LogFileConfig,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LspFileConfig {
    pub enabled: Option<bool>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogFileConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// How to start the language server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LspSettings {
    pub command: String,
    pub args: Vec<String>,
}

/// Resolved settings.
#[derive(Debug)]
pub struct Settings {
    pub server: String,
    pub document: String,
    pub timeout: Duration,
    pub endpoints: Endpoints,
    pub schemas: SchemaAssociations,
    /// `None` when the language server is disabled.
    pub lsp: Option<LspSettings>,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Settings {
    /// Read the config file (if any) and merge it with `cli`.
    ///
    /// An explicit `--config` must exist; the default location is optional.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_config_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => read_config_file(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::resolve(cli, file)
    }

    /// Merge `cli` over `file` over the defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let document = non_empty(cli.document.clone())
            .or(file.document)
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string());
        let server = non_empty(cli.server.clone())
            .or(file.server)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let endpoints = file.endpoints;

        // The schema endpoint applies to the edited document unless schemas are listed.
        let schemas = file.schemas.unwrap_or_else(|| {
            vec![SchemaSettings::new(
                endpoints.schema.clone(),
                vec![document.clone()],
            )]
        });

        let lsp_enabled = !cli.no_lsp && file.lsp.enabled.unwrap_or(true);
        let lsp = lsp_enabled.then(|| LspSettings {
            command: non_empty(cli.lsp_cmd.clone())
                .or(file.lsp.command)
                .unwrap_or_else(|| DEFAULT_SERVER_COMMAND.to_string()),
            args: cli
                .lsp_args
                .as_deref()
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .or(file.lsp.args)
                .unwrap_or_else(|| vec!["--stdio".to_string()]),
        });

        Ok(Self {
            server,
            document,
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            endpoints,
            schemas: SchemaAssociations::new(schemas)?,
            lsp,
            log_level: non_empty(cli.log_level.clone())
                .or(file.log.level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: cli
                .log_file
                .clone()
                .or(file.log.file)
                .unwrap_or_else(default_log_path),
        })
    }

    /// URI of the edited document, as used for markers and the language server.
    pub fn document_uri(&self) -> String {
        format!("file:///{}", self.document.trim_start_matches('/'))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `<config dir>/cfgpad/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cfgpad").join("config.toml"))
}

/// `<cache dir>/cfgpad/cfgpad.log`, falling back to the temp directory.
pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("cfgpad")
        .join("cfgpad.log")
}

pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}

pub fn parse_config(text: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cfgpad").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap();

        assert_eq!(settings.server, DEFAULT_SERVER_URL);
        assert_eq!(settings.document, "config.yaml");
        assert_eq!(settings.document_uri(), "file:///config.yaml");
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.endpoints, Endpoints::default());
        assert_eq!(settings.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(
            settings.lsp,
            Some(LspSettings {
                command: "yaml-language-server".to_string(),
                args: vec!["--stdio".to_string()],
            })
        );
        assert_eq!(
            settings
                .schemas
                .schema_for("config.yaml")
                .map(|s| s.uri.as_str()),
            Some("/api/v1/cfg/schema")
        );
    }

    #[test]
    fn test_file_values_and_schema_alias() {
        let file = parse_config(
            r#"
server = "http://cfg.internal:9000"
document = "app.yaml"
timeout_secs = 3

[endpoints]
get = "/v2/get"

[[schemas]]
uri = "https://schemas.example/app.json"
fileMatch = ["*.yaml"]

[lsp]
command = "/opt/yls/bin/yaml-language-server"

[log]
level = "debug"
"#,
            Path::new("config.toml"),
        )
        .unwrap();

        assert_eq!(file.endpoints.get, "/v2/get");
        assert_eq!(file.endpoints.save, "/api/v1/cfg/save");

        let settings = Settings::resolve(&Cli::default(), file).unwrap();
        assert_eq!(settings.server, "http://cfg.internal:9000");
        assert_eq!(settings.document_uri(), "file:///app.yaml");
        assert_eq!(settings.timeout, Duration::from_secs(3));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(
            settings.schemas.schema_for("app.yaml").map(|s| s.uri.as_str()),
            Some("https://schemas.example/app.json")
        );
        let lsp = settings.lsp.unwrap();
        assert_eq!(lsp.command, "/opt/yls/bin/yaml-language-server");
        assert_eq!(lsp.args, vec!["--stdio".to_string()]);
    }

    #[test]
    fn test_command_line_overrides_file() {
        let file = FileConfig {
            server: Some("http://from-file".to_string()),
            lsp: LspFileConfig {
                command: Some("from-file".to_string()),
                ..LspFileConfig::default()
            },
            ..FileConfig::default()
        };
        let cli = cli(&[
            "--server",
            "http://from-cli:1",
            "--lsp-cmd",
            "yls",
            "--lsp-args",
            "--stdio --log-level debug",
        ]);

        let settings = Settings::resolve(&cli, file).unwrap();
        assert_eq!(settings.server, "http://from-cli:1");
        let lsp = settings.lsp.unwrap();
        assert_eq!(lsp.command, "yls");
        assert_eq!(lsp.args, vec!["--stdio", "--log-level", "debug"]);
    }

    #[test]
    fn test_language_server_can_be_disabled() {
        let settings = Settings::resolve(&cli(&["--no-lsp"]), FileConfig::default()).unwrap();
        assert_eq!(settings.lsp, None);

        let file = FileConfig {
            lsp: LspFileConfig {
                enabled: Some(false),
                ..LspFileConfig::default()
            },
            ..FileConfig::default()
        };
        assert_eq!(Settings::resolve(&Cli::default(), file).unwrap().lsp, None);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = parse_config("sever = \"typo\"\n", Path::new("cfg.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("cfg.toml"));
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/cfgpad/config.toml")),
            ..Cli::default()
        };
        assert!(matches!(
            Settings::load(&cli),
            Err(ConfigError::Read { .. })
        ));
    }
}
