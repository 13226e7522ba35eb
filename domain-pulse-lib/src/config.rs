//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading `DP_*`
//! environment variables and merging both into a [`ProbeConfig`] with proper
//! precedence rules.

use crate::error::DomainCheckError;
use crate::types::ProbeConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default server listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default maximum number of domains accepted per request.
pub const DEFAULT_MAX_DOMAINS: usize = 500;

/// Upper bound for the configurable batch size.
pub const MAX_DOMAINS_LIMIT: usize = 10_000;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Probe timeouts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probes: Option<ProbesConfig>,

    /// HTTP server settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Probe timeouts, as strings like "2000ms", "2s" or "1m".
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProbesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<String>,

    /// Per-query DNS timeout; the resolver default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_timeout: Option<String>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:3000"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Largest batch a single request may carry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_domains: Option<usize>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Group text output by status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Emit JSON instead of text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl FileConfig {
    /// Apply the `[probes]` section on top of `config`.
    ///
    /// Only settings present in the file are changed.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(probes) = &self.probes {
            if let Some(timeout) = probes.whois_timeout.as_deref().and_then(parse_timeout_string)
            {
                config.whois_timeout = timeout;
            }
            if let Some(timeout) = probes.http_timeout.as_deref().and_then(parse_timeout_string) {
                config.http_timeout = timeout;
            }
            if let Some(timeout) = probes.dns_timeout.as_deref().and_then(parse_timeout_string) {
                config.dns_timeout = Some(timeout);
            }
        }
        config
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if reading, parsing or
    /// validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Looks in the XDG config directory, then the home directory, then the
    /// current directory; later files override earlier ones.
    ///
    /// # Returns
    ///
    /// Merged configuration from all discovered files. An invalid discovered
    /// file is an error, a missing one is not.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            merged_config = self.merge_configs(merged_config, config);
            loaded_files.push(path);
        }

        if self.verbose && loaded_files.len() > 1 {
            for (i, path) in loaded_files.iter().enumerate() {
                let precedence = if i == loaded_files.len() - 1 {
                    "highest"
                } else {
                    "overridden where set later"
                };
                tracing::info!(path = %path.display(), precedence, "Using configuration file");
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./domain-pulse.toml", "./.domain-pulse.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".domain-pulse.toml", "domain-pulse.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-pulse").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations field by field.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            probes: match (lower.probes, higher.probes) {
                (Some(lower_probes), Some(higher_probes)) => Some(ProbesConfig {
                    whois_timeout: higher_probes.whois_timeout.or(lower_probes.whois_timeout),
                    http_timeout: higher_probes.http_timeout.or(lower_probes.http_timeout),
                    dns_timeout: higher_probes.dns_timeout.or(lower_probes.dns_timeout),
                }),
                (lower_probes, higher_probes) => higher_probes.or(lower_probes),
            },
            server: match (lower.server, higher.server) {
                (Some(lower_server), Some(higher_server)) => Some(ServerConfig {
                    bind: higher_server.bind.or(lower_server.bind),
                    max_domains: higher_server.max_domains.or(lower_server.max_domains),
                }),
                (lower_server, higher_server) => higher_server.or(lower_server),
            },
            output: match (lower.output, higher.output) {
                (Some(lower_output), Some(higher_output)) => Some(OutputConfig {
                    pretty: higher_output.pretty.or(lower_output.pretty),
                    json: higher_output.json.or(lower_output.json),
                }),
                (lower_output, higher_output) => higher_output.or(lower_output),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainCheckError> {
        if let Some(probes) = &config.probes {
            for (name, value) in [
                ("whois_timeout", &probes.whois_timeout),
                ("http_timeout", &probes.http_timeout),
                ("dns_timeout", &probes.dns_timeout),
            ] {
                if let Some(timeout_str) = value {
                    if parse_timeout_string(timeout_str).is_none() {
                        return Err(DomainCheckError::config(format!(
                            "Invalid {} '{}'. Use format like '2000ms', '2s', '1m'",
                            name, timeout_str
                        )));
                    }
                }
            }
        }

        if let Some(server) = &config.server {
            if let Some(max_domains) = server.max_domains {
                if !(1..=MAX_DOMAINS_LIMIT).contains(&max_domains) {
                    return Err(DomainCheckError::config(format!(
                        "max_domains must be between 1 and {}",
                        MAX_DOMAINS_LIMIT
                    )));
                }
            }

            if let Some(bind) = &server.bind {
                if bind.parse::<SocketAddr>().is_err() {
                    return Err(DomainCheckError::config(format!(
                        "Invalid bind address '{}'. Use format like '127.0.0.1:3000'",
                        bind
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration.
///
/// Values that can be set via `DP_*` environment variables. Anything
/// invalid has already been dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub whois_timeout: Option<Duration>,
    pub http_timeout: Option<Duration>,
    pub dns_timeout: Option<Duration>,
    pub bind: Option<SocketAddr>,
    pub max_domains: Option<usize>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply the probe timeouts on top of `config`.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(timeout) = self.whois_timeout {
            config.whois_timeout = timeout;
        }
        if let Some(timeout) = self.http_timeout {
            config.http_timeout = timeout;
        }
        if let Some(timeout) = self.dns_timeout {
            config.dns_timeout = Some(timeout);
        }
        config
    }
}

/// Load configuration from environment variables.
///
/// Parses all `DP_*` environment variables. Invalid values are ignored and
/// reported as warnings when `verbose` is set.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    env_config_from(|key| env::var(key).ok(), verbose)
}

fn env_config_from<F>(lookup: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    let timeout = |key: &str| -> Option<Duration> {
        let raw = lookup(key)?;
        let parsed = parse_timeout_string(&raw);
        if parsed.is_none() {
            report_invalid(
                verbose,
                format!("Invalid {}='{}', use format like '2000ms', '2s', '1m'", key, raw),
            );
        }
        parsed
    };

    env_config.whois_timeout = timeout("DP_WHOIS_TIMEOUT");
    env_config.http_timeout = timeout("DP_HTTP_TIMEOUT");
    env_config.dns_timeout = timeout("DP_DNS_TIMEOUT");

    if let Some(raw) = lookup("DP_BIND") {
        match raw.trim().parse::<SocketAddr>() {
            Ok(addr) => env_config.bind = Some(addr),
            Err(_) => report_invalid(
                verbose,
                format!("Invalid DP_BIND='{}', use format like '127.0.0.1:3000'", raw),
            ),
        }
    }

    if let Some(raw) = lookup("DP_MAX_DOMAINS") {
        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_DOMAINS_LIMIT).contains(&n) => env_config.max_domains = Some(n),
            _ => report_invalid(
                verbose,
                format!("Invalid DP_MAX_DOMAINS='{}', must be 1-{}", raw, MAX_DOMAINS_LIMIT),
            ),
        }
    }

    let flag = |key: &str| -> Option<bool> {
        let raw = lookup(key)?;
        let parsed = parse_bool_flag(&raw);
        if parsed.is_none() {
            report_invalid(verbose, format!("Invalid {}='{}', use true/false", key, raw));
        }
        parsed
    };

    env_config.json = flag("DP_JSON");
    env_config.pretty = flag("DP_PRETTY");

    env_config.config = lookup("DP_CONFIG").filter(|path| !path.trim().is_empty());

    if env_config != EnvConfig::default() {
        tracing::debug!(?env_config, "Loaded DP_* environment overrides");
    }

    env_config
}

fn report_invalid(verbose: bool, message: String) {
    if verbose {
        tracing::warn!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "2000ms", "5s", "2m" into a duration.
///
/// A bare number is read as seconds. Zero is rejected.
///
/// # Arguments
///
/// * `timeout_str` - String representation of timeout
///
/// # Returns
///
/// The duration, or None if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        Duration::from_millis(ms.trim().parse::<u64>().ok()?)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        Duration::from_secs(secs.trim().parse::<u64>().ok()?)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        Duration::from_secs(mins.trim().parse::<u64>().ok()?.checked_mul(60)?)
    } else {
        Duration::from_secs(timeout_str.parse::<u64>().ok()?)
    };

    (!duration.is_zero()).then_some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("2000ms"), Some(Duration::from_millis(2000)));
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string(" 3S "), Some(Duration::from_secs(3)));
        assert_eq!(parse_timeout_string("0s"), None);
        assert_eq!(parse_timeout_string("0ms"), None);
        assert_eq!(parse_timeout_string("invalid"), None);
        assert_eq!(parse_timeout_string(""), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[probes]
whois_timeout = "1500ms"
http_timeout = "4s"

[server]
bind = "0.0.0.0:8080"
max_domains = 100

[output]
pretty = true
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let probes = config.probes.unwrap();
        assert_eq!(probes.whois_timeout.as_deref(), Some("1500ms"));
        assert_eq!(probes.http_timeout.as_deref(), Some("4s"));
        assert_eq!(probes.dns_timeout, None);

        let server = config.server.unwrap();
        assert_eq!(server.bind.as_deref(), Some("0.0.0.0:8080"));
        assert_eq!(server.max_domains, Some(100));

        assert_eq!(config.output.unwrap().pretty, Some(true));
    }

    #[test]
    fn test_missing_file() {
        let manager = ConfigManager::new(false);
        let result = manager.load_file("/definitely/not/here/domain-pulse.toml");
        assert!(matches!(result, Err(DomainCheckError::FileError { .. })));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let manager = ConfigManager::new(false);

        for content in [
            "[probes]\nwhois_timeout = \"soon\"\n",
            "[probes]\nhttp_timeout = \"0s\"\n",
            "[server]\nmax_domains = 0\n",
            "[server]\nmax_domains = 10001\n",
            "[server]\nbind = \"localhost\"\n",
            "[probes\n",
        ] {
            let temp_file = write_config(content);
            let result = manager.load_file(temp_file.path());
            assert!(
                matches!(result, Err(DomainCheckError::ConfigError { .. })),
                "accepted: {}",
                content
            );
        }
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            probes: Some(ProbesConfig {
                whois_timeout: Some("1s".to_string()),
                http_timeout: Some("2s".to_string()),
                dns_timeout: None,
            }),
            server: Some(ServerConfig {
                bind: Some("127.0.0.1:4000".to_string()),
                max_domains: Some(50),
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            probes: Some(ProbesConfig {
                http_timeout: Some("9s".to_string()),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                json: Some(true),
                pretty: None,
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let probes = merged.probes.unwrap();

        assert_eq!(probes.whois_timeout.as_deref(), Some("1s")); // Lower preserved
        assert_eq!(probes.http_timeout.as_deref(), Some("9s")); // Higher wins
        assert_eq!(merged.server.unwrap().max_domains, Some(50));
        assert_eq!(merged.output.unwrap().json, Some(true));
    }

    #[test]
    fn test_file_config_applies_to_probe_config() {
        let file = FileConfig {
            probes: Some(ProbesConfig {
                whois_timeout: Some("500ms".to_string()),
                http_timeout: None,
                dns_timeout: Some("1s".to_string()),
            }),
            ..Default::default()
        };

        let config = file.apply_to(ProbeConfig::default());
        assert_eq!(config.whois_timeout, Duration::from_millis(500));
        assert_eq!(config.http_timeout, ProbeConfig::default().http_timeout);
        assert_eq!(config.dns_timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_env_config_parsing() {
        let vars: HashMap<&str, &str> = [
            ("DP_WHOIS_TIMEOUT", "750ms"),
            ("DP_HTTP_TIMEOUT", "never"),
            ("DP_BIND", "0.0.0.0:9000"),
            ("DP_MAX_DOMAINS", "20000"),
            ("DP_JSON", "yes"),
            ("DP_PRETTY", "maybe"),
            ("DP_CONFIG", "  "),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()), false);

        assert_eq!(env_config.whois_timeout, Some(Duration::from_millis(750)));
        assert_eq!(env_config.http_timeout, None);
        assert_eq!(env_config.dns_timeout, None);
        assert_eq!(env_config.bind, Some("0.0.0.0:9000".parse().unwrap()));
        assert_eq!(env_config.max_domains, None);
        assert_eq!(env_config.json, Some(true));
        assert_eq!(env_config.pretty, None);
        assert_eq!(env_config.config, None);
    }

    /// Log sink for asserting on emitted warnings.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn warnings_for_bad_env(verbose: bool) -> String {
        let sink = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            env_config_from(
                |key| (key == "DP_HTTP_TIMEOUT").then(|| "never".to_string()),
                verbose,
            );
        });

        let bytes = sink.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_invalid_env_values_warn_only_when_verbose() {
        assert!(warnings_for_bad_env(false).is_empty());

        let verbose = warnings_for_bad_env(true);
        assert!(verbose.contains("WARN"));
        assert!(verbose.contains("DP_HTTP_TIMEOUT='never'"));
    }

    #[test]
    fn test_env_config_overrides_file_config() {
        let file = FileConfig {
            probes: Some(ProbesConfig {
                whois_timeout: Some("5s".to_string()),
                http_timeout: Some("5s".to_string()),
                dns_timeout: None,
            }),
            ..Default::default()
        };
        let env_config = EnvConfig {
            http_timeout: Some(Duration::from_secs(1)),
            ..Default::default()
        };

        let config = env_config.apply_to(file.apply_to(ProbeConfig::default()));
        assert_eq!(config.whois_timeout, Duration::from_secs(5));
        assert_eq!(config.http_timeout, Duration::from_secs(1));
    }
}
