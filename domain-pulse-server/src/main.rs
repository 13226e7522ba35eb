//! Domain Pulse HTTP server
//!
//! Serves `POST /api/check-domains` for batch availability checks and
//! `GET /health` for liveness probes.

mod routes;

use clap::Parser;
use domain_pulse_lib::{
    load_env_config, ConfigManager, DomainChecker, EnvConfig, FileConfig, ProbeConfig,
    DEFAULT_BIND, DEFAULT_MAX_DOMAINS,
};
use routes::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI arguments for domain-pulse-server
#[derive(Parser, Debug)]
#[command(name = "domain-pulse-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HTTP endpoint for batch domain availability checks")]
struct Args {
    /// Listen address (default 127.0.0.1:3000)
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE")]
    config: Option<String>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Effective server settings.
#[derive(Debug, Clone, PartialEq)]
struct ServerSettings {
    bind: SocketAddr,
    max_domains: usize,
    probe: ProbeConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "domain_pulse_server=debug,domain_pulse_lib=debug,info"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("domain-pulse-server v{} starting", env!("CARGO_PKG_VERSION"));

    let env_config = load_env_config(args.verbose);
    let file_config = load_file_config(&args, &env_config)?;
    let settings = resolve_settings(&args, &env_config, file_config)?;

    tracing::info!(
        bind = %settings.bind,
        max_domains = settings.max_domains,
        whois_timeout = ?settings.probe.whois_timeout,
        http_timeout = ?settings.probe.http_timeout,
        dns_timeout = ?settings.probe.dns_timeout,
        "Configuration loaded"
    );

    let state = AppState {
        checker: Arc::new(DomainChecker::with_config(settings.probe)?),
        max_domains: settings.max_domains,
    };

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    match args.config.as_deref().or(env_config.config.as_deref()) {
        Some(path) => config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e).into()),
        None => Ok(config_manager.discover_and_load()?),
    }
}

/// Merge file, environment and CLI settings. Later sources win.
fn resolve_settings(
    args: &Args,
    env_config: &EnvConfig,
    file_config: FileConfig,
) -> Result<ServerSettings, Box<dyn std::error::Error>> {
    let probe = env_config.apply_to(file_config.apply_to(ProbeConfig::default()));
    let server = file_config.server.unwrap_or_default();

    let file_bind = server
        .bind
        .as_deref()
        .map(str::parse::<SocketAddr>)
        .transpose()?;
    let bind = match args.bind.or(env_config.bind).or(file_bind) {
        Some(bind) => bind,
        None => DEFAULT_BIND.parse()?,
    };

    let max_domains = env_config
        .max_domains
        .or(server.max_domains)
        .unwrap_or(DEFAULT_MAX_DOMAINS);

    Ok(ServerSettings {
        bind,
        max_domains,
        probe,
    })
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_pulse_lib::{OutputConfig, ProbesConfig, ServerConfig};
    use std::time::Duration;

    fn args() -> Args {
        Args {
            bind: None,
            config: None,
            verbose: false,
        }
    }

    #[test]
    fn test_defaults() {
        let settings = resolve_settings(&args(), &EnvConfig::default(), FileConfig::default())
            .unwrap();

        assert_eq!(settings.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(settings.max_domains, 500);
        assert_eq!(settings.probe, ProbeConfig::default());
    }

    #[test]
    fn test_precedence_cli_env_file() {
        let file_config = FileConfig {
            probes: Some(ProbesConfig {
                whois_timeout: Some("1s".to_string()),
                http_timeout: Some("1s".to_string()),
                dns_timeout: None,
            }),
            server: Some(ServerConfig {
                bind: Some("0.0.0.0:7000".to_string()),
                max_domains: Some(50),
            }),
            output: Some(OutputConfig::default()),
        };
        let env_config = EnvConfig {
            bind: Some("0.0.0.0:8000".parse().unwrap()),
            http_timeout: Some(Duration::from_secs(4)),
            ..Default::default()
        };
        let cli = Args {
            bind: Some("127.0.0.1:9000".parse().unwrap()),
            ..args()
        };

        let settings = resolve_settings(&cli, &env_config, file_config.clone()).unwrap();
        assert_eq!(settings.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(settings.max_domains, 50);
        assert_eq!(settings.probe.whois_timeout, Duration::from_secs(1));
        assert_eq!(settings.probe.http_timeout, Duration::from_secs(4));

        let settings = resolve_settings(&args(), &env_config, file_config.clone()).unwrap();
        assert_eq!(settings.bind, "0.0.0.0:8000".parse().unwrap());

        let settings = resolve_settings(&args(), &EnvConfig::default(), file_config).unwrap();
        assert_eq!(settings.bind, "0.0.0.0:7000".parse().unwrap());
    }

    #[test]
    fn test_parse_args() {
        let parsed = Args::try_parse_from(["domain-pulse-server", "--bind", "0.0.0.0:3100"]).unwrap();
        assert_eq!(parsed.bind, Some("0.0.0.0:3100".parse().unwrap()));
        assert!(Args::try_parse_from(["domain-pulse-server", "--bind", "nowhere"]).is_err());
    }
}
