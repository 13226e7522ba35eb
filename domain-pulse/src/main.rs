//! Domain Pulse CLI Application
//!
//! A command-line interface that guesses domain availability from DNS,
//! WHOIS-reachability and HTTPS signals. This CLI application provides a
//! user-friendly interface to the domain-pulse-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use domain_pulse_lib::{
    load_env_config, parse_timeout_string, prepare_batch, BatchSummary, ConfigManager,
    DomainChecker, DomainResult, EnvConfig, FileConfig, ProbeConfig,
};
use std::process;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for domain-pulse
#[derive(Parser, Debug)]
#[command(name = "domain-pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Sai Dutt G.V <gvs46@protonmail.com>")]
#[command(about = "Guess domain availability from DNS, WHOIS and HTTPS signals")]
#[command(
    long_about = "Guess domain availability from three network signals: DNS resolution, WHOIS endpoint reachability and an HTTPS request.\n\nA domain is reported available when at least two of the three signals agree. URLs and www. prefixes are normalized before checking."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domains or URLs to check
    #[arg(value_name = "DOMAINS", help_heading = "Domain Selection")]
    pub domains: Vec<String>,

    /// Input file with domains (one per line, # comments allowed)
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        help_heading = "Domain Selection"
    )]
    pub file: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Group results by status with section headers
    #[arg(short = 'p', long = "pretty", help_heading = "Output Format")]
    pub pretty: bool,

    /// WHOIS reachability timeout (e.g. 2000ms, 2s)
    #[arg(long = "whois-timeout", value_name = "DURATION", help_heading = "Probes")]
    pub whois_timeout: Option<String>,

    /// HTTPS request timeout (e.g. 3000ms, 3s)
    #[arg(long = "http-timeout", value_name = "DURATION", help_heading = "Probes")]
    pub http_timeout: Option<String>,

    /// Per-query DNS timeout (resolver default when unset)
    #[arg(long = "dns-timeout", value_name = "DURATION", help_heading = "Probes")]
    pub dns_timeout: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show per-probe signals and debug logs
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Effective settings after merging config files, environment and CLI.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    probe: ProbeConfig,
    json: bool,
    pretty: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);
    tracing::info!("domain-pulse v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_domain_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(args: &Args) {
    let default_filter = if args.debug {
        "domain_pulse=debug,domain_pulse_lib=debug,warn"
    } else if args.verbose {
        "domain_pulse=info,domain_pulse_lib=info,warn"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn validate_args(args: &Args) -> Result<(), String> {
    // Must have either domains or file
    if args.domains.is_empty() && args.file.is_none() {
        return Err("You must specify domain names or a file with --file".to_string());
    }

    if args.json && args.pretty {
        return Err("Cannot use --pretty with --json".to_string());
    }

    for (flag, value) in [
        ("--whois-timeout", &args.whois_timeout),
        ("--http-timeout", &args.http_timeout),
        ("--dns-timeout", &args.dns_timeout),
    ] {
        if let Some(raw) = value {
            if parse_timeout_string(raw).is_none() {
                return Err(format!(
                    "Invalid {} '{}'. Use format like '2000ms', '2s', '1m'",
                    flag, raw
                ));
            }
        }
    }

    Ok(())
}

async fn run_domain_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let env_config = load_env_config(args.verbose || args.debug);
    let settings = build_settings(&args, &env_config)?;
    tracing::debug!(?settings, "Effective settings");

    let hostnames = prepare_batch(&collect_inputs(&args)?);
    if hostnames.is_empty() {
        return Err("No domains to check after removing blank entries".into());
    }

    let checker = DomainChecker::with_config(settings.probe.clone())?;

    if settings.pretty && !settings.json && hostnames.len() > 1 {
        ui::print_header(hostnames.len());
    }

    // Spinner::start returns None if stderr isn't a TTY.
    let spinner = if settings.json {
        None
    } else {
        ui::Spinner::start(format!(
            "Checking {} domain{}...",
            hostnames.len(),
            if hostnames.len() == 1 { "" } else { "s" }
        ))
    };

    let start_time = Instant::now();
    let results = checker.check_domains(&hostnames).await;
    let duration = start_time.elapsed();

    if let Some(s) = spinner {
        s.stop().await;
    }

    let summary = BatchSummary::from_results(&results);
    tracing::info!(
        total = summary.total,
        available = summary.available,
        taken = summary.taken,
        errors = summary.errors,
        elapsed = ?duration,
        "Batch finished"
    );

    display_results(&results, &settings, args.debug, duration)
}

/// Build effective settings from config files, environment and CLI.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (DP_*)
/// 3. Explicit config file (--config or DP_CONFIG), or discovered config files
/// 4. Built-in defaults
fn build_settings(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let file_config = load_file_config(args, env_config)?;

    // Step 1: config file over defaults
    let mut probe = file_config.apply_to(ProbeConfig::default());
    let output = file_config.output.unwrap_or_default();
    let mut json = output.json.unwrap_or(false);
    let mut pretty = output.pretty.unwrap_or(false);

    // Step 2: environment variables (DP_*)
    probe = env_config.apply_to(probe);
    json = env_config.json.unwrap_or(json);
    pretty = env_config.pretty.unwrap_or(pretty);

    // Step 3: CLI arguments (highest precedence)
    probe = apply_cli_timeouts(probe, args)?;
    if args.json {
        json = true;
    }
    if args.pretty {
        pretty = true;
    }

    Ok(Settings {
        probe,
        json,
        pretty,
    })
}

fn load_file_config(
    args: &Args,
    env_config: &EnvConfig,
) -> Result<FileConfig, Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);

    let explicit = args
        .config
        .as_deref()
        .map(|path| (path, "CLI --config"))
        .or_else(|| env_config.config.as_deref().map(|path| (path, "DP_CONFIG")));

    if let Some((path, source)) = explicit {
        tracing::info!(path, source, "Using explicit config file");
        return config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e).into());
    }

    match config_manager.discover_and_load() {
        Ok(file_config) => Ok(file_config),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring discovered config files");
            Ok(FileConfig::default())
        }
    }
}

/// Apply timeout flags to the probe config. Flags were validated up front.
fn apply_cli_timeouts(
    mut probe: ProbeConfig,
    args: &Args,
) -> Result<ProbeConfig, Box<dyn std::error::Error>> {
    if let Some(raw) = &args.whois_timeout {
        probe.whois_timeout = cli_timeout("--whois-timeout", raw)?;
    }
    if let Some(raw) = &args.http_timeout {
        probe.http_timeout = cli_timeout("--http-timeout", raw)?;
    }
    if let Some(raw) = &args.dns_timeout {
        probe.dns_timeout = Some(cli_timeout("--dns-timeout", raw)?);
    }
    Ok(probe)
}

fn cli_timeout(flag: &str, raw: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    parse_timeout_string(raw).ok_or_else(|| format!("Invalid {} '{}'", flag, raw).into())
}

/// Gather raw inputs from positional arguments and the input file, in that order.
fn collect_inputs(args: &Args) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut inputs = args.domains.clone();
    if let Some(file) = &args.file {
        inputs.extend(read_domains_from_file(file)?);
    }
    Ok(inputs)
}

fn read_domains_from_file(file_path: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};
    use std::path::Path;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {}", file_path).into());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut domains = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Line {}: Error reading line - {}", index + 1, e))?;

        // Skip comments, including inline ones
        let domain_part = line.split('#').next().unwrap_or("").trim();
        if !domain_part.is_empty() {
            domains.push(domain_part.to_string());
        }
    }

    if domains.is_empty() {
        return Err("No valid domains found in the file.".into());
    }

    Ok(domains)
}

fn display_results(
    results: &[DomainResult],
    settings: &Settings,
    debug: bool,
    duration: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.json {
        display_json_results(results)
    } else {
        display_text_results(results, settings.pretty, debug, duration);
        Ok(())
    }
}

/// Display results in JSON format
fn display_json_results(results: &[DomainResult]) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(results)?;
    println!("{}", json);
    Ok(())
}

/// Display results in human-readable text format
fn display_text_results(results: &[DomainResult], pretty: bool, debug: bool, duration: Duration) {
    if pretty {
        ui::print_grouped_results(results, debug);
    } else {
        for result in results {
            ui::print_result(result, debug);
        }
    }

    if results.len() > 1 {
        println!();
        ui::print_summary(&BatchSummary::from_results(results), duration);
    }
}
