//! # Domain Pulse Library
//!
//! Heuristic domain availability checking from three independent network
//! signals: DNS resolution, reachability of a WHOIS endpoint and an HTTPS
//! GET against the domain itself.
//!
//! Each signal casts one vote for "available"; a domain is reported as
//! available when at least two of the three agree. The result is a cheap
//! guess, not a registry lookup.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_pulse_lib::DomainChecker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::new()?;
//!     let results = checker.check_raw(&["https://www.example.com/about"]).await;
//!
//!     for result in &results {
//!         println!("{} - available: {}", result.domain(), result.is_available());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Input normalization**: URLs and `www.` prefixes collapse to a bare hostname
//! - **Concurrent probing**: every domain and every probe runs in its own task
//! - **Failure isolation**: a failing probe or domain never poisons the batch
//! - **Configurable**: probe timeouts from TOML files or `DP_*` variables

// Re-export main public API types and functions
// This makes them available as domain_pulse_lib::TypeName
pub use checker::DomainChecker;
pub use config::{
    load_env_config, parse_timeout_string, ConfigManager, EnvConfig, FileConfig, OutputConfig,
    ProbesConfig, ServerConfig, DEFAULT_BIND, DEFAULT_MAX_DOMAINS, MAX_DOMAINS_LIMIT,
};
pub use error::DomainCheckError;
pub use protocols::{DnsProbe, HttpProbe, Probe, WhoisProbe};
pub use types::{
    BatchSummary, DomainResult, ProbeConfig, ProbeKind, ProbeMethods, ProbeOutcome,
    CHECK_FAILED_MESSAGE, WHOIS_PORT, WHOIS_SERVER,
};
pub use utils::{normalize, prepare_batch};

// Public modules
pub mod protocols;

// Internal modules - these are not part of the public API
mod checker;
mod concurrent;
mod config;
mod error;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
