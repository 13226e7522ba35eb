//! Display logic for the domain-pulse CLI.
//!
//! This module handles text output: colored result lines, grouped
//! `--pretty` output, the spinner and the summary bar. JSON output lives in
//! `main.rs` since it is a single serde call.

use console::{pad_str, style, Alignment, Term};
use domain_pulse_lib::{BatchSummary, DomainResult, ProbeKind, ProbeMethods};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const DOMAIN_WIDTH: usize = 30;

// ── Spinner ──────────────────────────────────────────────────────────────────

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An async braille-dot spinner that writes to stderr so stdout stays clean.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a new spinner with the given message (e.g. "Checking 8 domains...").
    ///
    /// Returns None when stderr is not a terminal.
    pub fn start(message: String) -> Option<Self> {
        let term = Term::stderr();
        if !term.is_term() {
            return None;
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = tokio::spawn(async move {
            let mut idx = 0usize;
            while running_clone.load(Ordering::Relaxed) {
                let frame = SPINNER_FRAMES[idx % SPINNER_FRAMES.len()];
                let _ = term.clear_line();
                let _ = term.write_str(&format!("{} {}", style(frame).cyan(), message));
                idx += 1;
                tokio::time::sleep(Duration::from_millis(80)).await;
            }
            let _ = term.clear_line();
        });

        Some(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the spinner and clear the line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.await;
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────────────

/// Display bucket for a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Available,
    Taken,
    Error,
}

impl Status {
    pub fn of(result: &DomainResult) -> Self {
        if result.error().is_some() {
            Status::Error
        } else if result.is_available() {
            Status::Available
        } else {
            Status::Taken
        }
    }

    fn label(self) -> console::StyledObject<&'static str> {
        match self {
            Status::Available => style("AVAILABLE").green().bold(),
            Status::Taken => style("TAKEN").red().bold(),
            Status::Error => style("ERROR").yellow(),
        }
    }
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled header at the start of a pretty run.
pub fn print_header(domain_count: usize) {
    println!(
        "{} {} {}",
        style("domain-pulse").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Checking {} domain{}",
            domain_count,
            plural(domain_count)
        ))
        .dim(),
    );
    println!();
}

// ── Single result line ───────────────────────────────────────────────────────

/// Format and print a single domain result with colors and alignment.
pub fn print_result(result: &DomainResult, debug: bool) {
    let padded_domain = pad_str(result.domain(), DOMAIN_WIDTH, Alignment::Left, Some(".."));
    let status = Status::of(result);

    match result.error() {
        Some(reason) => println!(
            "  {}  {}  {}",
            style(&padded_domain).white(),
            status.label(),
            style(format!("({})", reason)).dim(),
        ),
        None => println!("  {}  {}", style(&padded_domain).white(), status.label()),
    }

    if debug {
        println!("    {} {}", style("└─").dim(), format_signals(&result.methods()));
    }
}

// ── Grouped batch output ─────────────────────────────────────────────────────

/// Print results grouped by status: Available, Taken, Error.
/// Empty sections are omitted entirely. Input order is kept within a section.
pub fn print_grouped_results(results: &[DomainResult], debug: bool) {
    let sections = [
        (Status::Available, "Available"),
        (Status::Taken, "Taken"),
        (Status::Error, "Error"),
    ];

    for (status, title) in sections {
        let members: Vec<&DomainResult> =
            results.iter().filter(|r| Status::of(r) == status).collect();
        if members.is_empty() {
            continue;
        }

        let heading = format!("── {} ({}) ", title, members.len());
        let rule = "─".repeat(52usize.saturating_sub(heading.chars().count()));
        match status {
            Status::Available => println!(
                "  {} {}",
                style(heading).green().bold(),
                style(rule).green().dim()
            ),
            Status::Taken => println!(
                "  {} {}",
                style(heading).red().bold(),
                style(rule).red().dim()
            ),
            Status::Error => println!(
                "  {} {}",
                style(heading).yellow().bold(),
                style(rule).yellow().dim()
            ),
        }

        for r in members {
            let padded = pad_str(r.domain(), DOMAIN_WIDTH, Alignment::Left, Some(".."));
            println!("    {}", style(&padded).white());
            if debug {
                println!("      {} {}", style("└─").dim(), format_signals(&r.methods()));
            }
        }
        println!();
    }
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the final summary bar with colored counts.
pub fn print_summary(summary: &BatchSummary, duration: Duration) {
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} domain{} in {:.1}s  {}  {}  {}  {}  {}  {}",
        style(summary.total).bold(),
        plural(summary.total),
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} available", summary.available)).green(),
        style("|").dim(),
        style(format!("{} taken", summary.taken)).red(),
        style("|").dim(),
        style(format!("{} errors", summary.errors)).yellow(),
    );
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Render the three votes, e.g. `dns=yes whois=no http=yes (2/3)`.
pub fn format_signals(methods: &ProbeMethods) -> String {
    let votes: Vec<String> = ProbeKind::ALL
        .iter()
        .map(|kind| {
            let vote = if methods.get(*kind) { "yes" } else { "no" };
            format!("{}={}", kind, vote)
        })
        .collect();

    format!("{} ({}/3)", votes.join(" "), methods.votes())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
