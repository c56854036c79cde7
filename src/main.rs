//! Mango CLI
//!
//! Interactive terminal UI plus a one-shot search command.

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};
use mango::card::{CardContent, CardViewState};
use mango::logging::{self, LogTarget};
use mango::{AppConfig, EndpointKind, HttpTrialSource, MangoError, SearchController, Trial};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Mango - find clinical trials for your condition
///
/// Describe a condition in plain words and browse recruiting trials.
#[derive(Parser)]
#[command(name = "mango")]
#[command(author = "Mango Contributors")]
#[command(version)]
#[command(about = "Find clinical trials for your condition", long_about = None)]
struct Cli {
    /// JSON config file (default: mango.json next to the executable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Trial service to query
    #[arg(long, global = true, value_enum)]
    endpoint: Option<EndpointKind>,

    /// Endpoint URL override
    #[arg(long, global = true)]
    url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive terminal UI
    Tui,

    /// Search once and print the matching trials
    Search {
        /// Condition description (use -- before text starting with -)
        #[arg(required = true, allow_hyphen_values = true)]
        query: Vec<String>,

        /// Print the raw trial records as JSON
        #[arg(long)]
        json: bool,

        /// Include summaries and contacts
        #[arg(short, long)]
        expand: bool,

        /// Seconds to wait for the service
        #[arg(long, default_value = "60")]
        timeout: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| match cli.command {
        Commands::Tui => {
            logging::init(LogTarget::File(logging::default_log_path()), &config.log_level)?;
            mango::tui::run(&config)
        }
        Commands::Search {
            query,
            json,
            expand,
            timeout,
        } => {
            let level = if cli.verbose { "debug" } else { "warn" };
            logging::init(LogTarget::Stderr, level)?;
            cmd_search(&config, &query.join(" "), json, expand, timeout)
        }
    });

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// File and environment, then command-line flags
fn load_config(cli: &Cli) -> mango::Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(url) = &cli.url {
        config.url = Some(url.clone());
    }
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    Ok(config)
}

/// Search command implementation
fn cmd_search(
    config: &AppConfig,
    query: &str,
    json: bool,
    expand: bool,
    timeout: u64,
) -> mango::Result<()> {
    let source = HttpTrialSource::new(config)?;
    let mut controller = SearchController::new(Arc::new(source));
    controller.set_query(query);

    let start = Instant::now();
    if controller.submit_search().is_none() {
        return Err(MangoError::EmptyQuery);
    }

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Finding the best treatment for {}",
        style(query.trim()).yellow()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let settled = controller.wait_idle(Duration::from_secs(timeout));
    spinner.finish_and_clear();
    if !settled {
        controller.cancel();
        return Err(MangoError::Timeout(timeout));
    }

    let state = controller.state();
    if let Some(err) = &state.last_error {
        return Err(err.clone().into());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state.results)?);
        return Ok(());
    }

    println!(
        "{} {} trials in {}",
        style("✓").green().bold(),
        style(state.results.len()).green(),
        style(HumanDuration(start.elapsed())).cyan()
    );
    let view = CardViewState {
        expanded: expand,
        ..Default::default()
    };
    for (i, trial) in state.results.iter().enumerate() {
        println!();
        print_card(i + 1, trial, view);
    }

    Ok(())
}

fn print_card(rank: usize, trial: &Trial, view: CardViewState) {
    let content = CardContent::build(trial, view);
    let indent = "   ";

    let enrollment = content
        .enrollment
        .map(|n| format!("  {} participants", n))
        .unwrap_or_default();
    println!(
        "{:>2}. {}{}",
        rank,
        style(&content.title).bold(),
        style(enrollment).yellow()
    );
    if let Some(official) = &content.official_title {
        println!("{}{}", indent, style(official).dim());
    }
    if let Some(label) = &content.recruiting {
        println!("{}{} {}", indent, style("●").green(), label);
    }
    if let Some(sponsor) = &content.sponsor {
        println!("{}{} {}", indent, style("Sponsor").bold(), sponsor);
    }
    for location in &content.locations {
        let place = match (&location.place, &location.facility) {
            (Some(place), Some(facility)) => format!("{} ({})", place, facility),
            (Some(place), None) => place.clone(),
            (None, Some(facility)) => facility.clone(),
            (None, None) => continue,
        };
        println!("{}{} {}", indent, style("Site").bold(), place);
    }
    if let Some(start) = &content.start_date {
        println!("{}{} {}", indent, style("Starts").bold(), start);
    }
    if !content.conditions.is_empty() {
        let tags: Vec<String> = content
            .conditions
            .iter()
            .map(|c| format!("[{}]", c))
            .collect();
        println!("{}{}", indent, style(tags.join(" ")).cyan());
    }
    if let Some(url) = trial.page_url() {
        println!("{}{}", indent, style(url).underlined());
    }

    if let Some(details) = &content.details {
        if let Some(summary) = &details.summary {
            println!();
            println!("{}{}", indent, style("Summary").bold());
            for line in mango::tui::card::wrap(summary, 76) {
                println!("{}{}", indent, line);
            }
        }
        if !details.contacts.is_empty() {
            println!();
            println!("{}{}", indent, style("Contact").bold());
            for contact in &details.contacts {
                let parts: Vec<&str> = [&contact.name, &contact.phone, &contact.email]
                    .into_iter()
                    .flatten()
                    .map(String::as_str)
                    .collect();
                println!("{}{}", indent, parts.join(" · "));
            }
        }
    }
}
