mod command;
mod library;
mod setup;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use command::Command;
use library::CacheLibrary;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;
use tierstack::HierarchyConfig;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "tierstack-cli")]
#[command(about = "Tierstack CLI - interactive multi-tier cache simulator", long_about = None)]
struct Args {
    /// YAML file describing the tiers (prompts interactively when omitted)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Override the worker pool width
    #[arg(short = 'w', long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = args
        .config
        .as_ref()
        .map(HierarchyConfig::from_file)
        .transpose()
        .context("Failed to load configuration")?;

    init_tracing(file_config.as_ref());

    let mut rl = DefaultEditor::new()?;
    let mut config = match file_config {
        Some(config) => config,
        None => setup::prompt_config(&mut rl)?,
    };
    if let Some(workers) = args.workers {
        config.workers = workers;
    }

    let library = CacheLibrary::new(&config)?;
    run_interactive(&library, &mut rl).await?;
    library.shutdown().await;

    Ok(())
}

/// Log to stdout; `RUST_LOG` wins over the configured level
fn init_tracing(config: Option<&HierarchyConfig>) {
    let logging = config.map(|c| c.logging.clone()).unwrap_or_default();
    let log_level = std::env::var("RUST_LOG").unwrap_or(logging.level);
    let filter = tracing_subscriber::EnvFilter::new(log_level);

    if logging.format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stdout)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stdout)
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

async fn run_interactive(library: &CacheLibrary, rl: &mut DefaultEditor) -> Result<()> {
    info!(
        "{}",
        format!("Tierstack CLI v{}", env!("CARGO_PKG_VERSION"))
            .bold()
            .cyan()
    );
    info!(
        "{} tier(s), {} worker(s) ready. Type {} for available commands\n",
        library.coordinator().tier_count(),
        library.coordinator().workers(),
        "HELP".bold()
    );

    loop {
        let readline = rl.readline(&format!("{} ", "Input:".green()));

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                rl.add_history_entry(&line)?;

                match Command::parse(&line) {
                    Ok(Command::Write { key, value }) => library.put(&key, &value),
                    Ok(Command::Read { key }) => {
                        library.get(&key).await;
                    }
                    Ok(Command::Stat) => library.display_stats(),
                    Ok(Command::Help) => info!("{}", help_text()),
                    Ok(Command::Exit) => {
                        info!("Goodbye!");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "{}", format!("Error: {}", e).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                info!("Goodbye!");
                break;
            }
            Err(err) => {
                error!(error = ?err, "Readline error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

fn help_text() -> String {
    format!(
        r#"{}

  WRITE "key" "value"        Queue a write into the fastest tier
  READ "key"                 Read through the tiers, fastest first
  STAT                       Show tier usage and recent average latencies
  HELP                       Show this help message
  exit                       Shut down and exit
"#,
        "Tierstack CLI - Available Commands".bold().cyan(),
    )
}
