use anyhow::{Context, Result, bail};
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::str::FromStr;
use tierstack::HierarchyConfig;
use tracing::warn;

/// Collect the tier layout interactively
///
/// Asks for the number of levels, then every capacity, every read time and
/// every write time, in that order.
pub fn prompt_config(rl: &mut DefaultEditor) -> Result<HierarchyConfig> {
    let levels: usize = prompt_number(rl, "Enter the number of cache levels: ", |n: &usize| *n > 0)?;

    let capacities = (1..=levels)
        .map(|level| {
            prompt_number(
                rl,
                &format!("Enter the capacity for cache level {}: ", level),
                |n: &usize| *n > 0,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let read_times = (1..=levels)
        .map(|level| {
            prompt_number(
                rl,
                &format!("Enter the read time for cache level {} (in ms): ", level),
                |_: &u64| true,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let write_times = (1..=levels)
        .map(|level| {
            prompt_number(
                rl,
                &format!("Enter the write time for cache level {} (in ms): ", level),
                |_: &u64| true,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    HierarchyConfig::from_columns(&capacities, &read_times, &write_times)
        .context("Invalid cache level configuration")
}

/// Prompt until the input parses and passes `accept`
fn prompt_number<T, F>(rl: &mut DefaultEditor, prompt: &str, accept: F) -> Result<T>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    loop {
        match rl.readline(prompt) {
            Ok(line) => match parse_number(&line, &accept) {
                Some(value) => return Ok(value),
                None => warn!("{}", "Invalid input. Please enter a positive numeric value.".red()),
            },
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                bail!("Setup aborted")
            }
            Err(err) => return Err(err).context("Failed to read input"),
        }
    }
}

fn parse_number<T, F>(line: &str, accept: &F) -> Option<T>
where
    T: FromStr,
    F: Fn(&T) -> bool,
{
    line.trim().parse::<T>().ok().filter(|value| accept(value))
}
