use anyhow::{Result, bail};

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Write { key: String, value: String },
    Read { key: String },
    Stat,
    Help,
    Exit,
}

impl Command {
    /// Parse `WRITE "key" "value"`, `READ "key"`, `STAT`, `HELP` or `exit`
    ///
    /// Keywords are case-insensitive. Keys and values are taken from the
    /// double-quoted segments; without quotes, whitespace-separated tokens
    /// are used instead.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let keyword = line
            .split(|c: char| c.is_whitespace() || c == '"')
            .next()
            .unwrap_or_default()
            .to_uppercase();

        match keyword.as_str() {
            "WRITE" => {
                let args = arguments(line);
                match args.as_slice() {
                    [key, value, ..] if !key.is_empty() => Ok(Self::Write {
                        key: key.clone(),
                        value: value.clone(),
                    }),
                    _ => bail!("Invalid WRITE command format. Usage: WRITE \"key\" \"value\""),
                }
            }
            "READ" => {
                let args = arguments(line);
                match args.first() {
                    Some(key) if !key.is_empty() => Ok(Self::Read { key: key.clone() }),
                    _ => bail!("Invalid READ command format. Usage: READ \"key\""),
                }
            }
            "STAT" | "STATS" => Ok(Self::Stat),
            "HELP" => Ok(Self::Help),
            "EXIT" | "QUIT" => Ok(Self::Exit),
            "" => bail!("Empty command"),
            _ => bail!("Unknown command. Valid commands are: WRITE, READ, STAT, HELP or exit."),
        }
    }
}

/// Arguments after the keyword
fn arguments(line: &str) -> Vec<String> {
    if line.contains('"') {
        line.split('"')
            .skip(1)
            .step_by(2)
            .map(|part| part.trim().to_string())
            .collect()
    } else {
        line.split_whitespace()
            .skip(1)
            .map(String::from)
            .collect()
    }
}
