//! slink: encode, decode and inspect shareable editor-session links.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sessionlink_core::{Session, inspect_link, read_link, write_link, write_link_legacy};

#[derive(Parser)]
#[command(
    name = "slink",
    version,
    about = "Encode, decode and inspect shareable editor-session links"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a JSON session description into a link
    Encode {
        /// Emit the legacy compressed-JSON format (tag 0)
        #[arg(long)]
        legacy: bool,
        /// JSON file to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Decode a link back into pretty-printed JSON
    Decode {
        /// The link; stdin when omitted
        link: Option<String>,
    },
    /// Show a link's tag, checksums and section sizes
    Inspect {
        /// The link; stdin when omitted
        link: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Encode { legacy, file } => {
            let json = read_source(file.as_deref())?;
            let session: Session =
                serde_json::from_str(&json).context("session JSON did not parse")?;
            let link = if legacy {
                write_link_legacy(&session)
            } else {
                write_link(&session)
            };
            println!("{link}");
        }
        Command::Decode { link } => {
            let link = read_argument(link)?;
            match read_link(link.trim()) {
                Some(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                None => bail!("link is unreadable"),
            }
        }
        Command::Inspect { link } => {
            let link = read_argument(link)?;
            match inspect_link(link.trim()) {
                Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                None => bail!("not a tagged link"),
            }
        }
    }
    Ok(())
}

/// Read a file, or stdin when no path was given.
fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => read_stdin(),
    }
}

/// Use the argument, or read stdin when it is absent.
fn read_argument(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(value) => Ok(value),
        None => read_stdin(),
    }
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read stdin")?;
    Ok(text)
}
