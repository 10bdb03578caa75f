use std::path::{Path, PathBuf};

mod formats;
mod print;
mod publish;
mod terminal;

use clap::ArgAction;
use formats::Formats;
use print::Print;
use publish::Publish;
use reqpub::Settings;

/// Normalise an extension to its dotted form and confirm it is supported.
///
/// This is a CLI boundary function: `md`, `.md` and `.MD` are all accepted.
fn parse_ext(s: &str) -> Result<String, String> {
    let lowercase = s.trim().to_lowercase();
    let ext = if lowercase.starts_with('.') {
        lowercase
    } else {
        format!(".{lowercase}")
    };
    reqpub::publish::check(&ext).map_err(|e| format!("{e}"))?;
    Ok(ext)
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML settings file
    ///
    /// Defaults are used when the file is not given or does not exist.
    #[arg(short, long, default_value = "reqpub.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let settings = load_settings(&self.config)?;
        self.command.run(&settings)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    if !path.is_file() {
        tracing::debug!("no settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    Settings::load(path).map_err(|e| anyhow::anyhow!("{}: {e}", path.display()))
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Publish a tree, or one document, to disk
    Publish(Publish),

    /// Render items to standard output
    ///
    /// Useful for previewing a single item or document without writing any
    /// files.
    Print(Print),

    /// List the supported output formats
    Formats(Formats),
}

impl Command {
    fn run(self, settings: &Settings) -> anyhow::Result<()> {
        match self {
            Self::Publish(command) => command.run(settings)?,
            Self::Print(command) => command.run(settings)?,
            Self::Formats(command) => command.run(),
        }
        Ok(())
    }
}
