use std::path::{Path, PathBuf};

mod list;
mod render;
mod terminal;

use acronyms::{Config, Definitions, Registry};
use anyhow::Context as _;
use clap::ArgAction;
use list::List;
use render::Render;
pub use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.run()
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
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Render acronym references in a document
    ///
    /// The result is written to stdout as Pandoc markdown.
    Render(Render),

    /// List acronyms in glossary order
    List(List),
}

impl Command {
    fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Render(command) => command.run()?,
            Self::List(command) => command.run()?,
        }
        Ok(())
    }
}

/// Where acronym definitions and settings come from.
#[derive(Debug, clap::Args)]
pub struct Source {
    /// The acronym definitions file (YAML, or TOML with a `.toml` extension)
    #[arg(short, long, value_name = "FILE")]
    definitions: PathBuf,

    /// The configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Source {
    /// Loads the configuration and registers every definition.
    #[instrument(level = "debug")]
    fn load(&self) -> anyhow::Result<(Registry, Config)> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        let definitions = Definitions::load(&self.definitions)?;
        let mut registry = Registry::with_capacity(definitions.len());
        definitions.register_into(&mut registry, config.parse_markdown)?;

        tracing::info!(
            "Registered {} acronyms from {}",
            registry.len(),
            self.definitions.display()
        );
        Ok((registry, config))
    }
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
}
