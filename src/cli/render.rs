use std::path::PathBuf;

use acronyms::{Document, Style, convert};
use clap::Parser;
use tracing::instrument;

use super::{Source, read_document, terminal::Colorize};

#[derive(Debug, Parser)]
pub struct Render {
    /// The document to render
    input: PathBuf,

    #[command(flatten)]
    source: Source,

    /// Override the configured style (long-short, short-long, long-long,
    /// short-footnote)
    #[arg(long)]
    style: Option<Style>,

    /// Do not link references to their glossary entry
    #[arg(long)]
    no_links: bool,
}

impl Render {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let (mut registry, mut config) = self.source.load()?;

        if let Some(style) = self.style {
            config.set_style(style);
        }
        if self.no_links {
            config.insert_links = false;
        }

        let text = read_document(&self.input)?;
        let document = Document::parse(&text, config.parse_markdown);
        let blocks = convert(&document, &mut registry, &config)?;

        let output = blocks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n");
        println!("{output}");

        let unused: Vec<String> = registry
            .iter()
            .filter(|acronym| !acronym.is_used())
            .map(|acronym| acronym.key().to_string())
            .collect();
        if !unused.is_empty() {
            eprintln!(
                "{}",
                format!(
                    "ℹ️  {} acronym(s) defined but never used: {}",
                    unused.len(),
                    unused.join(", ")
                )
                .dim()
            );
        }

        Ok(())
    }
}
