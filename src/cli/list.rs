use std::path::PathBuf;

use acronyms::{Acronym, Document, SortCriterion, convert, domain::sort::sort};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::instrument;

use super::{Source, read_document, terminal::Colorize};

/// Command arguments for `acro list`.
#[derive(Debug, Parser)]
#[command(about = "List acronyms in glossary order")]
pub struct List {
    #[command(flatten)]
    source: Source,

    /// A document whose references determine which acronyms are used, and in
    /// what order.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Sort criterion (default: from config).
    #[arg(long)]
    sort: Option<SortCriterion>,

    /// List acronyms that are never used.
    #[arg(long, conflicts_with = "used_only")]
    include_unused: bool,

    /// List only acronyms that are used.
    #[arg(long)]
    used_only: bool,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and print keys only.
    #[arg(long)]
    quiet: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Row {
    key: String,
    shortname: String,
    longname: String,
    definition_order: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_order: Option<usize>,
}

impl From<&Acronym> for Row {
    fn from(acronym: &Acronym) -> Self {
        Self {
            key: acronym.key().to_string(),
            shortname: acronym.shortname().to_string(),
            longname: acronym.longname().to_string(),
            definition_order: acronym.definition_order(),
            usage_order: acronym.usage_order(),
        }
    }
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self) -> anyhow::Result<()> {
        let (mut registry, config) = self.source.load()?;

        if let Some(path) = &self.input {
            let text = read_document(path)?;
            let document = Document::parse(&text, config.parse_markdown);
            convert(&document, &mut registry, &config)?;
        }

        let criterion = match self.sort {
            Some(criterion) => criterion,
            None => config.sorting()?,
        };
        let include_unused = if self.include_unused {
            true
        } else if self.used_only {
            false
        } else {
            config.include_unused
        };

        let sorted = sort(registry.all_entries(), criterion, include_unused)?;
        let rows: Vec<Row> = sorted.iter().map(Row::from).collect();

        match self.output {
            OutputFormat::Table => render_table(&rows, self.quiet),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        }

        Ok(())
    }
}

fn render_table(rows: &[Row], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}", row.key);
        }
        return;
    }

    if rows.is_empty() {
        println!("{}", "No acronyms to list.".dim());
        return;
    }

    let key_width = rows
        .iter()
        .map(|row| row.key.chars().count())
        .max()
        .unwrap_or(0)
        .max("KEY".len());
    let short_width = rows
        .iter()
        .map(|row| row.shortname.chars().count())
        .max()
        .unwrap_or(0)
        .max("SHORT".len());

    println!(
        "{}",
        format!("{:<key_width$}  {:<short_width$}  {:>5}  LONG", "KEY", "SHORT", "USED").info()
    );
    for row in rows {
        let used = row
            .usage_order
            .map_or_else(|| "-".to_string(), |order| (order + 1).to_string());
        println!(
            "{:<key_width$}  {:<short_width$}  {used:>5}  {}",
            row.key, row.shortname, row.longname
        );
    }
}
