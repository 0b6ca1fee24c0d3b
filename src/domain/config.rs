use std::{io, path::Path};

use serde::{Deserialize, Serialize};

use crate::domain::{
    Anchors, RenderError, SortCriterion, SortError, Style, anchor::DEFAULT_PREFIX,
};

/// Configuration for acronym rendering.
///
/// Style and sorting are stored by name so that a file with a typo still
/// loads; they are validated when [`Config::style`] or [`Config::sorting`]
/// is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The default style, e.g. `long-short`.
    style: String,

    /// The glossary sorting criterion, e.g. `alphabetical`.
    sorting: String,

    /// Whether the glossary lists acronyms that are never used.
    pub include_unused: bool,

    /// Whether references link to their glossary entry.
    pub insert_links: bool,

    /// Prefix of the identifiers generated for glossary entries.
    id_prefix: String,

    /// Whether acronym names are parsed as inline markdown by default.
    ///
    /// Individual definitions can override this.
    pub parse_markdown: bool,

    /// Heading of the generated glossary.
    pub glossary_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style: default_style(),
            sorting: default_sorting(),
            include_unused: true,
            insert_links: true,
            id_prefix: default_id_prefix(),
            parse_markdown: true,
            glossary_title: default_glossary_title(),
        }
    }
}

/// Errors raised when loading or saving a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] io::Error),
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialised.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] io::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// The default style.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownStyle`] if the configured name is not a
    /// recognised style.
    pub fn style(&self) -> Result<Style, RenderError> {
        self.style.parse()
    }

    /// Sets the default style.
    pub fn set_style(&mut self, style: Style) {
        self.style = style.name().to_string();
    }

    /// The glossary sorting criterion.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::UnknownSortCriterion`] if the configured name is
    /// not recognised.
    pub fn sorting(&self) -> Result<SortCriterion, SortError> {
        self.sorting.parse()
    }

    /// Sets the glossary sorting criterion.
    pub fn set_sorting(&mut self, criterion: SortCriterion) {
        self.sorting = criterion.name().to_string();
    }

    /// An anchor generator using the configured prefix.
    #[must_use]
    pub fn anchors(&self) -> Anchors {
        Anchors::new(self.id_prefix.clone())
    }
}

fn default_style() -> String {
    Style::default().name().to_string()
}

fn default_sorting() -> String {
    SortCriterion::default().name().to_string()
}

fn default_id_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_glossary_title() -> String {
    "List of Acronyms".to_string()
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_style")]
        style: String,

        #[serde(default = "default_sorting")]
        sorting: String,

        #[serde(default = "default_true")]
        include_unused: bool,

        #[serde(default = "default_true")]
        insert_links: bool,

        #[serde(default = "default_id_prefix")]
        id_prefix: String,

        #[serde(default = "default_true")]
        parse_markdown: bool,

        #[serde(default = "default_glossary_title")]
        glossary_title: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                style,
                sorting,
                include_unused,
                insert_links,
                id_prefix,
                parse_markdown,
                glossary_title,
            } => Self {
                style,
                sorting,
                include_unused,
                insert_links,
                id_prefix,
                parse_markdown,
                glossary_title,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            style: config.style,
            sorting: config.sorting,
            include_unused: config.include_unused,
            insert_links: config.insert_links,
            id_prefix: config.id_prefix,
            parse_markdown: config.parse_markdown,
            glossary_title: config.glossary_title,
        }
    }
}
