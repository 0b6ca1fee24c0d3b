use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::domain::{InvalidKeyError, Key, Registry, RegistryError, RichText};

/// A set of acronym definitions, as written in a definitions file.
///
/// Definitions keep the order of the file, which becomes the definition order
/// once they are registered.
///
/// ```yaml
/// acronyms:
///   - key: RL
///     shortname: RL
///     longname: Reinforcement Learning
///   - key: GPU
///     shortname: GPU
///     longname: "*Graphics* Processing Unit"
///     plural:
///       longname: "*Graphics* Processing Units"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    acronyms: Vec<Definition>,
}

/// A single acronym definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// The key references use.
    pub key: String,
    /// The short form.
    pub shortname: String,
    /// The long form.
    pub longname: String,
    /// Explicit plural forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<Plural>,
    /// Overrides the global `parse_markdown` setting for this acronym.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_markdown: Option<bool>,
}

/// Explicit plural forms of an acronym.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plural {
    /// The plural short form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<String>,
    /// The plural long form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longname: Option<String>,
}

/// Errors raised when loading or registering definitions.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The file is not a valid YAML definitions file.
    #[error("failed to parse YAML definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The file is not a valid TOML definitions file.
    #[error("failed to parse TOML definitions: {0}")]
    Toml(#[from] toml::de::Error),
    /// A definition has an empty key.
    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),
    /// A key is defined twice.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl Definitions {
    /// Loads definitions from a file.
    ///
    /// Files ending in `.toml` are parsed as TOML; anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let definitions = if is_toml {
            Self::from_toml_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        tracing::debug!(
            "Loaded {} acronym definitions from {}",
            definitions.len(),
            path.display()
        );
        Ok(definitions)
    }

    /// Parses YAML definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Yaml`] if the content is not valid.
    pub fn from_yaml_str(content: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parses TOML definitions (an array of `[[acronyms]]` tables).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Toml`] if the content is not valid.
    pub fn from_toml_str(content: &str) -> Result<Self, LoadError> {
        Ok(toml::from_str(content)?)
    }

    /// The definitions, in file order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Definition> {
        self.acronyms.iter()
    }

    /// The number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.acronyms.len()
    }

    /// Returns `true` if there are no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.acronyms.is_empty()
    }

    /// Registers every definition, in file order.
    ///
    /// Names are parsed as inline markdown when the definition's
    /// `parse_markdown` flag (or `default_parse_markdown` when unset) is on.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidKey`] for an empty key and
    /// [`LoadError::Registry`] for a key that is already registered. The
    /// definitions before the failing one stay registered.
    pub fn register_into(
        &self,
        registry: &mut Registry,
        default_parse_markdown: bool,
    ) -> Result<(), LoadError> {
        for definition in &self.acronyms {
            let parse = |text: &str| {
                if definition.parse_markdown.unwrap_or(default_parse_markdown) {
                    RichText::from_markdown(text)
                } else {
                    RichText::plain(text)
                }
            };

            let plural = definition.plural.clone().unwrap_or_default();
            registry.register(
                Key::new(definition.key.clone())?,
                parse(&definition.shortname),
                parse(&definition.longname),
                plural.shortname.as_deref().map(parse),
                plural.longname.as_deref().map(parse),
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = &'a Definition;
    type IntoIter = std::slice::Iter<'a, Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Definition> for Definitions {
    fn from_iter<I: IntoIterator<Item = Definition>>(iter: I) -> Self {
        Self {
            acronyms: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::{Inline, StyleKind};

    const YAML: &str = "\
acronyms:
  - key: RL
    shortname: RL
    longname: Reinforcement Learning
  - key: GPU
    shortname: GPU
    longname: \"*Graphics* Processing Unit\"
    plural:
      longname: \"*Graphics* Processing Units\"
";

    #[test]
    fn yaml_keeps_file_order() {
        let definitions = Definitions::from_yaml_str(YAML).unwrap();
        let keys: Vec<_> = definitions.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, ["RL", "GPU"]);
    }

    #[test]
    fn register_parses_markdown() {
        let mut registry = Registry::new();
        Definitions::from_yaml_str(YAML)
            .unwrap()
            .register_into(&mut registry, true)
            .unwrap();

        let gpu = registry.lookup("GPU").unwrap();
        assert_eq!(gpu.definition_order(), 1);
        assert_eq!(
            gpu.longname(),
            &RichText::from(vec![
                Inline::styled(StyleKind::Emphasis, "Graphics"),
                Inline::text(" Processing Unit"),
            ])
        );
        assert!(gpu.plural_longname().is_some());
        assert!(gpu.plural_shortname().is_none());
    }

    #[test]
    fn per_acronym_flag_overrides_default() {
        let definitions: Definitions = [Definition {
            key: "C".to_string(),
            shortname: "C".to_string(),
            longname: "*literally*".to_string(),
            plural: None,
            parse_markdown: Some(false),
        }]
        .into_iter()
        .collect();

        let mut registry = Registry::new();
        definitions.register_into(&mut registry, true).unwrap();

        assert_eq!(
            registry.lookup("C").unwrap().longname(),
            &RichText::plain("*literally*")
        );
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let definitions = Definitions::from_yaml_str(
            "acronyms:\n  - {key: RL, shortname: RL, longname: a}\n  - {key: RL, shortname: RL, longname: b}\n",
        )
        .unwrap();

        let err = definitions
            .register_into(&mut Registry::new(), true)
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Registry(RegistryError::DuplicateKey(_))
        ));
    }

    #[test]
    fn load_toml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            b"[[acronyms]]\nkey = \"RL\"\nshortname = \"RL\"\nlongname = \"Reinforcement Learning\"\n",
        )
        .unwrap();

        let definitions = Definitions::load(file.path()).unwrap();
        assert_eq!(definitions.len(), 1);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("acronyms.yaml");

        let err = Definitions::load(&missing).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("acronyms.yaml"));
    }
}
