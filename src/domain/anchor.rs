/// Generates link targets for acronyms.
///
/// The identifier of an acronym is the configured prefix followed by its key,
/// with every character that is not alphanumeric replaced by `_`. The
/// glossary uses the identifier for its entries, and rendered references link
/// to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchors {
    prefix: String,
}

/// The identifier prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "acronyms_";

impl Default for Anchors {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl Anchors {
    /// Creates a generator with the given identifier prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The fragment identifier for `key`, e.g. `acronyms_RL`.
    #[must_use]
    pub fn id(&self, key: &str) -> String {
        let sanitised: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}{sanitised}", self.prefix)
    }

    /// The link target for `key`, e.g. `#acronyms_RL`.
    #[must_use]
    pub fn target(&self, key: &str) -> String {
        format!("#{}", self.id(key))
    }
}
