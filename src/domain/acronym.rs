use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

use crate::domain::rich_text::RichText;

/// The unique key an acronym is registered and referenced under.
///
/// Keys are non-empty. They are otherwise free-form; characters that are not
/// valid in a link target are sanitised by [`crate::Anchors`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key(NonEmptyString);

impl Key {
    /// Creates a new key.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKeyError`] if the string is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, InvalidKeyError> {
        if s.trim().is_empty() {
            return Err(InvalidKeyError(s));
        }
        NonEmptyString::new(s).map(Self).map_err(InvalidKeyError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Key {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Key {
    type Error = InvalidKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for Key {
    type Err = InvalidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for Key {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when an acronym key is empty.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid acronym key '{0}': keys must not be empty")]
pub struct InvalidKeyError(String);

/// An acronym: a short and a long rich-text name addressable by a unique key.
///
/// Acronyms are values. Rendering never mutates a registered acronym; the
/// pluralised or case-transformed names used inside a single render are
/// fresh trees. Only [`crate::Registry::mark_used`] changes the usage order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acronym {
    pub(crate) key: Key,
    pub(crate) shortname: RichText,
    pub(crate) longname: RichText,
    pub(crate) plural_shortname: Option<RichText>,
    pub(crate) plural_longname: Option<RichText>,
    pub(crate) definition_order: usize,
    pub(crate) usage_order: Option<usize>,
}

impl Acronym {
    /// The key this acronym is registered under.
    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// The short form, e.g. `RL`.
    #[must_use]
    pub const fn shortname(&self) -> &RichText {
        &self.shortname
    }

    /// The long form, e.g. `Reinforcement Learning`.
    #[must_use]
    pub const fn longname(&self) -> &RichText {
        &self.longname
    }

    /// The explicit plural short form, if one was supplied.
    #[must_use]
    pub const fn plural_shortname(&self) -> Option<&RichText> {
        self.plural_shortname.as_ref()
    }

    /// The explicit plural long form, if one was supplied.
    #[must_use]
    pub const fn plural_longname(&self) -> Option<&RichText> {
        self.plural_longname.as_ref()
    }

    /// Rank by registration time, starting at 0.
    #[must_use]
    pub const fn definition_order(&self) -> usize {
        self.definition_order
    }

    /// Rank by first use, or `None` if the acronym has not been rendered.
    #[must_use]
    pub const fn usage_order(&self) -> Option<usize> {
        self.usage_order
    }

    /// Returns `true` once the acronym has been rendered at least once.
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.usage_order.is_some()
    }
}
