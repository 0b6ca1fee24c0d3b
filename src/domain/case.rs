//! Case transformation over rich text.
//!
//! Transformations rewrite leaf text only. Wrappers keep their kind and their
//! position in the tree.

use std::{fmt, str::FromStr};

use crate::domain::rich_text::{Inline, RichText};

/// A case rule applied to an acronym name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// Leave the text as it is.
    #[default]
    None,
    /// Upper-case every letter.
    Upper,
    /// Lower-case every letter.
    Lower,
    /// Capitalise the first letter of the whole fragment.
    Sentence,
}

/// Which of an acronym's names a [`Case`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseTarget {
    /// Neither name.
    #[default]
    None,
    /// The short name only.
    Short,
    /// The long name only.
    Long,
    /// Both names.
    Both,
}

impl CaseTarget {
    /// Returns `true` if the short name is targeted.
    #[must_use]
    pub const fn includes_short(self) -> bool {
        matches!(self, Self::Short | Self::Both)
    }

    /// Returns `true` if the long name is targeted.
    #[must_use]
    pub const fn includes_long(self) -> bool {
        matches!(self, Self::Long | Self::Both)
    }

    /// Parses a case target leniently.
    ///
    /// Unrecognised names are logged and treated as [`CaseTarget::None`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            tracing::warn!("{e}; no case transformation will be applied");
            Self::None
        })
    }
}

/// Error returned when a case kind or case target name is not recognised.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown case '{0}'")]
pub struct UnknownCaseError(String);

impl Case {
    /// Parses a case kind leniently.
    ///
    /// Unrecognised names are logged and treated as [`Case::None`], so the
    /// transformation is a no-op. Use [`str::parse`] for strict parsing.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            tracing::warn!("{e}; no case transformation will be applied");
            Self::None
        })
    }

    /// Applies this case rule to a tree, returning a new tree.
    #[must_use]
    pub fn apply(self, tree: &RichText) -> RichText {
        transform(tree, self)
    }
}

impl FromStr for Case {
    type Err = UnknownCaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "upper" => Ok(Self::Upper),
            "lower" => Ok(Self::Lower),
            "sentence" => Ok(Self::Sentence),
            other => Err(UnknownCaseError(other.to_string())),
        }
    }
}

impl FromStr for CaseTarget {
    type Err = UnknownCaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "short" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            "both" => Ok(Self::Both),
            other => Err(UnknownCaseError(other.to_string())),
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Sentence => "sentence",
        })
    }
}

/// Rewrites the leaf text of `tree` according to `case`.
///
/// This is a pure function: the input is not modified.
///
/// - [`Case::None`] returns an identical tree.
/// - [`Case::Upper`] and [`Case::Lower`] fold every leaf at every depth.
/// - [`Case::Sentence`] treats the leaves, in pre-order, as one logical
///   string. The first alphabetic character of that string is upper-cased in
///   its own leaf and nothing else changes.
#[must_use]
pub fn transform(tree: &RichText, case: Case) -> RichText {
    let mut out = tree.clone();
    match case {
        Case::None => {}
        Case::Upper => map_leaves(&mut out, &|text| text.to_uppercase()),
        Case::Lower => map_leaves(&mut out, &|text| text.to_lowercase()),
        Case::Sentence => {
            capitalise_first(&mut out);
        }
    }
    out
}

fn map_leaves(tree: &mut RichText, f: &dyn Fn(&str) -> String) {
    for node in tree.nodes_mut() {
        match node {
            Inline::Text(text) => *text = f(text),
            other => {
                if let Some(children) = other.children_mut() {
                    map_leaves(children, f);
                }
            }
        }
    }
}

/// Upper-cases the first alphabetic character in pre-order.
///
/// Returns `true` once the character has been found, which stops the scan in
/// every enclosing frame.
fn capitalise_first(tree: &mut RichText) -> bool {
    for node in tree.nodes_mut() {
        let found = match node {
            Inline::Text(text) => capitalise_leaf(text),
            other => other.children_mut().is_some_and(capitalise_first),
        };
        if found {
            return true;
        }
    }
    false
}

fn capitalise_leaf(text: &mut String) -> bool {
    let Some((index, c)) = text.char_indices().find(|(_, c)| c.is_alphabetic()) else {
        return false;
    };
    let upper: String = c.to_uppercase().collect();
    text.replace_range(index..index + c.len_utf8(), &upper);
    true
}
