use std::{cmp::Ordering, fmt, str::FromStr};

use thiserror::Error;

use crate::domain::Acronym;

/// The order acronyms are listed in a glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriterion {
    /// Case-sensitive lexicographic order of the short name.
    #[default]
    Alphabetical,
    /// Case-insensitive lexicographic order of the short name.
    AlphabeticalCaseInsensitive,
    /// Definition order.
    Initial,
    /// Order of first use in the document.
    Usage,
}

impl SortCriterion {
    /// Every recognised criterion.
    pub const ALL: [Self; 4] = [
        Self::Alphabetical,
        Self::AlphabeticalCaseInsensitive,
        Self::Initial,
        Self::Usage,
    ];

    /// The identifier used in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::AlphabeticalCaseInsensitive => "alphabetical-case-insensitive",
            Self::Initial => "initial",
            Self::Usage => "usage",
        }
    }
}

impl FromStr for SortCriterion {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|criterion| criterion.name() == s)
            .ok_or_else(|| SortError::UnknownSortCriterion(s.to_string()))
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when sorting acronyms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    /// The sorting criterion is not recognised.
    #[error(
        "unknown sorting criterion '{0}': expected one of alphabetical, \
         alphabetical-case-insensitive, initial, usage"
    )]
    UnknownSortCriterion(String),

    /// The criterion cannot be combined with the other settings.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Orders acronyms for a glossary.
///
/// Unused acronyms are dropped unless `include_unused` is set. Only
/// [`SortCriterion::Initial`] is a strict total order; ties under the other
/// criteria keep no particular order.
///
/// # Errors
///
/// Returns [`SortError::InvalidConfiguration`] for [`SortCriterion::Usage`]
/// with `include_unused`, since unused acronyms have no usage order.
pub fn sort(
    entries: impl IntoIterator<Item = Acronym>,
    criterion: SortCriterion,
    include_unused: bool,
) -> Result<Vec<Acronym>, SortError> {
    if criterion == SortCriterion::Usage && include_unused {
        return Err(SortError::InvalidConfiguration(
            "sorting by usage cannot include unused acronyms".to_string(),
        ));
    }

    let mut entries: Vec<Acronym> = entries
        .into_iter()
        .filter(|acronym| include_unused || acronym.is_used())
        .collect();

    match criterion {
        SortCriterion::Alphabetical => {
            entries.sort_by_cached_key(|acronym| acronym.shortname().stringify());
        }
        SortCriterion::AlphabeticalCaseInsensitive => {
            entries.sort_by_cached_key(|acronym| acronym.shortname().stringify().to_lowercase());
        }
        SortCriterion::Initial => entries.sort_by_key(Acronym::definition_order),
        SortCriterion::Usage => entries.sort_by(compare_usage),
    }

    Ok(entries)
}

fn compare_usage(a: &Acronym, b: &Acronym) -> Ordering {
    a.usage_order().cmp(&b.usage_order())
}
