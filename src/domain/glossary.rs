use std::fmt;

use crate::domain::{Anchors, Registry, RichText, SortCriterion, SortError, sort::sort};

/// One entry of the glossary listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    /// The anchor identifier references link to.
    pub id: String,
    /// The acronym's short name.
    pub shortname: RichText,
    /// The acronym's long name.
    pub longname: RichText,
}

/// Writes the entry as a Pandoc definition-list item.
impl fmt::Display for GlossaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}]{{#{}}}", self.shortname, self.id)?;
        write!(f, ":   {}", self.longname)
    }
}

/// Builds the glossary listing from the registry's current state.
///
/// Call this after the document pass, so that usage order is complete.
///
/// # Errors
///
/// Returns any error from [`sort`].
pub fn build_glossary(
    registry: &Registry,
    criterion: SortCriterion,
    include_unused: bool,
    anchors: &Anchors,
) -> Result<Vec<GlossaryEntry>, SortError> {
    let sorted = sort(registry.iter().cloned(), criterion, include_unused)?;
    Ok(sorted
        .into_iter()
        .map(|acronym| GlossaryEntry {
            id: anchors.id(acronym.key()),
            shortname: acronym.shortname,
            longname: acronym.longname,
        })
        .collect())
}
