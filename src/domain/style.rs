//! Rendering of acronyms into rich-text fragments.
//!
//! A [`Style`] maps an acronym and its first-use flag to a fragment. Rendering
//! always runs in the same order: plural substitution, then case
//! transformation, then style dispatch, then link insertion.

use std::{fmt, str::FromStr};

use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Acronym, Anchors, Key, Registry, RegistryError, RichText,
    case::{Case, CaseTarget},
    rich_text::Inline,
};

/// A named rendering rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// `Long (Short)` on first use, `Short` afterwards.
    #[default]
    LongShort,
    /// `Short (Long)` on first use, `Short` afterwards.
    ShortLong,
    /// `Long` every time.
    LongLong,
    /// `Short` with a footnote `Short: Long` on first use, `Short` afterwards.
    ShortFootnote,
}

impl Style {
    /// Every recognised style, in documentation order.
    pub const ALL: [Self; 4] = [
        Self::LongShort,
        Self::ShortLong,
        Self::LongLong,
        Self::ShortFootnote,
    ];

    /// The identifier used in configuration and markers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LongShort => "long-short",
            Self::ShortLong => "short-long",
            Self::LongLong => "long-long",
            Self::ShortFootnote => "short-footnote",
        }
    }
}

impl FromStr for Style {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| RenderError::UnknownStyle(s.to_string()))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which of an acronym's names an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Name {
    /// The short name.
    Short,
    /// The long name.
    Long,
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Short => "short name",
            Self::Long => "long name",
        })
    }
}

/// Errors raised while rendering an acronym.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The style identifier is not recognised.
    #[error(
        "unknown style '{0}': expected one of long-short, short-long, long-long, short-footnote"
    )]
    UnknownStyle(String),

    /// A plural form was requested for a formatted name without an explicit
    /// plural variant.
    #[error(
        "acronym '{key}' has a formatted {name} but no plural variant; define the plural \
         explicitly"
    )]
    MissingPluralVariant {
        /// The acronym's key.
        key: Key,
        /// The name that could not be pluralised.
        name: Name,
    },

    /// The acronym could not be looked up or marked used.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Per-reference rendering flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap the rendered fragment in a link to the glossary entry.
    pub insert_links: bool,
    /// Render the plural forms.
    pub plural: bool,
    /// Which names the case rule applies to.
    pub case_target: CaseTarget,
    /// The case rule.
    pub case: Case,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            insert_links: true,
            plural: false,
            case_target: CaseTarget::None,
            case: Case::None,
        }
    }
}

/// A rendered acronym reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The inline fragment that replaces the reference.
    pub inline: RichText,
    /// A footnote attached to the inline fragment, if the style produces one.
    pub note: Option<RichText>,
}

impl Rendered {
    /// Flattens the fragment into a single tree, with the footnote (if any)
    /// spliced in as an [`Inline::Note`] right after the inline text.
    #[must_use]
    pub fn into_rich_text(self) -> RichText {
        let mut out = self.inline;
        if let Some(note) = self.note {
            out.push(Inline::Note(note));
        }
        out
    }
}

/// The pluralised, case-transformed names used by a single render.
struct Names {
    short: RichText,
    long: RichText,
}

impl Names {
    fn resolve(acronym: &Acronym, options: &RenderOptions) -> Result<Self, RenderError> {
        let (short, long) = if options.plural {
            (
                pluralise(
                    acronym.key(),
                    Name::Short,
                    acronym.shortname(),
                    acronym.plural_shortname(),
                )?,
                pluralise(
                    acronym.key(),
                    Name::Long,
                    acronym.longname(),
                    acronym.plural_longname(),
                )?,
            )
        } else {
            (acronym.shortname().clone(), acronym.longname().clone())
        };

        Ok(Self {
            short: if options.case_target.includes_short() {
                options.case.apply(&short)
            } else {
                short
            },
            long: if options.case_target.includes_long() {
                options.case.apply(&long)
            } else {
                long
            },
        })
    }
}

/// Returns the plural form of a name.
///
/// An explicit variant always wins. Plain names fall back to an `s` suffix;
/// formatted names have no safe fallback.
fn pluralise(
    key: &Key,
    name: Name,
    singular: &RichText,
    plural: Option<&RichText>,
) -> Result<RichText, RenderError> {
    match plural {
        Some(plural) => Ok(plural.clone()),
        None if singular.is_plain() => Ok(RichText::plain(format!("{}s", singular.stringify()))),
        None => Err(RenderError::MissingPluralVariant {
            key: key.clone(),
            name,
        }),
    }
}

/// `a (b)`, with the separators as leaves of their own.
fn parenthesised(outer: RichText, inner: RichText) -> RichText {
    outer
        .concat(RichText::plain(" ("))
        .concat(inner)
        .concat(RichText::plain(")"))
}

/// Renders an acronym.
///
/// When `options.insert_links` is set, the whole fragment is wrapped in one
/// link to the acronym's anchor. The `short-footnote` style never links its
/// first-use inline text; it links the short name inside the footnote
/// instead.
///
/// # Errors
///
/// Returns [`RenderError::MissingPluralVariant`] if a plural is requested for
/// a formatted name that has no explicit plural variant.
pub fn render(
    acronym: &Acronym,
    style: Style,
    options: &RenderOptions,
    is_first_use: bool,
    anchors: &Anchors,
) -> Result<Rendered, RenderError> {
    let Names { short, long } = Names::resolve(acronym, options)?;

    let linked = |fragment: RichText| {
        if options.insert_links {
            RichText::from(Inline::link(anchors.target(acronym.key()), fragment))
        } else {
            fragment
        }
    };

    let rendered = match (style, is_first_use) {
        (Style::LongShort, true) => Rendered {
            inline: linked(parenthesised(long, short)),
            note: None,
        },
        (Style::ShortLong, true) => Rendered {
            inline: linked(parenthesised(short, long)),
            note: None,
        },
        (Style::LongLong, _) => Rendered {
            inline: linked(long),
            note: None,
        },
        (Style::ShortFootnote, true) => {
            let note = linked(short.clone())
                .concat(RichText::plain(": "))
                .concat(long);
            Rendered {
                inline: short,
                note: Some(note),
            }
        }
        (Style::LongShort | Style::ShortLong | Style::ShortFootnote, false) => Rendered {
            inline: linked(short),
            note: None,
        },
    };

    Ok(rendered)
}

/// A single acronym reference, as found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    /// The key of the referenced acronym.
    pub key: String,
    /// The style to render with.
    pub style: Style,
    /// Per-reference flags.
    pub options: RenderOptions,
    /// Forces first-use (`Some(true)`) or next-use (`Some(false)`) rendering.
    ///
    /// When `None`, the registry decides.
    pub first_use: Option<bool>,
}

/// Renders references against a registry.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    anchors: Anchors,
}

impl Engine {
    /// Creates an engine that links to the given anchors.
    #[must_use]
    pub const fn new(anchors: Anchors) -> Self {
        Self { anchors }
    }

    /// Renders one reference and records its use.
    ///
    /// The acronym is always marked used, so that it appears in usage-ordered
    /// listings. When the request does not force a first-use flag, the flag
    /// reported by [`Registry::mark_used`] is used.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Registry`] if the key is not registered, or any
    /// error from [`render`].
    #[instrument(level = "debug", skip(self, registry), fields(key = %request.key, style = %request.style))]
    pub fn render_request(
        &self,
        registry: &mut Registry,
        request: &RenderRequest,
    ) -> Result<Rendered, RenderError> {
        let first_use = registry.mark_used(&request.key)?;
        let is_first_use = request.first_use.unwrap_or(first_use);
        let acronym = registry.lookup(&request.key)?;
        render(
            acronym,
            request.style,
            &request.options,
            is_first_use,
            &self.anchors,
        )
    }
}
