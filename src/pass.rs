//! The document pass.
//!
//! A document is a sequence of top-level markdown blocks. Plain paragraphs
//! are parsed to rich text; the pass visits every leaf in document order,
//! finds acronym references in the leaf text, renders each one and splices
//! the fragment back into the tree. Other blocks (headings, lists, quotes,
//! tables) are kept as source and references in them are replaced in place.
//! Code is never touched. References look like this:
//!
//! - `\acr{RL}`, `\acrs{RL}` (plural), `\Acr{RL}` (sentence case),
//!   `\Acrs{RL}`, `\ACR{RL}` (upper case)
//! - `\acr{RL, style=short-long, first_use=true, insert_links=false,
//!   case=upper, case_target=long, plural=true}`
//! - `[!RL]`, `[!+RL]` (plural)
//!
//! A paragraph consisting only of `\printacronyms` is replaced by the
//! glossary once every reference has been rendered.

use std::{fmt, ops::Range, sync::LazyLock};

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Case, CaseTarget, Config, Engine, GlossaryEntry, Inline, Registry, RenderError, RenderOptions,
    RenderRequest, RichText, SortError, Style, build_glossary,
};

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(acrs|acr|Acrs|Acr|ACR)\{([^{}]*)\}|\[!(\+?)([^\]\s]+)\]")
        .expect("marker pattern is valid")
});

const PRINT_ACRONYMS: &str = r"\printacronyms";

/// Errors that abort a document pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PassError {
    /// A reference could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A reference has a malformed option.
    #[error("invalid acronym reference '{marker}': {reason}")]
    InvalidMarker {
        /// The reference as written in the document.
        marker: String,
        /// What is wrong with it.
        reason: String,
    },
    /// The glossary could not be sorted.
    #[error(transparent)]
    Sort(#[from] SortError),
}

/// A top-level block of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// A paragraph of inline content, parsed to rich text.
    Paragraph(RichText),
    /// Any other block, kept as markdown source.
    ///
    /// References are rendered in place, except inside the `protected` byte
    /// ranges (code spans and inline HTML).
    Markdown {
        /// The block's source text.
        source: String,
        /// Byte ranges of `source` that are copied through untouched.
        protected: Vec<Range<usize>>,
    },
    /// A code block, HTML block or metadata block, copied through untouched.
    Literal(String),
}

/// A document: a sequence of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    /// Splits markdown `source` into its top-level blocks.
    ///
    /// With `parse_markdown` set, a paragraph made only of text, emphasis,
    /// strong emphasis, strikethrough, superscript, subscript and plain links
    /// becomes [`Section::Paragraph`]. Every other block, and every paragraph
    /// when `parse_markdown` is off, is kept as source so that nothing the
    /// rich-text model cannot represent is lost. Text between blocks that
    /// produces no block of its own (link reference definitions) is kept
    /// as [`Section::Literal`].
    #[must_use]
    pub fn parse(source: &str, parse_markdown: bool) -> Self {
        let mut sections = Vec::new();
        let mut open: Option<OpenBlock> = None;
        let mut depth = 0usize;
        let mut last = 0usize;

        for (event, range) in Parser::new_ext(source, markdown_options()).into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    if depth == 0 {
                        let start = line_start(source, range.start);
                        push_gap(&mut sections, &source[last.min(start)..start]);
                        open = Some(OpenBlock::new(&tag, start..range.end));
                    } else if let Some(block) = &mut open {
                        block.observe_start(&tag, &range);
                    }
                    depth += 1;
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if let Some(block) = open.take() {
                            last = block.range.end;
                            sections.push(block.finish(source, parse_markdown));
                        }
                    }
                }
                other => {
                    if depth == 0 {
                        // Leaf blocks with no start/end pair, e.g. a thematic break.
                        let start = line_start(source, range.start);
                        push_gap(&mut sections, &source[last.min(start)..start]);
                        sections.push(Section::Markdown {
                            source: source[start..range.end].trim_end().to_string(),
                            protected: Vec::new(),
                        });
                        last = range.end;
                    } else if let Some(block) = &mut open {
                        block.observe(&other, &range);
                    }
                }
            }
        }
        push_gap(&mut sections, &source[last.min(source.len())..]);

        Self { sections }
    }

    /// The top-level blocks, in document order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_SUPERSCRIPT
        | Options::ENABLE_SUBSCRIPT
        | Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS
}

/// Moves `offset` back to the start of its line when only indentation
/// precedes it.
fn line_start(source: &str, offset: usize) -> usize {
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    if source[start..offset].trim().is_empty() {
        start
    } else {
        offset
    }
}

fn push_gap(sections: &mut Vec<Section>, gap: &str) {
    let gap = gap.trim();
    if !gap.is_empty() {
        sections.push(Section::Literal(gap.to_string()));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Paragraph,
    Literal,
    Other,
}

/// A top-level block whose end has not been reached yet.
#[derive(Debug)]
struct OpenBlock {
    kind: BlockKind,
    range: Range<usize>,
    inline_only: bool,
    protected: Vec<Range<usize>>,
}

impl OpenBlock {
    fn new(tag: &Tag<'_>, range: Range<usize>) -> Self {
        let kind = match tag {
            Tag::Paragraph => BlockKind::Paragraph,
            Tag::CodeBlock(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => BlockKind::Literal,
            _ => BlockKind::Other,
        };
        Self {
            kind,
            range,
            inline_only: true,
            protected: Vec::new(),
        }
    }

    fn observe_start(&mut self, tag: &Tag<'_>, range: &Range<usize>) {
        if matches!(tag, Tag::CodeBlock(_) | Tag::HtmlBlock) {
            self.protect(range);
        }
        let supported = match tag {
            Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript => true,
            Tag::Link { title, .. } => title.is_empty(),
            _ => false,
        };
        self.inline_only &= supported;
    }

    fn observe(&mut self, event: &Event<'_>, range: &Range<usize>) {
        match event {
            Event::Text(_) | Event::SoftBreak => {}
            Event::Code(_) | Event::InlineHtml(_) | Event::Html(_) => {
                self.inline_only = false;
                self.protect(range);
            }
            _ => self.inline_only = false,
        }
    }

    /// Records `range` (absolute) as protected, relative to the block start.
    fn protect(&mut self, range: &Range<usize>) {
        self.protected
            .push(range.start - self.range.start..range.end - self.range.start);
    }

    fn finish(self, source: &str, parse_markdown: bool) -> Section {
        let text = source[self.range].trim_end();
        match self.kind {
            BlockKind::Paragraph if parse_markdown && self.inline_only => {
                Section::Paragraph(RichText::from_markdown(text))
            }
            BlockKind::Literal => Section::Literal(text.to_string()),
            BlockKind::Paragraph | BlockKind::Other => Section::Markdown {
                source: text.to_string(),
                protected: self.protected,
            },
        }
    }
}

/// A rendered document, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph with every reference rendered.
    Paragraph(RichText),
    /// Markdown source with every reference rendered.
    Markdown(String),
    /// The glossary, in place of `\printacronyms`.
    Glossary {
        /// The glossary heading.
        title: String,
        /// The sorted entries.
        entries: Vec<GlossaryEntry>,
    },
}

/// Writes the block as Pandoc markdown.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph(text) => write!(f, "{text}"),
            Self::Markdown(source) => f.write_str(source),
            Self::Glossary { title, entries } => {
                write!(f, "# {title}")?;
                for entry in entries {
                    write!(f, "\n\n{entry}")?;
                }
                Ok(())
            }
        }
    }
}

/// Default settings for references that do not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defaults {
    /// The style used when a reference names none.
    pub style: Style,
    /// Whether references link to the glossary.
    pub insert_links: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            style: Style::default(),
            insert_links: true,
        }
    }
}

/// One pass over one document.
///
/// The pass borrows the registry exclusively: references are rendered one at
/// a time, in document order, and every first use is recorded as it happens.
#[derive(Debug)]
pub struct Pass<'r> {
    registry: &'r mut Registry,
    engine: Engine,
    defaults: Defaults,
}

impl<'r> Pass<'r> {
    /// Creates a pass over `registry`.
    pub const fn new(registry: &'r mut Registry, engine: Engine, defaults: Defaults) -> Self {
        Self {
            registry,
            engine,
            defaults,
        }
    }

    /// Renders every reference in a tree, returning the rewritten tree.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Nothing is returned for the
    /// partially rewritten tree.
    pub fn rewrite(&mut self, tree: &RichText) -> Result<RichText, PassError> {
        let mut out = RichText::new();
        for node in tree.nodes() {
            match node {
                Inline::Text(text) => self.rewrite_text(text, &mut out)?,
                Inline::Styled { kind, children } => {
                    out.push(Inline::styled(*kind, self.rewrite(children)?));
                }
                Inline::Link { target, children } => {
                    out.push(Inline::link(target.clone(), self.rewrite(children)?));
                }
                Inline::Note(children) => out.push(Inline::Note(self.rewrite(children)?)),
            }
        }
        Ok(out)
    }

    /// Renders every reference in markdown source, returning the rewritten
    /// source.
    ///
    /// References starting inside a `protected` byte range are left as they
    /// are.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered.
    pub fn rewrite_markdown(
        &mut self,
        source: &str,
        protected: &[Range<usize>],
    ) -> Result<String, PassError> {
        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for captures in MARKER.captures_iter(source) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if protected.iter().any(|range| range.contains(&whole.start())) {
                continue;
            }
            out.push_str(&source[last..whole.start()]);
            out.push_str(&self.render_marker(&captures)?.to_string());
            last = whole.end();
        }
        out.push_str(&source[last..]);
        Ok(out)
    }

    fn rewrite_text(&mut self, text: &str, out: &mut RichText) -> Result<(), PassError> {
        let mut last = 0;
        for captures in MARKER.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                out.push_text(&text[last..whole.start()]);
            }
            out.extend(self.render_marker(&captures)?);
            last = whole.end();
        }
        if last < text.len() {
            out.push_text(&text[last..]);
        }
        Ok(())
    }

    fn render_marker(&mut self, captures: &Captures<'_>) -> Result<RichText, PassError> {
        let request = self.parse_marker(captures)?;
        let rendered = self.engine.render_request(self.registry, &request)?;
        Ok(rendered.into_rich_text())
    }

    fn parse_marker(&self, captures: &Captures<'_>) -> Result<RenderRequest, PassError> {
        let marker = &captures[0];
        let mut request = RenderRequest {
            key: String::new(),
            style: self.defaults.style,
            options: RenderOptions {
                insert_links: self.defaults.insert_links,
                ..RenderOptions::default()
            },
            first_use: None,
        };

        // Shorthand form: [!KEY] or [!+KEY]
        if let Some(key) = captures.get(4) {
            request.key = key.as_str().to_string();
            request.options.plural = captures.get(3).is_some_and(|m| !m.as_str().is_empty());
            return Ok(request);
        }

        let command = captures.get(1).map_or("acr", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());

        match command {
            "acrs" => request.options.plural = true,
            "Acr" => {
                request.options.case = Case::Sentence;
                request.options.case_target = CaseTarget::Both;
            }
            "Acrs" => {
                request.options.plural = true;
                request.options.case = Case::Sentence;
                request.options.case_target = CaseTarget::Both;
            }
            "ACR" => {
                request.options.case = Case::Upper;
                request.options.case_target = CaseTarget::Both;
            }
            _ => {}
        }

        let mut parts = body.split(',').map(str::trim);
        request.key = parts.next().unwrap_or_default().to_string();
        if request.key.is_empty() {
            return Err(invalid(marker, "missing acronym key"));
        }

        for option in parts.filter(|part| !part.is_empty()) {
            let Some((name, value)) = option.split_once('=') else {
                return Err(invalid(marker, &format!("expected name=value, got '{option}'")));
            };
            let (name, value) = (name.trim(), value.trim().trim_matches('"'));
            match name {
                "style" => request.style = value.parse()?,
                "first_use" => request.first_use = Some(parse_bool(marker, name, value)?),
                "insert_links" => request.options.insert_links = parse_bool(marker, name, value)?,
                "plural" => request.options.plural = parse_bool(marker, name, value)?,
                "case" => request.options.case = Case::from_name(value),
                "case_target" => request.options.case_target = CaseTarget::from_name(value),
                other => tracing::warn!("Ignoring unknown option '{other}' in {marker}"),
            }
        }

        // A case without a target applies to both names.
        if request.options.case != Case::None && request.options.case_target == CaseTarget::None
        {
            request.options.case_target = CaseTarget::Both;
        }

        Ok(request)
    }
}

fn invalid(marker: &str, reason: &str) -> PassError {
    PassError::InvalidMarker {
        marker: marker.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(marker: &str, name: &str, value: &str) -> Result<bool, PassError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(invalid(
            marker,
            &format!("option '{name}' expects true or false, got '{other}'"),
        )),
    }
}

/// Renders a whole document.
///
/// Every section is rewritten in order. Afterwards, each `\printacronyms`
/// paragraph is replaced by the glossary, sorted according to `config`.
///
/// # Errors
///
/// Returns the first error encountered; no partial output is produced.
#[instrument(level = "debug", skip_all, fields(sections = document.sections().len()))]
pub fn convert(
    document: &Document,
    registry: &mut Registry,
    config: &Config,
) -> Result<Vec<Block>, PassError> {
    let style = config.style()?;
    let criterion = config.sorting()?;
    let anchors = config.anchors();

    let mut pass = Pass::new(
        registry,
        Engine::new(anchors.clone()),
        Defaults {
            style,
            insert_links: config.insert_links,
        },
    );

    let mut blocks = Vec::with_capacity(document.sections().len());
    let mut glossary_positions = Vec::new();
    for section in document.sections() {
        let block = match section {
            Section::Paragraph(paragraph) if paragraph.stringify().trim() == PRINT_ACRONYMS => {
                glossary_positions.push(blocks.len());
                Block::Paragraph(RichText::new())
            }
            Section::Markdown { source, .. } if source.trim() == PRINT_ACRONYMS => {
                glossary_positions.push(blocks.len());
                Block::Paragraph(RichText::new())
            }
            Section::Paragraph(paragraph) => Block::Paragraph(pass.rewrite(paragraph)?),
            Section::Markdown { source, protected } => {
                Block::Markdown(pass.rewrite_markdown(source, protected)?)
            }
            Section::Literal(source) => Block::Markdown(source.clone()),
        };
        blocks.push(block);
    }

    if !glossary_positions.is_empty() {
        let entries = build_glossary(registry, criterion, config.include_unused, &anchors)?;
        for position in glossary_positions {
            blocks[position] = Block::Glossary {
                title: config.glossary_title.clone(),
                entries: entries.clone(),
            };
        }
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Key, RegistryError, StyleKind};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        for (key, long) in [("RL", "Reinforcement Learning"), ("ML", "machine learning")] {
            registry
                .register(
                    Key::try_from(key).unwrap(),
                    RichText::plain(key),
                    RichText::plain(long),
                    None,
                    None,
                )
                .unwrap();
        }
        registry
    }

    fn unlinked() -> Defaults {
        Defaults {
            style: Style::LongShort,
            insert_links: false,
        }
    }

    fn rewrite(registry: &mut Registry, tree: &RichText) -> Result<String, PassError> {
        Pass::new(registry, Engine::default(), unlinked())
            .rewrite(tree)
            .map(|out| out.to_string())
    }

    #[test]
    fn first_and_next_use_in_document_order() {
        let mut registry = registry();
        let out = rewrite(
            &mut registry,
            &RichText::plain(r"We use \acr{RL}. Later, \acr{RL} again."),
        )
        .unwrap();
        assert_eq!(out, "We use Reinforcement Learning (RL). Later, RL again.");
    }

    #[test]
    fn references_inside_wrappers_keep_formatting() {
        let mut registry = registry();
        let tree = RichText::from(vec![
            Inline::text("See "),
            Inline::styled(StyleKind::Emphasis, r"\acr{RL}"),
            Inline::text("."),
        ]);
        let out = rewrite(&mut registry, &tree).unwrap();
        assert_eq!(out, "See *Reinforcement Learning (RL)*.");
    }

    #[test]
    fn shorthand_and_plural_forms() {
        let mut registry = registry();
        let out = rewrite(&mut registry, &RichText::plain("[!+RL] and [!RL]")).unwrap();
        assert_eq!(out, "Reinforcement Learnings (RLs) and RL");
    }

    #[test]
    fn sentence_case_command() {
        let mut registry = registry();
        let out = rewrite(&mut registry, &RichText::plain(r"\Acr{ML} works.")).unwrap();
        assert_eq!(out, "Machine learning (ML) works.");
    }

    #[test]
    fn options_override_defaults() {
        let mut registry = registry();
        let out = rewrite(
            &mut registry,
            &RichText::plain(r"\acr{RL, style=short-long, case=upper, case_target=long}"),
        )
        .unwrap();
        assert_eq!(out, "RL (REINFORCEMENT LEARNING)");
    }

    #[test]
    fn footnote_is_spliced_after_the_reference() {
        let mut registry = registry();
        let out = rewrite(
            &mut registry,
            &RichText::plain(r"\acr{RL, style=short-footnote} is fun"),
        )
        .unwrap();
        assert_eq!(out, "RL^[RL: Reinforcement Learning] is fun");
    }

    #[test]
    fn unknown_key_aborts() {
        let mut registry = registry();
        let err = rewrite(&mut registry, &RichText::plain(r"\acr{DL}")).unwrap_err();
        assert_eq!(
            err,
            PassError::Render(RenderError::Registry(RegistryError::NotFound(
                "DL".to_string()
            )))
        );
    }

    #[test]
    fn unknown_style_aborts() {
        let mut registry = registry();
        let err = rewrite(&mut registry, &RichText::plain(r"\acr{RL, style=fancy}")).unwrap_err();
        assert_eq!(
            err,
            PassError::Render(RenderError::UnknownStyle("fancy".to_string()))
        );
    }

    #[test]
    fn malformed_boolean_is_rejected() {
        let mut registry = registry();
        let err =
            rewrite(&mut registry, &RichText::plain(r"\acr{RL, plural=maybe}")).unwrap_err();
        assert!(matches!(err, PassError::InvalidMarker { .. }));
    }

    #[test]
    fn document_splits_on_blank_lines() {
        let document = Document::parse("one\ntwo\n\n\nthree\n", true);
        assert_eq!(
            document.sections(),
            [
                Section::Paragraph(RichText::plain("one two")),
                Section::Paragraph(RichText::plain("three")),
            ]
        );
    }

    #[test]
    fn unparsed_paragraphs_are_kept_as_source() {
        let document = Document::parse("*one*\ntwo\n", false);
        assert_eq!(
            document.sections(),
            [Section::Markdown {
                source: "*one*\ntwo".to_string(),
                protected: Vec::new(),
            }]
        );
    }

    #[test]
    fn link_reference_definitions_are_kept() {
        let document = Document::parse("See [docs][d].\n\n[d]: https://example.com\n", true);
        assert_eq!(
            document.sections().last(),
            Some(&Section::Literal("[d]: https://example.com".to_string()))
        );
    }

    #[test]
    fn blocks_other_than_paragraphs_survive_the_pass() {
        let mut registry = registry();
        let mut config = Config::default();
        config.insert_links = false;

        let document = Document::parse(
            "# Introduction\n\nWe use \\acr{RL}.\n\n- first \\acr{RL}\n- second `\\acr{RL}`\n\n> quoted\n",
            true,
        );
        let blocks: Vec<String> = convert(&document, &mut registry, &config)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            blocks,
            [
                "# Introduction",
                "We use Reinforcement Learning (RL).",
                "- first RL\n- second `\\acr{RL}`",
                "> quoted",
            ]
        );
    }

    #[test]
    fn code_blocks_are_copied_verbatim() {
        let mut registry = registry();
        let document = Document::parse("```\n\\acr{RL}\n```\n\n    \\acr{ML}\n", true);
        let blocks = convert(&document, &mut registry, &Config::default()).unwrap();

        assert_eq!(
            blocks,
            [
                Block::Markdown("```\n\\acr{RL}\n```".to_string()),
                Block::Markdown("    \\acr{ML}".to_string()),
            ]
        );
        assert!(registry.iter().all(|acronym| !acronym.is_used()));
    }

    #[test]
    fn headings_render_references_in_place() {
        let mut registry = registry();
        let mut config = Config::default();
        config.insert_links = false;

        let blocks = convert(
            &Document::parse("## About \\Acr{ML}\n", true),
            &mut registry,
            &config,
        )
        .unwrap();

        assert_eq!(
            blocks,
            [Block::Markdown("## About Machine learning (ML)".to_string())]
        );
    }

    #[test]
    fn convert_replaces_print_acronyms_after_the_pass() {
        let mut registry = registry();
        let mut config = Config::default();
        config.insert_links = false;
        config.include_unused = false;
        config.set_sorting(crate::domain::SortCriterion::Usage);

        let document = Document::parse(
            "\\printacronyms\n\nFirst \\acr{ML}, then \\acr{RL}.\n",
            false,
        );
        let blocks = convert(&document, &mut registry, &config).unwrap();

        assert_eq!(
            blocks[1].to_string(),
            "First machine learning (ML), then Reinforcement Learning (RL)."
        );
        let Block::Glossary { entries, .. } = &blocks[0] else {
            panic!("expected glossary, got {:?}", blocks[0]);
        };
        let shortnames: Vec<_> = entries.iter().map(|e| e.shortname.stringify()).collect();
        assert_eq!(shortnames, ["ML", "RL"]);
    }
}
