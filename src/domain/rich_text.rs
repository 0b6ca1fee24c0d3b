//! Rich text: a tree of plain-text leaves and nested formatting wrappers.
//!
//! Every other component reads and writes this representation. Only leaves
//! hold literal text; wrappers carry formatting and recursively contain more
//! rich text.

use std::fmt;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// The kind of formatting applied by a [`Inline::Styled`] wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// Emphasised (usually italic) text.
    Emphasis,
    /// Strongly emphasised (usually bold) text.
    Strong,
    /// A generic span with no formatting of its own.
    Span,
    /// Struck-out text.
    Strikeout,
    /// Small capitals.
    SmallCaps,
    /// Superscript.
    Superscript,
    /// Subscript.
    Subscript,
    /// Underlined text.
    Underline,
}

/// A single node in a [`RichText`] tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// A leaf holding literal text.
    Text(String),
    /// A formatting wrapper around nested rich text.
    Styled {
        /// The formatting applied to the children.
        kind: StyleKind,
        /// The wrapped content.
        children: RichText,
    },
    /// A hyperlink around a rendered fragment.
    Link {
        /// The link target, e.g. `#acronyms_RL`.
        target: String,
        /// The linked content.
        children: RichText,
    },
    /// An inline footnote.
    Note(RichText),
}

impl Inline {
    /// Creates a leaf node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Creates a formatting wrapper.
    pub fn styled(kind: StyleKind, children: impl Into<RichText>) -> Self {
        Self::Styled {
            kind,
            children: children.into(),
        }
    }

    /// Creates a hyperlink wrapper.
    pub fn link(target: impl Into<String>, children: impl Into<RichText>) -> Self {
        Self::Link {
            target: target.into(),
            children: children.into(),
        }
    }

    /// The nested content of a wrapper, or `None` for a leaf.
    #[must_use]
    pub const fn children(&self) -> Option<&RichText> {
        match self {
            Self::Text(_) => None,
            Self::Styled { children, .. } | Self::Link { children, .. } | Self::Note(children) => {
                Some(children)
            }
        }
    }

    pub(crate) const fn children_mut(&mut self) -> Option<&mut RichText> {
        match self {
            Self::Text(_) => None,
            Self::Styled { children, .. } | Self::Link { children, .. } | Self::Note(children) => {
                Some(children)
            }
        }
    }
}

/// An ordered sequence of [`Inline`] nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText(Vec<Inline>);

impl RichText {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a tree holding a single leaf.
    pub fn plain(text: impl Into<String>) -> Self {
        Self(vec![Inline::text(text)])
    }

    /// Parses an inline markdown snippet.
    ///
    /// Emphasis, strong emphasis, strikethrough, superscript, subscript and
    /// links become wrappers. Inline code becomes plain text, and line breaks
    /// (including paragraph boundaries) collapse to a single space.
    #[must_use]
    pub fn from_markdown(source: &str) -> Self {
        let options =
            Options::ENABLE_STRIKETHROUGH | Options::ENABLE_SUPERSCRIPT | Options::ENABLE_SUBSCRIPT;

        // Each open wrapper is a partially built node plus its children so far.
        let mut stack: Vec<(Option<Inline>, Self)> = vec![(None, Self::new())];
        let mut paragraphs = 0usize;

        for event in Parser::new_ext(source, options) {
            match event {
                Event::Start(Tag::Paragraph) => {
                    if paragraphs > 0 {
                        push_text(&mut stack, " ");
                    }
                    paragraphs += 1;
                }
                Event::Start(tag) => {
                    let open = match tag {
                        Tag::Emphasis => Some(Inline::styled(StyleKind::Emphasis, Self::new())),
                        Tag::Strong => Some(Inline::styled(StyleKind::Strong, Self::new())),
                        Tag::Strikethrough => {
                            Some(Inline::styled(StyleKind::Strikeout, Self::new()))
                        }
                        Tag::Superscript => {
                            Some(Inline::styled(StyleKind::Superscript, Self::new()))
                        }
                        Tag::Subscript => Some(Inline::styled(StyleKind::Subscript, Self::new())),
                        Tag::Link { dest_url, .. } => {
                            Some(Inline::link(dest_url.to_string(), Self::new()))
                        }
                        _ => None,
                    };
                    if let Some(open) = open {
                        stack.push((Some(open), Self::new()));
                    }
                }
                Event::End(
                    TagEnd::Emphasis
                    | TagEnd::Strong
                    | TagEnd::Strikethrough
                    | TagEnd::Superscript
                    | TagEnd::Subscript
                    | TagEnd::Link,
                ) => {
                    if stack.len() > 1 {
                        close_wrapper(&mut stack);
                    }
                }
                Event::Text(text) | Event::Code(text) => push_text(&mut stack, &text),
                Event::SoftBreak | Event::HardBreak => push_text(&mut stack, " "),
                _ => {}
            }
        }

        // Unbalanced input: fold anything left open back into its parent.
        while stack.len() > 1 {
            close_wrapper(&mut stack);
        }

        stack.pop().map(|(_, root)| root).unwrap_or_default()
    }

    /// Returns `true` if the tree has no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the tree carries no formatting: it is empty or a
    /// single leaf.
    ///
    /// Plain names can be pluralised by appending a suffix. Rich names cannot.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        match self.0.as_slice() {
            [] | [Inline::Text(_)] => true,
            _ => false,
        }
    }

    /// The nodes of the tree.
    #[must_use]
    pub fn nodes(&self) -> &[Inline] {
        &self.0
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Inline] {
        &mut self.0
    }

    /// Appends a node.
    ///
    /// Adjacent leaves are merged, so `plain("a")` followed by `text("b")` is
    /// the single leaf `"ab"`.
    pub fn push(&mut self, node: Inline) {
        if let Inline::Text(text) = &node {
            if let Some(Inline::Text(last)) = self.0.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.0.push(node);
    }

    /// Appends a leaf.
    pub fn push_text(&mut self, text: &str) {
        self.push(Inline::text(text));
    }

    /// Appends every node of `other`, preserving its structure.
    ///
    /// Unlike [`push`](Self::push), leaves are not merged across the seam:
    /// `plain("a").concat(plain("b"))` has two leaves.
    pub fn append(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Concatenates two trees, keeping the leaf boundaries of both.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.append(other);
        self
    }

    /// Concatenates the text of every leaf in document order.
    #[must_use]
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        self.stringify_into(&mut out);
        out
    }

    fn stringify_into(&self, out: &mut String) {
        for node in &self.0 {
            match node {
                Inline::Text(text) => out.push_str(text),
                other => {
                    if let Some(children) = other.children() {
                        children.stringify_into(out);
                    }
                }
            }
        }
    }
}

/// Pops the innermost open wrapper, fills in its children and appends it to
/// its parent.
fn close_wrapper(stack: &mut Vec<(Option<Inline>, RichText)>) {
    if let Some((Some(mut node), content)) = stack.pop() {
        if let Some(children) = node.children_mut() {
            *children = content;
        }
        if let Some((_, parent)) = stack.last_mut() {
            parent.push(node);
        }
    }
}

fn push_text(stack: &mut [(Option<Inline>, RichText)], text: &str) {
    if let Some((_, content)) = stack.last_mut() {
        content.push_text(text);
    }
}

impl From<Vec<Inline>> for RichText {
    fn from(nodes: Vec<Inline>) -> Self {
        let mut tree = Self::new();
        for node in nodes {
            tree.push(node);
        }
        tree
    }
}

impl From<Inline> for RichText {
    fn from(node: Inline) -> Self {
        Self(vec![node])
    }
}

impl From<&str> for RichText {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl IntoIterator for RichText {
    type Item = Inline;
    type IntoIter = std::vec::IntoIter<Inline>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Pushes each node in turn, merging adjacent leaves.
impl Extend<Inline> for RichText {
    fn extend<I: IntoIterator<Item = Inline>>(&mut self, iter: I) {
        for node in iter {
            self.push(node);
        }
    }
}

impl FromIterator<Inline> for RichText {
    fn from_iter<I: IntoIterator<Item = Inline>>(iter: I) -> Self {
        let mut tree = Self::new();
        for node in iter {
            tree.push(node);
        }
        tree
    }
}

/// Writes the tree as Pandoc markdown.
impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.0 {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(&escape_markdown(text)),
            Self::Styled { kind, children } => match kind {
                StyleKind::Emphasis => write!(f, "*{children}*"),
                StyleKind::Strong => write!(f, "**{children}**"),
                StyleKind::Span => write!(f, "[{children}]{{}}"),
                StyleKind::Strikeout => write!(f, "~~{children}~~"),
                StyleKind::SmallCaps => write!(f, "[{children}]{{.smallcaps}}"),
                StyleKind::Superscript => write!(f, "^{children}^"),
                StyleKind::Subscript => write!(f, "~{children}~"),
                StyleKind::Underline => write!(f, "[{children}]{{.underline}}"),
            },
            Self::Link { target, children } => write!(f, "[{children}]({target})"),
            Self::Note(children) => write!(f, "^[{children}]"),
        }
    }
}

/// Backslash-escapes characters that Pandoc markdown would read as markup.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '>' | '#' | '$' | '^' | '~'
        ) {
            result.push('\\');
        }
        result.push(ch);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_merges_adjacent_leaves() {
        let mut tree = RichText::plain("Reinforcement");
        tree.push_text(" Learning");
        assert_eq!(tree, RichText::plain("Reinforcement Learning"));
    }

    #[test]
    fn single_leaf_is_plain() {
        assert!(RichText::plain("RL").is_plain());
        assert!(RichText::new().is_plain());
    }

    #[test]
    fn wrapper_is_rich() {
        let tree = RichText::from(Inline::styled(StyleKind::Emphasis, "RL"));
        assert!(!tree.is_plain());
    }

    #[test]
    fn stringify_flattens_nested_wrappers() {
        let tree = RichText::from(vec![
            Inline::text("a"),
            Inline::styled(
                StyleKind::Strong,
                RichText::from(vec![
                    Inline::text("b"),
                    Inline::styled(StyleKind::Emphasis, "c"),
                ]),
            ),
            Inline::text("d"),
        ]);
        assert_eq!(tree.stringify(), "abcd");
    }

    #[test]
    fn markdown_parses_nested_emphasis() {
        let tree = RichText::from_markdown("*Reinforcement* **Learning _agent_**");
        let expected = RichText::from(vec![
            Inline::styled(StyleKind::Emphasis, "Reinforcement"),
            Inline::text(" "),
            Inline::styled(
                StyleKind::Strong,
                RichText::from(vec![
                    Inline::text("Learning "),
                    Inline::styled(StyleKind::Emphasis, "agent"),
                ]),
            ),
        ]);
        assert_eq!(tree, expected);
    }

    #[test]
    fn markdown_without_formatting_is_plain() {
        let tree = RichText::from_markdown("Hypertext Markup Language");
        assert_eq!(tree, RichText::plain("Hypertext Markup Language"));
    }

    #[test]
    fn concat_keeps_leaf_boundaries() {
        let tree = RichText::plain("Reinforcement Learning")
            .concat(RichText::plain(" ("))
            .concat(RichText::plain("RL"))
            .concat(RichText::plain(")"));
        assert_eq!(
            tree.nodes(),
            [
                Inline::text("Reinforcement Learning"),
                Inline::text(" ("),
                Inline::text("RL"),
                Inline::text(")"),
            ]
        );
        assert_eq!(tree.stringify(), "Reinforcement Learning (RL)");
    }

    #[test]
    fn extend_merges_adjacent_leaves() {
        let mut tree = RichText::plain("We use ");
        tree.extend(RichText::plain("RL").concat(RichText::plain(" here")));
        assert_eq!(tree, RichText::plain("We use RL here"));
    }

    #[test]
    fn literal_markup_characters_are_escaped() {
        let tree = RichText::plain("*x*");
        assert_eq!(tree.to_string(), r"\*x\*");
        assert_eq!(RichText::from_markdown(&tree.to_string()), tree);
    }

    #[test]
    fn escaped_text_survives_a_round_trip() {
        let literal = RichText::plain(r"a_b [c] `d` ^e^ ~f~ \g # <h>");
        assert_eq!(RichText::from_markdown(&literal.to_string()), literal);

        let parsed = RichText::from_markdown(r"\*not emphasis\*");
        assert_eq!(parsed, RichText::plain("*not emphasis*"));
        assert_eq!(parsed.to_string(), r"\*not emphasis\*");
    }

    #[test]
    fn display_writes_pandoc_markdown() {
        let tree = RichText::from(vec![
            Inline::link(
                "#acronyms_RL",
                RichText::from(vec![
                    Inline::styled(StyleKind::Emphasis, "RL"),
                    Inline::styled(StyleKind::SmallCaps, "x"),
                ]),
            ),
            Inline::Note(RichText::plain("note")),
        ]);
        assert_eq!(tree.to_string(), "[*RL*[x]{.smallcaps}](#acronyms_RL)^[note]");
    }
}
