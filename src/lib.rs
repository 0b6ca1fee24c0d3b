//! Acronym rendering for Pandoc-style documents
//!
//! Acronyms are defined once, referenced throughout a document and rendered
//! differently on first and subsequent use. A glossary lists them in a chosen
//! order.

pub mod domain;
pub use domain::{
    Acronym, Anchors, Case, CaseTarget, Config, Engine, Key, Registry, RegistryError,
    RenderError, RenderOptions, RenderRequest, Rendered, RichText, SortCriterion, SortError,
    Style,
};

/// Loading acronym definitions from files.
pub mod storage;
pub use storage::{Definitions, LoadError};

pub mod pass;
pub use pass::{Document, Pass, PassError, convert};
